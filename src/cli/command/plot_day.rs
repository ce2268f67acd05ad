//! Download a day of GLM files and plot their events.

use std::{fs, num::NonZeroUsize, path::Path};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::{
    cli::{create_progress_bar, create_spinner, Cli},
    deserialise::read_events,
    download::{fetch_object, Fetched},
    error::GlmError,
    glm::{day_prefixes, DayEvents, GlmFileName, Satellite},
    parquet,
    render::{load_coastlines, load_font, render_day, save_png, PlotStyle},
    s3::{BucketClient, S3Object},
};

use super::{make_image_file_name, make_title};

pub async fn plot_day(args: &Cli) -> Result<String> {
    let satellite = Satellite(args.satellite);
    let bucket = BucketClient::new(&satellite.bucket()).await;

    run(args, &bucket).await
}

async fn run(args: &Cli, bucket: &BucketClient) -> Result<String> {
    let satellite = Satellite(args.satellite);
    let image_path = args
        .output
        .clone()
        .unwrap_or_else(|| make_image_file_name(satellite, args.date));

    let mut style = PlotStyle::new(args.width, make_title(satellite, args.date));
    if let Some(font_path) = &args.font {
        style.font = Some(load_font(font_path)?);
    }

    let objects = list_day(bucket, satellite, args.date, args.max_files).await?;
    if objects.is_empty() {
        return Err(GlmError::NoFiles {
            bucket: satellite.bucket(),
            date: args.date.to_string(),
        }
        .into());
    }

    let tmp_dir = TempDir::new()?;
    let (download_dir, keep_files) = match &args.cache_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            (dir.clone(), true)
        }
        None => (tmp_dir.path().to_path_buf(), false),
    };

    let day = read_day(bucket, &objects, &download_dir, keep_files).await?;
    if day.is_empty() {
        warn!("no valid events in {} files", day.files());
    } else {
        info!("{} events in {} files", day.len(), day.files());
    }

    if !args.no_coastlines {
        let bar = create_spinner("Loading coastlines...".to_string());
        let loaded = load_coastlines(bucket.http(), args.cache_dir.as_deref()).await;
        match loaded {
            Ok(lines) => {
                bar.finish_with_message(format!("{} coastline segments loaded", lines.len()));
                style.coastlines = lines;
            }
            Err(e) => {
                bar.finish_and_clear();
                warn!("drawing map without coastlines: {:#}", e);
            }
        }
    }

    let img = render_day(&day, &style);
    save_png(&img, &image_path)?;

    if args.parquet {
        let parquet_path = image_path.with_extension("parquet");
        parquet::save_events(day.events(), args.date, &parquet_path)?;
        info!("events saved to {}", parquet_path.display());
    }

    Ok(image_path.to_string_lossy().to_string())
}

/// Lists the LCFA files of `satellite` for each hour of `date`, in time order.
async fn list_day(
    bucket: &BucketClient,
    satellite: Satellite,
    date: NaiveDate,
    max_files: Option<NonZeroUsize>,
) -> Result<Vec<S3Object>> {
    let max_files = max_files.map(NonZeroUsize::get);
    let prefixes = day_prefixes(date);
    let pb = create_progress_bar(prefixes.len() as u64, "Listing hours...".to_string());
    let mut objects = Vec::new();

    for prefix in &prefixes {
        let listed = bucket.list_objects(prefix).await?;
        let n_listed = listed.len();

        objects.extend(listed.into_iter().filter(|o| {
            GlmFileName::parse(&o.key)
                .map(|name| name.is_from(satellite))
                .unwrap_or(false)
        }));
        pb.suspend(|| debug!("{}: {} objects", prefix, n_listed));

        pb.inc(1);
        if max_files.is_some_and(|max| objects.len() >= max) {
            break;
        }
    }

    if let Some(max) = max_files {
        objects.truncate(max);
    }
    pb.finish_with_message(format!("{} files listed", objects.len()));

    let first = objects.first().and_then(|o| GlmFileName::parse(&o.key).ok());
    let last = objects.last().and_then(|o| GlmFileName::parse(&o.key).ok());
    if let (Some(first), Some(last)) = (first, last) {
        info!("scans from {} to {}", first.start, last.end);
    }

    Ok(objects)
}

/// Fetches and reads every object, one after another.
async fn read_day(
    bucket: &BucketClient,
    objects: &[S3Object],
    download_dir: &Path,
    keep_files: bool,
) -> Result<DayEvents> {
    let pb = create_progress_bar(objects.len() as u64, "Downloading files...".to_string());
    let mut day = DayEvents::new();

    for object in objects {
        let (file_path, fetched) = fetch_object(bucket, object, download_dir).await?;
        let events = read_events(&file_path)
            .with_context(|| format!("Failed to read {}", object.key))?;
        pb.suspend(|| match fetched {
            Fetched::Cached => debug!("{}: {} events (cached)", object.file_name(), events.len()),
            Fetched::Downloaded(bytes) => {
                debug!("{}: {} events ({} bytes)", object.file_name(), events.len(), bytes)
            }
        });
        day.push_file(events);

        if !keep_files {
            fs::remove_file(&file_path)?;
        }
        pb.inc(1);
    }

    pb.finish_with_message("Files downloaded");

    Ok(day)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use clap::Parser;
    use httpmock::prelude::*;
    use reqwest::Client;

    use super::*;
    use crate::deserialise::tests::write_sample_file;

    const DATE: &str = "2023-07-04";
    const BUCKET: &str = "noaa-goes16";
    const KEY_00: &str = "GLM-L2-LCFA/2023/185/00/OR_GLM-L2-LCFA_G16_s20231850000000_e20231850000200_c20231850000217.nc";
    const KEY_13: &str = "GLM-L2-LCFA/2023/185/13/OR_GLM-L2-LCFA_G16_s20231851300000_e20231851300200_c20231851300218.nc";
    const FOREIGN_KEY: &str = "GLM-L2-LCFA/2023/185/13/README.txt";

    fn listing(keys: &[(&str, usize)]) -> String {
        let contents: String = keys
            .iter()
            .map(|(key, size)| {
                format!(
                    "<Contents><Key>{}</Key><LastModified>2023-07-04T00:00:22.000Z</LastModified><Size>{}</Size></Contents>",
                    key, size
                )
            })
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>noaa-goes16</Name><IsTruncated>false</IsTruncated>{}</ListBucketResult>"#,
            contents
        )
    }

    /// Serves one listing per hour of the test date, with the given objects.
    async fn mock_bucket(server: &MockServer, files: &[(&'static str, Vec<u8>)], extra: &[&'static str]) {
        let date = NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();

        for prefix in day_prefixes(date) {
            let mut keys: Vec<(&str, usize)> = files
                .iter()
                .filter(|(key, _)| key.starts_with(prefix.as_str()))
                .map(|(key, body)| (*key, body.len()))
                .collect();
            keys.extend(extra.iter().filter(|k| k.starts_with(prefix.as_str())).map(|k| (*k, 10)));
            let body = listing(&keys);

            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path_contains(BUCKET)
                        .query_param("list-type", "2")
                        .query_param("prefix", prefix.as_str());
                    then.status(200).body(body);
                })
                .await;
        }

        for (key, bytes) in files {
            let bytes = bytes.clone();
            server
                .mock_async(|when, then| {
                    when.method(GET).path(format!("/{}/{}", BUCKET, key));
                    then.status(200).body(bytes);
                })
                .await;
        }
    }

    async fn local_bucket(server: &MockServer) -> BucketClient {
        BucketClient::with_endpoint(Client::new(), BUCKET, &server.base_url()).await
    }

    fn sample_bytes(dir: &Path, name: &str, n_events: usize) -> Vec<u8> {
        let lat: Vec<i16> = (0..n_events).map(|i| (30000 + i * 100) as u16 as i16).collect();
        let lon: Vec<i16> = (0..n_events).map(|i| (20000 + i * 100) as u16 as i16).collect();
        let energy: Vec<i16> = (0..n_events).map(|i| (i + 1) as i16).collect();
        let path = write_sample_file(dir, name, &lat, &lon, &energy);

        fs::read(path).unwrap()
    }

    fn args(output: &Path, extra: &[&str]) -> Cli {
        let mut argv = vec![
            "glmday".to_string(),
            DATE.to_string(),
            "--no-coastlines".to_string(),
            "--width".to_string(),
            "360".to_string(),
            "--output".to_string(),
            output.to_string_lossy().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));

        Cli::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn should_plot_all_files_of_the_day() {
        let tmp_dir = TempDir::new().unwrap();
        let files = vec![
            (KEY_00, sample_bytes(tmp_dir.path(), "a.nc", 3)),
            (KEY_13, sample_bytes(tmp_dir.path(), "b.nc", 2)),
        ];
        let server = MockServer::start_async().await;
        mock_bucket(&server, &files, &[FOREIGN_KEY]).await;

        let output = tmp_dir.path().join("day.png");
        let cli = args(&output, &["--parquet"]);
        let bucket = local_bucket(&server).await;

        let saved = run(&cli, &bucket).await.unwrap();

        assert_eq!(saved, output.to_string_lossy());
        assert!(output.is_file());
        assert!(tmp_dir.path().join("day.parquet").is_file());
    }

    #[tokio::test]
    async fn should_read_events_in_key_order() {
        let tmp_dir = TempDir::new().unwrap();
        let files = vec![
            (KEY_00, sample_bytes(tmp_dir.path(), "a.nc", 3)),
            (KEY_13, sample_bytes(tmp_dir.path(), "b.nc", 2)),
        ];
        let server = MockServer::start_async().await;
        mock_bucket(&server, &files, &[FOREIGN_KEY]).await;
        let bucket = local_bucket(&server).await;
        let date = NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();

        let objects = list_day(&bucket, Satellite(16), date, None).await.unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].key, KEY_00);

        let download_dir = tmp_dir.path().join("downloads");
        fs::create_dir_all(&download_dir).unwrap();
        let day = read_day(&bucket, &objects, &download_dir, false).await.unwrap();

        assert_eq!(day.files(), 2);
        assert_eq!(day.len(), 5);
        assert_eq!(fs::read_dir(&download_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn should_limit_number_of_files() {
        let tmp_dir = TempDir::new().unwrap();
        let files = vec![
            (KEY_00, sample_bytes(tmp_dir.path(), "a.nc", 3)),
            (KEY_13, sample_bytes(tmp_dir.path(), "b.nc", 2)),
        ];
        let server = MockServer::start_async().await;
        mock_bucket(&server, &files, &[]).await;
        let bucket = local_bucket(&server).await;
        let date = NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();

        let objects = list_day(&bucket, Satellite(16), date, NonZeroUsize::new(1)).await.unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].key, KEY_00);
    }

    #[tokio::test]
    async fn should_keep_files_in_cache_dir() {
        let tmp_dir = TempDir::new().unwrap();
        let files = vec![(KEY_00, sample_bytes(tmp_dir.path(), "a.nc", 4))];
        let server = MockServer::start_async().await;
        mock_bucket(&server, &files, &[]).await;

        let cache_dir = tmp_dir.path().join("cache");
        let output = tmp_dir.path().join("cached.png");
        let cli = args(&output, &["--cache-dir", &cache_dir.to_string_lossy()]);
        let bucket = local_bucket(&server).await;

        run(&cli, &bucket).await.unwrap();

        let cached = cache_dir.join(KEY_00.rsplit('/').next().unwrap());
        assert!(cached.is_file());
    }

    #[tokio::test]
    async fn should_fail_when_no_files_exist() {
        let tmp_dir = TempDir::new().unwrap();
        let server = MockServer::start_async().await;
        mock_bucket(&server, &[], &[FOREIGN_KEY]).await;

        let output = tmp_dir.path().join("empty.png");
        let cli = args(&output, &[]);
        let bucket = local_bucket(&server).await;

        let err = run(&cli, &bucket).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<GlmError>(), Some(GlmError::NoFiles { .. })));
        assert!(!output.exists());
    }
}
