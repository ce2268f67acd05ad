//! Coastline outlines from Natural Earth GeoJSON.

use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use geojson::{FeatureCollection, GeoJson, Position, Value};
use reqwest::Client;

use crate::download::download_object;

pub const COASTLINE_URL: &str = "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson/ne_110m_coastline.geojson";

const COASTLINE_FILE: &str = "ne_110m_coastline.geojson";

/// A connected line of (lon, lat) vertices in degrees.
pub type Polyline = Vec<(f32, f32)>;

/// Loads the coastlines, from `cache_dir` when a copy is present there.
pub async fn load_coastlines(client: &Client, cache_dir: Option<&Path>) -> Result<Vec<Polyline>> {
    let json = match cache_dir {
        Some(dir) => {
            let path = dir.join(COASTLINE_FILE);
            if !path.is_file() {
                download_object(client, COASTLINE_URL, &path).await?;
            }
            fs::read_to_string(&path)?
        }
        None => client
            .get(COASTLINE_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?,
    };

    parse_coastlines(&json)
}

/// Extracts every line and polygon ring of a GeoJSON feature collection.
pub fn parse_coastlines(json: &str) -> Result<Vec<Polyline>> {
    let geojson: GeoJson = json.parse().context("Malformed coastline GeoJSON")?;
    let collection =
        FeatureCollection::try_from(geojson).context("Coastlines are not a feature collection")?;

    let mut lines = Vec::new();
    for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
        match &geometry.value {
            Value::LineString(line) => lines.push(to_polyline(line)?),
            Value::MultiLineString(parts) | Value::Polygon(parts) => {
                for part in parts {
                    lines.push(to_polyline(part)?);
                }
            }
            Value::MultiPolygon(polygons) => {
                for ring in polygons.iter().flatten() {
                    lines.push(to_polyline(ring)?);
                }
            }
            _ => {}
        }
    }

    Ok(lines)
}

fn to_polyline(positions: &[Position]) -> Result<Polyline> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Ok((*lon as f32, *lat as f32)),
            _ => Err(anyhow!("Invalid position {:?}", position)),
        })
        .collect()
}

// -- Tests -------------------------------------------------------------------
