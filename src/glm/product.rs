//! Bucket layout and file naming of the GLM Level-2 LCFA product.
//!
//! Objects live under `GLM-L2-LCFA/<year>/<day of year>/<hour>/` in the
//! `noaa-goes<N>` buckets, one file per 20 second scan, named e.g.
//! `OR_GLM-L2-LCFA_G16_s20231850000000_e20231850000200_c20231850000217.nc`.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};

pub const PRODUCT: &str = "GLM-L2-LCFA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A GOES-R series satellite carrying a GLM instrument.
pub struct Satellite(pub u8);

impl Satellite {
    pub fn bucket(&self) -> String {
        format!("noaa-goes{}", self.0)
    }

    pub fn platform(&self) -> String {
        format!("G{}", self.0)
    }

    pub fn display_name(&self) -> String {
        format!("GOES-{}", self.0)
    }
}

/// Prefix holding the files of one UTC hour of `date`.
pub fn hourly_prefix(date: NaiveDate, hour: u32) -> String {
    format!(
        "{}/{}/{:03}/{:02}/",
        PRODUCT,
        date.year(),
        date.ordinal(),
        hour
    )
}

/// The 24 hourly prefixes covering `date`.
pub fn day_prefixes(date: NaiveDate) -> Vec<String> {
    (0..24).map(|hour| hourly_prefix(date, hour)).collect()
}

#[derive(Debug, Clone, PartialEq)]
/// Properties encoded in a GLM LCFA file name.
pub struct GlmFileName {
    pub platform: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl GlmFileName {
    /// Parses the last path segment of `key`.
    pub fn parse(key: &str) -> Result<Self> {
        let file_name = key.rsplit('/').next().unwrap_or(key);
        let stem = file_name
            .strip_suffix(".nc")
            .ok_or_else(|| anyhow!("Not a NetCDF file: {}", file_name))?;

        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() != 6 || parts[0] != "OR" || parts[1] != PRODUCT {
            return Err(anyhow!("Not a {} file name: {}", PRODUCT, file_name));
        }

        let name = GlmFileName {
            platform: parts[2].to_string(),
            start: parse_scan_time(parts[3], 's')?,
            end: parse_scan_time(parts[4], 'e')?,
        };
        // creation time is checked but not kept
        parse_scan_time(parts[5], 'c')?;

        Ok(name)
    }

    pub fn is_from(&self, satellite: Satellite) -> bool {
        self.platform == satellite.platform()
    }
}

// Parses `<tag>YYYYJJJHHMMSSt` where `t` is tenths of a second.
fn parse_scan_time(field: &str, tag: char) -> Result<DateTime<Utc>> {
    let digits = field
        .strip_prefix(tag)
        .filter(|d| d.len() == 14 && d.chars().all(|c| c.is_ascii_digit()))
        .ok_or_else(|| anyhow!("Invalid time field `{}`", field))?;

    let year: i32 = digits[0..4].parse()?;
    let ordinal: u32 = digits[4..7].parse()?;
    let hour: u32 = digits[7..9].parse()?;
    let minute: u32 = digits[9..11].parse()?;
    let second: u32 = digits[11..13].parse()?;
    let tenths: i64 = digits[13..14].parse()?;

    let date = NaiveDate::from_yo_opt(year, ordinal)
        .ok_or_else(|| anyhow!("Invalid day of year in `{}`", field))?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| anyhow!("Invalid time of day in `{}`", field))?;

    Ok(date.and_time(time).and_utc() + TimeDelta::milliseconds(tenths * 100))
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn should_make_hourly_prefix() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();

        assert_eq!(hourly_prefix(date, 0), "GLM-L2-LCFA/2023/185/00/");
        assert_eq!(hourly_prefix(date, 13), "GLM-L2-LCFA/2023/185/13/");
    }

    #[test]
    fn should_pad_day_of_year() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 9).unwrap();
        assert_eq!(hourly_prefix(date, 5), "GLM-L2-LCFA/2020/009/05/");
    }

    #[test]
    fn should_count_leap_day() {
        let date = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        assert_eq!(hourly_prefix(date, 23), "GLM-L2-LCFA/2020/366/23/");
    }

    #[test]
    fn should_cover_whole_day() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();
        let prefixes = day_prefixes(date);

        assert_eq!(prefixes.len(), 24);
        assert_eq!(prefixes[0], "GLM-L2-LCFA/2023/185/00/");
        assert_eq!(prefixes[23], "GLM-L2-LCFA/2023/185/23/");
    }

    #[test]
    fn should_name_satellite_bucket() {
        let sat = Satellite(16);

        assert_eq!(sat.bucket(), "noaa-goes16");
        assert_eq!(sat.platform(), "G16");
        assert_eq!(sat.display_name(), "GOES-16");
        assert_eq!(Satellite(18).bucket(), "noaa-goes18");
    }

    #[test]
    fn should_parse_file_name() {
        let key = "GLM-L2-LCFA/2023/185/00/OR_GLM-L2-LCFA_G16_s20231850000000_e20231850000200_c20231850000217.nc";
        let name = GlmFileName::parse(key).unwrap();

        assert_eq!(name.platform, "G16");
        assert!(name.is_from(Satellite(16)));
        assert!(!name.is_from(Satellite(18)));
        assert_eq!(
            name.start.date_naive(),
            NaiveDate::from_ymd_opt(2023, 7, 4).unwrap()
        );
        assert_eq!(name.end - name.start, TimeDelta::seconds(20));
        assert_eq!(name.end.second(), 20);
        assert_eq!(name.end.nanosecond(), 0);
    }

    #[test]
    fn should_reject_foreign_file_names() {
        assert!(GlmFileName::parse("GLM-L2-LCFA/2023/185/00/index.html").is_err());
        assert!(GlmFileName::parse("OR_ABI-L2-FDCC-M6_G16_s20231850001171_e20231850003544_c20231850004167.nc").is_err());
        assert!(GlmFileName::parse("OR_GLM-L2-LCFA_G16_s2023185_e20231850000200_c20231850000217.nc").is_err());
        assert!(GlmFileName::parse("OR_GLM-L2-LCFA_G16_s20231850000000_e20231850000200_c2023185.nc").is_err());
    }
}
