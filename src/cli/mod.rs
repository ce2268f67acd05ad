//! Command line interface.

pub mod command;

use std::{num::NonZeroUsize, path::PathBuf, time::Duration};

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::GlmError;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// Plot a day of GOES GLM lightning events on a world map
pub struct Cli {
    /// Day to plot, as YYYY-MM-DD (UTC)
    #[arg(value_parser = parse_date)]
    pub date: NaiveDate,

    /// GOES satellite number
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u8).range(16..=19))]
    pub satellite: u8,

    /// Image file to write, defaults to ~/glm-events-g<N>-<date>.png
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Width of the map in pixels
    #[arg(long, default_value_t = 1440, value_parser = clap::value_parser!(u32).range(360..=16384))]
    pub width: u32,

    /// Keep downloaded files in this directory and reuse them on later runs
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Only read the first N files of the day
    #[arg(long)]
    pub max_files: Option<NonZeroUsize>,

    /// Also save the events as a parquet file next to the image
    #[arg(long)]
    pub parquet: bool,

    /// TrueType font used for the title and colorbar labels
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Draw the map without coastlines
    #[arg(long)]
    pub no_coastlines: bool,

    /// Log every file
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, GlmError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        // no surrounding whitespace either
        .filter(|_| !s.starts_with(char::is_whitespace))
        .ok_or_else(|| GlmError::InvalidDate(s.to_string()))
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}

// -- Tests -------------------------------------------------------------------
