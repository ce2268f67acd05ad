pub mod plot_day;

use std::path::PathBuf;

use chrono::NaiveDate;
pub use plot_day::plot_day;

use crate::glm::Satellite;

pub fn make_image_file_name(satellite: Satellite, date: NaiveDate) -> PathBuf {
    let file_name = format!(
        "glm-events-{}-{}.png",
        satellite.platform().to_lowercase(),
        date.format("%Y-%m-%d")
    );

    dirs::home_dir().unwrap_or_default().join(file_name)
}

pub fn make_title(satellite: Satellite, date: NaiveDate) -> String {
    format!("{} GLM Events {}", satellite.display_name(), date.format("%Y-%m-%d"))
}

// -- Tests -------------------------------------------------------------------
