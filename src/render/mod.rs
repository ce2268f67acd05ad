//! Renders a day of events as a scatter plot over a world map.

pub mod coastline;
pub mod colormap;
pub mod map;

use std::{fs, path::Path};

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut, text_size};

pub use coastline::{load_coastlines, Polyline};
use colormap::{turbo, Normalize};
use map::MapFrame;

use crate::glm::DayEvents;

pub const POINT_ALPHA: f32 = 0.6;
pub const COLORBAR_LABEL: &str = "log10(Event energy)";

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const TITLE_BAND: u32 = 48;
const COLORBAR_GAP: u32 = 24;
const COLORBAR_HEIGHT: u32 = 16;
const COLORBAR_BAND: u32 = 80;

/// What to draw besides the events.
pub struct PlotStyle {
    /// Width of the map area in pixels.
    pub width: u32,
    pub title: String,
    pub coastlines: Vec<Polyline>,
    /// Labels are only drawn when a font is given.
    pub font: Option<FontVec>,
}

impl PlotStyle {
    pub fn new(width: u32, title: impl Into<String>) -> Self {
        PlotStyle {
            width,
            title: title.into(),
            coastlines: Vec::new(),
            font: None,
        }
    }
}

pub fn load_font(path: &Path) -> Result<FontVec> {
    let data = fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    FontVec::try_from_vec(data).with_context(|| format!("Invalid font {}", path.display()))
}

/// Draws the events of `day` coloured by `log10(energy)`.
pub fn render_day(day: &DayEvents, style: &PlotStyle) -> RgbImage {
    let margin = (style.width / 24).max(16);
    let frame = MapFrame::new(margin, TITLE_BAND, style.width);
    let mut img = RgbImage::from_pixel(
        frame.width + 2 * margin,
        TITLE_BAND + frame.height + COLORBAR_BAND,
        BACKGROUND,
    );

    frame.draw_graticule(&mut img);
    frame.draw_coastlines(&mut img, &style.coastlines);

    let range = day.energy_range();
    if let Some((min, max)) = range {
        let norm = Normalize::new(min, max);
        for event in day.events() {
            if let Some(v) = event.log_energy() {
                frame.draw_point(&mut img, event.lon, event.lat, turbo(norm.apply(v)), POINT_ALPHA);
            }
        }
    }

    frame.draw_frame(&mut img);

    if let Some(font) = &style.font {
        let center = img.width() / 2;
        draw_centered(&mut img, font, PxScale::from(22.0), &style.title, center, 12);
    }
    if let Some((min, max)) = range {
        draw_colorbar(&mut img, &frame, Normalize::new(min, max), style.font.as_ref());
    }

    img
}

pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to save {}", path.display()))
}

fn draw_colorbar(img: &mut RgbImage, frame: &MapFrame, norm: Normalize, font: Option<&FontVec>) {
    let x0 = frame.x + frame.width / 8;
    let width = frame.width * 3 / 4;
    let y0 = frame.y + frame.height + COLORBAR_GAP;

    for dx in 0..width {
        let color = turbo(dx as f32 / (width - 1).max(1) as f32);
        for dy in 0..COLORBAR_HEIGHT {
            img.put_pixel(x0 + dx, y0 + dy, color);
        }
    }

    let scale = PxScale::from(14.0);
    let y_tick = (y0 + COLORBAR_HEIGHT) as f32;
    for tick in colorbar_ticks(norm) {
        let x = x0 as f32 + norm.apply(tick) * (width - 1) as f32;
        draw_line_segment_mut(img, (x, y_tick), (x, y_tick + 5.0), TEXT_COLOR);
        if let Some(font) = font {
            let label = format!("{}", tick);
            draw_centered(img, font, scale, &label, x.round() as u32, y0 + COLORBAR_HEIGHT + 7);
        }
    }

    if let Some(font) = font {
        draw_centered(img, font, scale, COLORBAR_LABEL, x0 + width / 2, y0 + COLORBAR_HEIGHT + 28);
    }
}

/// Integer positions within the normalised range.
fn colorbar_ticks(norm: Normalize) -> Vec<f32> {
    let first = norm.min.ceil() as i32;
    let last = norm.max.floor() as i32;
    (first..=last).map(|t| t as f32).collect()
}

fn draw_centered(img: &mut RgbImage, font: &FontVec, scale: PxScale, text: &str, center_x: u32, y: u32) {
    let (w, _) = text_size(scale, font, text);
    let x = center_x as i32 - (w / 2) as i32;
    draw_text_mut(img, TEXT_COLOR, x, y as i32, scale, font, text);
}

// -- Tests -------------------------------------------------------------------
