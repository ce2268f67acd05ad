//! Plate Carrée map frame and the primitives drawn into it.

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_hollow_rect_mut, draw_line_segment_mut},
    rect::Rect,
};

use super::coastline::Polyline;

pub const GRATICULE_STEP: i32 = 30;

const GRATICULE_COLOR: Rgb<u8> = Rgb([205, 205, 205]);
const COASTLINE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const FRAME_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq)]
/// Placement of a global equirectangular map inside an image.
pub struct MapFrame {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl MapFrame {
    /// A 2:1 frame `width` pixels wide with its top left corner at (`x`, `y`).
    pub fn new(x: u32, y: u32, width: u32) -> Self {
        MapFrame {
            x,
            y,
            width,
            height: width / 2,
        }
    }

    /// Image coordinates of a (lon, lat) position.
    pub fn project(&self, lon: f32, lat: f32) -> (f32, f32) {
        let px = self.x as f32 + (lon + 180.0) / 360.0 * self.width as f32;
        let py = self.y as f32 + (90.0 - lat) / 180.0 * self.height as f32;
        (px, py)
    }

    /// The pixel holding a (lon, lat) position, edges folded inwards.
    pub fn pixel(&self, lon: f32, lat: f32) -> (u32, u32) {
        let (px, py) = self.project(lon, lat);
        let max_x = (self.x + self.width - 1) as f32;
        let max_y = (self.y + self.height - 1) as f32;
        (
            px.floor().clamp(self.x as f32, max_x) as u32,
            py.floor().clamp(self.y as f32, max_y) as u32,
        )
    }

    pub fn draw_graticule(&self, img: &mut RgbImage) {
        for lon in (-180..=180).step_by(GRATICULE_STEP as usize) {
            let top = self.project(lon as f32, 90.0);
            let bottom = self.project(lon as f32, -90.0);
            draw_line_segment_mut(img, top, bottom, GRATICULE_COLOR);
        }
        for lat in (-90..=90).step_by(GRATICULE_STEP as usize) {
            let west = self.project(-180.0, lat as f32);
            let east = self.project(180.0, lat as f32);
            draw_line_segment_mut(img, west, east, GRATICULE_COLOR);
        }
    }

    pub fn draw_coastlines(&self, img: &mut RgbImage, lines: &[Polyline]) {
        for line in lines {
            for segment in line.windows(2) {
                let (lon0, lat0) = segment[0];
                let (lon1, lat1) = segment[1];
                // skip segments wrapping around the antimeridian
                if (lon1 - lon0).abs() > 180.0 {
                    continue;
                }
                draw_line_segment_mut(
                    img,
                    self.project(lon0, lat0),
                    self.project(lon1, lat1),
                    COASTLINE_COLOR,
                );
            }
        }
    }

    pub fn draw_frame(&self, img: &mut RgbImage) {
        let rect = Rect::at(self.x as i32, self.y as i32).of_size(self.width, self.height);
        draw_hollow_rect_mut(img, rect, FRAME_COLOR);
    }

    /// Blends a single point over the map.
    pub fn draw_point(&self, img: &mut RgbImage, lon: f32, lat: f32, color: Rgb<u8>, alpha: f32) {
        let (x, y) = self.pixel(lon, lat);
        blend(img, x, y, color, alpha);
    }
}

pub fn blend(img: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>, alpha: f32) {
    if x >= img.width() || y >= img.height() {
        return;
    }
    let pixel = img.get_pixel_mut(x, y);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (src as f32 * alpha + *dst as f32 * (1.0 - alpha)).round() as u8;
    }
}

// -- Tests -------------------------------------------------------------------
