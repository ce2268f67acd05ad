//! The turbo colormap, as a polynomial fit.

use image::Rgb;

const RED: [f32; 6] = [0.13572138, 4.61539260, -42.66032258, 132.13108234, -152.94239396, 59.28637943];
const GREEN: [f32; 6] = [0.09140261, 2.19418839, 4.84296658, -14.18503333, 4.27729857, 2.82956604];
const BLUE: [f32; 6] = [0.10667330, 12.64194608, -60.58204836, 110.36276771, -89.90310912, 27.34824973];

/// Colour for `t` in [0, 1]; values outside are clamped.
pub fn turbo(t: f32) -> Rgb<u8> {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    Rgb([channel(&RED, t), channel(&GREEN, t), channel(&BLUE, t)])
}

fn channel(coefficients: &[f32; 6], t: f32) -> u8 {
    let v = coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c);
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Linear mapping of a value range onto [0, 1].
pub struct Normalize {
    pub min: f32,
    pub max: f32,
}

impl Normalize {
    pub fn new(min: f32, max: f32) -> Self {
        Normalize { min, max }
    }

    pub fn apply(&self, v: f32) -> f32 {
        let span = self.max - self.min;
        if span <= f32::EPSILON {
            0.5
        } else {
            (v - self.min) / span
        }
    }
}

// -- Tests -------------------------------------------------------------------
