use std::ops::{ Add, Mul };

use crate::feq;

/// An RGB color.
///
/// Components are nominally in `[0, 1]`, but the shading model's albedo
/// weights are independent gains, so values above 1 are expected before tone
/// mapping and are only brought back into range by [`Color::to_rgb8`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl Color {
    pub fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b }
    }

    pub fn black() -> Color {
        Color { r: 0.0, g: 0.0, b: 0.0 }
    }

    pub fn white() -> Color {
        Color { r: 1.0, g: 1.0, b: 1.0 }
    }

    /// Tone-normalizes and quantizes to 8-bit channels.
    ///
    /// Every channel is divided by `max(1, max(r, g, b))`, so an
    /// out-of-range pixel keeps its hue instead of clipping one channel.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let max = 1.0f32.max(self.r.max(self.g.max(self.b)));

        [
            (255.0 * self.r / max).clamp(0.0, 255.0) as u8,
            (255.0 * self.g / max).clamp(0.0, 255.0) as u8,
            (255.0 * self.b / max).clamp(0.0, 255.0) as u8,
        ]
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl Mul<f32> for Color {
    type Output = Self;

    fn mul(self, other: f32) -> Self {
        Self {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/// Component-wise color modulation.
impl Mul<Color> for Color {
    type Output = Self;

    fn mul(self, other: Color) -> Self {
        Self {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
        }
    }
}

/* Tests */

#[test]
fn add_colors() {
    let a = Color::rgb(0.9, 0.6, 0.75);
    let b = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(a + b, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn mul_color_by_scalar() {
    let c = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c * 2.0, Color::rgb(0.4, 0.6, 0.8));
}

#[test]
fn mul_colors_componentwise() {
    let a = Color::rgb(1.0, 0.2, 0.4);
    let b = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(a * b, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn to_rgb8_in_range_passes_through() {
    let c = Color::rgb(0.25, 0.5, 0.75);

    assert_eq!(c.to_rgb8(), [63, 127, 191]);
}

#[test]
fn to_rgb8_normalizes_by_largest_channel() {
    // One channel at 2.0 halves the whole pixel rather than clipping.
    let c = Color::rgb(2.0, 1.0, 0.0);

    assert_eq!(c.to_rgb8(), [255, 127, 0]);
}

#[test]
fn to_rgb8_black_stays_black() {
    assert_eq!(Color::black().to_rgb8(), [0, 0, 0]);
}
