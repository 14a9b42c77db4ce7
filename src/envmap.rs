use std::f32::consts::PI;
use std::path::Path;

use image::DynamicImage;
use thiserror::Error;

use crate::color::Color;
use crate::vector::Vec3;

/// Errors raised while loading an environment map.
///
/// Any of these is fatal to the run: the map is loaded before the first ray
/// is traced, so no partial image is ever produced.
#[derive(Error, Debug)]
pub enum EnvmapError {
    #[error("failed to decode environment map: {0}")]
    Image(#[from] image::ImageError),

    #[error("environment map must have 3 channels, found {found}")]
    ChannelCount { found: u8 },
}

/// An equirectangular environment map.
///
/// Loaded once before rendering and read-only afterwards; every ray that
/// escapes the scene samples its color here.
#[derive(Clone, Debug, PartialEq)]
pub struct Envmap {
    pub width: usize,
    pub height: usize,
    pub texels: Vec<Color>,
}

impl Envmap {
    /// Loads a 3-channel equirectangular image.
    ///
    /// Texel rows keep the file's order, with row 0 the top of the image:
    /// that is the row `sample` maps a straight-up direction to.
    pub fn load(path: &Path) -> Result<Envmap, EnvmapError> {
        let decoded = image::open(path)?;
        let rgb = match decoded {
            DynamicImage::ImageRgb8(buffer) => buffer,
            other => {
                return Err(EnvmapError::ChannelCount {
                    found: other.color().channel_count(),
                })
            }
        };

        let (width, height) = rgb.dimensions();
        let texels = rgb
            .pixels()
            .map(|p| {
                Color::rgb(
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                )
            })
            .collect();

        Ok(Envmap {
            width: width as usize,
            height: height as usize,
            texels,
        })
    }

    /// A single-texel map, handy for tests and synthetic backdrops.
    pub fn uniform(color: Color) -> Envmap {
        Envmap { width: 1, height: 1, texels: vec![color] }
    }

    /// Samples the map along a normalized direction.
    ///
    /// Spherical coordinates `phi = atan2(z, x)`, `theta = acos(y)` map into
    /// texel space; indices are clamped so the poles and the seam never read
    /// out of bounds.
    pub fn sample(&self, dir: &Vec3) -> Color {
        let phi = dir.z.atan2(dir.x);
        let theta = dir.y.clamp(-1.0, 1.0).acos();

        let x = ((phi + PI) / (2.0 * PI) * self.width as f32) as usize;
        let y = (theta / PI * self.height as f32) as usize;

        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.texels[x + y * self.width]
    }
}

/* Tests */

#[test]
fn uniform_map_returns_its_color() {
    let map = Envmap::uniform(Color::rgb(0.25, 0.5, 0.75));

    assert_eq!(map.sample(&Vec3::new(0.0, 0.0, -1.0)), Color::rgb(0.25, 0.5, 0.75));
    assert_eq!(map.sample(&Vec3::new(0.0, 1.0, 0.0)), Color::rgb(0.25, 0.5, 0.75));
}

#[cfg(test)]
fn quadrant_map() -> Envmap {
    Envmap {
        width: 2,
        height: 2,
        texels: vec![
            Color::rgb(1.0, 0.0, 0.0),
            Color::rgb(0.0, 1.0, 0.0),
            Color::rgb(0.0, 0.0, 1.0),
            Color::rgb(1.0, 1.0, 0.0),
        ],
    }
}

#[test]
fn up_direction_samples_top_row() {
    let map = quadrant_map();

    // theta = 0 at the zenith; phi = atan2(0, 0) = 0 lands in column 1.
    assert_eq!(map.sample(&Vec3::new(0.0, 1.0, 0.0)), Color::rgb(0.0, 1.0, 0.0));
}

#[test]
fn down_direction_clamps_to_bottom_row() {
    let map = quadrant_map();

    // theta = pi maps to row `height`, which must clamp to the last row.
    assert_eq!(map.sample(&Vec3::new(0.0, -1.0, 0.0)), Color::rgb(1.0, 1.0, 0.0));
}

#[test]
fn seam_direction_clamps_to_last_column() {
    let map = quadrant_map();

    // phi = pi maps to column `width`, which must clamp to the last column.
    assert_eq!(map.sample(&Vec3::new(-1.0, 0.0, 0.0)), Color::rgb(1.0, 1.0, 0.0));
}
