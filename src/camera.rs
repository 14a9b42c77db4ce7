use crate::vector::Vec3;

/// A pinhole camera fixed at the world origin, looking down -Z.
///
/// Only the image dimensions and the vertical field of view are free; view
/// transforms are an external collaborator's concern and never enter the
/// intersection or shading math.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view, radians.
    pub fov: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, fov: f32) -> Camera {
        Camera { width, height, fov }
    }

    /// The unnormalized camera-space direction through the center of pixel
    /// `(x, y)`. Row 0 is the top of the image; the y flip happens here.
    pub fn ray_for_pixel(&self, x: u32, y: u32) -> Vec3 {
        let focal = self.height as f32 / (2.0 * (self.fov / 2.0).tan());

        Vec3::new(
            (x as f32 + 0.5) - self.width as f32 / 2.0,
            -(y as f32 + 0.5) + self.height as f32 / 2.0,
            -focal,
        )
    }
}

/* Tests */

#[test]
fn focal_distance_follows_vertical_fov() {
    use crate::feq;

    // fov of pi/2 puts the image plane at half the image height.
    let c = Camera::new(100, 100, std::f32::consts::FRAC_PI_2);

    assert!(feq(c.ray_for_pixel(50, 50).z, -50.0));
}

#[test]
fn center_pixels_straddle_the_axis() {
    let c = Camera::new(2, 2, 1.05);

    let upper_left = c.ray_for_pixel(0, 0);
    let lower_right = c.ray_for_pixel(1, 1);

    assert_eq!(upper_left.x, -0.5);
    assert_eq!(upper_left.y, 0.5);
    assert_eq!(lower_right.x, 0.5);
    assert_eq!(lower_right.y, -0.5);
}

#[test]
fn corner_rays_are_symmetric() {
    let c = Camera::new(640, 480, 1.05);

    let a = c.ray_for_pixel(0, 0);
    let b = c.ray_for_pixel(639, 479);

    assert_eq!(a.x, -b.x);
    assert_eq!(a.y, -b.y);
    assert_eq!(a.z, b.z);
}
