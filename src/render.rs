use image::{ Rgb, RgbImage };
use log::info;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::color::Color;
use crate::envmap::Envmap;
use crate::scene::Scene;
use crate::tracer::Tracer;
use crate::vector::Vec3;

/// Renders the scene to an 8-bit RGB image.
///
/// One primary ray per pixel, scanline rows as independent rayon tasks. The
/// scene, lights and environment map are shared read-only and each task
/// writes only its own row, so the parallel region needs no synchronization.
/// The finished framebuffer is tone-normalized per pixel and handed to the
/// `image` crate for encoding.
pub fn render(scene: &Scene, envmap: &Envmap, camera: &Camera, max_depth: u32) -> RgbImage {
    let width = camera.width as usize;
    let tracer = Tracer::new(scene, envmap, max_depth);
    let eye = Vec3::default();

    info!(
        "rendering {}x{} with bounce depth {}",
        camera.width, camera.height, max_depth
    );

    let mut framebuffer = vec![Color::black(); width * camera.height as usize];
    framebuffer
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let dir = camera.ray_for_pixel(x as u32, y as u32).normalized();
                *pixel = tracer.cast_ray(&eye, &dir, 0);
            }
        });

    let mut image = RgbImage::new(camera.width, camera.height);
    for (i, color) in framebuffer.iter().enumerate() {
        let x = (i % width) as u32;
        let y = (i / width) as u32;
        image.put_pixel(x, y, Rgb(color.to_rgb8()));
    }

    info!("render complete");
    image
}

/* Tests */

#[cfg(test)]
use crate::geometry::Sphere;
#[cfg(test)]
use crate::material;
#[cfg(test)]
use crate::scene::bare_scene;

#[test]
fn empty_scene_renders_the_backdrop_everywhere() {
    let scene = bare_scene();
    let envmap = Envmap::uniform(Color::rgb(0.25, 0.5, 0.75));
    let camera = Camera::new(4, 4, 1.05);

    let image = render(&scene, &envmap, &camera, 4);

    for pixel in image.pixels() {
        assert_eq!(pixel.0, [63, 127, 191]);
    }
}

#[test]
fn center_pixel_sees_the_mirrored_backdrop() {
    let mut scene = bare_scene();
    scene.spheres.push(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 2.0, material::MIRROR));

    let envmap = Envmap::uniform(Color::white());
    let camera = Camera::new(3, 3, 1.05);

    let image = render(&scene, &envmap, &camera, 4);

    // The center ray runs straight down -Z into the mirror; with no lights
    // the pixel is the backdrop scaled by the reflection albedo.
    let expected = (Color::white() * material::MIRROR.albedo[2]).to_rgb8();
    assert_eq!(image.get_pixel(1, 1).0, expected);

    // Corner rays miss the sphere and carry no material contribution.
    assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255]);
}
