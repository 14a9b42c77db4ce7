use crate::color::Color;
use crate::consts::RAY_BIAS;
use crate::envmap::Envmap;
use crate::scene::Scene;
use crate::vector::Vec3;

/// Recursive light transport over one scene and environment map.
///
/// Holds the per-render read-only state so `cast_ray` only threads the ray
/// itself through the recursion.
pub struct Tracer<'a> {
    pub scene: &'a Scene,
    pub envmap: &'a Envmap,
    pub max_depth: u32,
}

/// A spawned ray's origin, pushed off the surface along the normal so it
/// cannot immediately re-hit the surface it starts on. The sign follows the
/// travel direction: into the surface for transmitted rays, out of it for
/// reflected and shadow rays.
fn biased_origin(point: &Vec3, normal: &Vec3, dir: &Vec3) -> Vec3 {
    if dir.dot(normal) < 0.0 {
        *point - *normal * RAY_BIAS
    } else {
        *point + *normal * RAY_BIAS
    }
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, envmap: &'a Envmap, max_depth: u32) -> Tracer<'a> {
        Tracer { scene, envmap, max_depth }
    }

    /// Traces one ray and returns its color.
    ///
    /// The only base case is the environment backdrop: an exhausted bounce
    /// budget and an escaped ray both sample the map along `dir`. Degenerate
    /// rays (total internal reflection, grazing planes) resolve to sentinel
    /// values inside `refract`/`intersect`, never to errors, so a bad ray
    /// cannot abort the image.
    pub fn cast_ray(&self, origin: &Vec3, dir: &Vec3, depth: u32) -> Color {
        if depth >= self.max_depth {
            return self.envmap.sample(dir);
        }

        let hit = match self.scene.intersect(origin, dir) {
            Some(hit) => hit,
            None => return self.envmap.sample(dir),
        };

        let material = hit.material;

        let reflect_dir = dir.reflect(&hit.normal).normalized();
        let refract_dir = dir
            .refract(&hit.normal, material.refractive_index, 1.0)
            .normalized();

        let reflect_orig = biased_origin(&hit.point, &hit.normal, &reflect_dir);
        let refract_orig = biased_origin(&hit.point, &hit.normal, &refract_dir);
        let reflect_color = self.cast_ray(&reflect_orig, &reflect_dir, depth + 1);
        let refract_color = self.cast_ray(&refract_orig, &refract_dir, depth + 1);

        let mut diffuse_intensity = 0.0;
        let mut specular_intensity = 0.0f32;
        for light in &self.scene.lights {
            let light_dir = (light.position - hit.point).normalized();
            let shadow_orig = biased_origin(&hit.point, &hit.normal, &light_dir);

            // Occluded when anything sits between the point and the light.
            if let Some(shadow) = self.scene.intersect(&shadow_orig, &light_dir) {
                if (shadow.point - shadow_orig).norm()
                    < (light.position - hit.point).norm()
                {
                    continue;
                }
            }

            diffuse_intensity += light_dir.dot(&hit.normal).max(0.0);
            specular_intensity += (-(-light_dir).reflect(&hit.normal).dot(dir))
                .max(0.0)
                .powf(material.specular_exponent);
        }

        material.diffuse_color * diffuse_intensity * material.albedo[0]
            + Color::white() * specular_intensity * material.albedo[1]
            + reflect_color * material.albedo[2]
            + refract_color * material.albedo[3]
    }
}

/* Tests */

#[cfg(test)]
use crate::geometry::Sphere;
#[cfg(test)]
use crate::material::{ self, Material };
#[cfg(test)]
use crate::scene::{ bare_scene, Light };

#[test]
fn exhausted_budget_returns_environment_color() {
    // Aimed straight at the glass sphere, but with no budget at all the
    // tracer must not even consult the scene.
    let scene = Scene::default();
    let envmap = Envmap::uniform(Color::rgb(0.1, 0.2, 0.3));
    let tracer = Tracer::new(&scene, &envmap, 0);

    let dir = Vec3::new(0.0, -1.5, -15.0).normalized();
    let color = tracer.cast_ray(&Vec3::default(), &dir, 0);

    assert_eq!(color, Color::rgb(0.1, 0.2, 0.3));
}

#[test]
fn escaped_ray_returns_exact_environment_color() {
    let scene = Scene::default();
    let envmap = Envmap::uniform(Color::rgb(0.6, 0.5, 0.4));
    let tracer = Tracer::new(&scene, &envmap, 4);

    let color = tracer.cast_ray(&Vec3::default(), &Vec3::new(0.0, 1.0, 0.0), 0);

    assert_eq!(color, Color::rgb(0.6, 0.5, 0.4));
}

#[cfg(test)]
fn diffuse_white() -> Material {
    Material {
        refractive_index: 1.0,
        albedo: [1.0, 0.0, 0.0, 0.0],
        diffuse_color: Color::white(),
        specular_exponent: 0.0,
    }
}

#[test]
fn lit_point_accumulates_diffuse() {
    let mut scene = bare_scene();
    scene.spheres.push(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, diffuse_white()));
    scene.lights.push(Light { position: Vec3::new(0.0, 0.0, 10.0) });

    let envmap = Envmap::uniform(Color::black());
    let tracer = Tracer::new(&scene, &envmap, 4);

    // Normal incidence, light directly behind the camera: L.N = 1, and the
    // specular term is weighted to zero.
    let color = tracer.cast_ray(&Vec3::default(), &Vec3::new(0.0, 0.0, -1.0), 0);

    assert_eq!(color, Color::white());
}

#[test]
fn occluded_light_contributes_nothing() {
    let mut scene = bare_scene();
    scene.spheres.push(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, diffuse_white()));
    // A blocker between the shading point (0, 0, -4) and the light.
    scene.spheres.push(Sphere::new(Vec3::new(0.0, 0.0, 2.0), 1.0, diffuse_white()));
    scene.lights.push(Light { position: Vec3::new(0.0, 0.0, 10.0) });

    let envmap = Envmap::uniform(Color::black());
    let tracer = Tracer::new(&scene, &envmap, 4);

    let color = tracer.cast_ray(&Vec3::default(), &Vec3::new(0.0, 0.0, -1.0), 0);

    assert_eq!(color, Color::black());
}

#[test]
fn mirror_converges_to_scaled_environment_color() {
    let mut scene = bare_scene();
    scene.spheres.push(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, material::MIRROR));

    let envmap = Envmap::uniform(Color::white());
    let tracer = Tracer::new(&scene, &envmap, 4);

    // No lights: the only contribution is the reflected environment scaled
    // by the mirror's reflection albedo.
    let color = tracer.cast_ray(&Vec3::default(), &Vec3::new(0.0, 0.0, -1.0), 0);

    assert_eq!(color, Color::white() * material::MIRROR.albedo[2]);
}

#[test]
fn mirror_chain_multiplies_reflection_albedo() {
    // Two parallel mirrors: each bounce multiplies by albedo[2] until the
    // budget runs out and the environment terminates the chain.
    let mut scene = bare_scene();
    scene.spheres.push(Sphere::new(Vec3::new(0.0, 0.0, -6.0), 1.0, material::MIRROR));
    scene.spheres.push(Sphere::new(Vec3::new(0.0, 0.0, 1.0), 1.0, material::MIRROR));

    let envmap = Envmap::uniform(Color::white());
    let weight = material::MIRROR.albedo[2];

    // Depth 1: one shaded hit, whose reflection immediately samples the map.
    let shallow = Tracer::new(&scene, &envmap, 1)
        .cast_ray(&Vec3::default(), &Vec3::new(0.0, 0.0, -1.0), 0);
    assert_eq!(shallow, Color::white() * weight);

    // Depth 2: the reflected ray hits the second mirror before escaping.
    let deep = Tracer::new(&scene, &envmap, 2)
        .cast_ray(&Vec3::default(), &Vec3::new(0.0, 0.0, -1.0), 0);
    assert_eq!(deep, Color::white() * weight * weight);
}
