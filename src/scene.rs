use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use rand::rngs::SmallRng;
use rand::{ Rng, SeedableRng };
use serde::{ Serialize, Deserialize };
use thiserror::Error;

use crate::color::Color;
use crate::consts::{ MAX_TRACE_DISTANCE, NO_HIT_DISTANCE, RAY_EPSILON };
use crate::geometry::Sphere;
use crate::material::{ self, Material };
use crate::vector::Vec3;

/// A point light with implicit unit intensity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
}

/// The procedural sphere gallery.
///
/// `count` spheres spread over a half circle of radius `ring_radius`, centers
/// at height `height` around depth `depth`, materials assigned round-robin.
/// Spheres are generated per query rather than stored.
#[derive(Clone, Debug, PartialEq)]
pub struct SphereRing {
    pub count: usize,
    pub ring_radius: f32,
    pub sphere_radius: f32,
    pub height: f32,
    pub depth: f32,
    pub materials: Vec<Material>,
}

impl SphereRing {
    /// The `i`-th gallery sphere. A one-sphere ring sits at angle zero.
    fn sphere(&self, i: usize) -> Sphere {
        let span = self.count.saturating_sub(1).max(1) as f32;
        let angle = PI * i as f32 / span;
        let center = Vec3::new(
            self.ring_radius * angle.cos(),
            self.height,
            self.depth - self.ring_radius * angle.sin(),
        );

        Sphere::new(center, self.sphere_radius, self.materials[i % self.materials.len()])
    }
}

/// The bounded checkerboard floor, an implicit `y = height` plane.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckerPlane {
    pub height: f32,
    pub half_width: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub light_color: Color,
    pub dark_color: Color,
}

impl CheckerPlane {
    /// Cell parity from the hit point's coordinates. The casts truncate
    /// toward zero, so negative coordinates keep their own parity.
    fn color_at(&self, p: &Vec3) -> Color {
        let cell_x = (p.x * 3.0) as i32 % 3;
        let cell_y = (p.y * 3.0) as i32 % 3;

        if (cell_x + cell_y) % 2 != 0 {
            self.light_color
        } else {
            self.dark_color
        }
    }
}

/// The bounded striped wall, an implicit `x = offset` plane.
///
/// The stripe parity can carry an extra speckle bit; see
/// [`Scene::speckle_seed`].
#[derive(Clone, Debug, PartialEq)]
pub struct WallPlane {
    pub offset: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub light_color: Color,
    pub dark_color: Color,
}

impl WallPlane {
    fn color_at(&self, p: &Vec3, speckle_seed: Option<u64>) -> Color {
        let jitter = match speckle_seed {
            Some(seed) => {
                // One stable bit per wall cell, derived from the seed so a
                // render is reproducible end to end.
                let cell = ((p.y * 2.0) as i64 as u64)
                    ^ ((p.z * 2.0) as i64 as u64).rotate_left(32);
                let mut rng = SmallRng::seed_from_u64(seed ^ cell);
                rng.gen_range(0..2)
            }
            None => 0,
        };

        if ((p.x * 2.0 + p.z * 2.0 + jitter as f32) as i32) % 2 != 0 {
            self.light_color
        } else {
            self.dark_color
        }
    }
}

/// A resolved closest intersection.
///
/// The normal is unit length and oriented away from the surface on the side
/// the ray arrived from. Produced fresh per query, never mutated in place.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    pub point: Vec3,
    pub normal: Vec3,
    pub material: Material,
}

/// All geometry and lights for one render.
///
/// Built once before rendering and read-only afterwards; the renderer is a
/// pure function of (scene, camera, environment map).
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub ring: SphereRing,
    pub floor: CheckerPlane,
    pub wall: WallPlane,
    pub spheres: Vec<Sphere>,
    pub lights: Vec<Light>,
    /// When set, the wall's stripe parity gains a per-cell pseudo-random
    /// bit derived from this seed. `None` leaves the wall deterministic.
    pub speckle_seed: Option<u64>,
}

impl Default for Scene {
    /// The reference scene: a four-sphere gallery, a glass and a mirror
    /// sphere, two bounded planes, three lights.
    fn default() -> Scene {
        Scene {
            ring: SphereRing {
                count: 4,
                ring_radius: 5.0,
                sphere_radius: 2.0,
                height: -3.0,
                depth: -15.0,
                materials: vec![
                    material::IVORY,
                    material::GOLD,
                    material::RED_RUBBER,
                    material::SILVER,
                ],
            },
            floor: CheckerPlane {
                height: -5.5,
                half_width: 10.0,
                z_near: -10.0,
                z_far: -30.0,
                light_color: Color::rgb(0.8, 0.7, 0.6),
                dark_color: Color::rgb(0.2, 0.1, 0.1),
            },
            wall: WallPlane {
                offset: -7.3,
                y_min: -4.0,
                y_max: 10.0,
                z_near: -10.0,
                z_far: -30.0,
                light_color: Color::rgb(0.5, 0.5, 0.5),
                dark_color: Color::rgb(0.2, 0.2, 0.2),
            },
            spheres: vec![
                Sphere::new(Vec3::new(0.0, -1.5, -15.0), 1.0, material::GLASS),
                Sphere::new(Vec3::new(4.0, 2.0, -22.0), 3.0, material::MIRROR),
            ],
            lights: vec![
                Light { position: Vec3::new(-20.0, 20.0, 20.0) },
                Light { position: Vec3::new(30.0, 50.0, -25.0) },
                Light { position: Vec3::new(30.0, 20.0, 30.0) },
            ],
            speckle_seed: None,
        }
    }
}

impl Scene {
    /// Closest hit along `dir` across every primitive, or `None` when the
    /// ray escapes the scene.
    ///
    /// `dir` must be normalized. A candidate only displaces the running
    /// nearest hit when strictly closer; a nearest distance past
    /// `MAX_TRACE_DISTANCE` still counts as a miss, which keeps this
    /// consistent with the background logic in the tracer.
    pub fn intersect(&self, origin: &Vec3, dir: &Vec3) -> Option<Hit> {
        let mut nearest = NO_HIT_DISTANCE;
        let mut found = None;

        for i in 0..self.ring.count {
            let sphere = self.ring.sphere(i);
            if let Some(d) = sphere.intersect(origin, dir) {
                if d < nearest {
                    nearest = d;
                    let point = *origin + *dir * d;
                    found = Some(Hit {
                        point,
                        normal: (point - sphere.center).normalized(),
                        material: sphere.material,
                    });
                }
            }
        }

        // Near-parallel rays never hit the implicit planes; the epsilon
        // guard doubles as the division-by-zero check.
        if dir.y.abs() > RAY_EPSILON {
            let d = -(origin.y - self.floor.height) / dir.y;
            let p = *origin + *dir * d;
            if d > RAY_EPSILON
                && d < nearest
                && p.x.abs() < self.floor.half_width
                && p.z < self.floor.z_near
                && p.z > self.floor.z_far
            {
                nearest = d;
                found = Some(Hit {
                    point: p,
                    normal: Vec3::new(0.0, 1.0, 0.0),
                    material: Material {
                        diffuse_color: self.floor.color_at(&p),
                        ..Default::default()
                    },
                });
            }
        }

        if dir.x.abs() > RAY_EPSILON {
            let d = -(origin.x - self.wall.offset) / dir.x;
            let p = *origin + *dir * d;
            if d > RAY_EPSILON
                && d < nearest
                && p.y > self.wall.y_min
                && p.y < self.wall.y_max
                && p.z < self.wall.z_near
                && p.z > self.wall.z_far
            {
                nearest = d;
                found = Some(Hit {
                    point: p,
                    normal: Vec3::new(1.0, 0.0, 0.0),
                    material: Material {
                        diffuse_color: self.wall.color_at(&p, self.speckle_seed),
                        ..Default::default()
                    },
                });
            }
        }

        for sphere in &self.spheres {
            if let Some(d) = sphere.intersect(origin, dir) {
                if d < nearest {
                    nearest = d;
                    let point = *origin + *dir * d;
                    found = Some(Hit {
                        point,
                        normal: (point - sphere.center).normalized(),
                        material: sphere.material,
                    });
                }
            }
        }

        if nearest < MAX_TRACE_DISTANCE {
            found
        } else {
            None
        }
    }

    /// Loads a scene description from a JSON file.
    pub fn from_json(path: &Path) -> Result<Scene, SceneError> {
        let text = fs::read_to_string(path)?;
        let file: SceneFile = serde_json::from_str(&text)?;
        Scene::try_from(file)
    }
}

/// Errors raised while loading a scene description file.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scene file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown material preset: {0:?}")]
    UnknownMaterial(String),

    #[error("sphere ring declares {count} spheres but no materials")]
    EmptyRingMaterials { count: usize },
}

/// On-disk scene description.
///
/// Positions and colors are plain arrays; materials are either a preset name
/// or an inline record.
#[derive(Clone, Serialize, Deserialize)]
pub struct SceneFile {
    ring: RingFile,
    floor: FloorFile,
    wall: WallFile,
    #[serde(default)]
    spheres: Vec<SphereFile>,
    lights: Vec<[f32; 3]>,
    #[serde(default)]
    speckle_seed: Option<u64>,
}

#[derive(Clone, Serialize, Deserialize)]
struct RingFile {
    count: usize,
    ring_radius: f32,
    sphere_radius: f32,
    height: f32,
    depth: f32,
    materials: Vec<MaterialFile>,
}

#[derive(Clone, Serialize, Deserialize)]
struct FloorFile {
    height: f32,
    half_width: f32,
    z_near: f32,
    z_far: f32,
    light_color: [f32; 3],
    dark_color: [f32; 3],
}

#[derive(Clone, Serialize, Deserialize)]
struct WallFile {
    offset: f32,
    y_min: f32,
    y_max: f32,
    z_near: f32,
    z_far: f32,
    light_color: [f32; 3],
    dark_color: [f32; 3],
}

#[derive(Clone, Serialize, Deserialize)]
struct SphereFile {
    center: [f32; 3],
    radius: f32,
    material: MaterialFile,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MaterialFile {
    Preset(String),
    Custom {
        refractive_index: f32,
        albedo: [f32; 4],
        diffuse_color: [f32; 3],
        specular_exponent: f32,
    },
}

impl MaterialFile {
    fn resolve(&self) -> Result<Material, SceneError> {
        match self {
            MaterialFile::Preset(name) => material::preset(name)
                .ok_or_else(|| SceneError::UnknownMaterial(name.clone())),
            MaterialFile::Custom {
                refractive_index,
                albedo,
                diffuse_color,
                specular_exponent,
            } => Ok(Material {
                refractive_index: *refractive_index,
                albedo: *albedo,
                diffuse_color: color_from(diffuse_color),
                specular_exponent: *specular_exponent,
            }),
        }
    }
}

fn color_from(c: &[f32; 3]) -> Color {
    Color::rgb(c[0], c[1], c[2])
}

fn vec3_from(v: &[f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

impl TryFrom<SceneFile> for Scene {
    type Error = SceneError;

    fn try_from(file: SceneFile) -> Result<Scene, SceneError> {
        if file.ring.count > 0 && file.ring.materials.is_empty() {
            return Err(SceneError::EmptyRingMaterials { count: file.ring.count });
        }

        let ring_materials = file
            .ring
            .materials
            .iter()
            .map(MaterialFile::resolve)
            .collect::<Result<Vec<_>, _>>()?;

        let spheres = file
            .spheres
            .iter()
            .map(|s| {
                Ok(Sphere::new(
                    vec3_from(&s.center),
                    s.radius,
                    s.material.resolve()?,
                ))
            })
            .collect::<Result<Vec<_>, SceneError>>()?;

        Ok(Scene {
            ring: SphereRing {
                count: file.ring.count,
                ring_radius: file.ring.ring_radius,
                sphere_radius: file.ring.sphere_radius,
                height: file.ring.height,
                depth: file.ring.depth,
                materials: ring_materials,
            },
            floor: CheckerPlane {
                height: file.floor.height,
                half_width: file.floor.half_width,
                z_near: file.floor.z_near,
                z_far: file.floor.z_far,
                light_color: color_from(&file.floor.light_color),
                dark_color: color_from(&file.floor.dark_color),
            },
            wall: WallPlane {
                offset: file.wall.offset,
                y_min: file.wall.y_min,
                y_max: file.wall.y_max,
                z_near: file.wall.z_near,
                z_far: file.wall.z_far,
                light_color: color_from(&file.wall.light_color),
                dark_color: color_from(&file.wall.dark_color),
            },
            spheres,
            lights: file
                .lights
                .iter()
                .map(|l| Light { position: vec3_from(l) })
                .collect(),
            speckle_seed: file.speckle_seed,
        })
    }
}

/* Tests */

/// An empty scene whose planes have degenerate bounds, so nothing can be
/// hit until a test adds its own spheres.
#[cfg(test)]
pub(crate) fn bare_scene() -> Scene {
    Scene {
        ring: SphereRing {
            count: 0,
            ring_radius: 0.0,
            sphere_radius: 0.0,
            height: 0.0,
            depth: 0.0,
            materials: Vec::new(),
        },
        floor: CheckerPlane {
            height: 0.0,
            half_width: 0.0,
            z_near: 0.0,
            z_far: 0.0,
            light_color: Color::white(),
            dark_color: Color::black(),
        },
        wall: WallPlane {
            offset: 0.0,
            y_min: 0.0,
            y_max: 0.0,
            z_near: 0.0,
            z_far: 0.0,
            light_color: Color::white(),
            dark_color: Color::black(),
        },
        spheres: Vec::new(),
        lights: Vec::new(),
        speckle_seed: None,
    }
}

#[test]
fn upward_ray_escapes_reference_scene() {
    let scene = Scene::default();

    assert_eq!(scene.intersect(&Vec3::default(), &Vec3::new(0.0, 1.0, 0.0)), None);
}

#[test]
fn glass_sphere_is_closest_along_its_axis() {
    use crate::feq;

    let scene = Scene::default();
    let target = Vec3::new(0.0, -1.5, -15.0);
    let dir = target.normalized();

    let hit = scene.intersect(&Vec3::default(), &dir).unwrap();

    assert_eq!(hit.material, material::GLASS);
    assert!(feq(hit.point.norm(), target.norm() - 1.0));
    assert_eq!(hit.normal, (hit.point - target).normalized());
}

#[test]
fn mirror_sphere_hit_reports_its_material() {
    use crate::feq;

    let scene = Scene::default();
    let target = Vec3::new(4.0, 2.0, -22.0);
    let dir = target.normalized();

    let hit = scene.intersect(&Vec3::default(), &dir).unwrap();

    assert_eq!(hit.material, material::MIRROR);
    assert!(feq(hit.point.norm(), target.norm() - 3.0));
}

#[test]
fn floor_hit_reports_checker_color_and_up_normal() {
    let scene = Scene::default();
    let dir = Vec3::new(0.0, -5.5, -20.0).normalized();

    let hit = scene.intersect(&Vec3::default(), &dir).unwrap();

    assert_eq!(hit.normal, Vec3::new(0.0, 1.0, 0.0));
    // At (0, -5.5, -20) the cell parity picks the light checker color.
    assert_eq!(hit.material.diffuse_color, Color::rgb(0.8, 0.7, 0.6));
    assert_eq!(hit.material.albedo, Material::default().albedo);
}

#[test]
fn wall_hit_reports_stripe_color_and_x_normal() {
    let scene = Scene::default();
    let dir = Vec3::new(-7.3, 0.0, -20.0).normalized();

    let hit = scene.intersect(&Vec3::default(), &dir).unwrap();

    assert_eq!(hit.normal, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(hit.material.diffuse_color, Color::rgb(0.2, 0.2, 0.2));
}

#[test]
fn wall_speckle_is_deterministic_per_seed() {
    let mut scene = Scene::default();
    scene.speckle_seed = Some(7);
    let dir = Vec3::new(-7.3, 1.0, -20.0).normalized();

    let first = scene.intersect(&Vec3::default(), &dir).unwrap();
    let second = scene.intersect(&Vec3::default(), &dir).unwrap();

    assert_eq!(first.material.diffuse_color, second.material.diffuse_color);
}

#[test]
fn hit_past_trace_distance_is_a_miss() {
    let mut scene = bare_scene();
    scene.spheres.push(Sphere::new(
        Vec3::new(0.0, 0.0, -2000.0),
        1.0,
        material::IVORY,
    ));

    assert_eq!(scene.intersect(&Vec3::default(), &Vec3::new(0.0, 0.0, -1.0)), None);
}

#[test]
fn ring_spheres_follow_the_angular_layout() {
    use crate::feq;

    let scene = Scene::default();

    // Sphere 0 sits at angle zero, sphere 3 at angle pi.
    let first = scene.ring.sphere(0);
    let last = scene.ring.sphere(3);
    assert_eq!(first.center, Vec3::new(5.0, -3.0, -15.0));
    assert!(feq(last.center.x, -5.0));
    assert!(feq(last.center.z, -15.0));

    // Materials rotate through the list.
    assert_eq!(first.material, material::IVORY);
    assert_eq!(scene.ring.sphere(2).material, material::RED_RUBBER);
}

#[test]
fn reference_scene_file_round_trips() {
    let file: SceneFile =
        serde_json::from_str(include_str!("../scenes/reference.json")).unwrap();
    let scene = Scene::try_from(file).unwrap();

    assert_eq!(scene, Scene::default());
}

#[test]
fn unknown_material_name_is_an_error() {
    let json = r#"{
        "ring": { "count": 1, "ring_radius": 1.0, "sphere_radius": 1.0,
                  "height": 0.0, "depth": -10.0, "materials": ["adamantium"] },
        "floor": { "height": -4.0, "half_width": 10.0, "z_near": -10.0, "z_far": -30.0,
                   "light_color": [1, 1, 1], "dark_color": [0, 0, 0] },
        "wall": { "offset": -7.0, "y_min": -4.0, "y_max": 10.0, "z_near": -10.0, "z_far": -30.0,
                  "light_color": [1, 1, 1], "dark_color": [0, 0, 0] },
        "lights": [[0, 10, 0]]
    }"#;

    let file: SceneFile = serde_json::from_str(json).unwrap();
    let err = Scene::try_from(file).unwrap_err();

    assert!(matches!(err, SceneError::UnknownMaterial(name) if name == "adamantium"));
}

#[test]
fn ring_without_materials_is_an_error() {
    let json = r#"{
        "ring": { "count": 2, "ring_radius": 1.0, "sphere_radius": 1.0,
                  "height": 0.0, "depth": -10.0, "materials": [] },
        "floor": { "height": -4.0, "half_width": 10.0, "z_near": -10.0, "z_far": -30.0,
                   "light_color": [1, 1, 1], "dark_color": [0, 0, 0] },
        "wall": { "offset": -7.0, "y_min": -4.0, "y_max": 10.0, "z_near": -10.0, "z_far": -30.0,
                  "light_color": [1, 1, 1], "dark_color": [0, 0, 0] },
        "lights": []
    }"#;

    let file: SceneFile = serde_json::from_str(json).unwrap();
    let err = Scene::try_from(file).unwrap_err();

    assert!(matches!(err, SceneError::EmptyRingMaterials { count: 2 }));
}

#[test]
fn inline_material_resolves() {
    let json = r#"{
        "ring": { "count": 0, "ring_radius": 0.0, "sphere_radius": 0.0,
                  "height": 0.0, "depth": 0.0, "materials": [] },
        "floor": { "height": -4.0, "half_width": 10.0, "z_near": -10.0, "z_far": -30.0,
                   "light_color": [1, 1, 1], "dark_color": [0, 0, 0] },
        "wall": { "offset": -7.0, "y_min": -4.0, "y_max": 10.0, "z_near": -10.0, "z_far": -30.0,
                  "light_color": [1, 1, 1], "dark_color": [0, 0, 0] },
        "spheres": [{
            "center": [0, 0, -5],
            "radius": 1.5,
            "material": {
                "refractive_index": 1.3,
                "albedo": [1.0, 0.5, 0.1, 0.0],
                "diffuse_color": [0.9, 0.2, 0.2],
                "specular_exponent": 80.0
            }
        }],
        "lights": [[0, 10, 0]]
    }"#;

    let file: SceneFile = serde_json::from_str(json).unwrap();
    let scene = Scene::try_from(file).unwrap();

    assert_eq!(scene.spheres.len(), 1);
    assert_eq!(scene.spheres[0].material.refractive_index, 1.3);
    assert_eq!(scene.spheres[0].material.diffuse_color, Color::rgb(0.9, 0.2, 0.2));
}
