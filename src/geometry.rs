use crate::consts::RAY_EPSILON;
use crate::material::Material;
use crate::vector::Vec3;

/// An analytic sphere.
///
/// Owned by the scene and immutable for the duration of a render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Material) -> Sphere {
        Sphere { center, radius, material }
    }

    /// Distance along `dir` to the closest intersection past `RAY_EPSILON`,
    /// or `None` if the ray misses.
    ///
    /// `dir` must be normalized. Solves `|O + tD - C|^2 = r^2` geometrically:
    /// a negative half-chord discriminant is a miss, the near root wins when
    /// it clears the epsilon cutoff, and the far root covers a ray that
    /// starts inside the sphere.
    pub fn intersect(&self, origin: &Vec3, dir: &Vec3) -> Option<f32> {
        let to_center = self.center - *origin;
        let tca = to_center.dot(dir);
        let d2 = to_center.dot(&to_center) - tca * tca;
        let r2 = self.radius * self.radius;

        if d2 > r2 {
            return None;
        }

        let thc = (r2 - d2).sqrt();
        let near = tca - thc;
        let far = tca + thc;

        if near > RAY_EPSILON {
            Some(near)
        } else if far > RAY_EPSILON {
            Some(far)
        } else {
            None
        }
    }
}

/* Tests */

#[cfg(test)]
fn test_sphere(center: Vec3, radius: f32) -> Sphere {
    Sphere::new(center, radius, Default::default())
}

#[test]
fn hit_from_outside_aimed_at_center() {
    use crate::feq;

    let s = test_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0);
    let origin = Vec3::new(0.0, 0.0, 0.0);
    let dir = Vec3::new(0.0, 0.0, -1.0);

    let d = s.intersect(&origin, &dir).unwrap();

    // Aimed at the center, the hit distance is |origin - center| - radius.
    assert!(feq(d, (origin - s.center).norm() - s.radius));
}

#[test]
fn hit_from_inside_returns_far_root() {
    use crate::feq;

    let s = test_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0);
    let origin = Vec3::new(0.0, 0.0, -10.0);
    let dir = Vec3::new(0.0, 0.0, -1.0);

    let d = s.intersect(&origin, &dir).unwrap();

    assert!(feq(d, s.radius));
}

#[test]
fn sphere_behind_ray_misses() {
    let s = test_sphere(Vec3::new(0.0, 0.0, 10.0), 2.0);
    let origin = Vec3::new(0.0, 0.0, 0.0);
    let dir = Vec3::new(0.0, 0.0, -1.0);

    assert_eq!(s.intersect(&origin, &dir), None);
}

#[test]
fn offset_sphere_misses() {
    let s = test_sphere(Vec3::new(0.0, 5.0, -10.0), 2.0);
    let origin = Vec3::new(0.0, 0.0, 0.0);
    let dir = Vec3::new(0.0, 0.0, -1.0);

    assert_eq!(s.intersect(&origin, &dir), None);
}

#[test]
fn ray_leaving_surface_does_not_rehit() {
    // Origin on the surface pointing away: both roots are at or behind the
    // epsilon cutoff.
    let s = test_sphere(Vec3::new(0.0, 0.0, -10.0), 2.0);
    let origin = Vec3::new(0.0, 0.0, -8.0);
    let dir = Vec3::new(0.0, 0.0, 1.0);

    assert_eq!(s.intersect(&origin, &dir), None);
}
