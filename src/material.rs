use crate::color::Color;

/// Surface parameters for the Whitted shading model.
///
/// The four `albedo` entries are independent gains on the diffuse, specular,
/// reflected and refracted terms, in that order. They are not required to
/// sum to one; the driver tone-maps the resulting out-of-range colors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    /// Refractive index of the medium, 1.0 for vacuum/air.
    pub refractive_index: f32,
    /// Gains for diffuse, specular, reflection and refraction.
    pub albedo: [f32; 4],
    pub diffuse_color: Color,
    /// Phong shininess.
    pub specular_exponent: f32,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            refractive_index: 1.0,
            albedo: [2.0, 0.0, 0.0, 0.0],
            diffuse_color: Color { r: 0.0, g: 0.0, b: 0.0 },
            specular_exponent: 0.0,
        }
    }
}

pub const IVORY: Material = Material {
    refractive_index: 1.0,
    albedo: [0.9, 0.5, 0.1, 0.0],
    diffuse_color: Color { r: 0.4, g: 0.4, b: 0.3 },
    specular_exponent: 50.0,
};

pub const GLASS: Material = Material {
    refractive_index: 1.5,
    albedo: [0.0, 0.9, 0.1, 0.8],
    diffuse_color: Color { r: 0.6, g: 0.7, b: 0.8 },
    specular_exponent: 125.0,
};

pub const RED_RUBBER: Material = Material {
    refractive_index: 1.0,
    albedo: [1.4, 0.3, 0.0, 0.0],
    diffuse_color: Color { r: 0.3, g: 0.1, b: 0.1 },
    specular_exponent: 10.0,
};

pub const MIRROR: Material = Material {
    refractive_index: 1.0,
    albedo: [0.0, 16.0, 0.8, 0.0],
    diffuse_color: Color { r: 1.0, g: 1.0, b: 1.0 },
    specular_exponent: 1425.0,
};

pub const GOLD: Material = Material {
    refractive_index: 1.0,
    albedo: [0.5, 0.9, 0.1, 0.0],
    diffuse_color: Color { r: 1.0, g: 0.85, b: 0.57 },
    specular_exponent: 100.0,
};

pub const SILVER: Material = Material {
    refractive_index: 1.0,
    albedo: [0.5, 0.9, 0.2, 0.0],
    diffuse_color: Color { r: 0.75, g: 0.75, b: 0.75 },
    specular_exponent: 200.0,
};

pub const OBSIDIAN: Material = Material {
    refractive_index: 1.0,
    albedo: [0.7, 0.3, 0.1, 0.0],
    diffuse_color: Color { r: 0.05, g: 0.05, b: 0.05 },
    specular_exponent: 300.0,
};

pub const BRONZE: Material = Material {
    refractive_index: 1.0,
    albedo: [0.6, 0.6, 0.2, 0.0],
    diffuse_color: Color { r: 0.8, g: 0.5, b: 0.2 },
    specular_exponent: 150.0,
};

/// Looks up a named preset, as used by scene description files.
pub fn preset(name: &str) -> Option<Material> {
    match name {
        "ivory" => Some(IVORY),
        "glass" => Some(GLASS),
        "red_rubber" => Some(RED_RUBBER),
        "mirror" => Some(MIRROR),
        "gold" => Some(GOLD),
        "silver" => Some(SILVER),
        "obsidian" => Some(OBSIDIAN),
        "bronze" => Some(BRONZE),
        _ => None,
    }
}

/* Tests */

#[test]
fn preset_lookup_known_names() {
    assert_eq!(preset("glass"), Some(GLASS));
    assert_eq!(preset("bronze"), Some(BRONZE));
}

#[test]
fn preset_lookup_unknown_name() {
    assert_eq!(preset("adamantium"), None);
}
