use crate::tuple::Tuple3D;

/// A material record.
///
/// Materials use attributes from the Phong reflection model: ambient,
/// diffuse and specular coefficients (one multiplier per color channel) and a
/// shininess exponent. Transparency and reflection coefficients are carried
/// as data only; the shading in this crate never traces secondary
/// reflection or refraction rays.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub k_a: Tuple3D,
    pub k_d: Tuple3D,
    pub k_s: Tuple3D,
    pub k_t: Tuple3D,
    pub k_r: Tuple3D,
    pub shininess: f64,
}

/// The default material only reflects ambient light.
impl Default for Material {
    fn default() -> Material {
        Material {
            k_a: Tuple3D::ONE,
            k_d: Tuple3D::ZERO,
            k_s: Tuple3D::ZERO,
            k_t: Tuple3D::ZERO,
            k_r: Tuple3D::ZERO,
            shininess: 0.0,
        }
    }
}

impl Material {
    pub fn new() -> Material {
        Default::default()
    }

    pub fn with_ambient(mut self, k_a: Tuple3D) -> Material {
        self.k_a = k_a;
        self
    }

    pub fn with_diffuse(mut self, k_d: Tuple3D) -> Material {
        self.k_d = k_d;
        self
    }

    pub fn with_specular(mut self, k_s: Tuple3D) -> Material {
        self.k_s = k_s;
        self
    }

    pub fn with_transparency(mut self, k_t: Tuple3D) -> Material {
        self.k_t = k_t;
        self
    }

    pub fn with_reflection(mut self, k_r: Tuple3D) -> Material {
        self.k_r = k_r;
        self
    }

    pub fn with_shininess(mut self, shininess: f64) -> Material {
        self.shininess = shininess;
        self
    }
}

#[test]
fn default_material_is_pure_ambient() {
    let m = Material::default();

    assert_eq!(m.k_a, Tuple3D::ONE);
    assert_eq!(m.k_d, Tuple3D::ZERO);
    assert_eq!(m.k_s, Tuple3D::ZERO);
    assert_eq!(m.shininess, 0.0);
}

#[test]
fn fluent_setters() {
    let m = Material::new()
        .with_diffuse(Tuple3D::uniform(0.5))
        .with_specular(Tuple3D::uniform(0.3))
        .with_shininess(100.0);

    assert_eq!(m.k_d, Tuple3D::uniform(0.5));
    assert_eq!(m.k_s, Tuple3D::uniform(0.3));
    assert_eq!(m.shininess, 100.0);
    assert_eq!(m.k_a, Tuple3D::ONE);
}
