use crate::color::Color;
use crate::error::{ Result, TracerError };
use crate::tuple::{ Point, Tuple3D, Vector };

/// Light which reaches every surface equally, from no direction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AmbientLight {
    pub intensity: Color,
}

impl AmbientLight {
    /// No ambient light at all.
    pub const NONE: AmbientLight = AmbientLight { intensity: Color::BLACK };

    /// Creates ambient light from a base intensity and its attenuation.
    pub fn new(intensity: Color, k_a: Tuple3D) -> AmbientLight {
        AmbientLight { intensity: intensity.scale(&k_a) }
    }

    pub fn from_intensity(intensity: Color) -> AmbientLight {
        AmbientLight { intensity }
    }
}

/// A light infinitely far away, such as the sun.
///
/// Every point receives the same intensity from the same direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub intensity: Color,
    pub direction: Vector,
}

impl DirectionalLight {
    pub fn new(intensity: Color, direction: Vector) -> DirectionalLight {
        DirectionalLight { intensity, direction: direction.normalize() }
    }
}

/// A point light.
///
/// Radiates from `position` in every direction, fading with distance `d` by
/// the factor `1 / (k_c + k_l·d + k_q·d²)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Point,
    k_c: f64,
    k_l: f64,
    k_q: f64,
}

impl PointLight {
    /// Creates a point light which does not fade.
    pub fn new(intensity: Color, position: Point) -> PointLight {
        PointLight { intensity, position, k_c: 1.0, k_l: 0.0, k_q: 0.0 }
    }

    /// Sets the attenuation coefficients.
    ///
    /// The constant term must be at least 1 and the others non-negative, so
    /// attenuation never amplifies the light.
    pub fn with_attenuation(mut self, k_c: f64, k_l: f64, k_q: f64)
        -> Result<PointLight> {
        if !(k_c >= 1.0) || !(k_l >= 0.0) || !(k_q >= 0.0) {
            return Err(TracerError::InvalidLight(format!(
                "attenuation ({}, {}, {}) needs k_c >= 1 and k_l, k_q >= 0",
                k_c, k_l, k_q
            )));
        }

        self.k_c = k_c;
        self.k_l = k_l;
        self.k_q = k_q;
        Ok(self)
    }

    pub fn attenuation(&self, distance: f64) -> f64 {
        self.k_c + self.k_l * distance + self.k_q * distance * distance
    }

    pub fn intensity_at(&self, p: &Point) -> Color {
        self.intensity / self.attenuation(self.position.distance(p))
    }

    /// The direction from the light to `p`, if `p` is not the light itself.
    fn direction_to(&self, p: &Point) -> Option<Vector> {
        p.subtract(&self.position).ok().map(|v| v.normalize())
    }
}

/// A point light which only shines into the half-space `direction` faces.
///
/// The point light intensity is scaled by `max(0, direction·l)^narrow_beam`,
/// where `l` runs from the light to the lit point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub light: PointLight,
    pub direction: Vector,
    pub narrow_beam: f64,
}

impl SpotLight {
    pub fn new(intensity: Color, position: Point, direction: Vector)
        -> SpotLight {
        SpotLight {
            light: PointLight::new(intensity, position),
            direction: direction.normalize(),
            narrow_beam: 1.0,
        }
    }

    pub fn with_attenuation(mut self, k_c: f64, k_l: f64, k_q: f64)
        -> Result<SpotLight> {
        self.light = self.light.with_attenuation(k_c, k_l, k_q)?;
        Ok(self)
    }

    /// Narrows the beam; exponents above 1 tighten the spot.
    pub fn with_narrow_beam(mut self, narrow_beam: f64) -> Result<SpotLight> {
        if !(narrow_beam >= 1.0) {
            return Err(TracerError::InvalidLight(format!(
                "narrow beam exponent {} must be at least 1", narrow_beam
            )));
        }

        self.narrow_beam = narrow_beam;
        Ok(self)
    }

    pub fn intensity_at(&self, p: &Point) -> Color {
        let factor = match self.light.direction_to(p) {
            Some(l) => self.direction.dot(&l).max(0.0),
            None => 0.0,
        };

        self.light.intensity_at(p) * factor.powf(self.narrow_beam)
    }
}

/// A light source which lights surfaces from a direction.
///
/// Ambient light is not a light source: it has no direction and is never
/// blocked, so the scene keeps it separately.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LightSource {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl LightSource {
    /// The light intensity arriving at `p`.
    pub fn intensity_at(&self, p: &Point) -> Color {
        match self {
            LightSource::Directional(d) => d.intensity,
            LightSource::Point(pl) => pl.intensity_at(p),
            LightSource::Spot(s) => s.intensity_at(p),
        }
    }

    /// The unit vector from `p` towards the light.
    ///
    /// Returns `None` when `p` sits exactly on a point or spot light, which
    /// leaves no direction to shade with.
    pub fn direction_to_light(&self, p: &Point) -> Option<Vector> {
        match self {
            LightSource::Directional(d) => Some(-d.direction),
            LightSource::Point(pl) => pl.direction_to(p).map(|v| -v),
            LightSource::Spot(s) => s.light.direction_to(p).map(|v| -v),
        }
    }

    /// How far away the light is from `p`. Infinite for directional light.
    pub fn distance(&self, p: &Point) -> f64 {
        match self {
            LightSource::Directional(_) => f64::INFINITY,
            LightSource::Point(pl) => pl.position.distance(p),
            LightSource::Spot(s) => s.light.position.distance(p),
        }
    }
}

impl From<DirectionalLight> for LightSource {
    fn from(light: DirectionalLight) -> LightSource {
        LightSource::Directional(light)
    }
}

impl From<PointLight> for LightSource {
    fn from(light: PointLight) -> LightSource {
        LightSource::Point(light)
    }
}

impl From<SpotLight> for LightSource {
    fn from(light: SpotLight) -> LightSource {
        LightSource::Spot(light)
    }
}

#[test]
fn ambient_light_scales_by_coefficient() {
    let a = AmbientLight::new(Color::gray(200.0), Tuple3D::uniform(0.1));

    assert_eq!(a.intensity, Color::gray(20.0));
    assert!(AmbientLight::NONE.intensity.is_black());
}

#[test]
fn directional_light_is_constant() {
    let l: LightSource = DirectionalLight::new(
        Color::gray(50.0), Vector::new(0.0, -2.0, 0.0).unwrap()
    ).into();

    let p1 = Point::new(1.0, 2.0, 3.0);
    let p2 = Point::new(-100.0, 0.0, 40.0);

    assert_eq!(l.intensity_at(&p1), Color::gray(50.0));
    assert_eq!(l.intensity_at(&p2), Color::gray(50.0));
    assert_eq!(l.direction_to_light(&p1), Some(Vector::Y));
    assert_eq!(l.distance(&p1), f64::INFINITY);
}

#[test]
fn point_light_without_attenuation() {
    let l: LightSource = PointLight::new(
        Color::gray(100.0), Point::new(0.0, 0.0, 10.0)
    ).into();

    let p = Point::ZERO;
    assert_eq!(l.intensity_at(&p), Color::gray(100.0));
    assert_eq!(l.direction_to_light(&p), Some(Vector::Z));
    assert_eq!(l.distance(&p), 10.0);
}

#[test]
fn point_light_quadratic_attenuation_halves_intensity() {
    let l = PointLight::new(Color::gray(100.0), Point::new(0.0, 0.0, 10.0))
        .with_attenuation(1.0, 0.0, 0.01)
        .unwrap();

    assert_eq!(l.attenuation(10.0), 2.0);
    assert_eq!(l.intensity_at(&Point::ZERO), Color::gray(50.0));
}

#[test]
fn attenuation_cannot_amplify() {
    let l = PointLight::new(Color::gray(100.0), Point::ZERO);

    assert!(l.with_attenuation(0.5, 0.0, 0.0).is_err());
    assert!(l.with_attenuation(1.0, -1.0, 0.0).is_err());
    assert!(l.with_attenuation(1.0, 0.0, -0.1).is_err());
}

#[test]
fn spot_light_only_lights_its_hemisphere() {
    let s: LightSource = SpotLight::new(
        Color::gray(100.0), Point::new(0.0, 0.0, 10.0), -Vector::Z
    ).into();

    // Straight down the beam.
    assert_eq!(s.intensity_at(&Point::ZERO), Color::gray(100.0));

    // Behind the light.
    assert!(s.intensity_at(&Point::new(0.0, 0.0, 20.0)).is_black());

    // 60 degrees off the beam axis: cos = 0.5.
    let off = Point::new(10.0 * 3f64.sqrt(), 0.0, 0.0);
    let at = s.intensity_at(&off);
    assert_eq!(at, Color::gray(50.0));
}

#[test]
fn narrow_beam_tightens_spot() {
    let s = SpotLight::new(
        Color::gray(100.0), Point::new(0.0, 0.0, 10.0), -Vector::Z
    ).with_narrow_beam(2.0).unwrap();

    let off = Point::new(10.0 * 3f64.sqrt(), 0.0, 0.0);
    assert_eq!(s.intensity_at(&off), Color::gray(25.0));
}

#[test]
fn light_at_the_point_has_no_direction() {
    let l: LightSource = PointLight::new(Color::WHITE, Point::ZERO).into();

    assert_eq!(l.direction_to_light(&Point::ZERO), None);
}
