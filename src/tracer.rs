use crate::align_zero;
use crate::color::Color;
use crate::intersect::Intersection;
use crate::light::LightSource;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::tuple::{ Point, Vector };

/// Computes the color seen along a ray.
///
/// Implementors are shared by every render thread, so tracing must only read
/// from the scene.
pub trait RayTracer: Sync {
    fn trace_ray(&self, ray: &Ray) -> Color;
}

/// A local-illumination ray tracer.
///
/// Shades the nearest hit with the Phong reflection model: emission, ambient,
/// then diffuse and specular light from every light source which is not
/// blocked by other geometry (hard shadows). No secondary rays are traced
/// for reflection or refraction.
pub struct SimpleRayTracer<'a> {
    scene: &'a Scene,
}

/// How the surface at a hit faces the viewer.
#[derive(Copy, Clone, Debug, PartialEq)]
struct SurfaceView {
    normal: Vector,

    /// Unit vector from the hit back towards the ray origin.
    view: Vector,

    /// `normal·view`, aligned to zero.
    nv: f64,
}

/// One light as seen from a hit.
///
/// The normal is flipped when the light (and so the viewer) is behind the
/// surface, which makes `nl` and `nv` positive.
#[derive(Copy, Clone, Debug, PartialEq)]
struct LightView {
    normal: Vector,

    /// Unit vector from the hit towards the light.
    light: Vector,

    nl: f64,
    nv: f64,
}

impl<'a> SimpleRayTracer<'a> {
    pub fn new(scene: &'a Scene) -> SimpleRayTracer<'a> {
        SimpleRayTracer { scene }
    }

    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Computes the normal and view vectors for a hit.
    ///
    /// Returns `None` when the ray grazes the surface exactly edge-on, or the
    /// surface has no normal at the hit; such hits shade black.
    fn preprocess(hit: &Intersection, ray: &Ray) -> Option<SurfaceView> {
        let normal = hit.shape.normal_at(&hit.point).ok()?;
        let view = -ray.direction;

        let nv = align_zero(normal.dot(&view));
        if nv == 0.0 {
            return None;
        }

        Some(SurfaceView { normal, view, nv })
    }

    /// Looks at a light from a hit, if the light and the viewer are on the
    /// same side of the surface.
    fn light_view(surface: &SurfaceView, light: &LightSource, p: &Point)
        -> Option<LightView> {
        let l = light.direction_to_light(p)?;
        let nl = align_zero(surface.normal.dot(&l));

        if nl * surface.nv <= 0.0 {
            return None;
        }

        Some(if nl < 0.0 {
            LightView { normal: -surface.normal, light: l, nl: -nl, nv: -surface.nv }
        } else {
            LightView { normal: surface.normal, light: l, nl, nv: surface.nv }
        })
    }

    /// Whether nothing blocks the light on its way to `p`.
    fn unshaded(&self, lv: &LightView, light: &LightSource, p: &Point) -> bool {
        let shadow_ray = Ray::with_offset(*p, lv.light, &lv.normal);
        let distance = light.distance(&shadow_ray.origin);

        self.scene.geometries
            .intersect_within(&shadow_ray, distance)
            .is_empty()
    }

    /// Diffuse plus specular light from every unblocked light source.
    fn local_effects(&self, hit: &Intersection, surface: &SurfaceView) -> Color {
        let material = &hit.shape.material;
        let mut color = Color::BLACK;

        for light in self.scene.lights.iter() {
            let lv = match SimpleRayTracer::light_view(surface, light, &hit.point) {
                Some(lv) => lv,
                None => continue,
            };

            let intensity = light.intensity_at(&hit.point);
            if intensity.is_black() || !self.unshaded(&lv, light, &hit.point) {
                continue;
            }

            // r = 2(n·l)n - l, so r·v = 2(n·l)(n·v) - l·v.
            let rv = align_zero(2.0 * lv.nl * lv.nv - lv.light.dot(&surface.view));
            let specular = rv.max(0.0).powf(material.shininess);

            let k = material.k_d * lv.nl + material.k_s * specular;
            color = color + intensity * k;
        }

        color
    }

    fn calc_color(&self, hit: &Intersection, surface: &SurfaceView) -> Color {
        hit.shape.emission
            + self.scene.ambient_light.intensity * hit.shape.material.k_a
            + self.local_effects(hit, surface)
    }
}

impl<'a> RayTracer for SimpleRayTracer<'a> {
    fn trace_ray(&self, ray: &Ray) -> Color {
        let hits = self.scene.geometries.intersect(ray);
        let closest = match ray.closest_intersection(&hits) {
            Some(hit) => hit,
            None => return self.scene.background,
        };

        match SimpleRayTracer::preprocess(&closest, ray) {
            Some(surface) => self.calc_color(&closest, &surface),
            None => Color::BLACK,
        }
    }
}

/* Tests */

#[cfg(test)]
use crate::{ geometry::Shape, light::{ AmbientLight, PointLight },
    material::Material, tuple::Tuple3D };

#[cfg(test)]
fn lit_floor(blocker: Option<Shape>) -> Scene {
    let floor = Shape::plane(Point::ZERO, Vector::Y)
        .with_material(Material::new()
            .with_ambient(Tuple3D::ZERO)
            .with_diffuse(Tuple3D::ONE));

    let mut scene = Scene::new("floor")
        .with(floor)
        .with_light(PointLight::new(Color::gray(100.0), Point::new(0.0, 10.0, 0.0)));

    if let Some(b) = blocker {
        scene = scene.with(b);
    }

    scene
}

#[cfg(test)]
fn floor_ray() -> Ray {
    Ray::new(Point::new(0.0, 5.0, -5.0), Vector::new(0.0, -1.0, 1.0).unwrap())
}

#[test]
fn miss_returns_background() {
    let scene = Scene::new("empty").with_background(Color::rgb(1.0, 2.0, 3.0));
    let tracer = SimpleRayTracer::new(&scene);
    let r = Ray::new(Point::ZERO, Vector::Z);

    assert_eq!(tracer.trace_ray(&r), Color::rgb(1.0, 2.0, 3.0));
}

#[test]
fn emission_and_ambient_without_lights() {
    let sphere = Shape::sphere(Point::new(0.0, 0.0, 5.0), 1.0).unwrap()
        .with_emission(Color::rgb(10.0, 0.0, 0.0))
        .with_material(Material::new().with_ambient(Tuple3D::uniform(0.5)));

    let scene = Scene::new("glow")
        .with(sphere)
        .with_ambient_light(AmbientLight::from_intensity(Color::gray(40.0)));

    let tracer = SimpleRayTracer::new(&scene);
    let r = Ray::new(Point::ZERO, Vector::Z);

    assert_eq!(tracer.trace_ray(&r), Color::rgb(30.0, 20.0, 20.0));
}

#[test]
fn diffuse_and_specular_facing_the_light() {
    let sphere = Shape::sphere(Point::ZERO, 1.0).unwrap()
        .with_material(Material::new()
            .with_ambient(Tuple3D::ZERO)
            .with_diffuse(Tuple3D::uniform(0.5))
            .with_specular(Tuple3D::uniform(0.25))
            .with_shininess(10.0));

    let scene = Scene::new("sphere")
        .with(sphere)
        .with_light(PointLight::new(Color::gray(100.0), Point::new(0.0, 0.0, -10.0)));

    let tracer = SimpleRayTracer::new(&scene);
    let r = Ray::new(Point::new(0.0, 0.0, -5.0), Vector::Z);

    // Light, viewer and normal all line up: n·l = 1 and r·v = 1.
    assert_eq!(tracer.trace_ray(&r), Color::gray(75.0));
}

#[test]
fn unblocked_floor_is_lit() {
    let scene = lit_floor(None);
    let tracer = SimpleRayTracer::new(&scene);

    assert_eq!(tracer.trace_ray(&floor_ray()), Color::gray(100.0));
}

#[test]
fn blocker_casts_shadow() {
    let blocker = Shape::sphere(Point::new(0.0, 5.0, 0.0), 1.0).unwrap();
    let lit = lit_floor(None);
    let shadowed = lit_floor(Some(blocker));

    let lit = SimpleRayTracer::new(&lit).trace_ray(&floor_ray());
    let dark = SimpleRayTracer::new(&shadowed).trace_ray(&floor_ray());

    assert!(dark.is_black());
    assert!(dark.r <= lit.r && dark.g <= lit.g && dark.b <= lit.b);
}

#[test]
fn geometry_beyond_the_light_casts_no_shadow() {
    let beyond = Shape::sphere(Point::new(0.0, 20.0, 0.0), 1.0).unwrap();
    let scene = lit_floor(Some(beyond));
    let tracer = SimpleRayTracer::new(&scene);

    assert_eq!(tracer.trace_ray(&floor_ray()), Color::gray(100.0));
}

#[test]
fn geometry_just_past_the_light_casts_no_shadow() {
    let floor = Shape::plane(Point::ZERO, Vector::Y)
        .with_material(Material::new()
            .with_ambient(Tuple3D::ZERO)
            .with_diffuse(Tuple3D::ONE));

    // Spans 1.05 to 1.11 above the floor, with the light at 1.
    let past = Shape::sphere(Point::new(0.0, 1.08, 0.0), 0.03).unwrap();

    let scene = Scene::new("close light")
        .with(floor)
        .with(past)
        .with_light(PointLight::new(Color::gray(100.0), Point::new(0.0, 1.0, 0.0)));

    let tracer = SimpleRayTracer::new(&scene);
    let r = Ray::new(Point::new(0.0, 1.0, -1.0), Vector::new(0.0, -1.0, 1.0).unwrap());

    assert_eq!(tracer.trace_ray(&r), Color::gray(100.0));
}

#[test]
fn light_behind_surface_does_not_light_viewer_side() {
    let floor = Shape::plane(Point::ZERO, Vector::Y)
        .with_material(Material::new()
            .with_ambient(Tuple3D::ZERO)
            .with_diffuse(Tuple3D::ONE));

    let scene = Scene::new("under")
        .with(floor)
        .with_light(PointLight::new(Color::gray(100.0), Point::new(0.0, -10.0, 0.0)));

    let tracer = SimpleRayTracer::new(&scene);

    assert!(tracer.trace_ray(&floor_ray()).is_black());
}

#[test]
fn surfaces_are_lit_from_both_sides() {
    let floor = Shape::plane(Point::ZERO, Vector::Y)
        .with_material(Material::new()
            .with_ambient(Tuple3D::ZERO)
            .with_diffuse(Tuple3D::ONE));

    let scene = Scene::new("under")
        .with(floor)
        .with_light(PointLight::new(Color::gray(100.0), Point::new(0.0, -10.0, 0.0)));

    let tracer = SimpleRayTracer::new(&scene);
    let r = Ray::new(Point::new(0.0, -5.0, -5.0), Vector::new(0.0, 1.0, 1.0).unwrap());

    assert_eq!(tracer.trace_ray(&r), Color::gray(100.0));
}

#[test]
fn nearest_hit_is_shaded() {
    let near = Shape::sphere(Point::new(0.0, 0.0, 5.0), 1.0).unwrap()
        .with_emission(Color::rgb(0.0, 50.0, 0.0));
    let far = Shape::sphere(Point::new(0.0, 0.0, 10.0), 1.0).unwrap()
        .with_emission(Color::rgb(50.0, 0.0, 0.0));

    let scene = Scene::new("two").with(far).with(near);
    let tracer = SimpleRayTracer::new(&scene);

    assert_eq!(tracer.trace_ray(&Ray::new(Point::ZERO, Vector::Z)),
               Color::rgb(0.0, 50.0, 0.0));
}
