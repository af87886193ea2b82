use std::fs;
use std::path::Path;

use log::debug;
use serde::{ Serialize, Deserialize };

use crate::camera::CameraBuilder;
use crate::color::Color;
use crate::error::{ Result, TracerError };
use crate::geometries::Geometries;
use crate::geometry::Shape;
use crate::intersect::Intersectable;
use crate::light::{ AmbientLight, DirectionalLight, LightSource, PointLight,
    SpotLight };
use crate::material::Material;
use crate::ray::Ray;
use crate::sampling::SamplingMethod;
use crate::tuple::{ Point, Tuple3D, Vector };

/// Everything the ray tracer needs to shade a ray.
///
/// A scene is assembled once, through the fluent setters or from a JSON
/// description, and is read-only while rendering.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub name: String,
    pub background: Color,
    pub ambient_light: AmbientLight,
    pub geometries: Geometries,
    pub lights: Vec<LightSource>,
}

impl Scene {
    pub fn new(name: &str) -> Scene {
        Scene { name: name.to_string(), ..Default::default() }
    }

    pub fn with_background(mut self, background: Color) -> Scene {
        self.background = background;
        self
    }

    pub fn with_ambient_light(mut self, ambient_light: AmbientLight) -> Scene {
        self.ambient_light = ambient_light;
        self
    }

    pub fn with_geometries(mut self, geometries: Geometries) -> Scene {
        self.geometries = geometries;
        self
    }

    /// Adds a shape or group to the scene geometry.
    pub fn with(mut self, child: impl Into<Intersectable>) -> Scene {
        self.geometries.add(child);
        self
    }

    pub fn with_light(mut self, light: impl Into<LightSource>) -> Scene {
        self.lights.push(light.into());
        self
    }

    /// Parses a JSON scene description.
    pub fn from_json(json: &str) -> Result<SceneDescription> {
        let scene_json: SceneJson = serde_json::from_str(json)?;
        scene_json.into_description()
    }

    /// Reads and parses a JSON scene description file.
    pub fn load(path: &Path) -> Result<SceneDescription> {
        let json = fs::read_to_string(path)?;
        Scene::from_json(&json)
    }
}

/// A scene parsed from JSON, with the camera it describes, if any.
#[derive(Clone, Debug)]
pub struct SceneDescription {
    pub scene: Scene,
    pub camera: Option<CameraBuilder>,
}

/* JSON scene format */

type Triple = [f64; 3];

fn point(t: Triple) -> Point {
    Point::new(t[0], t[1], t[2])
}

fn vector(field: &str, t: Triple) -> Result<Vector> {
    Vector::new(t[0], t[1], t[2]).map_err(|_| TracerError::Scene(
        format!("`{}` must not be a zero vector", field)
    ))
}

fn color(t: Triple) -> Color {
    Color::rgb(t[0], t[1], t[2])
}

/// A scene, as written in a JSON file.
///
/// Only `geometries` is really needed; everything else has a default (black
/// background, no ambient light, no lights, no camera).
#[derive(Serialize, Deserialize)]
pub struct SceneJson {
    #[serde(default)]
    name: String,

    #[serde(default)]
    background: Option<Triple>,

    #[serde(default)]
    ambient: Option<AmbientJson>,

    #[serde(default)]
    lights: Vec<LightJson>,

    #[serde(default)]
    geometries: Vec<GeometryJson>,

    #[serde(default)]
    camera: Option<CameraJson>,
}

#[derive(Serialize, Deserialize)]
struct AmbientJson {
    intensity: Triple,

    #[serde(default)]
    k_a: Option<Coefficient>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LightJson {
    Directional {
        intensity: Triple,
        direction: Triple,
    },

    Point {
        intensity: Triple,
        position: Triple,

        #[serde(default)]
        attenuation: Option<Triple>,
    },

    Spot {
        intensity: Triple,
        position: Triple,
        direction: Triple,

        #[serde(default)]
        attenuation: Option<Triple>,

        #[serde(default)]
        narrow_beam: Option<f64>,
    },
}

/// A material coefficient: either one number for every channel, or one
/// number per channel.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum Coefficient {
    Uniform(f64),
    PerChannel(Triple),
}

impl From<Coefficient> for Tuple3D {
    fn from(c: Coefficient) -> Tuple3D {
        match c {
            Coefficient::Uniform(k) => Tuple3D::uniform(k),
            Coefficient::PerChannel(t) => Tuple3D::new(t[0], t[1], t[2]),
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct MaterialJson {
    k_a: Option<Coefficient>,
    k_d: Option<Coefficient>,
    k_s: Option<Coefficient>,
    k_t: Option<Coefficient>,
    k_r: Option<Coefficient>,
    shininess: Option<f64>,
}

impl From<MaterialJson> for Material {
    fn from(m: MaterialJson) -> Material {
        let base = Material::default();
        Material {
            k_a: m.k_a.map_or(base.k_a, Into::into),
            k_d: m.k_d.map_or(base.k_d, Into::into),
            k_s: m.k_s.map_or(base.k_s, Into::into),
            k_t: m.k_t.map_or(base.k_t, Into::into),
            k_r: m.k_r.map_or(base.k_r, Into::into),
            shininess: m.shininess.unwrap_or(base.shininess),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct GeometryJson {
    #[serde(flatten)]
    shape: ShapeJson,

    #[serde(default)]
    emission: Option<Triple>,

    #[serde(default)]
    material: Option<MaterialJson>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeJson {
    Sphere { center: Triple, radius: f64 },
    Plane { point: Triple, normal: Triple },
    Triangle { vertices: [Triple; 3] },
    Polygon { vertices: Vec<Triple> },
    Tube { origin: Triple, direction: Triple, radius: f64 },
    Cylinder { origin: Triple, direction: Triple, radius: f64, height: f64 },

    /// A nested group. Emission and material are not inherited by children.
    Group { children: Vec<GeometryJson> },
}

impl GeometryJson {
    fn into_intersectable(self) -> Result<Intersectable> {
        let mut shape = match self.shape {
            ShapeJson::Sphere { center, radius } =>
                Shape::sphere(point(center), radius)?,

            ShapeJson::Plane { point: q, normal } =>
                Shape::plane(point(q), vector("normal", normal)?),

            ShapeJson::Triangle { vertices: [a, b, c] } =>
                Shape::triangle(point(a), point(b), point(c))?,

            ShapeJson::Polygon { vertices } => {
                let vertices: Vec<Point> = vertices.into_iter().map(point).collect();
                Shape::polygon(&vertices)?
            },

            ShapeJson::Tube { origin, direction, radius } => {
                let axis = Ray::new(point(origin), vector("direction", direction)?);
                Shape::tube(axis, radius)?
            },

            ShapeJson::Cylinder { origin, direction, radius, height } => {
                let axis = Ray::new(point(origin), vector("direction", direction)?);
                Shape::cylinder(axis, radius, height)?
            },

            ShapeJson::Group { children } => {
                let mut group = Geometries::new();
                for child in children {
                    group.add(child.into_intersectable()?);
                }

                return Ok(group.into());
            },
        };

        if let Some(emission) = self.emission {
            shape = shape.with_emission(color(emission));
        }
        if let Some(material) = self.material {
            shape = shape.with_material(material.into());
        }

        Ok(shape.into())
    }
}

impl LightJson {
    fn into_light(self) -> Result<LightSource> {
        let light: LightSource = match self {
            LightJson::Directional { intensity, direction } => {
                DirectionalLight::new(
                    color(intensity), vector("direction", direction)?
                ).into()
            },

            LightJson::Point { intensity, position, attenuation } => {
                let mut light = PointLight::new(color(intensity), point(position));
                if let Some([k_c, k_l, k_q]) = attenuation {
                    light = light.with_attenuation(k_c, k_l, k_q)?;
                }

                light.into()
            },

            LightJson::Spot {
                intensity, position, direction, attenuation, narrow_beam
            } => {
                let mut light = SpotLight::new(
                    color(intensity),
                    point(position),
                    vector("direction", direction)?,
                );
                if let Some([k_c, k_l, k_q]) = attenuation {
                    light = light.with_attenuation(k_c, k_l, k_q)?;
                }
                if let Some(narrow_beam) = narrow_beam {
                    light = light.with_narrow_beam(narrow_beam)?;
                }

                light.into()
            },
        };

        Ok(light)
    }
}

/// Camera settings, as written in a JSON scene file.
///
/// Orientation is either `look_at` (with an optional `up`), or an explicit,
/// orthogonal `to` and `up` pair.
#[derive(Serialize, Deserialize)]
struct CameraJson {
    location: Triple,

    #[serde(default)]
    look_at: Option<Triple>,

    #[serde(default)]
    to: Option<Triple>,

    #[serde(default)]
    up: Option<Triple>,

    view_plane_size: [f64; 2],
    view_plane_distance: f64,
    resolution: [usize; 2],

    #[serde(default)]
    threads: Option<i32>,

    #[serde(default)]
    debug_print: Option<f64>,

    #[serde(default)]
    sampling: Option<SamplingJson>,

    #[serde(default)]
    depth_of_field: Option<DepthOfFieldJson>,
}

#[derive(Serialize, Deserialize)]
struct SamplingJson {
    method: SamplingMethod,

    #[serde(default)]
    level: Option<u32>,

    #[serde(default)]
    adaptive_depth: Option<u32>,

    #[serde(default)]
    adaptive_threshold: Option<f64>,

    #[serde(default)]
    jitter: Option<f64>,

    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Serialize, Deserialize)]
struct DepthOfFieldJson {
    focal_distance: f64,
    aperture: f64,

    #[serde(default)]
    samples: Option<u32>,
}

impl CameraJson {
    fn into_builder(self) -> Result<CameraBuilder> {
        use crate::consts::{ DEFAULT_ADAPTIVE_DEPTH, DEFAULT_ADAPTIVE_THRESHOLD,
            DEFAULT_DOF_SAMPLES };

        let mut builder = CameraBuilder::new().location(point(self.location));

        builder = match (self.look_at, self.to, self.up) {
            (Some(target), None, None) => builder.look_at(point(target)),
            (Some(target), None, Some(up)) =>
                builder.look_at_with_up(point(target), vector("up", up)?),
            (None, Some(to), Some(up)) =>
                builder.direction(vector("to", to)?, vector("up", up)?)?,
            _ => return Err(TracerError::Scene(
                "camera needs either `look_at` or both `to` and `up`".to_string()
            )),
        };

        let [width, height] = self.view_plane_size;
        let [nx, ny] = self.resolution;
        builder = builder
            .view_plane_size(width, height)?
            .view_plane_distance(self.view_plane_distance)?
            .resolution(nx, ny)?;

        if let Some(threads) = self.threads {
            builder = builder.threads(threads)?;
        }

        if let Some(seconds) = self.debug_print {
            builder = builder.debug_print(seconds)?;
        }

        if let Some(s) = self.sampling {
            builder = builder.sampling(s.method, s.level.unwrap_or(1))?;
            builder = builder.adaptive(
                s.adaptive_depth.unwrap_or(DEFAULT_ADAPTIVE_DEPTH),
                s.adaptive_threshold.unwrap_or(DEFAULT_ADAPTIVE_THRESHOLD),
            )?;
            if s.jitter.is_some() || s.seed.is_some() {
                builder = builder.jitter(s.jitter.unwrap_or(1.0), s.seed)?;
            }
        }

        if let Some(dof) = self.depth_of_field {
            builder = builder.depth_of_field(
                dof.focal_distance,
                dof.aperture,
                dof.samples.unwrap_or(DEFAULT_DOF_SAMPLES),
            )?;
        }

        Ok(builder)
    }
}

impl SceneJson {
    pub fn into_description(self) -> Result<SceneDescription> {
        let mut scene = Scene::new(&self.name);

        if let Some(background) = self.background {
            scene = scene.with_background(color(background));
        }

        if let Some(ambient) = self.ambient {
            let k_a = ambient.k_a.map_or(Tuple3D::ONE, Into::into);
            scene = scene.with_ambient_light(
                AmbientLight::new(color(ambient.intensity), k_a)
            );
        }

        for light in self.lights {
            scene.lights.push(light.into_light()?);
        }

        for geometry in self.geometries {
            scene.geometries.add(geometry.into_intersectable()?);
        }

        let camera = match self.camera {
            Some(c) => Some(c.into_builder()?),
            None => None,
        };

        debug!(
            "loaded scene '{}': {} top-level geometries, {} lights{}",
            scene.name,
            scene.geometries.len(),
            scene.lights.len(),
            if camera.is_some() { ", with camera" } else { "" }
        );

        Ok(SceneDescription { scene, camera })
    }
}

#[cfg(test)]
const SAMPLE_SCENE: &str = r#"{
    "name": "sample",
    "background": [10, 20, 30],
    "ambient": { "intensity": [255, 255, 255], "k_a": 0.1 },
    "lights": [
        { "type": "directional", "intensity": [100, 100, 100], "direction": [0, -1, 0] },
        { "type": "point", "intensity": [50, 50, 50], "position": [0, 10, 0],
          "attenuation": [1, 0.01, 0.001] },
        { "type": "spot", "intensity": [50, 50, 50], "position": [0, 10, 0],
          "direction": [0, -1, 0], "narrow_beam": 4 }
    ],
    "geometries": [
        { "type": "sphere", "center": [0, 0, -10], "radius": 2,
          "emission": [20, 0, 0],
          "material": { "k_d": 0.5, "k_s": [0.1, 0.2, 0.3], "shininess": 30 } },
        { "type": "plane", "point": [0, -2, 0], "normal": [0, 1, 0] },
        { "type": "group", "children": [
            { "type": "triangle", "vertices": [[1, 0, 0], [0, 2, 0], [0, 0, 3]] },
            { "type": "cylinder", "origin": [0, 0, 0], "direction": [0, 1, 0],
              "radius": 1, "height": 2 }
        ] }
    ],
    "camera": {
        "location": [0, 0, 10],
        "look_at": [0, 0, 0],
        "view_plane_size": [4, 3],
        "view_plane_distance": 10,
        "resolution": [40, 30],
        "threads": -1,
        "sampling": { "method": "grid", "level": 2 }
    }
}"#;

#[test]
fn scene_builder_defaults() {
    let s = Scene::new("empty");

    assert_eq!(s.name, "empty");
    assert!(s.background.is_black());
    assert_eq!(s.ambient_light, AmbientLight::NONE);
    assert!(s.geometries.is_empty());
    assert!(s.lights.is_empty());
}

#[test]
fn parse_sample_scene() {
    let d = Scene::from_json(SAMPLE_SCENE).unwrap();
    let s = &d.scene;

    assert_eq!(s.name, "sample");
    assert_eq!(s.background, Color::rgb(10.0, 20.0, 30.0));
    assert_eq!(s.ambient_light.intensity, Color::gray(25.5));
    assert_eq!(s.lights.len(), 3);
    assert_eq!(s.geometries.len(), 3);
    assert!(d.camera.is_some());

    match &s.geometries.children()[0] {
        Intersectable::Shape(sphere) => {
            assert_eq!(sphere.emission, Color::rgb(20.0, 0.0, 0.0));
            assert_eq!(sphere.material.k_d, Tuple3D::uniform(0.5));
            assert_eq!(sphere.material.k_s, Tuple3D::new(0.1, 0.2, 0.3));
            assert_eq!(sphere.material.k_a, Tuple3D::ONE);
            assert_eq!(sphere.material.shininess, 30.0);
        },
        other => panic!("expected a shape, got {:?}", other),
    }

    match &s.geometries.children()[2] {
        Intersectable::Geometries(g) => assert_eq!(g.len(), 2),
        other => panic!("expected a group, got {:?}", other),
    }
}

#[test]
fn sample_scene_camera_builds() {
    let d = Scene::from_json(SAMPLE_SCENE).unwrap();
    let camera = d.camera.unwrap().build().unwrap();

    assert_eq!(camera.resolution(), (40, 30));
}

#[test]
fn invalid_geometry_is_reported() {
    let json = r#"{ "geometries": [
        { "type": "sphere", "center": [0, 0, 0], "radius": -1 }
    ] }"#;

    assert!(matches!(Scene::from_json(json),
        Err(TracerError::InvalidGeometry(_))));
}

#[test]
fn zero_direction_is_reported() {
    let json = r#"{ "lights": [
        { "type": "directional", "intensity": [1, 1, 1], "direction": [0, 0, 0] }
    ] }"#;

    assert!(matches!(Scene::from_json(json), Err(TracerError::Scene(_))));
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(Scene::from_json("{ \"geometries\": 3 }"),
        Err(TracerError::Json(_))));
}

#[test]
fn camera_needs_an_orientation() {
    let json = r#"{ "camera": {
        "location": [0, 0, 0],
        "view_plane_size": [1, 1],
        "view_plane_distance": 1,
        "resolution": [1, 1]
    } }"#;

    assert!(matches!(Scene::from_json(json), Err(TracerError::Scene(_))));
}
