use std::time::{ Duration, Instant };

use log::{ debug, info };
use rand::rngs::StdRng;

use crate::canvas::{ Canvas, ImageSink };
use crate::color::Color;
use crate::error::{ Result, TracerError };
use crate::is_zero;
use crate::parallel::{ self, Threading };
use crate::ray::Ray;
use crate::sampling::{ self, DepthOfField, SamplingConfig, SamplingMethod };
use crate::tracer::RayTracer;
use crate::tuple::{ Point, Vector };

/// Where the camera looks, as given to the builder.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Orientation {
    /// Explicit forward and up vectors, already orthogonal.
    Vectors { to: Vector, up: Vector },

    /// A target point; `up` is only a hint and is straightened on build.
    LookAt { target: Point, up: Option<Vector> },
}

/// Collects camera settings, validating them on `build`.
///
/// Setters which can reject their input on their own return a `Result`;
/// checks which need several settings (a missing field, a camera placed on
/// its own target) wait for `build`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraBuilder {
    location: Option<Point>,
    orientation: Option<Orientation>,
    view_plane_size: Option<(f64, f64)>,
    view_plane_distance: Option<f64>,
    resolution: Option<(usize, usize)>,
    threading: Threading,
    progress: Option<Duration>,
    sampling: SamplingConfig,
    depth_of_field: Option<DepthOfField>,
}

impl CameraBuilder {
    pub fn new() -> CameraBuilder {
        Default::default()
    }

    pub fn location(mut self, location: Point) -> CameraBuilder {
        self.location = Some(location);
        self
    }

    /// Points the camera along `to`, with `up` as the top of the image.
    ///
    /// The two vectors must be orthogonal.
    pub fn direction(mut self, to: Vector, up: Vector) -> Result<CameraBuilder> {
        if !is_zero(to.normalize().dot(&up.normalize())) {
            return Err(TracerError::camera(
                "direction", "`to` and `up` are not orthogonal"
            ));
        }

        self.orientation = Some(Orientation::Vectors { to, up });
        Ok(self)
    }

    /// Points the camera at `target`, keeping the image upright along the Y
    /// axis where possible.
    pub fn look_at(mut self, target: Point) -> CameraBuilder {
        self.orientation = Some(Orientation::LookAt { target, up: None });
        self
    }

    /// Points the camera at `target`, with `up` roughly at the top of the
    /// image.
    pub fn look_at_with_up(mut self, target: Point, up: Vector) -> CameraBuilder {
        self.orientation = Some(Orientation::LookAt { target, up: Some(up) });
        self
    }

    pub fn view_plane_size(mut self, width: f64, height: f64)
        -> Result<CameraBuilder> {
        if !(width > 0.0) || !(height > 0.0) {
            return Err(TracerError::camera(
                "view_plane_size",
                format!("{} x {} is not a positive size", width, height)
            ));
        }

        self.view_plane_size = Some((width, height));
        Ok(self)
    }

    pub fn view_plane_distance(mut self, distance: f64) -> Result<CameraBuilder> {
        if !(distance > 0.0) {
            return Err(TracerError::camera(
                "view_plane_distance",
                format!("{} is not a positive distance", distance)
            ));
        }

        self.view_plane_distance = Some(distance);
        Ok(self)
    }

    /// Sets the image size in pixels, as columns by rows.
    pub fn resolution(mut self, nx: usize, ny: usize) -> Result<CameraBuilder> {
        if nx == 0 || ny == 0 {
            return Err(TracerError::camera(
                "resolution",
                format!("{} x {} has no pixels", nx, ny)
            ));
        }

        self.resolution = Some((nx, ny));
        Ok(self)
    }

    /// Sets the thread count; see `Threading::from_count`.
    pub fn threads(mut self, count: i32) -> Result<CameraBuilder> {
        self.threading = Threading::from_count(count)?;
        Ok(self)
    }

    /// Logs render progress every `seconds`; zero turns progress off.
    pub fn debug_print(mut self, seconds: f64) -> Result<CameraBuilder> {
        if !(seconds >= 0.0) || !seconds.is_finite() {
            return Err(TracerError::camera(
                "debug_print",
                format!("{} is not a non-negative interval", seconds)
            ));
        }

        self.progress = if seconds == 0.0 {
            None
        } else {
            Some(Duration::from_secs_f64(seconds))
        };
        Ok(self)
    }

    /// Sets the sampling method and its level (rays per pixel side).
    pub fn sampling(mut self, method: SamplingMethod, level: u32)
        -> Result<CameraBuilder> {
        if level == 0 {
            return Err(TracerError::camera(
                "sampling", "the super-sampling level must be at least 1"
            ));
        }

        self.sampling.method = method;
        self.sampling.level = level;
        Ok(self)
    }

    /// Tunes adaptive sampling.
    pub fn adaptive(mut self, max_depth: u32, threshold: f64)
        -> Result<CameraBuilder> {
        if max_depth == 0 {
            return Err(TracerError::camera(
                "adaptive", "the maximum depth must be at least 1"
            ));
        }

        if !(threshold >= 0.0) {
            return Err(TracerError::camera(
                "adaptive",
                format!("threshold {} must not be negative", threshold)
            ));
        }

        self.sampling.adaptive_depth = max_depth;
        self.sampling.adaptive_threshold = threshold;
        Ok(self)
    }

    /// Sets the jitter magnitude and, optionally, a seed which makes jitter
    /// and depth of field repeatable.
    pub fn jitter(mut self, magnitude: f64, seed: Option<u64>)
        -> Result<CameraBuilder> {
        if !(0.0..=1.0).contains(&magnitude) {
            return Err(TracerError::camera(
                "jitter",
                format!("magnitude {} is outside 0 to 1", magnitude)
            ));
        }

        self.sampling.jitter = magnitude;
        self.sampling.seed = seed;
        Ok(self)
    }

    /// Enables depth of field. An aperture of zero turns it off.
    pub fn depth_of_field(mut self, focal_distance: f64, aperture: f64,
        samples: u32) -> Result<CameraBuilder> {
        if !(focal_distance > 0.0) {
            return Err(TracerError::camera(
                "depth_of_field",
                format!("focal distance {} must be positive", focal_distance)
            ));
        }

        if !(aperture >= 0.0) {
            return Err(TracerError::camera(
                "depth_of_field",
                format!("aperture {} must not be negative", aperture)
            ));
        }

        if samples == 0 {
            return Err(TracerError::camera(
                "depth_of_field", "at least one sample is needed"
            ));
        }

        self.depth_of_field = if aperture == 0.0 {
            None
        } else {
            Some(DepthOfField { focal_distance, aperture, samples })
        };
        Ok(self)
    }

    /// Validates the settings and computes the camera basis.
    ///
    /// The up vector is recomputed as `right × to`, with `right = to × up`,
    /// so a look-at hint which is not quite orthogonal still gives an
    /// orthonormal basis.
    pub fn build(&self) -> Result<Camera> {
        use crate::error::TracerError::MissingCameraField;

        let location = self.location.ok_or(MissingCameraField("location"))?;
        let orientation = self.orientation.ok_or(MissingCameraField("direction"))?;
        let (width, height) = self.view_plane_size
            .ok_or(MissingCameraField("view_plane_size"))?;
        let distance = self.view_plane_distance
            .ok_or(MissingCameraField("view_plane_distance"))?;
        let (nx, ny) = self.resolution.ok_or(MissingCameraField("resolution"))?;

        let (to, up) = match orientation {
            Orientation::Vectors { to, up } => (to.normalize(), up),
            Orientation::LookAt { target, up } => {
                let to = target.subtract(&location)
                    .map_err(|_| TracerError::camera(
                        "look_at", "the camera is placed at its target"
                    ))?
                    .normalize();

                let up = up.unwrap_or_else(|| default_up(&to));
                (to, up)
            },
        };

        let right = to.cross(&up)
            .map_err(|_| TracerError::camera(
                "direction", "`up` is parallel to the view direction"
            ))?
            .normalize();
        let up = right.cross(&to)?.normalize();

        let camera = Camera {
            location,
            to,
            up,
            right,
            width,
            height,
            distance,
            nx,
            ny,
            vp_center: location + to.scale(distance)?,
            threading: self.threading,
            progress: self.progress,
            sampling: self.sampling,
            depth_of_field: self.depth_of_field,
        };

        debug!("camera at {:?} looking {:?}, {}x{} pixels, {:?} sampling",
               location, to, nx, ny, self.sampling.method);
        Ok(camera)
    }
}

/// The Y axis, unless the camera looks straight along it.
fn default_up(to: &Vector) -> Vector {
    if to.cross(&Vector::Y).is_ok() { Vector::Y } else { Vector::Z }
}

/// A pinhole camera with a view plane, ready to render.
///
/// Built by `CameraBuilder`; immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    location: Point,
    to: Vector,
    up: Vector,
    right: Vector,
    width: f64,
    height: f64,
    distance: f64,
    nx: usize,
    ny: usize,
    vp_center: Point,
    threading: Threading,
    progress: Option<Duration>,
    sampling: SamplingConfig,
    depth_of_field: Option<DepthOfField>,
}

impl Camera {
    pub fn builder() -> CameraBuilder {
        CameraBuilder::new()
    }

    pub fn location(&self) -> Point {
        self.location
    }

    /// The unit forward, up and right vectors.
    pub fn basis(&self) -> (Vector, Vector, Vector) {
        (self.to, self.up, self.right)
    }

    pub fn view_plane_distance(&self) -> f64 {
        self.distance
    }

    /// The image size as `(columns, rows)`.
    pub fn resolution(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn threading(&self) -> Threading {
        self.threading
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    /// The point on the view plane at a (possibly fractional) pixel position.
    ///
    /// Whole numbers are pixel centers: column `j` sits
    /// `(j - (nx - 1) / 2) × width / nx` right of the view plane center, and
    /// row `i` sits `(i - (ny - 1) / 2) × height / ny` below it.
    pub fn pixel_point(&self, col: f64, row: f64) -> Point {
        let pixel_width = self.width / self.nx as f64;
        let pixel_height = self.height / self.ny as f64;

        let x = (col - (self.nx as f64 - 1.0) / 2.0) * pixel_width;
        let y = (row - (self.ny as f64 - 1.0) / 2.0) * pixel_height;

        Point::from(self.vp_center.xyz()
            + self.right.xyz() * x
            - self.up.xyz() * y)
    }

    /// The pinhole ray through the center of a pixel.
    pub fn construct_ray(&self, col: usize, row: usize) -> Ray {
        self.ray_to(&self.pixel_point(col as f64, row as f64))
    }

    fn ray_to(&self, target: &Point) -> Ray {
        // The view plane lies in front of the camera, so this never fails.
        let direction = target.subtract(&self.location).unwrap_or(self.to);
        Ray::new(self.location, direction)
    }

    /// Traces a view plane point, through the lens when depth of field is on.
    fn trace_point(&self, tracer: &dyn RayTracer, target: &Point,
        rng: Option<&mut StdRng>) -> Color {
        let pinhole = self.ray_to(target);

        let (dof, rng) = match (self.depth_of_field, rng) {
            (Some(dof), Some(rng)) => (dof, rng),
            _ => return tracer.trace_ray(&pinhole),
        };

        // Where the pinhole ray crosses the focal plane.
        let cos = pinhole.direction.dot(&self.to);
        let focal_point = pinhole.point_at(dof.focal_distance / cos);

        let colors: Vec<Color> = (0..dof.samples)
            .map(|_| {
                let (dx, dy) = dof.disk_offset(rng);
                let origin = Point::from(self.location.xyz()
                    + self.right.xyz() * dx
                    + self.up.xyz() * dy);

                match focal_point.subtract(&origin) {
                    Ok(direction) => tracer.trace_ray(&Ray::new(origin, direction)),
                    Err(_) => Color::BLACK,
                }
            })
            .collect();

        Color::average(&colors)
    }

    /// The random number generator for one pixel, when its samples need one.
    fn pixel_rng(&self, col: usize, row: usize) -> Option<StdRng> {
        if self.sampling.is_random() || self.depth_of_field.is_some() {
            Some(self.sampling.rng_for(row * self.nx + col))
        } else {
            None
        }
    }

    /// The final color of one pixel, averaged over all of its samples.
    pub fn pixel_color(&self, tracer: &dyn RayTracer, col: usize, row: usize)
        -> Color {
        let mut rng = self.pixel_rng(col, row);
        let (x, y) = (col as f64, row as f64);

        match self.sampling.method {
            SamplingMethod::Adaptive => {
                let mut sample = |dx: f64, dy: f64| {
                    let p = self.pixel_point(x + dx, y + dy);
                    self.trace_point(tracer, &p, rng.as_mut())
                };

                sampling::adaptive(
                    &mut sample,
                    self.sampling.adaptive_depth,
                    self.sampling.adaptive_threshold,
                )
            },

            _ => {
                let offsets = self.sampling.offsets(rng.as_mut());
                let colors: Vec<Color> = offsets.iter()
                    .map(|&(dx, dy)| {
                        let p = self.pixel_point(x + dx, y + dy);
                        self.trace_point(tracer, &p, rng.as_mut())
                    })
                    .collect();

                Color::average(&colors)
            },
        }
    }

    /// Renders into a new canvas of the camera's resolution.
    pub fn render(&self, tracer: &dyn RayTracer) -> Canvas {
        let mut canvas = Canvas::new(self.nx, self.ny);
        self.render_pixels(tracer, &mut canvas);
        canvas
    }

    /// Renders into an image sink, which must match the camera resolution.
    pub fn render_into(&self, tracer: &dyn RayTracer, sink: &mut dyn ImageSink)
        -> Result<()> {
        let resolution = sink.resolution();
        if resolution != self.resolution() {
            return Err(TracerError::ResolutionMismatch {
                sink: resolution,
                camera: self.resolution(),
            });
        }

        self.render_pixels(tracer, sink);
        Ok(())
    }

    fn render_pixels(&self, tracer: &dyn RayTracer, sink: &mut dyn ImageSink) {
        info!("rendering {}x{} pixels ({:?}, {:?} sampling)",
              self.nx, self.ny, self.threading, self.sampling.method);
        let start = Instant::now();

        parallel::render_pixels(
            self.threading,
            self.nx,
            self.ny,
            self.progress,
            |col, row| self.pixel_color(tracer, col, row),
            |col, row, color| sink.write_pixel(col, row, &color),
        );

        info!("rendered {} pixels in {:.2?}", self.nx * self.ny, start.elapsed());
    }
}

/* Tests */

#[cfg(test)]
use crate::{ geometry::Shape, light::PointLight, material::Material,
    scene::Scene, tracer::SimpleRayTracer, tuple::Tuple3D };

#[cfg(test)]
fn basic_builder() -> CameraBuilder {
    Camera::builder()
        .location(Point::ZERO)
        .direction(-Vector::Z, Vector::Y).unwrap()
        .view_plane_size(3.0, 3.0).unwrap()
        .view_plane_distance(1.0).unwrap()
        .resolution(3, 3).unwrap()
}

#[cfg(test)]
fn test_scene() -> Scene {
    let shiny = Material::new()
        .with_ambient(Tuple3D::uniform(0.2))
        .with_diffuse(Tuple3D::uniform(0.6))
        .with_specular(Tuple3D::uniform(0.3))
        .with_shininess(20.0);

    Scene::new("test")
        .with_background(Color::rgb(0.0, 0.0, 40.0))
        .with_ambient_light(crate::light::AmbientLight::from_intensity(Color::gray(50.0)))
        .with(Shape::sphere(Point::new(0.0, 0.0, -8.0), 2.0).unwrap()
            .with_emission(Color::rgb(30.0, 0.0, 0.0))
            .with_material(shiny))
        .with(Shape::plane(Point::new(0.0, -2.0, 0.0), Vector::Y)
            .with_material(shiny))
        .with_light(PointLight::new(Color::gray(200.0), Point::new(5.0, 5.0, 0.0)))
}

#[cfg(test)]
fn test_builder(threads: i32) -> CameraBuilder {
    Camera::builder()
        .location(Point::new(0.0, 1.0, 2.0))
        .look_at(Point::new(0.0, 0.0, -8.0))
        .view_plane_size(4.0, 3.0).unwrap()
        .view_plane_distance(4.0).unwrap()
        .resolution(16, 12).unwrap()
        .threads(threads).unwrap()
}

#[test]
fn center_pixel_looks_forward() {
    let c = basic_builder().build().unwrap();
    let r = c.construct_ray(1, 1);

    assert_eq!(r.origin, Point::ZERO);
    assert_eq!(r.direction, -Vector::Z);
}

#[test]
fn corner_pixels_lean_outwards() {
    let c = basic_builder().build().unwrap();

    let top_left = Vector::new(-1.0, 1.0, -1.0).unwrap().normalize();
    let bottom_right = Vector::new(1.0, -1.0, -1.0).unwrap().normalize();

    assert_eq!(c.construct_ray(0, 0).direction, top_left);
    assert_eq!(c.construct_ray(2, 2).direction, bottom_right);
}

#[test]
fn even_resolution_centers_between_pixels() {
    let c = basic_builder()
        .view_plane_size(4.0, 2.0).unwrap()
        .resolution(4, 2).unwrap()
        .build().unwrap();

    assert_eq!(c.pixel_point(0.0, 0.0), Point::new(-1.5, 0.5, -1.0));
    assert_eq!(c.pixel_point(3.0, 1.0), Point::new(1.5, -0.5, -1.0));
}

#[test]
fn look_at_builds_orthonormal_basis() {
    let c = Camera::builder()
        .location(Point::new(0.0, 0.0, 10.0))
        .look_at_with_up(Point::ZERO, Vector::new(0.0, 1.0, 1.0).unwrap())
        .view_plane_size(1.0, 1.0).unwrap()
        .view_plane_distance(1.0).unwrap()
        .resolution(1, 1).unwrap()
        .build().unwrap();

    let (to, up, right) = c.basis();
    assert_eq!(to, -Vector::Z);
    assert_eq!(up, Vector::Y);
    assert_eq!(right, Vector::X);
}

#[test]
fn looking_straight_down_still_works() {
    let c = Camera::builder()
        .location(Point::new(0.0, 10.0, 0.0))
        .look_at(Point::ZERO)
        .view_plane_size(1.0, 1.0).unwrap()
        .view_plane_distance(1.0).unwrap()
        .resolution(1, 1).unwrap()
        .build();

    assert!(c.is_ok());
}

#[test]
fn missing_settings_fail_build() {
    let full = basic_builder();

    let mut b = full.clone();
    b.view_plane_size = None;
    assert!(matches!(b.build(),
        Err(TracerError::MissingCameraField("view_plane_size"))));

    let mut b = full.clone();
    b.view_plane_distance = None;
    assert!(matches!(b.build(),
        Err(TracerError::MissingCameraField("view_plane_distance"))));

    assert!(matches!(CameraBuilder::new().build(),
        Err(TracerError::MissingCameraField("location"))));
}

#[test]
fn camera_at_target_fails_build() {
    let b = basic_builder().look_at(Point::ZERO);

    assert!(matches!(b.build(), Err(TracerError::InvalidCamera { .. })));
}

#[test]
fn bad_settings_are_rejected() {
    let b = CameraBuilder::new();

    assert!(b.clone().direction(Vector::Z, Vector::new(0.0, 1.0, 1.0).unwrap()).is_err());
    assert!(b.clone().view_plane_size(0.0, 1.0).is_err());
    assert!(b.clone().view_plane_distance(-1.0).is_err());
    assert!(b.clone().resolution(0, 10).is_err());
    assert!(b.clone().threads(-7).is_err());
    assert!(b.clone().debug_print(-1.0).is_err());
    assert!(b.clone().sampling(SamplingMethod::Grid, 0).is_err());
    assert!(b.clone().adaptive(0, 1.0).is_err());
    assert!(b.clone().jitter(1.5, None).is_err());
    assert!(b.clone().depth_of_field(0.0, 1.0, 4).is_err());
    assert!(b.depth_of_field(1.0, 1.0, 0).is_err());
}

#[test]
fn sink_must_match_resolution() {
    let scene = test_scene();
    let tracer = SimpleRayTracer::new(&scene);
    let camera = test_builder(0).build().unwrap();
    let mut canvas = Canvas::new(4, 4);

    assert!(matches!(camera.render_into(&tracer, &mut canvas),
        Err(TracerError::ResolutionMismatch { .. })));
}

#[test]
fn render_matches_pixel_colors() {
    let scene = test_scene();
    let tracer = SimpleRayTracer::new(&scene);
    let camera = test_builder(0).build().unwrap();
    let image = camera.render(&tracer);

    assert_eq!(image.read_pixel(8, 6).unwrap(), camera.pixel_color(&tracer, 8, 6));
    assert_eq!(image.read_pixel(0, 0).unwrap(), Color::rgb(0.0, 0.0, 40.0));
}

#[test]
fn center_and_grid_of_one_agree() {
    let scene = test_scene();
    let tracer = SimpleRayTracer::new(&scene);

    let center = test_builder(0)
        .sampling(SamplingMethod::Center, 1).unwrap()
        .build().unwrap()
        .render(&tracer);
    let grid = test_builder(0)
        .sampling(SamplingMethod::Grid, 1).unwrap()
        .build().unwrap()
        .render(&tracer);

    assert_eq!(center, grid);
}

#[test]
fn threading_strategies_render_identically() {
    let scene = test_scene();
    let tracer = SimpleRayTracer::new(&scene);

    let images: Vec<Canvas> = [0, -1, 3].iter()
        .map(|&threads| test_builder(threads)
            .sampling(SamplingMethod::Grid, 2).unwrap()
            .build().unwrap()
            .render(&tracer))
        .collect();

    assert_eq!(images[0], images[1]);
    assert_eq!(images[0], images[2]);
}

#[test]
fn seeded_randomness_is_thread_independent() {
    let scene = test_scene();
    let tracer = SimpleRayTracer::new(&scene);

    let images: Vec<Canvas> = [0, -1, 3].iter()
        .map(|&threads| test_builder(threads)
            .sampling(SamplingMethod::Jittered, 2).unwrap()
            .jitter(1.0, Some(99)).unwrap()
            .depth_of_field(10.0, 0.1, 3).unwrap()
            .build().unwrap()
            .render(&tracer))
        .collect();

    assert_eq!(images[0], images[1]);
    assert_eq!(images[0], images[2]);
}

#[test]
fn adaptive_sampling_of_flat_background() {
    let scene = Scene::new("flat").with_background(Color::gray(77.0));
    let tracer = SimpleRayTracer::new(&scene);
    let image = test_builder(0)
        .sampling(SamplingMethod::Adaptive, 1).unwrap()
        .adaptive(3, 1.0).unwrap()
        .build().unwrap()
        .render(&tracer);

    assert_eq!(image.read_pixel(3, 3).unwrap(), Color::gray(77.0));
}

#[test]
fn only_random_sampling_draws_random_numbers() {
    let center = basic_builder().build().unwrap();
    let grid = basic_builder()
        .sampling(SamplingMethod::Grid, 3).unwrap()
        .build().unwrap();
    let jittered = basic_builder()
        .sampling(SamplingMethod::Jittered, 3).unwrap()
        .build().unwrap();
    let lens = basic_builder()
        .depth_of_field(5.0, 0.2, 4).unwrap()
        .build().unwrap();

    assert!(center.pixel_rng(1, 1).is_none());
    assert!(grid.pixel_rng(1, 1).is_none());
    assert!(jittered.pixel_rng(1, 1).is_some());
    assert!(lens.pixel_rng(1, 1).is_some());
}
