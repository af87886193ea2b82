mod sphere;
mod plane;
mod polygon;
mod triangle;
mod tube;
mod cylinder;

pub use sphere::Sphere;
pub use plane::Plane;
pub use polygon::Polygon;
pub use triangle::Triangle;
pub use tube::Tube;
pub use cylinder::Cylinder;

use crate::color::Color;
use crate::error::Result;
use crate::intersect::Intersection;
use crate::material::Material;
use crate::ray::Ray;
use crate::tuple::{ Point, Vector };

/// The surface a `Shape` is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeType {
    /// A sphere with a center and a positive radius.
    Sphere(Sphere),

    /// An infinite plane through a point, with a unit normal.
    Plane(Plane),

    /// A triangle; a polygon with exactly three vertices.
    Triangle(Triangle),

    /// A convex, planar polygon with three or more vertices.
    Polygon(Polygon),

    /// An infinitely long round tube around an axis ray.
    Tube(Tube),

    /// A tube cut to a height and closed with two caps.
    Cylinder(Cylinder),
}

/// A renderable primitive.
///
/// Couples a surface (`ty`) with what it looks like: the light it emits by
/// itself and the material it reflects light with. Shapes are built once when
/// a scene is assembled and never change while rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub ty: ShapeType,
    pub emission: Color,
    pub material: Material,
}

impl From<ShapeType> for Shape {
    fn from(ty: ShapeType) -> Shape {
        Shape {
            ty,
            emission: Color::BLACK,
            material: Default::default(),
        }
    }
}

impl Shape {
    pub fn sphere(center: Point, radius: f64) -> Result<Shape> {
        Ok(ShapeType::Sphere(Sphere::new(center, radius)?).into())
    }

    pub fn plane(point: Point, normal: Vector) -> Shape {
        ShapeType::Plane(Plane::new(point, normal)).into()
    }

    /// Creates the plane through three points.
    pub fn plane_through(p1: &Point, p2: &Point, p3: &Point) -> Result<Shape> {
        Ok(ShapeType::Plane(Plane::through(p1, p2, p3)?).into())
    }

    pub fn triangle(p1: Point, p2: Point, p3: Point) -> Result<Shape> {
        Ok(ShapeType::Triangle(Triangle::new(p1, p2, p3)?).into())
    }

    pub fn polygon(vertices: &[Point]) -> Result<Shape> {
        Ok(ShapeType::Polygon(Polygon::new(vertices)?).into())
    }

    pub fn tube(axis: Ray, radius: f64) -> Result<Shape> {
        Ok(ShapeType::Tube(Tube::new(axis, radius)?).into())
    }

    pub fn cylinder(axis: Ray, radius: f64, height: f64) -> Result<Shape> {
        Ok(ShapeType::Cylinder(Cylinder::new(axis, radius, height)?).into())
    }

    pub fn with_emission(mut self, emission: Color) -> Shape {
        self.emission = emission;
        self
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    /// The unit normal of the surface at `p`.
    ///
    /// `p` is expected to lie on the surface. Fails only for points where the
    /// surface has no defined normal, such as the center of a sphere.
    pub fn normal_at(&self, p: &Point) -> Result<Vector> {
        match self.ty {
            ShapeType::Sphere(ref s) => s.normal_at(p),
            ShapeType::Plane(ref pl) => Ok(pl.normal()),
            ShapeType::Triangle(ref t) => Ok(t.normal()),
            ShapeType::Polygon(ref pg) => Ok(pg.normal()),
            ShapeType::Tube(ref t) => t.normal_at(p),
            ShapeType::Cylinder(ref c) => c.normal_at(p),
        }
    }

    /// Intersects a ray with this shape.
    pub fn intersect(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        self.intersect_within(ray, f64::INFINITY)
    }

    /// Intersects a ray with this shape, keeping only the hits closer to the
    /// ray origin than `max_distance`.
    pub fn intersect_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<Intersection<'_>> {
        let points = match self.ty {
            ShapeType::Sphere(ref s) => s.intersect(ray, max_distance),
            ShapeType::Plane(ref pl) => pl.intersect(ray, max_distance),
            ShapeType::Triangle(ref t) => t.intersect(ray, max_distance),
            ShapeType::Polygon(ref pg) => pg.intersect(ray, max_distance),
            ShapeType::Tube(ref t) => t.intersect(ray, max_distance),
            ShapeType::Cylinder(ref c) => c.intersect(ray, max_distance),
        };

        points.into_iter()
            .map(|point| Intersection::new(self, point))
            .collect()
    }
}

/// Keeps a hit distance if it lies strictly in front of the ray origin and
/// strictly before `max_distance`.
pub(crate) fn in_range(t: f64, max_distance: f64) -> bool {
    use crate::align_zero;

    align_zero(t) > 0.0 && align_zero(t - max_distance) < 0.0
}

#[test]
fn shapes_default_to_black_ambient_only() {
    let s = Shape::sphere(Point::ZERO, 1.0).unwrap();

    assert!(s.emission.is_black());
    assert_eq!(s.material, Material::default());
}

#[test]
fn fluent_setters_apply() {
    use crate::tuple::Tuple3D;

    let s = Shape::plane(Point::ZERO, Vector::Y)
        .with_emission(Color::gray(10.0))
        .with_material(Material::new().with_diffuse(Tuple3D::uniform(0.5)));

    assert_eq!(s.emission, Color::gray(10.0));
    assert_eq!(s.material.k_d, Tuple3D::uniform(0.5));
}

#[test]
fn hits_reference_their_shape() {
    let s = Shape::sphere(Point::ZERO, 1.0).unwrap();
    let r = Ray::new(Point::new(-2.0, 0.0, 0.0), Vector::X);
    let hits = s.intersect(&r);

    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| std::ptr::eq(h.shape, &s)));
}

#[test]
fn max_distance_clips_hits() {
    let s = Shape::sphere(Point::ZERO, 1.0).unwrap();
    let r = Ray::new(Point::new(-2.0, 0.0, 0.0), Vector::X);

    assert_eq!(s.intersect_within(&r, 2.0).len(), 1);
    assert_eq!(s.intersect_within(&r, 0.5).len(), 0);
    assert_eq!(s.intersect_within(&r, 10.0).len(), 2);
}

#[test]
fn normals_have_unit_length() {
    use crate::feq;

    let axis = Ray::new(Point::ZERO, Vector::Y);
    let cases = vec![
        (Shape::sphere(Point::new(1.0, 2.0, 3.0), 2.0).unwrap(),
            Point::new(1.0, 4.0, 3.0)),
        (Shape::plane(Point::ZERO, Vector::new(0.0, 3.0, 4.0).unwrap()),
            Point::new(1.0, 0.0, 0.0)),
        (Shape::triangle(
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
            Point::new(0.0, 0.0, 3.0)).unwrap(),
            Point::new(1.0 / 3.0, 2.0 / 3.0, 1.0)),
        (Shape::tube(axis, 2.0).unwrap(), Point::new(2.0, 7.0, 0.0)),
        (Shape::cylinder(axis, 2.0, 3.0).unwrap(), Point::new(0.0, 1.0, 2.0)),
        (Shape::cylinder(axis, 2.0, 3.0).unwrap(), Point::new(0.5, 3.0, 0.5)),
    ];

    for (shape, p) in cases {
        let n = shape.normal_at(&p).unwrap();
        assert!(feq(n.length(), 1.0), "{:?} at {:?}", shape.ty, p);
    }
}
