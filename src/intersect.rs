use crate::geometries::Geometries;
use crate::geometry::Shape;
use crate::ray::Ray;
use crate::tuple::Point;

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. `point` is
/// where the ray met the surface, and `shape` is a reference to the shape it
/// met, which the shading code reads the normal and material from.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub shape: &'a Shape,
    pub point: Point,
}

/// Implements partial equality on an Intersection.
///
/// Two Intersection structures are equal if the points are equivalent, and
/// if the underlying *pointers* of the shapes are equivalent.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.point == other.point && std::ptr::eq(self.shape, other.shape)
    }
}

impl<'a> Intersection<'a> {
    pub fn new(shape: &'a Shape, point: Point) -> Intersection<'a> {
        Intersection { shape, point }
    }
}

/// Anything a ray can be intersected with: a single shape or a group.
///
/// Groups nest to any depth; a scene is one root group.
#[derive(Clone, Debug)]
pub enum Intersectable {
    Shape(Shape),
    Geometries(Geometries),
}

impl Intersectable {
    /// All hits of the ray, in no particular order.
    pub fn intersect(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        self.intersect_within(ray, f64::INFINITY)
    }

    /// All hits of the ray closer than `max_distance`, in no particular order.
    pub fn intersect_within(&self, ray: &Ray, max_distance: f64)
        -> Vec<Intersection<'_>> {
        match self {
            Intersectable::Shape(s) => s.intersect_within(ray, max_distance),
            Intersectable::Geometries(g) => g.intersect_within(ray, max_distance),
        }
    }
}

impl From<Shape> for Intersectable {
    fn from(shape: Shape) -> Intersectable {
        Intersectable::Shape(shape)
    }
}

impl From<Geometries> for Intersectable {
    fn from(group: Geometries) -> Intersectable {
        Intersectable::Geometries(group)
    }
}

#[test]
fn intersections_compare_shapes_by_pointer() {
    let s1 = Shape::sphere(Point::ZERO, 1.0).unwrap();
    let s2 = s1.clone();
    let p = Point::new(1.0, 0.0, 0.0);

    assert_eq!(Intersection::new(&s1, p), Intersection::new(&s1, p));
    assert_ne!(Intersection::new(&s1, p), Intersection::new(&s2, p));
}

#[test]
fn intersectable_shape_forwards() {
    use crate::tuple::Vector;

    let i: Intersectable = Shape::sphere(Point::ZERO, 1.0).unwrap().into();
    let r = Ray::new(Point::new(0.0, 0.0, -5.0), Vector::Z);

    assert_eq!(i.intersect(&r).len(), 2);
    assert_eq!(i.intersect_within(&r, 5.0).len(), 1);
}
