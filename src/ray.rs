use crate::consts::DELTA;
use crate::align_zero;
use crate::tuple::{ Point, Vector };
use crate::intersect::Intersection;

/// A half-line starting at `origin`.
///
/// The direction is normalized on construction, so the parameter `t` passed
/// to `point_at` is always a Euclidean distance from the origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vector,
}

impl Ray {
    pub fn new(origin: Point, direction: Vector) -> Ray {
        Ray { origin, direction: direction.normalize() }
    }

    /// Creates a ray leaving a surface.
    ///
    /// The origin is pushed by `DELTA` along `normal`, towards the side of
    /// the surface that `direction` heads into. This keeps shadow and other
    /// secondary rays from hitting the surface they start on ("acne"). A
    /// direction lying in the surface leaves the origin untouched.
    pub fn with_offset(origin: Point, direction: Vector, normal: &Vector)
        -> Ray {
        let nv = align_zero(normal.dot(&direction));
        let origin = if nv == 0.0 {
            origin
        } else {
            let k = if nv > 0.0 { DELTA } else { -DELTA };
            origin + normal.normalize().scale_unchecked(k)
        };

        Ray::new(origin, direction)
    }

    /// The point at distance `t` along the ray.
    pub fn point_at(&self, t: f64) -> Point {
        if align_zero(t) == 0.0 {
            self.origin
        } else {
            self.origin + self.direction.scale_unchecked(t)
        }
    }

    /// Picks the point closest to the ray origin.
    ///
    /// Ties keep whichever point came first.
    pub fn closest_point(&self, points: &[Point]) -> Option<Point> {
        let mut closest: Option<(f64, Point)> = None;
        for p in points {
            let d = self.origin.distance_squared(p);
            match closest {
                Some((best, _)) if best <= d => (),
                _ => closest = Some((d, *p)),
            }
        }

        closest.map(|(_, p)| p)
    }

    /// Picks the hit closest to the ray origin, by squared distance.
    ///
    /// A linear scan; ties keep whichever hit came first.
    pub fn closest_intersection<'a>(&self, hits: &[Intersection<'a>])
        -> Option<Intersection<'a>> {
        let mut closest: Option<(f64, Intersection<'a>)> = None;
        for hit in hits {
            let d = self.origin.distance_squared(&hit.point);
            match closest {
                Some((best, _)) if best <= d => (),
                _ => closest = Some((d, *hit)),
            }
        }

        closest.map(|(_, hit)| hit)
    }
}

#[test]
fn ray_direction_is_normalized() {
    let r = Ray::new(
        Point::new(1.0, 2.0, 3.0),
        Vector::new(0.0, 3.0, 4.0).unwrap()
    );

    assert_eq!(r.direction, Vector::new(0.0, 0.6, 0.8).unwrap());
}

#[test]
fn ray_position() {
    let r = Ray::new(
                Point::new(2.0, 3.0, 4.0),
                Vector::X
            );

    assert_eq!(r.point_at(0.0), Point::new(2.0, 3.0, 4.0));
    assert_eq!(r.point_at(1.0), Point::new(3.0, 3.0, 4.0));
    assert_eq!(r.point_at(-1.0), Point::new(1.0, 3.0, 4.0));
    assert_eq!(r.point_at(2.5), Point::new(4.5, 3.0, 4.0));
}

#[test]
fn offset_ray_moves_towards_direction_side() {
    let r = Ray::with_offset(Point::ZERO, Vector::Y, &Vector::Y);
    assert_eq!(r.origin, Point::new(0.0, DELTA, 0.0));

    let r = Ray::with_offset(Point::ZERO, -Vector::Y, &Vector::Y);
    assert_eq!(r.origin, Point::new(0.0, -DELTA, 0.0));
}

#[test]
fn offset_ray_along_surface_is_not_moved() {
    let r = Ray::with_offset(Point::ZERO, Vector::X, &Vector::Y);
    assert_eq!(r.origin, Point::ZERO);
}

#[test]
fn closest_point_to_origin() {
    let r = Ray::new(Point::ZERO, Vector::X);
    let points = vec![
        Point::new(5.0, 0.0, 0.0),
        Point::new(2.0, 0.0, 0.0),
        Point::new(3.0, 0.0, 0.0),
    ];

    assert_eq!(r.closest_point(&points), Some(Point::new(2.0, 0.0, 0.0)));
    assert_eq!(r.closest_point(&[]), None);
}
