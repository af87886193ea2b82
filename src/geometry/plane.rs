use crate::align_zero;
use crate::error::{ Result, TracerError };
use crate::ray::Ray;
use crate::tuple::{ Point, Vector };

use super::in_range;

/// An infinite plane through `point`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    point: Point,
    normal: Vector,
}

impl Plane {
    pub fn new(point: Point, normal: Vector) -> Plane {
        Plane { point, normal: normal.normalize() }
    }

    /// Creates the plane through three points.
    ///
    /// The normal is `(p2 - p1) × (p3 - p1)`, normalized. Fails when two of
    /// the points coincide or all three lie on one line.
    pub fn through(p1: &Point, p2: &Point, p3: &Point) -> Result<Plane> {
        let coincide = |_| TracerError::geometry("plane points coincide");
        let v1 = p2.subtract(p1).map_err(coincide)?;
        let v2 = p3.subtract(p1).map_err(coincide)?;

        let normal = v1.cross(&v2)
            .map_err(|_| TracerError::geometry("plane points are collinear"))?;

        Ok(Plane::new(*p1, normal))
    }

    pub fn point(&self) -> Point {
        self.point
    }

    /// The unit normal; the same everywhere on the plane.
    pub fn normal(&self) -> Vector {
        self.normal
    }

    /// Intersects a ray with the plane.
    ///
    /// Rays parallel to the plane, rays lying in it, and rays starting on it
    /// all miss.
    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<Point> {
        let nv = align_zero(self.normal.dot(&ray.direction));
        if nv == 0.0 {
            return vec![];
        }

        let to_plane = match self.point.subtract(&ray.origin) {
            Ok(v) => v,
            Err(_) => return vec![],
        };

        let nq = align_zero(self.normal.dot(&to_plane));
        if nq == 0.0 {
            return vec![];
        }

        let t = align_zero(nq / nv);
        if in_range(t, max_distance) {
            vec![ray.point_at(t)]
        } else {
            vec![]
        }
    }
}

#[test]
fn plane_through_points() {
    let p = Plane::through(
        &Point::new(0.0, 1.0, 0.0),
        &Point::new(-1.0, 0.0, 0.0),
        &Point::new(1.0, 0.0, 0.0),
    ).unwrap();

    assert_eq!(p.normal(), Vector::new(0.0, 0.0, 1.0).unwrap());
}

#[test]
fn degenerate_planes_are_rejected() {
    let a = Point::new(1.0, 2.0, 3.0);
    let b = Point::new(2.0, 4.0, 6.0);
    let c = Point::new(3.0, 6.0, 9.0);

    assert!(Plane::through(&a, &a, &b).is_err());
    assert!(Plane::through(&a, &b, &c).is_err());
}

#[test]
fn ray_hits_plane() {
    let p = Plane::new(Point::new(0.0, 0.0, 2.0), Vector::Z);
    let r = Ray::new(Point::new(1.0, 1.0, 0.0), Vector::Z);

    assert_eq!(p.intersect(&r, f64::INFINITY), vec![Point::new(1.0, 1.0, 2.0)]);
}

#[test]
fn plane_hit_from_behind() {
    let p = Plane::new(Point::ZERO, Vector::Y);
    let r = Ray::new(Point::new(0.0, -3.0, 0.0), Vector::Y);

    assert_eq!(p.intersect(&r, f64::INFINITY), vec![Point::ZERO]);
}

#[test]
fn parallel_ray_misses_plane() {
    let p = Plane::new(Point::ZERO, Vector::Y);
    let r = Ray::new(Point::new(0.0, 1.0, 0.0), Vector::X);

    assert!(p.intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn ray_in_plane_misses() {
    let p = Plane::new(Point::ZERO, Vector::Y);
    let r = Ray::new(Point::new(3.0, 0.0, 0.0), Vector::X);

    assert!(p.intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn ray_starting_on_plane_misses() {
    let p = Plane::new(Point::ZERO, Vector::Y);
    let r = Ray::new(Point::ZERO, Vector::Y);
    let s = Ray::new(Point::new(1.0, 0.0, 0.0), Vector::Y);

    assert!(p.intersect(&r, f64::INFINITY).is_empty());
    assert!(p.intersect(&s, f64::INFINITY).is_empty());
}

#[test]
fn plane_behind_ray_misses() {
    let p = Plane::new(Point::ZERO, Vector::Y);
    let r = Ray::new(Point::new(0.0, 1.0, 0.0), Vector::Y);

    assert!(p.intersect(&r, f64::INFINITY).is_empty());
}
