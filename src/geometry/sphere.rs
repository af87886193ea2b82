use crate::align_zero;
use crate::error::{ Result, TracerError };
use crate::ray::Ray;
use crate::tuple::{ Point, Vector };

use super::in_range;

/// A sphere around `center`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Point,
    radius: f64,
}

impl Sphere {
    pub fn new(center: Point, radius: f64) -> Result<Sphere> {
        if !(radius > 0.0) {
            return Err(TracerError::geometry(
                format!("sphere radius {} must be positive", radius)
            ));
        }

        Ok(Sphere { center, radius })
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// The outward normal; undefined at the center itself.
    pub fn normal_at(&self, p: &Point) -> Result<Vector> {
        Ok(p.subtract(&self.center)?.normalize())
    }

    /// Intersects a ray with the sphere.
    ///
    /// Projects the center onto the ray (`tm`), measures the squared distance
    /// between the center and the ray (`d²`), and steps `th` back and forth
    /// from the projection to reach the surface. Rays which only graze the
    /// sphere do not hit it. Hits are ordered by distance.
    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<Point> {
        let u = match self.center.subtract(&ray.origin) {
            Ok(u) => u,

            // Starting at the center, the ray leaves through the surface
            // exactly one radius away.
            Err(_) => {
                return if in_range(self.radius, max_distance) {
                    vec![ray.point_at(self.radius)]
                } else {
                    vec![]
                };
            }
        };

        let tm = align_zero(ray.direction.dot(&u));
        let d2 = align_zero(u.length_squared() - tm * tm);
        let th2 = align_zero(self.radius * self.radius - d2);
        if th2 <= 0.0 {
            return vec![];
        }

        let th = th2.sqrt();
        [tm - th, tm + th].iter()
            .filter(|&&t| in_range(t, max_distance))
            .map(|&t| ray.point_at(t))
            .collect()
    }
}

#[test]
fn non_positive_radius_is_rejected() {
    assert!(Sphere::new(Point::ZERO, 0.0).is_err());
    assert!(Sphere::new(Point::ZERO, -1.0).is_err());
    assert!(Sphere::new(Point::ZERO, f64::NAN).is_err());
}

#[test]
fn ray_through_center_hits_twice() {
    let s = Sphere::new(Point::ZERO, 1.0).unwrap();
    let r = Ray::new(Point::new(-2.0, 0.0, 0.0), Vector::X);
    let hits = s.intersect(&r, f64::INFINITY);

    assert_eq!(hits, vec![Point::new(-1.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0)]);
}

#[test]
fn ray_missing_sphere() {
    let s = Sphere::new(Point::ZERO, 1.0).unwrap();
    let r = Ray::new(Point::new(-2.0, 2.0, 0.0), Vector::X);

    assert!(s.intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn tangent_ray_misses() {
    let s = Sphere::new(Point::ZERO, 1.0).unwrap();
    let r = Ray::new(Point::new(0.0, 1.0, -5.0), Vector::Z);

    assert!(s.intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn ray_inside_sphere_hits_once() {
    let s = Sphere::new(Point::ZERO, 2.0).unwrap();
    let r = Ray::new(Point::new(0.5, 0.0, 0.0), Vector::X);

    assert_eq!(s.intersect(&r, f64::INFINITY), vec![Point::new(2.0, 0.0, 0.0)]);
}

#[test]
fn ray_from_center_hits_at_radius() {
    let s = Sphere::new(Point::new(1.0, 1.0, 1.0), 3.0).unwrap();
    let r = Ray::new(Point::new(1.0, 1.0, 1.0), -Vector::Y);

    assert_eq!(s.intersect(&r, f64::INFINITY), vec![Point::new(1.0, -2.0, 1.0)]);
    assert!(s.intersect(&r, 2.0).is_empty());
}

#[test]
fn sphere_behind_ray_is_not_hit() {
    let s = Sphere::new(Point::ZERO, 1.0).unwrap();
    let r = Ray::new(Point::new(0.0, 0.0, 5.0), Vector::Z);

    assert!(s.intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn sphere_normal_points_outwards() {
    let s = Sphere::new(Point::new(0.0, 0.0, 1.0), 1.0).unwrap();

    assert_eq!(s.normal_at(&Point::ZERO).unwrap(), -Vector::Z);
    assert!(s.normal_at(&Point::new(0.0, 0.0, 1.0)).is_err());
}
