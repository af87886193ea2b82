use crate::error::Result;
use crate::ray::Ray;
use crate::tuple::{ Point, Vector };

use super::Polygon;

/// A triangle; intersected exactly like a three-vertex polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle(Polygon);

impl Triangle {
    pub fn new(p1: Point, p2: Point, p3: Point) -> Result<Triangle> {
        Ok(Triangle(Polygon::new(&[p1, p2, p3])?))
    }

    pub fn vertices(&self) -> &[Point] {
        self.0.vertices()
    }

    pub fn normal(&self) -> Vector {
        self.0.normal()
    }

    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<Point> {
        self.0.intersect(ray, max_distance)
    }
}

#[cfg(test)]
fn slanted() -> Triangle {
    Triangle::new(
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 2.0, 0.0),
        Point::new(0.0, 0.0, 3.0),
    ).unwrap()
}

#[test]
fn collinear_triangle_is_rejected() {
    let t = Triangle::new(
        Point::ZERO,
        Point::new(1.0, 1.0, 1.0),
        Point::new(2.0, 2.0, 2.0),
    );

    assert!(t.is_err());
}

#[test]
fn triangle_normal() {
    let n = Vector::new(6.0, 3.0, 2.0).unwrap().normalize();

    assert_eq!(slanted().normal(), n);
}

#[test]
fn ray_hits_triangle_inside() {
    let r = Ray::new(Point::new(0.2, 0.5, -1.0), Vector::Z);

    assert_eq!(slanted().intersect(&r, f64::INFINITY),
               vec![Point::new(0.2, 0.5, 1.65)]);
}

#[test]
fn ray_through_vertex_misses() {
    let r = Ray::new(Point::new(1.0, 0.0, -1.0), Vector::Z);

    assert!(slanted().intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn ray_beside_triangle_misses() {
    let r = Ray::new(Point::new(1.0, 1.0, -1.0), Vector::Z);

    assert!(slanted().intersect(&r, f64::INFINITY).is_empty());
}
