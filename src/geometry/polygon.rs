use crate::{ align_zero, is_zero };
use crate::error::{ Result, TracerError };
use crate::ray::Ray;
use crate::tuple::{ Point, Vector };

use super::Plane;

/// A convex polygon.
///
/// Vertices are kept in order; consecutive vertices (and the last and first)
/// form the edges. All vertices lie on `plane`, which is taken from the
/// first three.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
    plane: Plane,
}

impl Polygon {
    /// Creates a polygon from its vertices, in edge order.
    ///
    /// Fails with fewer than three vertices, with two consecutive vertices in
    /// the same place, or when the vertices do not form a convex, planar
    /// polygon. Three consecutive collinear vertices count as non-convex.
    pub fn new(vertices: &[Point]) -> Result<Polygon> {
        if vertices.len() < 3 {
            return Err(TracerError::geometry(
                format!("a polygon needs at least 3 vertices, got {}",
                        vertices.len())
            ));
        }

        let plane = Plane::through(&vertices[0], &vertices[1], &vertices[2])?;
        let polygon = Polygon { vertices: vertices.to_vec(), plane };

        // A triangle is always planar and convex.
        if vertices.len() == 3 {
            return Ok(polygon);
        }

        let n = polygon.normal();
        let size = vertices.len();

        // Walk the edges keeping the last two; every pair must turn the same
        // way around the normal.
        let mut edge1 = edge(&vertices[size - 2], &vertices[size - 1])?;
        let mut edge2 = edge(&vertices[size - 1], &vertices[0])?;
        let positive = edge1.cross(&edge2).ok().map(|c| c.dot(&n) > 0.0);

        for i in 1..size {
            let offset = vertices[i].xyz() - vertices[0].xyz();
            if !is_zero(offset.dot(&n.xyz())) {
                return Err(TracerError::geometry(
                    "polygon vertices are not on the same plane"
                ));
            }

            edge1 = edge2;
            edge2 = edge(&vertices[i - 1], &vertices[i])?;
            let turn = edge1.cross(&edge2).ok().map(|c| c.dot(&n) > 0.0);

            match (positive, turn) {
                (Some(p), Some(t)) if p == t => (),
                _ => return Err(TracerError::geometry(
                    "polygon is not convex"
                )),
            }
        }

        Ok(polygon)
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn normal(&self) -> Vector {
        self.plane.normal()
    }

    /// Intersects a ray with the polygon.
    ///
    /// Finds the hit on the polygon's plane, then checks that the hit lies on
    /// the same side of every edge. A hit on an edge or vertex (or on the
    /// line through an edge) is a miss.
    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<Point> {
        let p = match self.plane.intersect(ray, max_distance).first() {
            Some(p) => *p,
            None => return vec![],
        };

        let n = self.plane.normal().xyz();
        let size = self.vertices.len();
        let mut side = 0.0;

        for i in 0..size {
            let a = self.vertices[i].xyz();
            let b = self.vertices[(i + 1) % size].xyz();

            let s = align_zero((b - a).cross(&(p.xyz() - a)).dot(&n));
            if s == 0.0 {
                return vec![];
            }

            if side == 0.0 {
                side = s;
            } else if (s > 0.0) != (side > 0.0) {
                return vec![];
            }
        }

        vec![p]
    }
}

fn edge(from: &Point, to: &Point) -> Result<Vector> {
    to.subtract(from).map_err(|_| TracerError::geometry(
        "polygon has two identical consecutive vertices"
    ))
}

#[cfg(test)]
fn square() -> Polygon {
    Polygon::new(&[
        Point::new(-1.0, -1.0, 0.0),
        Point::new(1.0, -1.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
        Point::new(-1.0, 1.0, 0.0),
    ]).unwrap()
}

#[test]
fn too_few_vertices() {
    assert!(Polygon::new(&[Point::ZERO, Point::new(1.0, 0.0, 0.0)]).is_err());
}

#[test]
fn repeated_vertex_is_rejected() {
    let p = Polygon::new(&[
        Point::new(-1.0, -1.0, 0.0),
        Point::new(1.0, -1.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
    ]);

    assert!(p.is_err());
}

#[test]
fn non_planar_polygon_is_rejected() {
    let p = Polygon::new(&[
        Point::new(-1.0, -1.0, 0.0),
        Point::new(1.0, -1.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
        Point::new(-1.0, 1.0, 1.0),
    ]);

    assert!(matches!(p, Err(TracerError::InvalidGeometry(_))));
}

#[test]
fn concave_polygon_is_rejected() {
    let p = Polygon::new(&[
        Point::new(-1.0, -1.0, 0.0),
        Point::new(1.0, -1.0, 0.0),
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
        Point::new(-1.0, 1.0, 0.0),
    ]);

    assert!(p.is_err());
}

#[test]
fn collinear_vertices_are_rejected() {
    let p = Polygon::new(&[
        Point::new(-1.0, -1.0, 0.0),
        Point::new(0.0, -1.0, 0.0),
        Point::new(1.0, -1.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
    ]);

    assert!(p.is_err());
}

#[test]
fn ray_hits_square_inside() {
    let r = Ray::new(Point::new(0.5, 0.25, -2.0), Vector::Z);

    assert_eq!(square().intersect(&r, f64::INFINITY),
               vec![Point::new(0.5, 0.25, 0.0)]);
}

#[test]
fn ray_outside_square_misses() {
    let r = Ray::new(Point::new(2.0, 0.0, -2.0), Vector::Z);
    let s = Ray::new(Point::new(1.5, 1.5, -2.0), Vector::Z);

    assert!(square().intersect(&r, f64::INFINITY).is_empty());
    assert!(square().intersect(&s, f64::INFINITY).is_empty());
}

#[test]
fn edges_and_vertices_are_misses() {
    let on_edge = Ray::new(Point::new(1.0, 0.0, -2.0), Vector::Z);
    let on_vertex = Ray::new(Point::new(-1.0, 1.0, -2.0), Vector::Z);
    let on_edge_line = Ray::new(Point::new(1.0, 3.0, -2.0), Vector::Z);

    assert!(square().intersect(&on_edge, f64::INFINITY).is_empty());
    assert!(square().intersect(&on_vertex, f64::INFINITY).is_empty());
    assert!(square().intersect(&on_edge_line, f64::INFINITY).is_empty());
}
