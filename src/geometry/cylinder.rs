use crate::{ align_zero, is_zero };
use crate::error::{ Result, TracerError };
use crate::ray::Ray;
use crate::tuple::{ Point, Vector };

use super::{ in_range, Plane, Tube };

/// A finite, closed cylinder.
///
/// The tube around `axis` cut between the axis origin (the base) and
/// `height` along the axis (the top), with both ends closed by flat caps.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    tube: Tube,
    height: f64,
    base: Plane,
    top: Plane,
}

impl Cylinder {
    pub fn new(axis: Ray, radius: f64, height: f64) -> Result<Cylinder> {
        if !(height > 0.0) {
            return Err(TracerError::geometry(
                format!("cylinder height {} must be positive", height)
            ));
        }

        let tube = Tube::new(axis, radius)?;
        let base = Plane::new(axis.origin, axis.direction);
        let top = Plane::new(axis.point_at(height), axis.direction);

        Ok(Cylinder { tube, height, base, top })
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn radius(&self) -> f64 {
        self.tube.radius()
    }

    /// The outward normal: the axis direction on the caps, radial elsewhere.
    pub fn normal_at(&self, p: &Point) -> Result<Vector> {
        let t = self.tube.axial_offset(p);
        let direction = self.tube.axis().direction;

        if is_zero(t) {
            Ok(-direction)
        } else if is_zero(t - self.height) {
            Ok(direction)
        } else {
            self.tube.normal_at(p)
        }
    }

    /// Intersects a ray with the side and both caps.
    ///
    /// Side hits count only strictly between the caps; cap hits count only
    /// strictly inside the rim. Hits are ordered by distance.
    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<Point> {
        let mut hits: Vec<Point> = self.tube.distances(ray).into_iter()
            .filter(|&t| in_range(t, max_distance))
            .map(|t| ray.point_at(t))
            .filter(|p| {
                let s = self.tube.axial_offset(p);
                s > 0.0 && align_zero(s - self.height) < 0.0
            })
            .collect();

        let r2 = self.radius() * self.radius();
        for cap in &[&self.base, &self.top] {
            let center = cap.point();
            hits.extend(cap.intersect(ray, max_distance).into_iter()
                .filter(|p| align_zero(p.distance_squared(&center) - r2) < 0.0));
        }

        hits.sort_by(|a, b| {
            ray.origin.distance_squared(a)
                .partial_cmp(&ray.origin.distance_squared(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits
    }
}

#[cfg(test)]
fn y_cylinder() -> Cylinder {
    Cylinder::new(Ray::new(Point::ZERO, Vector::Y), 1.0, 2.0).unwrap()
}

#[test]
fn invalid_cylinders_are_rejected() {
    let axis = Ray::new(Point::ZERO, Vector::Y);

    assert!(Cylinder::new(axis, 1.0, 0.0).is_err());
    assert!(Cylinder::new(axis, 0.0, 1.0).is_err());
}

#[test]
fn ray_crosses_side() {
    let r = Ray::new(Point::new(-3.0, 1.0, 0.0), Vector::X);

    assert_eq!(y_cylinder().intersect(&r, f64::INFINITY), vec![
        Point::new(-1.0, 1.0, 0.0),
        Point::new(1.0, 1.0, 0.0),
    ]);
}

#[test]
fn ray_above_cylinder_misses() {
    let r = Ray::new(Point::new(-3.0, 3.0, 0.0), Vector::X);

    assert!(y_cylinder().intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn ray_along_axis_hits_both_caps() {
    let r = Ray::new(Point::new(0.5, -1.0, 0.0), Vector::Y);

    assert_eq!(y_cylinder().intersect(&r, f64::INFINITY), vec![
        Point::new(0.5, 0.0, 0.0),
        Point::new(0.5, 2.0, 0.0),
    ]);
}

#[test]
fn ray_through_side_and_cap() {
    let r = Ray::new(
        Point::new(-2.0, 0.5, 0.0),
        Vector::new(1.0, 1.0, 0.0).unwrap()
    );
    let hits = y_cylinder().intersect(&r, f64::INFINITY);

    assert_eq!(hits, vec![Point::new(-1.0, 1.5, 0.0), Point::new(-0.5, 2.0, 0.0)]);
}

#[test]
fn rim_is_not_hit() {
    let r = Ray::new(Point::new(1.0, -1.0, 0.0), Vector::Y);

    assert!(y_cylinder().intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn cylinder_normals() {
    let c = y_cylinder();

    assert_eq!(c.normal_at(&Point::new(0.5, 0.0, 0.0)).unwrap(), -Vector::Y);
    assert_eq!(c.normal_at(&Point::new(0.0, 2.0, 0.5)).unwrap(), Vector::Y);
    assert_eq!(c.normal_at(&Point::new(0.0, 1.0, -1.0)).unwrap(), -Vector::Z);
}
