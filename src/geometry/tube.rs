use crate::align_zero;
use crate::error::{ Result, TracerError };
use crate::ray::Ray;
use crate::tuple::{ Point, Vector };

use super::in_range;

/// An infinitely long tube of `radius` around the `axis` line.
#[derive(Debug, Clone, PartialEq)]
pub struct Tube {
    axis: Ray,
    radius: f64,
}

impl Tube {
    pub fn new(axis: Ray, radius: f64) -> Result<Tube> {
        if !(radius > 0.0) {
            return Err(TracerError::geometry(
                format!("tube radius {} must be positive", radius)
            ));
        }

        Ok(Tube { axis, radius })
    }

    pub fn axis(&self) -> &Ray {
        &self.axis
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// How far along the axis `p` projects, from the axis origin.
    pub(crate) fn axial_offset(&self, p: &Point) -> f64 {
        let v = p.xyz() - self.axis.origin.xyz();
        align_zero(self.axis.direction.xyz().dot(&v))
    }

    /// The outward normal: from the projection of `p` onto the axis, to `p`.
    ///
    /// Undefined for points on the axis.
    pub fn normal_at(&self, p: &Point) -> Result<Vector> {
        let o = self.axis.point_at(self.axial_offset(p));
        Ok(p.subtract(&o)?.normalize())
    }

    /// Ray distances to the tube surface, nearest first.
    ///
    /// Solves `|v⊥|²t² + 2(v⊥·Δp⊥)t + |Δp⊥|² - r² = 0`, where `⊥` drops the
    /// component along the axis and `Δp` runs from the axis origin to the ray
    /// origin. Rays parallel to the axis and rays grazing the tube have no
    /// distances. Negative distances are kept; callers filter.
    pub(crate) fn distances(&self, ray: &Ray) -> Vec<f64> {
        let d = self.axis.direction.xyz();
        let v = ray.direction.xyz();
        let dp = ray.origin.xyz() - self.axis.origin.xyz();

        let v_perp = v - d * v.dot(&d);
        let dp_perp = dp - d * dp.dot(&d);

        let a = align_zero(v_perp.length_squared());
        if a == 0.0 {
            return vec![];
        }

        let b = 2.0 * v_perp.dot(&dp_perp);
        let c = dp_perp.length_squared() - self.radius * self.radius;

        let disc = align_zero(b * b - 4.0 * a * c);
        if disc <= 0.0 {
            return vec![];
        }

        let root = disc.sqrt();
        vec![
            align_zero((-b - root) / (2.0 * a)),
            align_zero((-b + root) / (2.0 * a)),
        ]
    }

    pub fn intersect(&self, ray: &Ray, max_distance: f64) -> Vec<Point> {
        self.distances(ray).into_iter()
            .filter(|&t| in_range(t, max_distance))
            .map(|t| ray.point_at(t))
            .collect()
    }
}

#[cfg(test)]
fn y_tube() -> Tube {
    Tube::new(Ray::new(Point::ZERO, Vector::Y), 1.0).unwrap()
}

#[test]
fn ray_crosses_tube() {
    let r = Ray::new(Point::new(-3.0, 5.0, 0.0), Vector::X);

    assert_eq!(y_tube().intersect(&r, f64::INFINITY), vec![
        Point::new(-1.0, 5.0, 0.0),
        Point::new(1.0, 5.0, 0.0),
    ]);
}

#[test]
fn ray_along_axis_misses_tube() {
    let r = Ray::new(Point::new(0.5, -3.0, 0.0), Vector::Y);

    assert!(y_tube().intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn tangent_ray_misses_tube() {
    let r = Ray::new(Point::new(-3.0, 0.0, 1.0), Vector::X);

    assert!(y_tube().intersect(&r, f64::INFINITY).is_empty());
}

#[test]
fn ray_inside_tube_hits_once() {
    let r = Ray::new(Point::new(0.0, 2.0, 0.0), -Vector::Z);

    assert_eq!(y_tube().intersect(&r, f64::INFINITY),
               vec![Point::new(0.0, 2.0, -1.0)]);
}

#[test]
fn tube_normal_is_radial() {
    let t = y_tube();

    assert_eq!(t.normal_at(&Point::new(0.0, -4.0, 1.0)).unwrap(), Vector::Z);
    assert_eq!(t.normal_at(&Point::new(-1.0, 7.0, 0.0)).unwrap(), -Vector::X);
    assert!(t.normal_at(&Point::new(0.0, 3.0, 0.0)).is_err());
}
