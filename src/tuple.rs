use std::ops::{ Add, Sub, Neg, Mul };

use crate::feq;
use crate::error::{ Result, TracerError };

/// A raw triple of numbers.
///
/// Used as the unchecked backing store for `Point` and `Vector`, and on its
/// own as a three-channel multiplier (material coefficients, light
/// attenuation of each color channel).
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Tuple3D {
    pub x: f64,
    pub y: f64,
    pub z: f64
}

impl PartialEq for Tuple3D {
    fn eq(&self, other: &Tuple3D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z)
    }
}

impl Tuple3D {
    pub const ZERO: Tuple3D = Tuple3D { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Tuple3D = Tuple3D { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Tuple3D {
        Tuple3D { x, y, z }
    }

    /// Creates a triple with the same value in every component.
    pub fn uniform(k: f64) -> Tuple3D {
        Tuple3D { x: k, y: k, z: k }
    }

    pub fn dot(&self, other: &Tuple3D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
    }

    pub fn cross(&self, other: &Tuple3D) -> Tuple3D {
        Tuple3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Component-wise product.
    pub fn product(&self, other: &Tuple3D) -> Tuple3D {
        Tuple3D {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    /// Checks whether every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl Add for Tuple3D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z
        }
    }
}

impl Sub for Tuple3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z
        }
    }
}

impl Neg for Tuple3D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z
        }
    }
}

/// Implements scalar right-multiplication for a 3D tuple.
impl Mul<f64> for Tuple3D {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self {
            x: self.x * other,
            y: self.y * other,
            z: self.z * other
        }
    }
}

/// Implements scalar left-multiplication for a 3D tuple.
impl Mul<Tuple3D> for f64 {
    type Output = Tuple3D;

    fn mul(self, other: Tuple3D) -> Tuple3D {
        other * self
    }
}

/// A location in space.
///
/// Points can be moved by a `Vector` (`point + vector`), and subtracting two
/// points yields the `Vector` between them, which fails if the points are the
/// same.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point(Tuple3D);

impl Point {
    pub const ZERO: Point = Point(Tuple3D::ZERO);

    pub fn new(x: f64, y: f64, z: f64) -> Point {
        Point(Tuple3D { x, y, z })
    }

    pub fn x(&self) -> f64 { self.0.x }
    pub fn y(&self) -> f64 { self.0.y }
    pub fn z(&self) -> f64 { self.0.z }

    /// The raw coordinates of this point.
    pub fn xyz(&self) -> Tuple3D {
        self.0
    }

    /// Returns the vector pointing from `other` to `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use phong_tracer::tuple::{ Point, Vector };
    /// let a = Point::new(3.0, 2.0, 1.0);
    /// let b = Point::new(5.0, 6.0, 7.0);
    /// assert_eq!(a.subtract(&b).unwrap(), Vector::new(-2.0, -4.0, -6.0).unwrap());
    /// assert!(a.subtract(&a).is_err());
    /// ```
    pub fn subtract(&self, other: &Point) -> Result<Vector> {
        Vector::from_tuple(self.0 - other.0)
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        (self.0 - other.0).length_squared()
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl From<Tuple3D> for Point {
    fn from(t: Tuple3D) -> Point {
        Point(t)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, v: Vector) -> Point {
        Point(self.0 + v.0)
    }
}

/// A direction with non-zero length.
///
/// Every constructor and every operation which could produce a zero-length
/// result returns a `Result`; holding a `Vector` therefore guarantees
/// `normalize` is well defined.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vector(Tuple3D);

impl Vector {
    pub const X: Vector = Vector(Tuple3D { x: 1.0, y: 0.0, z: 0.0 });
    pub const Y: Vector = Vector(Tuple3D { x: 0.0, y: 1.0, z: 0.0 });
    pub const Z: Vector = Vector(Tuple3D { x: 0.0, y: 0.0, z: 1.0 });

    pub fn new(x: f64, y: f64, z: f64) -> Result<Vector> {
        Vector::from_tuple(Tuple3D { x, y, z })
    }

    pub fn from_tuple(t: Tuple3D) -> Result<Vector> {
        if t.is_zero() {
            Err(TracerError::ZeroVector)
        } else {
            Ok(Vector(t))
        }
    }

    pub fn x(&self) -> f64 { self.0.x }
    pub fn y(&self) -> f64 { self.0.y }
    pub fn z(&self) -> f64 { self.0.z }

    /// The raw components of this vector.
    pub fn xyz(&self) -> Tuple3D {
        self.0
    }

    pub fn add(&self, other: &Vector) -> Result<Vector> {
        Vector::from_tuple(self.0 + other.0)
    }

    pub fn subtract(&self, other: &Vector) -> Result<Vector> {
        Vector::from_tuple(self.0 - other.0)
    }

    /// Scales the vector; scaling by zero is rejected.
    pub fn scale(&self, k: f64) -> Result<Vector> {
        Vector::from_tuple(self.0 * k)
    }

    /// Scales by a factor the caller already knows is non-zero.
    ///
    /// A zero factor leaves the vector unchanged instead of breaking the
    /// non-zero invariant.
    pub(crate) fn scale_unchecked(&self, k: f64) -> Vector {
        if k == 0.0 { *self } else { Vector(self.0 * k) }
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.0.dot(&other.0)
    }

    /// Cross product; parallel vectors are rejected.
    pub fn cross(&self, other: &Vector) -> Result<Vector> {
        Vector::from_tuple(self.0.cross(&other.0))
    }

    pub fn length_squared(&self) -> f64 {
        self.0.length_squared()
    }

    pub fn length(&self) -> f64 {
        self.0.length()
    }

    pub fn normalize(&self) -> Vector {
        Vector(self.0 * (1.0 / self.length()))
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector(-self.0)
    }
}

/* Tests */

#[test]
fn add_tuples() {
    let a1 = Tuple3D::new(3.0, -2.0, 5.0);
    let a2 = Tuple3D::new(-2.0, 3.0, 1.0);

    assert_eq!(a1 + a2, Tuple3D::new(1.0, 1.0, 6.0));
}

#[test]
fn neg_tuple() {
    let a = Tuple3D::new(1.0, -2.0, 3.0);

    assert_eq!(-a, Tuple3D::new(-1.0, 2.0, -3.0));
}

#[test]
fn mul_scalar() {
    let a = Tuple3D::new(1.0, -2.0, 3.0);

    assert_eq!(a * 3.5, Tuple3D::new(3.5, -7.0, 10.5));
    assert_eq!(0.5 * a, Tuple3D::new(0.5, -1.0, 1.5));
}

#[test]
fn tuple_product() {
    let a = Tuple3D::new(1.0, 2.0, 3.0);
    let b = Tuple3D::new(0.5, 0.0, 2.0);

    assert_eq!(a.product(&b), Tuple3D::new(0.5, 0.0, 6.0));
}

#[test]
fn sub_points() {
    let p1 = Point::new(3.0, 2.0, 1.0);
    let p2 = Point::new(5.0, 6.0, 7.0);

    assert_eq!(p1.subtract(&p2).unwrap(), Vector::new(-2.0, -4.0, -6.0).unwrap());
}

#[test]
fn sub_same_point_fails() {
    let p = Point::new(1.0, 2.0, 3.0);

    assert!(matches!(p.subtract(&p), Err(TracerError::ZeroVector)));
}

#[test]
fn move_point_by_vector() {
    let p = Point::new(3.0, 2.0, 1.0);
    let v = Vector::new(5.0, 6.0, 7.0).unwrap();

    assert_eq!(p + v, Point::new(8.0, 8.0, 8.0));
}

#[test]
fn zero_vector_is_rejected() {
    assert!(Vector::new(0.0, 0.0, 0.0).is_err());
    assert!(Vector::X.scale(0.0).is_err());
    assert!(Vector::X.subtract(&Vector::X).is_err());
    assert!(Vector::X.add(&-Vector::X).is_err());
}

#[test]
fn magnitude() {
    let v = Vector::new(-1.0, -2.0, -3.0).unwrap();

    assert_eq!(v.length(), f64::sqrt(14.0));
    assert_eq!(v.length_squared(), 14.0);
}

#[test]
fn normalize_dirty() {
    let v = Vector::new(1.0, 2.0, 3.0).unwrap();
    let e = Vector::new(
        1.0 / f64::sqrt(14.0),
        2.0 / f64::sqrt(14.0),
        3.0 / f64::sqrt(14.0)
    ).unwrap();

    assert_eq!(v.normalize(), e);
    assert!(crate::feq(v.normalize().length(), 1.0));
}

#[test]
fn dot_vectors() {
    let a = Vector::new(1.0, 2.0, 3.0).unwrap();
    let b = Vector::new(2.0, 3.0, 4.0).unwrap();

    assert_eq!(a.dot(&b), 20.0);
}

#[test]
fn cross_vectors() {
    let a = Vector::new(1.0, 2.0, 3.0).unwrap();
    let b = Vector::new(2.0, 3.0, 4.0).unwrap();

    assert_eq!(a.cross(&b).unwrap(), Vector::new(-1.0, 2.0, -1.0).unwrap());
    assert_eq!(b.cross(&a).unwrap(), Vector::new(1.0, -2.0, 1.0).unwrap());
}

#[test]
fn cross_parallel_vectors_fails() {
    let a = Vector::new(1.0, 2.0, 3.0).unwrap();
    let b = Vector::new(-2.0, -4.0, -6.0).unwrap();

    assert!(a.cross(&b).is_err());
}

#[test]
fn point_distance() {
    let a = Point::new(1.0, 2.0, 3.0);
    let b = Point::new(1.0, 6.0, 6.0);

    assert_eq!(a.distance_squared(&b), 25.0);
    assert_eq!(a.distance(&b), 5.0);
}
