pub mod consts;
pub mod error;

pub mod tuple;
pub mod ray;
pub mod color;
pub mod material;
pub mod light;

pub mod geometry;
pub mod intersect;
pub mod geometries;
pub mod scene;
pub mod tracer;

pub mod sampling;
pub mod parallel;
pub mod camera;
pub mod canvas;

pub use error::{ TracerError, Result };

use consts::{ ALIGN_EPSILON, FEQ_EPSILON };

/// Loose equality used by tests and `PartialEq` on tuples and colors.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}

/// Checks whether a value is close enough to zero to branch on as zero.
pub fn is_zero(value: f64) -> bool {
    value.abs() < ALIGN_EPSILON
}

/// Snaps values within `ALIGN_EPSILON` of zero to exactly zero.
///
/// Every sign test in the intersection and shading code runs through this
/// first, so floating point noise never decides which side of a surface a
/// point is on.
pub fn align_zero(value: f64) -> f64 {
    if is_zero(value) { 0.0 } else { value }
}

#[test]
fn align_zero_snaps_noise() {
    assert_eq!(align_zero(1e-12), 0.0);
    assert_eq!(align_zero(-1e-12), 0.0);
    assert_eq!(align_zero(0.5), 0.5);
    assert!(is_zero(-5e-11));
    assert!(!is_zero(1e-9));
}
