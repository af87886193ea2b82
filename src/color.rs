use std::ops::{ Add, Sub, Mul, Div };

use crate::feq;
use crate::tuple::Tuple3D;

/// A color.
///
/// Represented with red-green-blue (RGB) values on a 0 to 255 scale. Values
/// above 255 are allowed while shading (light intensities routinely exceed
/// it); the canvas clamps when writing an image.
///
/// # Examples
///
/// Blend two colors:
///
/// ```
/// # use phong_tracer::color::Color;
/// let green = Color::rgb(0.0, 255.0, 0.0);
/// let blue = Color::rgb(0.0, 0.0, 255.0);
/// let blend = Color::average(&[green, blue]);
/// assert_eq!(blend, Color::rgb(0.0, 127.5, 127.5));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialOrd)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Similar to the `PartialEq` implementation on `Tuple3D`, `Color`s are
/// compared component-wise, accounting for possible floating point error in
/// comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

/// Conversion from a slice to a `Color`.
///
/// Takes the first three elements of the slice as `r`, `g` and `b`. Missing
/// elements default to zero.
impl From<&[f64]> for Color {
    fn from(v: &[f64]) -> Color {
        match v.len() {
            0 => Default::default(),
            1 => Color { r: v[0], ..Default::default() },
            2 => Color { r: v[0], g: v[1], ..Default::default() },
            _ => Color { r: v[0], g: v[1], b: v[2] }
        }
    }
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 255.0, g: 255.0, b: 255.0 };

    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// Creates a gray with the same value in every channel.
    pub fn gray(v: f64) -> Color {
        Color { r: v, g: v, b: v }
    }

    /// Whether every channel is exactly zero.
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Scales each channel by the matching coefficient.
    pub fn scale(&self, k: &Tuple3D) -> Color {
        Color {
            r: self.r * k.x,
            g: self.g * k.y,
            b: self.b * k.z,
        }
    }

    /// Averages a list of colors. An empty list averages to black.
    pub fn average(colors: &[Color]) -> Color {
        if colors.is_empty() {
            return Color::BLACK;
        }

        let sum = colors.iter().fold(Color::BLACK, |acc, c| acc + *c);
        sum / colors.len() as f64
    }

    /// Perceptual distance between two colors.
    ///
    /// Uses the "redmean" weighted Euclidean distance, which tracks human
    /// perception much better than plain RGB distance at negligible cost.
    /// Channels are clamped to the displayable range first, so two colors
    /// which both saturate compare as equal.
    pub fn difference(&self, other: &Color) -> f64 {
        let a = self.clamped();
        let b = other.clamped();

        let mean_r = (a.r + b.r) / 2.0;
        let dr = a.r - b.r;
        let dg = a.g - b.g;
        let db = a.b - b.b;

        ((2.0 + mean_r / 256.0) * dr * dr
            + 4.0 * dg * dg
            + (2.0 + (255.0 - mean_r) / 256.0) * db * db).sqrt()
    }

    /// The color with every channel clamped to `[0, 255]`.
    pub fn clamped(&self) -> Color {
        Color {
            r: self.r.clamp(0.0, 255.0),
            g: self.g.clamp(0.0, 255.0),
            b: self.b.clamp(0.0, 255.0),
        }
    }
}

/// Adds two colors together.
///
/// Components are added together individually.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

/// Subtracts one color from another.
impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

/// Multiplies a color by a scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/// Multiplies a scalar by a color.
impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        other * self
    }
}

/// Scales a color by per-channel coefficients.
///
/// Shorthand for `Color::scale`.
impl Mul<Tuple3D> for Color {
    type Output = Color;

    fn mul(self, other: Tuple3D) -> Self::Output {
        self.scale(&other)
    }
}

/// Divides each channel by a scalar.
impl Div<f64> for Color {
    type Output = Color;

    fn div(self, other: f64) -> Self::Output {
        Color {
            r: self.r / other,
            g: self.g / other,
            b: self.b / other,
        }
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 1.6, g: 0.7, b: 1.0 };

    assert_eq!(c1 + c2, c3);
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 0.2, g: 0.5, b: 0.5 };

    assert_eq!(c1 - c2, c3);
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(0.2, 0.3, 0.4);
    let c2 = Color { r: 0.4, g: 0.6, b: 0.8 };

    assert_eq!(c1 * 2.0, c2);
    assert_eq!(c2 / 2.0, c1);
}

#[test]
fn scale_by_coefficients() {
    let c = Color::rgb(100.0, 100.0, 100.0);
    let k = Tuple3D::new(0.5, 0.25, 0.0);

    assert_eq!(c * k, Color::rgb(50.0, 25.0, 0.0));
}

#[test]
fn average_of_nothing_is_black() {
    assert!(Color::average(&[]).is_black());
}

#[test]
fn difference_is_symmetric_and_zero_on_equal() {
    let a = Color::rgb(10.0, 200.0, 30.0);
    let b = Color::rgb(90.0, 20.0, 130.0);

    assert_eq!(a.difference(&a), 0.0);
    assert!(feq(a.difference(&b), b.difference(&a)));
    assert!(a.difference(&b) > 0.0);
}

#[test]
fn difference_ignores_overexposure() {
    let a = Color::rgb(300.0, 300.0, 300.0);
    let b = Color::rgb(900.0, 256.0, 1000.0);

    assert_eq!(a.difference(&b), 0.0);
}
