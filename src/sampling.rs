use std::collections::HashMap;
use std::f64::consts::PI;

use rand::{ Rng, SeedableRng };
use rand::rngs::StdRng;
use serde::{ Serialize, Deserialize };

use crate::color::Color;
use crate::consts::{ DEFAULT_ADAPTIVE_DEPTH, DEFAULT_ADAPTIVE_THRESHOLD };

/// How a pixel is covered with rays.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMethod {
    /// One ray through the pixel center.
    Center,

    /// `level × level` evenly spaced rays.
    Grid,

    /// The grid, with every ray moved by a bounded random offset.
    Jittered,

    /// Corner rays, subdividing only where the corners disagree.
    Adaptive,
}

impl Default for SamplingMethod {
    fn default() -> SamplingMethod {
        SamplingMethod::Center
    }
}

/// Super-sampling settings for a render.
///
/// Sample positions are offsets within a pixel, measured in pixels from its
/// center, so every offset lies in `[-0.5, 0.5]` on both axes. `x` grows to
/// the right and `y` grows downwards, like pixel columns and rows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SamplingConfig {
    pub method: SamplingMethod,

    /// Rays per pixel side, for grid and jittered sampling.
    pub level: u32,

    /// Maximum subdivision depth for adaptive sampling; 1 never subdivides.
    pub adaptive_depth: u32,

    /// Largest corner color difference an adaptive region may keep.
    pub adaptive_threshold: f64,

    /// Jitter magnitude, as a fraction of one grid cell.
    pub jitter: f64,

    /// Seed for jitter and depth of field; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> SamplingConfig {
        SamplingConfig {
            method: SamplingMethod::Center,
            level: 1,
            adaptive_depth: DEFAULT_ADAPTIVE_DEPTH,
            adaptive_threshold: DEFAULT_ADAPTIVE_THRESHOLD,
            jitter: 1.0,
            seed: None,
        }
    }
}

impl SamplingConfig {
    /// The random number generator for one pixel.
    ///
    /// Seeded configurations derive a separate stream for every pixel, so a
    /// pixel gets the same samples no matter which thread renders it, or in
    /// which order.
    pub fn rng_for(&self, pixel_index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(
                seed ^ (pixel_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ),
            None => StdRng::from_entropy(),
        }
    }

    /// Whether sample positions depend on random numbers.
    pub fn is_random(&self) -> bool {
        self.method == SamplingMethod::Jittered
    }

    /// Sample offsets for the non-adaptive methods.
    ///
    /// Adaptive sampling decides its positions while tracing; here it falls
    /// back to the pixel center. Jittered sampling without a generator keeps
    /// the plain grid.
    pub fn offsets(&self, rng: Option<&mut StdRng>) -> Vec<(f64, f64)> {
        match (self.method, rng) {
            (SamplingMethod::Center, _) | (SamplingMethod::Adaptive, _) =>
                vec![(0.0, 0.0)],
            (SamplingMethod::Jittered, Some(rng)) =>
                jittered_offsets(self.level, self.jitter, rng),
            (SamplingMethod::Grid, _) | (SamplingMethod::Jittered, None) =>
                grid_offsets(self.level),
        }
    }
}

/// Centers of the cells of an `n × n` grid over the pixel, row by row.
pub fn grid_offsets(level: u32) -> Vec<(f64, f64)> {
    let n = level.max(1);
    let cell = 1.0 / n as f64;

    let mut offsets = Vec::with_capacity((n * n) as usize);
    for row in 0..n {
        for col in 0..n {
            offsets.push((
                (col as f64 + 0.5) * cell - 0.5,
                (row as f64 + 0.5) * cell - 0.5,
            ));
        }
    }

    offsets
}

/// Grid offsets, each moved by up to half a cell times `jitter`, kept inside
/// the pixel.
pub fn jittered_offsets(level: u32, jitter: f64, rng: &mut StdRng)
    -> Vec<(f64, f64)> {
    let cell = 1.0 / level.max(1) as f64;
    let spread = cell * jitter;

    grid_offsets(level).into_iter()
        .map(|(x, y)| {
            let dx = (rng.gen::<f64>() - 0.5) * spread;
            let dy = (rng.gen::<f64>() - 0.5) * spread;
            ((x + dx).clamp(-0.5, 0.5), (y + dy).clamp(-0.5, 0.5))
        })
        .collect()
}

/// Adaptively samples the pixel.
///
/// Traces the four corners of the pixel. If no two corner colors differ by
/// more than `threshold`, or `depth` runs out, the pixel is the mean of its
/// corners; otherwise it is the mean of its four quadrants, each sampled the
/// same way with one less level of depth. `sample` is called once per
/// distinct position: quadrants inherit their parent's corners, and
/// midpoints shared by neighbouring quadrants are remembered.
pub fn adaptive<F>(sample: &mut F, depth: u32, threshold: f64) -> Color
where
    F: FnMut(f64, f64) -> Color,
{
    // Positions are sums of powers of two, so their bits are exact keys.
    let key = |v: f64| (v + 0.0).to_bits();
    let mut traced: HashMap<(u64, u64), Color> = HashMap::new();
    let mut sample = |x: f64, y: f64| {
        *traced.entry((key(x), key(y))).or_insert_with(|| sample(x, y))
    };

    let corners = [
        sample(-0.5, -0.5),
        sample(0.5, -0.5),
        sample(-0.5, 0.5),
        sample(0.5, 0.5),
    ];

    adaptive_region(&mut sample, 0.0, 0.0, 0.5, corners, depth.max(1), threshold)
}

/// One square region of an adaptive pixel, given its already traced corners
/// in the order top left, top right, bottom left, bottom right.
fn adaptive_region<F>(sample: &mut F, cx: f64, cy: f64, half: f64,
    corners: [Color; 4], depth: u32, threshold: f64) -> Color
where
    F: FnMut(f64, f64) -> Color,
{
    let mut spread: f64 = 0.0;
    for i in 0..corners.len() {
        for j in (i + 1)..corners.len() {
            spread = spread.max(corners[i].difference(&corners[j]));
        }
    }

    if depth <= 1 || spread <= threshold {
        return Color::average(&corners);
    }

    let [top_left, top_right, bottom_left, bottom_right] = corners;
    let top = sample(cx, cy - half);
    let left = sample(cx - half, cy);
    let center = sample(cx, cy);
    let right = sample(cx + half, cy);
    let bottom = sample(cx, cy + half);

    let q = half / 2.0;
    let d = depth - 1;
    let quadrants = [
        adaptive_region(sample, cx - q, cy - q, q,
            [top_left, top, left, center], d, threshold),
        adaptive_region(sample, cx + q, cy - q, q,
            [top, top_right, center, right], d, threshold),
        adaptive_region(sample, cx - q, cy + q, q,
            [left, center, bottom_left, bottom], d, threshold),
        adaptive_region(sample, cx + q, cy + q, q,
            [center, right, bottom, bottom_right], d, threshold),
    ];

    Color::average(&quadrants)
}

/// Depth-of-field settings.
///
/// Rays start on a disk of radius `aperture` around the camera and all pass
/// through the point where the pinhole ray meets the focal plane, so only
/// geometry near that plane stays sharp.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DepthOfField {
    pub focal_distance: f64,
    pub aperture: f64,
    pub samples: u32,
}

impl DepthOfField {
    /// A uniformly distributed point on the aperture disk, as offsets along
    /// the camera's right and up vectors.
    pub fn disk_offset(&self, rng: &mut StdRng) -> (f64, f64) {
        let r = self.aperture * rng.gen::<f64>().sqrt();
        let theta = 2.0 * PI * rng.gen::<f64>();

        (r * theta.cos(), r * theta.sin())
    }
}

#[test]
fn grid_of_one_is_the_center() {
    assert_eq!(grid_offsets(1), vec![(0.0, 0.0)]);
}

#[test]
fn grid_offsets_are_evenly_spaced() {
    let g = grid_offsets(2);

    assert_eq!(g, vec![(-0.25, -0.25), (0.25, -0.25), (-0.25, 0.25), (0.25, 0.25)]);
    assert_eq!(grid_offsets(4).len(), 16);
}

#[test]
fn jitter_stays_inside_the_pixel() {
    let mut rng = StdRng::seed_from_u64(42);

    for (x, y) in jittered_offsets(3, 1.0, &mut rng) {
        assert!((-0.5..=0.5).contains(&x));
        assert!((-0.5..=0.5).contains(&y));
    }
}

#[test]
fn zero_jitter_is_the_grid() {
    let mut rng = StdRng::seed_from_u64(7);

    assert_eq!(jittered_offsets(3, 0.0, &mut rng), grid_offsets(3));
}

#[test]
fn seeded_pixels_repeat() {
    let config = SamplingConfig {
        method: SamplingMethod::Jittered,
        level: 2,
        seed: Some(1234),
        ..Default::default()
    };

    let a = config.offsets(Some(&mut config.rng_for(17)));
    let b = config.offsets(Some(&mut config.rng_for(17)));
    let c = config.offsets(Some(&mut config.rng_for(18)));

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn only_jitter_needs_random_numbers() {
    let mut config = SamplingConfig { level: 2, ..Default::default() };
    assert!(!config.is_random());
    assert_eq!(config.offsets(None), vec![(0.0, 0.0)]);

    config.method = SamplingMethod::Grid;
    assert!(!config.is_random());
    assert_eq!(config.offsets(None), grid_offsets(2));

    config.method = SamplingMethod::Jittered;
    assert!(config.is_random());
    assert_eq!(config.offsets(None), grid_offsets(2));
}

#[test]
fn flat_pixel_is_not_subdivided() {
    let mut calls = 0;
    let mut sample = |_x: f64, _y: f64| {
        calls += 1;
        Color::gray(100.0)
    };

    let c = adaptive(&mut sample, 4, 10.0);

    assert_eq!(c, Color::gray(100.0));
    assert_eq!(calls, 4);
}

#[test]
fn edges_are_subdivided() {
    // Left half black, right half white.
    let mut calls = 0;
    let mut sample = |x: f64, _y: f64| {
        calls += 1;
        if x < 0.0 { Color::BLACK } else { Color::WHITE }
    };

    let c = adaptive(&mut sample, 2, 10.0);

    // Corners, then the center and four edge midpoints.
    assert_eq!(calls, 9);
    assert!(c.r > 0.0 && c.r < 255.0);
}

#[test]
fn subdivision_traces_each_point_once() {
    let mut traced: Vec<(f64, f64)> = Vec::new();
    let mut sample = |x: f64, y: f64| {
        traced.push((x, y));
        if x < 0.0 { Color::BLACK } else { Color::WHITE }
    };

    adaptive(&mut sample, 3, 10.0);

    // Only the two left quadrants straddle the edge and subdivide again,
    // sharing one midpoint.
    assert_eq!(traced.len(), 9 + 5 + 4);
    for (i, a) in traced.iter().enumerate() {
        for b in traced.iter().skip(i + 1) {
            assert!(a != b, "{:?} traced twice", a);
        }
    }
}

#[test]
fn disk_offsets_stay_inside_aperture() {
    let dof = DepthOfField { focal_distance: 10.0, aperture: 0.5, samples: 8 };
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..100 {
        let (x, y) = dof.disk_offset(&mut rng);
        assert!(x * x + y * y <= 0.25 + 1e-12);
    }
}
