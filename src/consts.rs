// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

/// Values smaller than this are treated as exactly zero when branching.
pub const ALIGN_EPSILON: f64 = 1e-10;

/// How far secondary rays are pushed off a surface along its normal.
pub const DELTA: f64 = 0.1;

// Camera defaults
pub const DEFAULT_ADAPTIVE_DEPTH: u32 = 3;
pub const DEFAULT_ADAPTIVE_THRESHOLD: f64 = 10.0;
pub const DEFAULT_DOF_SAMPLES: u32 = 16;

/// Cores left free when the thread count is chosen automatically.
pub const SPARE_THREADS: usize = 2;

// Runtime defaults for the command line
pub const OUT_FILE: &str = "out.ppm";
