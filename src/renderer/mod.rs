mod machinery;
mod worker;

pub use machinery::{RenderProgress, render};

use crate::integrator::PathTracer;

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    pub tile_size: std::num::NonZeroU32,
    pub sample_count: std::num::NonZeroU32,
    /// Base seed of the per-tile random generators; renders with the same
    /// seed are bit-identical regardless of thread scheduling.
    pub seed: u64,
    pub tracer: PathTracer,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            tile_size: 32.try_into().expect("non-zero"),
            sample_count: 16.try_into().expect("non-zero"),
            seed: 0,
            tracer: PathTracer::default(),
        }
    }
}
