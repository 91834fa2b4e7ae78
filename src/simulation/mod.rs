//! Deterministic synthetic signals
//!
//! Sums of tones and seeded Gaussian noise, used by the tests, the benchmark
//! and `tdsim`. The same arguments (and seed) give bit-identical samples.

pub mod noise;
pub mod tones;

pub use noise::{add_noise, rms_power, white_noise};
pub use tones::{am_tone, synthesize, Tone};
