#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_panics_doc,
    clippy::cast_lossless,
    clippy::cast_precision_loss
)]
//! Time difference of arrival estimation via generalized cross-correlation.
//!
//! [`estimate`] computes the delay between two signals with one of the
//! [`Weighting`] kernels, [`Bearing`] turns the delays between the channels
//! of a uniform linear microphone array into the bearing of a single source.
//!
//! ```
//! use gcc_tdoa::{estimate, Weighting};
//!
//! let a = [0., 1., 0.5, -0.25, 0., 0., 0., 0.];
//! let b = [0., 0., 0., 1., 0.5, -0.25, 0., 0.];
//! let estimate = estimate(&a, &b, 8., Weighting::Phat).unwrap();
//! assert_eq!(estimate.delay_samples(), 2);
//! assert_eq!(estimate.tdoa, 0.25);
//! ```
use num::Complex;

mod bearing;
pub use bearing::{Bearing, BearingConfig, BearingEstimate, PairEstimate};
mod error;
pub use error::{Error, Result};
pub mod gcc;
pub use gcc::{estimate, estimate_named, Estimate, GccConfig};
pub mod geometry;
pub use geometry::{InvalidPairs, LinearArray, MicPair, PairSelection};
pub mod medium;
pub use medium::{speed_of_sound, Medium};
mod recording;
pub use recording::{PcmFormat, Recording};
pub mod weighting;
pub use weighting::{Weighting, Weights};
mod utils;

pub type F = f64;
pub type C = Complex<F>;
