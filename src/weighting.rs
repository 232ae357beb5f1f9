//! Spectral weighting kernels of the generalized cross-correlation.
//!
//! Each kernel maps the spectra of two signals to one real weight per
//! frequency bin, which is multiplied onto the raw cross-power spectrum
//! `X1 * conj(X2)` before the inverse transform.
//!
//! ref. : C. Knapp, G. Carter, "The generalized cross-correlation method for
//! estimation of time delay", IEEE Transactions on Acoustics, Speech and
//! Signal Processing, 24(4):320-327, 1976.
#![allow(clippy::module_name_repetitions)]
use std::str::FromStr;

use derive_more::Display;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::{Error, C, F};

/// Added to every kernel denominator, keeps the weighted spectrum finite.
pub const EPSILON: F = 1e-10;

/// Selects the weighting kernel used by the estimator.
#[derive(Clone, Copy, Debug, Default, Display, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Phase transform, see [`phat`].
    #[default]
    #[display(fmt = "phat")]
    Phat,
    /// See [`roth`].
    #[display(fmt = "roth")]
    Roth,
    /// Smoothed coherence transform, see [`scot`].
    #[display(fmt = "scot")]
    Scot,
    /// Maximum likelihood, see [`mle`].
    #[display(fmt = "mle")]
    Mle,
    /// Classic cross-correlation, see [`none`].
    #[serde(rename = "none")]
    #[display(fmt = "none")]
    Unweighted,
}

impl FromStr for Weighting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "phat" => Self::Phat,
            "roth" => Self::Roth,
            "scot" => Self::Scot,
            "mle" => Self::Mle,
            "none" => Self::Unweighted,
            _ => {
                return Err(Error::UnknownWeighting {
                    name: s.to_owned(),
                    valid: Self::tokens(),
                })
            }
        })
    }
}

impl Weighting {
    pub const ALL: [Weighting; 5] = [
        Weighting::Phat,
        Weighting::Roth,
        Weighting::Scot,
        Weighting::Mle,
        Weighting::Unweighted,
    ];

    /// Names accepted by [`Weighting::from_str`].
    #[must_use]
    pub fn tokens() -> Vec<&'static str> {
        Self::ALL.iter().map(|w| w.token()).collect()
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Weighting::Phat => "phat",
            Weighting::Roth => "roth",
            Weighting::Scot => "scot",
            Weighting::Mle => "mle",
            Weighting::Unweighted => "none",
        }
    }

    /// Computes the weights for the spectra `x1` and `x2`.
    ///
    /// Always takes both spectra, kernels that need fewer ignore the rest.
    ///
    /// # Panics
    /// If `x1` and `x2` differ in length.
    #[must_use]
    pub fn weights(self, x1: ArrayView1<C>, x2: ArrayView1<C>) -> Weights {
        match self {
            Weighting::Phat => Weights::PerBin(phat(x1, x2)),
            Weighting::Roth => Weights::PerBin(roth(x1)),
            Weighting::Scot => Weights::PerBin(scot(x1, x2)),
            Weighting::Mle => Weights::PerBin(mle(x1, x2)),
            Weighting::Unweighted => Weights::Constant(none()),
        }
    }
}

/// Output of a weighting kernel.
#[derive(Clone, Debug, PartialEq)]
pub enum Weights {
    /// Same weight for every bin.
    Constant(F),
    PerBin(Array1<F>),
}

impl Weights {
    /// Multiplies the weights onto `cross` in place.
    ///
    /// # Panics
    /// If per bin weights do not match the length of `cross`.
    pub fn apply(&self, cross: &mut Array1<C>) {
        match self {
            Weights::Constant(w) => {
                let w = *w;
                cross.mapv_inplace(|c| c * w);
            }
            Weights::PerBin(w) => {
                assert_eq!(w.len(), cross.len(), "one weight per bin");
                cross.zip_mut_with(w, |c, &w| *c *= w);
            }
        }
    }
}

fn assert_same_len(x1: ArrayView1<C>, x2: ArrayView1<C>) {
    assert_eq!(
        x1.len(),
        x2.len(),
        "spectra need to have the same number of bins"
    );
}

/// `sqrt(|X1 conj(X1) X2 conj(X2)|)`, the geometric mean of both auto-power
/// spectra.
fn auto_power_mean(a: C, b: C) -> F {
    (a.norm_sqr() * b.norm_sqr()).sqrt()
}

/// PHAT: `1 / (|X1 conj(X2)| + eps)`.
///
/// Whitens the cross-power spectrum, only the phase is left. Robust against
/// gain mismatch between the channels and broadband noise.
///
/// # Panics
/// If `x1` and `x2` differ in length.
#[must_use]
pub fn phat(x1: ArrayView1<C>, x2: ArrayView1<C>) -> Array1<F> {
    assert_same_len(x1, x2);
    x1.iter()
        .zip(x2.iter())
        .map(|(a, b)| 1. / ((a * b.conj()).norm() + EPSILON))
        .collect()
}

/// Roth: `1 / (|X1 conj(X1)| + eps)`.
///
/// Normalizes by the power of the first signal only.
#[must_use]
pub fn roth(x1: ArrayView1<C>) -> Array1<F> {
    x1.mapv(|a| 1. / (a.norm_sqr() + EPSILON))
}

/// SCOT: `1 / (sqrt(|X1 conj(X1) X2 conj(X2)|) + eps)`.
///
/// Symmetric version of [`roth`].
///
/// # Panics
/// If `x1` and `x2` differ in length.
#[must_use]
pub fn scot(x1: ArrayView1<C>, x2: ArrayView1<C>) -> Array1<F> {
    assert_same_len(x1, x2);
    x1.iter()
        .zip(x2.iter())
        .map(|(&a, &b)| 1. / (auto_power_mean(a, b) + EPSILON))
        .collect()
}

/// Coherence `X1 conj(X2) / (sqrt(X1 conj(X1) X2 conj(X2)) + eps)`.
///
/// # Panics
/// If `x1` and `x2` differ in length.
#[must_use]
pub fn coherence(x1: ArrayView1<C>, x2: ArrayView1<C>) -> Array1<C> {
    assert_same_len(x1, x2);
    x1.iter()
        .zip(x2.iter())
        .map(|(&a, &b)| a * b.conj() / (auto_power_mean(a, b) + EPSILON))
        .collect()
}

/// Maximum likelihood: `|g|^2 / (|S| |1 - |g|^2| + eps)` with `g` the
/// [`coherence`] and `S = X1 conj(X2)`.
///
/// For a single observation window `|g|` is close to one in every bin, the
/// epsilon keeps the weight finite there.
///
/// # Panics
/// If `x1` and `x2` differ in length.
#[must_use]
pub fn mle(x1: ArrayView1<C>, x2: ArrayView1<C>) -> Array1<F> {
    let gamma = coherence(x1, x2);
    x1.iter()
        .zip(x2.iter())
        .zip(gamma.iter())
        .map(|((a, b), g)| {
            let cross = (a * b.conj()).norm();
            let g2 = g.norm_sqr();
            g2 / (cross * (1. - g2).abs() + EPSILON)
        })
        .collect()
}

/// No weighting, the scalar `1`.
#[must_use]
pub fn none() -> F {
    1.
}
