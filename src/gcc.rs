//! Time difference of arrival estimation via generalized cross-correlation.
#![allow(clippy::module_name_repetitions)]
use ndarray::{Array1, ArrayView1};
use realfft::RealFftPlanner;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tracing::{debug, trace};

use crate::utils::{argmax_abs, fftshift, max_abs};
use crate::{Error, Result, Weighting, C, F};

#[derive(SmartDefault, Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GccConfig {
    pub weighting: Weighting,
    /// Largest imaginary part left by the inverse transform, relative to the
    /// largest real part, that is still accepted as rounding noise.
    #[default = 1e-6]
    pub imaginary_tolerance: F,
}

/// Result of one [`estimate`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct Estimate {
    /// Seconds signal `b` lags signal `a`, negative if it leads.
    pub tdoa: F,
    /// Cross-correlation with zero lag at index `N / 2`.
    pub correlogram: Array1<F>,
    /// Lag in seconds of each correlogram index.
    pub lag_axis: Array1<F>,
    pub peak_index: usize,
    /// Absolute correlogram value at `peak_index`.
    pub peak: F,
}

impl Estimate {
    /// Length of the compared signals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.correlogram.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.correlogram.is_empty()
    }

    /// Delay in whole samples, same sign as [`Estimate::tdoa`].
    #[must_use]
    pub fn delay_samples(&self) -> isize {
        peak_to_lag(self.peak_index, self.len())
    }

    /// Whether the correlation peak stands above `min_peak`.
    ///
    /// All-zero input produces a peak of `0` at an arbitrary index, which
    /// is never confident.
    #[must_use]
    pub fn is_confident(&self, min_peak: F) -> bool {
        self.peak > min_peak
    }
}

/// Estimates the delay of `b` relative to `a` sampled at `sample_rate`.
///
/// Uses the default [`GccConfig`] with `weighting`.
///
/// # Errors
/// See [`GccConfig::estimate`].
pub fn estimate<'a, 'b>(
    a: impl Into<ArrayView1<'a, F>>,
    b: impl Into<ArrayView1<'b, F>>,
    sample_rate: F,
    weighting: Weighting,
) -> Result<Estimate> {
    GccConfig {
        weighting,
        ..GccConfig::default()
    }
    .estimate(a, b, sample_rate)
}

/// Like [`estimate`], with the weighting given by its name.
///
/// # Errors
/// [`Error::UnknownWeighting`] if `weighting` is not one of
/// [`Weighting::tokens`], otherwise see [`GccConfig::estimate`].
pub fn estimate_named<'a, 'b>(
    a: impl Into<ArrayView1<'a, F>>,
    b: impl Into<ArrayView1<'b, F>>,
    sample_rate: F,
    weighting: &str,
) -> Result<Estimate> {
    estimate(a, b, sample_rate, weighting.parse()?)
}

/// Lag axis in seconds for `n` correlogram bins, zero at `n / 2`.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn lag_axis(n: usize, sample_rate: F) -> Array1<F> {
    let half = (n / 2) as isize;
    Array1::from_shape_fn(n, |k| (k as isize - half) as F / sample_rate)
}

/// Maps the correlogram index of the peak to the delay of the second signal
/// in samples.
///
/// A peak at index `k` sits at lag `k - n/2` of `a` against `b`, so `b` is
/// delayed by `n/2 - k`. The result is wrapped into `[-n/2, (n-1)/2]`, which
/// maps the ambiguous `k == 0` onto `-n/2` for even `n`.
#[allow(clippy::cast_possible_wrap)]
fn peak_to_lag(peak_index: usize, n: usize) -> isize {
    let n = n as isize;
    let lag = n / 2 - peak_index as isize;
    if lag > (n - 1) / 2 {
        lag - n
    } else {
        lag
    }
}

impl GccConfig {
    /// Estimates the delay of `b` relative to `a` sampled at `sample_rate`.
    ///
    /// Both signals are zero padded to the longer length `N`.
    ///
    /// # Errors
    /// - [`Error::EmptySignal`] if both signals are empty.
    /// - [`Error::InvalidSampleRate`] if `sample_rate` is not positive.
    /// - [`Error::NonFinite`] if the weighted spectrum contains NaN or Inf,
    ///   which only happens for non-finite samples.
    /// - [`Error::ImaginaryResidue`] if the inverse transform is not real
    ///   within [`GccConfig::imaginary_tolerance`].
    pub fn estimate<'a, 'b>(
        &self,
        a: impl Into<ArrayView1<'a, F>>,
        b: impl Into<ArrayView1<'b, F>>,
        sample_rate: F,
    ) -> Result<Estimate> {
        let (a, b) = (a.into(), b.into());
        if !(sample_rate.is_finite() && sample_rate > 0.) {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        let n = a.len().max(b.len());
        if n == 0 {
            return Err(Error::EmptySignal);
        }

        let x1 = spectrum(a, n)?;
        let x2 = spectrum(b, n)?;

        let mut cross: Array1<C> = x1.iter().zip(x2.iter()).map(|(a, b)| a * b.conj()).collect();
        self.weighting
            .weights(x1.view(), x2.view())
            .apply(&mut cross);
        if cross.iter().any(|c| !(c.re.is_finite() && c.im.is_finite())) {
            return Err(Error::NonFinite);
        }

        let correlation = inverse_real(cross.view(), self.imaginary_tolerance)?;
        let correlogram = fftshift(correlation.view());
        let lag_axis = lag_axis(n, sample_rate);

        let peak_index = argmax_abs(correlogram.view());
        let peak = correlogram[peak_index].abs();
        let delay = peak_to_lag(peak_index, n);
        let tdoa = delay as F / sample_rate;
        debug!(
            n,
            weighting = %self.weighting,
            peak_index,
            peak,
            delay,
            tdoa,
            "located correlation peak"
        );

        Ok(Estimate {
            tdoa,
            correlogram,
            lag_axis,
            peak_index,
            peak,
        })
    }
}

/// Full `n` bin spectrum of the real `signal`, zero padded to `n`.
///
/// Computed with a real input fft and mirrored, so `X[n-k] == conj(X[k])`
/// holds exactly.
pub(crate) fn spectrum(signal: ArrayView1<F>, n: usize) -> Result<Array1<C>> {
    assert!(signal.len() <= n, "signal is longer than the transform");
    let mut planner = RealFftPlanner::<F>::new();
    let fft = planner.plan_fft_forward(n);

    let mut input = fft.make_input_vec();
    input
        .iter_mut()
        .zip(signal.iter())
        .for_each(|(i, &s)| *i = s);
    let mut half = fft.make_output_vec();
    fft.process(&mut input, &mut half)?;

    Ok(Array1::from_shape_fn(n, |k| {
        if k < half.len() {
            half[k]
        } else {
            half[n - k].conj()
        }
    }))
}

/// Inverse transform of a Hermitian spectrum, scaled by `1 / n`.
///
/// The imaginary part of the result is rounding noise for Hermitian input
/// and is dropped, unless it exceeds `tolerance` relative to the real part.
pub(crate) fn inverse_real(spectrum: ArrayView1<C>, tolerance: F) -> Result<Array1<F>> {
    let n = spectrum.len();
    let mut planner = FftPlanner::<F>::new();
    let ifft = planner.plan_fft_inverse(n);
    let mut buffer = spectrum.to_vec();
    ifft.process(&mut buffer);

    let scale = 1. / n as F;
    let real: Array1<F> = buffer.iter().map(|c| c.re * scale).collect();
    let imag: Array1<F> = buffer.iter().map(|c| c.im * scale).collect();

    let real_max = max_abs(real.view());
    let imag_max = max_abs(imag.view());
    let residue = imag_max / real_max.max(F::MIN_POSITIVE);
    trace!(residue, "imaginary residue of inverse transform");
    if imag_max > tolerance * real_max.max(F::MIN_POSITIVE) {
        return Err(Error::ImaginaryResidue { residue, tolerance });
    }
    Ok(real)
}
