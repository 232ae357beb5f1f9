use realfft::FftError;
use thiserror::Error;

use crate::F;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("unknown weighting {name:?}, choose from {valid:?}")]
    UnknownWeighting {
        name: String,
        valid: Vec<&'static str>,
    },
    /// `tdoa * c / d` left `[-1, 1]`, so there is no real arrival angle.
    #[error("arccos argument {ratio} is outside [-1, 1]")]
    GeometryOutOfRange { ratio: F },
    #[error("signals are empty")]
    EmptySignal,
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(F),
    #[error("weighted cross-power spectrum contains NaN or Inf")]
    NonFinite,
    #[error("inverse transform left an imaginary residue of {residue:e} (tolerance {tolerance:e})")]
    ImaginaryResidue { residue: F, tolerance: F },
    #[error("fft failed: {0}")]
    Transform(String),
    #[error("invalid microphone array: {0}")]
    InvalidArray(String),
    #[error("expected {expected} channels, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },
    #[error("correlation peak {peak:e} is not above {min_peak:e}")]
    NoConfidentPeak { peak: F, min_peak: F },
    #[error("no microphone pair produced a valid angle")]
    NoValidPairs,
    #[error("invalid pcm format {0:?}")]
    InvalidPcmFormat(String),
}

impl From<FftError> for Error {
    fn from(value: FftError) -> Self {
        Self::Transform(value.to_string())
    }
}
