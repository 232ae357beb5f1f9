//! Bearing of a single source from a recording of a uniform linear array.
#![allow(clippy::module_name_repetitions)]
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tracing::{debug, warn};

use crate::geometry::{aggregate, arrival_angle, InvalidPairs, LinearArray, MicPair, PairSelection};
use crate::{Error, Estimate, GccConfig, Medium, Recording, Result, F};

#[derive(SmartDefault, Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BearingConfig {
    pub gcc: GccConfig,
    pub medium: Medium,
    #[default = 4]
    pub mics: usize,
    /// Distance between neighbouring microphones in meters.
    #[default = 0.1]
    pub spacing: F,
    pub pairs: PairSelection,
    pub invalid_pairs: InvalidPairs,
    /// Pairs whose correlation peak is not above this are treated as invalid.
    pub min_peak: F,
}

impl BearingConfig {
    /// # Errors
    /// [`Error::InvalidArray`] if `mics` or `spacing` do not describe an array.
    pub fn create(self) -> Result<Bearing> {
        let BearingConfig {
            gcc,
            medium,
            mics,
            spacing,
            pairs,
            invalid_pairs,
            min_peak,
        } = self;
        let array = LinearArray::new(mics, spacing)?;
        Ok(Bearing {
            gcc,
            medium,
            pairs: array.pairs(pairs),
            array,
            invalid_pairs,
            min_peak,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Bearing {
    gcc: GccConfig,
    medium: Medium,
    array: LinearArray,
    pairs: Vec<MicPair>,
    invalid_pairs: InvalidPairs,
    min_peak: F,
}

/// Delay and angle of one microphone pair.
#[derive(Clone, Debug, PartialEq)]
pub struct PairEstimate {
    pub pair: MicPair,
    pub estimate: Estimate,
    /// Arrival angle in degrees.
    pub angle: Result<F>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BearingEstimate {
    pub pairs: Vec<PairEstimate>,
    pub speed_of_sound: F,
    /// Mean of the valid pair angles in degrees.
    pub bearing: F,
}

impl BearingEstimate {
    /// Angles of the pairs that produced one.
    pub fn angles(&self) -> impl Iterator<Item = F> + '_ {
        self.pairs.iter().filter_map(|p| p.angle.as_ref().ok().copied())
    }
}

impl Bearing {
    #[must_use]
    pub fn array(&self) -> &LinearArray {
        &self.array
    }

    #[must_use]
    pub fn pairs(&self) -> &[MicPair] {
        &self.pairs
    }

    /// Estimates the bearing of the dominant source in `recording`.
    ///
    /// # Errors
    /// - [`Error::ChannelMismatch`] if the recording does not have one channel
    ///   per microphone.
    /// - Any error of [`GccConfig::estimate`].
    /// - The errors of [`aggregate`] for the pair angles.
    pub fn locate(&self, recording: &Recording) -> Result<BearingEstimate> {
        if recording.channels() != self.array.mics() {
            return Err(Error::ChannelMismatch {
                expected: self.array.mics(),
                actual: recording.channels(),
            });
        }
        let speed_of_sound = self.medium.speed_of_sound();

        let pairs = self
            .pairs
            .iter()
            .map(|&pair| -> Result<_> {
                let estimate = self.gcc.estimate(
                    recording.channel(pair.a),
                    recording.channel(pair.b),
                    recording.sample_rate(),
                )?;
                let angle = if estimate.is_confident(self.min_peak) {
                    arrival_angle(estimate.tdoa, speed_of_sound, pair.distance)
                } else {
                    Err(Error::NoConfidentPeak {
                        peak: estimate.peak,
                        min_peak: self.min_peak,
                    })
                };
                match &angle {
                    Ok(angle) => debug!(pair.a, pair.b, tdoa = estimate.tdoa, angle, "pair angle"),
                    Err(e) => warn!(pair.a, pair.b, tdoa = estimate.tdoa, "no angle for pair: {e}"),
                }
                Ok(PairEstimate {
                    pair,
                    estimate,
                    angle,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let bearing = aggregate(pairs.iter().map(|p| &p.angle), self.invalid_pairs)?;
        debug!(bearing, speed_of_sound, "aggregated bearing");
        Ok(BearingEstimate {
            pairs,
            speed_of_sound,
            bearing,
        })
    }
}
