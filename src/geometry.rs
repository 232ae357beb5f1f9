//! Uniform linear microphone arrays and the conversion of delays to arrival
//! angles.
use std::fmt::{self, Display};
use std::str::FromStr;

use derive_more::Constructor;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::utils::mean;
use crate::{Error, Result, F};

/// Microphones on a line, microphone `i` at `i * spacing` from microphone `0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearArray {
    mics: usize,
    spacing: F,
}

/// Two microphones of an array, `b` is compared against `a`.
#[derive(Clone, Copy, Debug, PartialEq, Constructor)]
pub struct MicPair {
    pub a: usize,
    pub b: usize,
    /// Distance between both microphones in meters.
    pub distance: F,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PairSelection {
    /// Neighbouring microphones `(i, i + 1)`.
    #[default]
    Adjacent,
    /// Every microphone against the reference `(0, i)`.
    Reference,
}

impl Display for PairSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairSelection::Adjacent => write!(f, "adjacent"),
            PairSelection::Reference => write!(f, "reference"),
        }
    }
}

impl FromStr for PairSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "adjacent" => Self::Adjacent,
            "reference" => Self::Reference,
            e => return Err(format!("Unsupported pair selection {e:?}")),
        })
    }
}

/// What [`aggregate`] does with pairs that have no valid angle.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvalidPairs {
    /// Average the remaining pairs.
    #[default]
    Exclude,
    /// Fail with the first error.
    Fail,
}

impl LinearArray {
    /// # Errors
    /// [`Error::InvalidArray`] for less than two microphones or a spacing that
    /// is not positive.
    pub fn new(mics: usize, spacing: F) -> Result<Self> {
        if mics < 2 {
            return Err(Error::InvalidArray(format!(
                "need at least two microphones, got {mics}"
            )));
        }
        if !(spacing.is_finite() && spacing > 0.) {
            return Err(Error::InvalidArray(format!(
                "spacing must be positive, got {spacing}"
            )));
        }
        Ok(Self { mics, spacing })
    }

    #[must_use]
    pub fn mics(&self) -> usize {
        self.mics
    }

    #[must_use]
    pub fn spacing(&self) -> F {
        self.spacing
    }

    /// Distance of every non reference microphone to microphone `0`.
    #[must_use]
    pub fn distances(&self) -> Vec<F> {
        (1..self.mics).map(|i| i as F * self.spacing).collect()
    }

    #[must_use]
    pub fn pairs(&self, selection: PairSelection) -> Vec<MicPair> {
        match selection {
            PairSelection::Adjacent => (0..self.mics)
                .tuple_windows()
                .map(|(a, b)| MicPair::new(a, b, self.spacing))
                .collect(),
            PairSelection::Reference => self
                .distances()
                .into_iter()
                .enumerate()
                .map(|(i, distance)| MicPair::new(0, i + 1, distance))
                .collect(),
        }
    }
}

/// Arrival angle `acos(tdoa * speed / distance)` in degrees of a far field
/// source.
///
/// `90` is broadside, `0` lies on the array axis beyond the first microphone
/// of the pair.
///
/// # Errors
/// [`Error::GeometryOutOfRange`] if `tdoa * speed / distance` is not within
/// `[-1, 1]`, e.g. because the delay is longer than sound needs to travel
/// `distance`.
pub fn arrival_angle(tdoa: F, speed_of_sound: F, distance: F) -> Result<F> {
    let ratio = tdoa * speed_of_sound / distance;
    if !(-1.0..=1.0).contains(&ratio) {
        return Err(Error::GeometryOutOfRange { ratio });
    }
    Ok(ratio.acos().to_degrees())
}

/// Arithmetic mean of the per pair `angles`.
///
/// # Errors
/// With [`InvalidPairs::Fail`] the first failed angle, with
/// [`InvalidPairs::Exclude`] [`Error::NoValidPairs`] when every angle failed.
pub fn aggregate<'a>(
    angles: impl IntoIterator<Item = &'a Result<F>>,
    invalid: InvalidPairs,
) -> Result<F> {
    let mut valid = Vec::new();
    for angle in angles {
        match (angle, invalid) {
            (Ok(angle), _) => valid.push(*angle),
            (Err(e), InvalidPairs::Fail) => return Err(e.clone()),
            (Err(_), InvalidPairs::Exclude) => {}
        }
    }
    mean(valid).ok_or(Error::NoValidPairs)
}
