//! Propagation speed of sound in air.
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::F;

/// Calibration constant in m/s of [`speed_of_sound`].
pub const SPEED_OF_SOUND_CALIBRATION: F = 331.3;

#[must_use]
pub fn celsius_to_kelvin(temperature: F) -> F {
    temperature + 273.15
}

/// Speed of sound in m/s at `temperature` degrees Celsius.
///
/// `k * sqrt((1 + T) / 273)` with `T` in Kelvin and
/// `k = SPEED_OF_SOUND_CALIBRATION`.
#[must_use]
pub fn speed_of_sound(temperature: F) -> F {
    speed_of_sound_with(SPEED_OF_SOUND_CALIBRATION, temperature)
}

fn speed_of_sound_with(calibration: F, temperature: F) -> F {
    calibration * ((1. + celsius_to_kelvin(temperature)) / 273.).sqrt()
}

#[derive(SmartDefault, Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Medium {
    /// Ambient temperature in degrees Celsius.
    #[default = 25.0]
    pub temperature: F,
    #[default(SPEED_OF_SOUND_CALIBRATION)]
    pub calibration: F,
}

impl Medium {
    #[must_use]
    pub fn at(temperature: F) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }

    /// Speed of sound in m/s, recomputed on every call.
    #[must_use]
    pub fn speed_of_sound(&self) -> F {
        speed_of_sound_with(self.calibration, self.temperature)
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn freezing() {
        assert_approx_eq!(F, celsius_to_kelvin(0.), 273.15);
        assert_approx_eq!(F, speed_of_sound(0.), 331.997, epsilon = 0.001);
        assert!((speed_of_sound(0.) - 331.2).abs() < 1.);
    }

    #[test]
    fn room_temperature() {
        assert_approx_eq!(F, speed_of_sound(25.), 346.804, epsilon = 0.001);
        assert_approx_eq!(F, Medium::default().speed_of_sound(), speed_of_sound(25.));
    }

    #[test]
    fn calibration_scales_linearly() {
        let medium = Medium {
            temperature: 20.,
            calibration: 331.45,
        };
        assert_approx_eq!(
            F,
            medium.speed_of_sound() / Medium::at(20.).speed_of_sound(),
            331.45 / 331.3,
            epsilon = 1e-12
        );
    }

    #[test]
    fn warmer_is_faster() {
        assert!(speed_of_sound(30.) > speed_of_sound(10.));
    }
}
