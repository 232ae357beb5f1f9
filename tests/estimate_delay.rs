mod common;

use common::{noise, roll};
use float_cmp::assert_approx_eq;
use gcc_tdoa::{estimate, estimate_named, Error, GccConfig, Weighting, F};

const FS: F = 16_000.;

#[test]
fn self_correlation_peaks_at_zero_lag() {
    let x = noise(1024, 1);
    for weighting in Weighting::ALL {
        let estimate = estimate(&x, &x, FS, weighting).unwrap();
        assert_eq!(estimate.peak_index, 512, "{weighting}");
        assert_eq!(estimate.delay_samples(), 0, "{weighting}");
        assert!(estimate.tdoa.abs() < 1. / FS, "{weighting}");
    }
}

#[test]
fn recovers_circular_shifts() {
    let x = noise(1024, 2);
    for shift in [-511, -200, -37, -1, 1, 5, 100, 511] {
        let delayed = roll(&x, shift);
        for weighting in Weighting::ALL {
            let estimate = estimate(&x, &delayed, FS, weighting).unwrap();
            assert_eq!(estimate.delay_samples(), shift, "{weighting} {shift}");
            assert_approx_eq!(F, estimate.tdoa, shift as F / FS, epsilon = 1e-12);
        }
    }
}

#[test]
fn recovers_shifts_with_odd_length() {
    let x = noise(1001, 3);
    for shift in [-500, -250, 3, 500] {
        let delayed = roll(&x, shift);
        for weighting in Weighting::ALL {
            let estimate = estimate(&x, &delayed, FS, weighting).unwrap();
            assert_eq!(estimate.delay_samples(), shift, "{weighting} {shift}");
        }
    }
}

#[test]
fn second_signal_lagging_is_positive() {
    let x = noise(1024, 4);
    let delayed = roll(&x, 5);

    let lagging = estimate(&x, &delayed, FS, Weighting::Phat).unwrap();
    assert!(lagging.tdoa > 0.);
    // same index policy as reading the lag axis at `N - peak_index`
    assert_eq!(lagging.tdoa, lagging.lag_axis[1024 - lagging.peak_index]);
    assert_eq!(lagging.tdoa, -lagging.lag_axis[lagging.peak_index]);

    let leading = estimate(&delayed, &x, FS, Weighting::Phat).unwrap();
    assert_approx_eq!(F, leading.tdoa, -lagging.tdoa);
}

#[test]
fn phat_ignores_gain_mismatch() {
    let x = noise(2048, 5);
    let quiet = roll(&x, 42).into_iter().map(|s| s * 0.05).collect::<Vec<_>>();
    let estimate = estimate(&x, &quiet, FS, Weighting::Phat).unwrap();
    assert_eq!(estimate.delay_samples(), 42);
}

#[test]
fn zero_pads_shorter_signal() {
    let x = noise(1000, 6);
    let delayed: Vec<F> = std::iter::repeat(0.)
        .take(10)
        .chain(x[..790].iter().copied())
        .collect();
    for weighting in [Weighting::Phat, Weighting::Unweighted] {
        let estimate = estimate(&x, &delayed, FS, weighting).unwrap();
        assert_eq!(estimate.correlogram.len(), 1000);
        assert_eq!(estimate.lag_axis.len(), 1000);
        assert_eq!(estimate.delay_samples(), 10, "{weighting}");
    }
}

#[test]
fn lag_axis_matches_correlogram() {
    let x = noise(256, 7);
    let estimate = estimate(&x, &x, FS, Weighting::Scot).unwrap();
    assert_eq!(estimate.lag_axis[128], 0.);
    assert_approx_eq!(F, estimate.lag_axis[0], -128. / FS);
    assert_approx_eq!(F, estimate.lag_axis[255], 127. / FS);
    let tdoa = estimate.tdoa;
    assert!(estimate.lag_axis.iter().any(|&lag| lag == tdoa));
}

#[test]
fn silence_does_not_crash() {
    let zeros = vec![0.; 256];
    for weighting in Weighting::ALL {
        let estimate = estimate(&zeros, &zeros, FS, weighting).unwrap();
        assert!(estimate.peak_index < 256);
        assert_eq!(estimate.peak, 0.);
        assert!(!estimate.is_confident(0.));
        assert!(estimate.correlogram.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn imaginary_residue_is_rounding_noise() {
    let x = noise(4096, 8);
    let y = roll(&noise(4096, 8), 17)
        .into_iter()
        .zip(noise(4096, 9))
        .map(|(s, n)| s + 0.3 * n)
        .collect::<Vec<_>>();
    for weighting in Weighting::ALL {
        let config = GccConfig {
            weighting,
            imaginary_tolerance: 1e-9,
        };
        let estimate = config.estimate(&x, &y, FS).unwrap();
        assert_eq!(estimate.delay_samples(), 17, "{weighting}");
    }
}

#[test]
fn mle_stays_finite_on_identical_signals() {
    let x = noise(512, 10);
    let estimate = estimate(&x, &x, FS, Weighting::Mle).unwrap();
    assert!(estimate.correlogram.iter().all(|v| v.is_finite()));
    assert!(estimate.is_confident(0.));
}

#[test]
fn unknown_weighting() {
    let x = noise(16, 11);
    let error = estimate_named(&x, &x, FS, "rhot").unwrap_err();
    assert_eq!(
        error,
        Error::UnknownWeighting {
            name: "rhot".into(),
            valid: vec!["phat", "roth", "scot", "mle", "none"],
        }
    );
    assert!(error.to_string().contains("phat"));
    assert!(estimate_named(&x, &x, FS, "scot").is_ok());
}
