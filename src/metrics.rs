//! Quality scores comparing a filtered signal with its clean reference.
//!
//! All functions tolerate bad input: mismatched lengths or empty signals give
//! a neutral score instead of an error.

/// Noise power below which [`snr`] reports a noiseless result.
const NOISE_FLOOR: f64 = 1e-10;

/// SNR reported when the test signal matches the reference exactly.
pub const SNR_NOISELESS: f64 = 100.0;

/// Signal-to-noise ratio in decibels of `test` against `clean`.
///
/// Returns [`SNR_NOISELESS`] when the residual power is below `1e-10`, and
/// `0.0` for mismatched or empty inputs.
pub fn snr(clean: &[f64], test: &[f64]) -> f64 {
    if clean.len() != test.len() || clean.is_empty() {
        return 0.0;
    }

    let n = clean.len() as f64;
    let (signal_power, noise_power) = clean
        .iter()
        .zip(test)
        .fold((0.0, 0.0), |(sp, np), (&c, &t)| {
            let noise = t - c;
            (sp + c * c, np + noise * noise)
        });

    let noise_power = noise_power / n;
    if noise_power < NOISE_FLOOR {
        return SNR_NOISELESS;
    }

    10.0 * ((signal_power / n) / noise_power).log10()
}

/// Mean squared error between two signals, `0.0` for mismatched or empty inputs.
pub fn mse(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>() / a.len() as f64
}

/// Pearson correlation coefficient.
///
/// Returns `0.0` when either signal is constant, or for mismatched or empty inputs.
/// A signal counts as constant when its centred energy is at rounding level
/// relative to its raw energy, so low-amplitude signals still correlate.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let (mut sum_sq_a, mut sum_sq_b) = (0.0, 0.0);
    let (mut energy_a, mut energy_b) = (0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        numerator += da * db;
        sum_sq_a += da * da;
        sum_sq_b += db * db;
        energy_a += x * x;
        energy_b += y * y;
    }

    if is_constant(sum_sq_a, energy_a) || is_constant(sum_sq_b, energy_b) {
        return 0.0;
    }
    numerator / (sum_sq_a.sqrt() * sum_sq_b.sqrt())
}

fn is_constant(centred: f64, energy: f64) -> bool {
    centred <= f64::EPSILON * energy
}
