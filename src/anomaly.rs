use ndarray::{s, Array1};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Uniform};
use tracing::debug;

use crate::data_structures::Injection;
use crate::error::{CalibratorError, Result};

pub const DEFAULT_WINDOW: usize = 50;

// thresholds live on k * 0.001 for k in -500..500, k != 0
pub const THRESHOLD_STEP: f64 = 0.001;
const THRESHOLD_HALF_STEPS: i64 = 500;

/// Mean of `signal[max(0, p - w) .. min(n, p + w)]`.
///
/// Near either boundary the window is clipped, not padded, so fewer samples
/// are averaged. An empty window (empty signal, `w == 0`, or a position far
/// past the end) yields NaN.
pub fn identify_mean(signal: &Array1<f64>, position: usize, window: usize) -> f64 {
    let n = signal.len();
    let left = position.saturating_sub(window).min(n);
    let right = position.saturating_add(window).min(n);
    if left >= right {
        return f64::NAN;
    }
    signal.slice(s![left..right]).mean().unwrap_or(f64::NAN)
}

/// Every threshold `sample_threshold` can return, in ascending order.
pub fn threshold_grid() -> Vec<f64> {
    (-THRESHOLD_HALF_STEPS..THRESHOLD_HALF_STEPS)
        .filter(|&k| k != 0)
        .map(|k| k as f64 * THRESHOLD_STEP)
        .collect()
}

/// Uniform draw from [`threshold_grid`]; never exactly zero.
pub fn sample_threshold(rng: &mut StdRng) -> Result<f64> {
    // 999 slots: 500 negatives, then 499 positives
    let slots = (2 * THRESHOLD_HALF_STEPS - 1) as usize;
    let idx = Uniform::new(0, slots)
        .map_err(|e| CalibratorError::Sampling(e.to_string()))?
        .sample(rng) as i64;
    let k = if idx < THRESHOLD_HALF_STEPS {
        idx - THRESHOLD_HALF_STEPS
    } else {
        idx - THRESHOLD_HALF_STEPS + 1
    };
    Ok(k as f64 * THRESHOLD_STEP)
}

pub fn sample_position(rng: &mut StdRng, len: usize) -> Result<usize> {
    if len == 0 {
        return Err(CalibratorError::EmptySignal);
    }
    let pos = Uniform::new(0, len)
        .map_err(|e| CalibratorError::Sampling(e.to_string()))?
        .sample(rng);
    Ok(pos)
}

/// Perturb one sample of a copy of `signal` by `threshold * local_mean`.
///
/// Missing `position` / `threshold` are drawn from `rng`, position first.
/// The caller's array is never touched.
pub fn inject(
    rng: &mut StdRng,
    signal: &Array1<f64>,
    position: Option<usize>,
    threshold: Option<f64>,
    window: usize,
) -> Result<Injection> {
    let n = signal.len();
    let position = match position {
        Some(p) => p,
        None => sample_position(rng, n)?,
    };
    if position >= n {
        return Err(CalibratorError::PositionOutOfBounds { position, len: n });
    }

    let local_mean = identify_mean(signal, position, window);
    let threshold = match threshold {
        Some(t) => t,
        None => sample_threshold(rng)?,
    };

    let mut anomalous = signal.to_owned();
    anomalous[position] += threshold * local_mean;
    debug!(position, threshold, local_mean, window, "injected anomaly");

    Ok(Injection { anomalous, position, threshold, local_mean })
}

pub fn add_anomaly(
    rng: &mut StdRng,
    signal: &Array1<f64>,
    position: Option<usize>,
    threshold: Option<f64>,
    window: usize,
) -> Result<Array1<f64>> {
    Ok(inject(rng, signal, position, threshold, window)?.anomalous)
}

/// Same as [`add_anomaly`] but also hands back an untouched copy for comparison.
pub fn add_anomaly_pair(
    rng: &mut StdRng,
    signal: &Array1<f64>,
    position: Option<usize>,
    threshold: Option<f64>,
    window: usize,
) -> Result<(Array1<f64>, Array1<f64>)> {
    let anomalous = add_anomaly(rng, signal, position, threshold, window)?;
    Ok((signal.to_owned(), anomalous))
}
