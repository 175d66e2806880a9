use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::anomaly::{inject, sample_threshold};
use crate::config::{validate_location_range, CalibratorConfig};
use crate::data_structures::AnomalyDataset;
use crate::error::{CalibratorError, Result};
use crate::plotting;
use crate::utils::integer_grid;

// Candidate positions, built once per calibrator unless explicitly rebuilt
#[derive(Clone, Debug)]
struct DenseGrid {
    min_location: f64,
    max_location: f64,
    points: Vec<usize>,
}

/// Generates anomalous variants of one base signal.
///
/// Owns its random source, so two calibrators seeded alike produce the same
/// positions, thresholds and datasets.
pub struct AnomalyCalibrator {
    original_signal: Array1<f64>,
    anomalous_signal: Option<Array1<f64>>,
    curr_threshold: f64,
    window: usize,
    dense_locations: usize,
    min_location: f64,
    max_location: f64,
    num_locations: usize,
    image_folder: PathBuf,
    dense_grid: Option<DenseGrid>,
    rng: StdRng,
}

impl AnomalyCalibrator {
    pub fn new(signal: Array1<f64>, config: &CalibratorConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(signal, config, rng)
    }

    /// Build with an explicit random source; `config.seed` is ignored.
    pub fn with_rng(signal: Array1<f64>, config: &CalibratorConfig, mut rng: StdRng) -> Result<Self> {
        config.validate()?;
        let curr_threshold = match config.threshold {
            Some(t) => t,
            None => sample_threshold(&mut rng)?,
        };
        Ok(Self {
            original_signal: signal,
            anomalous_signal: None,
            curr_threshold,
            window: config.window,
            dense_locations: config.dense_locations,
            min_location: config.min_location,
            max_location: config.max_location,
            num_locations: config.num_locations,
            image_folder: config.image_folder.clone(),
            dense_grid: None,
            rng,
        })
    }

    pub fn original_signal(&self) -> &Array1<f64> {
        &self.original_signal
    }

    /// Result of the last [`inject_anomaly`](Self::inject_anomaly), if any.
    pub fn anomalous_signal(&self) -> Option<&Array1<f64>> {
        self.anomalous_signal.as_ref()
    }

    pub fn threshold(&self) -> f64 {
        self.curr_threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.curr_threshold = threshold;
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.original_signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original_signal.is_empty()
    }

    /// Inject one anomaly into a copy of the base signal and remember it.
    /// Unlike [`build_dataset`](Self::build_dataset), a missing threshold is drawn fresh.
    pub fn inject_anomaly(&mut self, position: Option<usize>, threshold: Option<f64>) -> Result<&Array1<f64>> {
        let injection = inject(&mut self.rng, &self.original_signal, position, threshold, self.window)?;
        Ok(self.anomalous_signal.insert(injection.anomalous))
    }

    /// Cached candidate grid, if one has been built.
    pub fn dense_grid(&self) -> Option<&[usize]> {
        self.dense_grid.as_ref().map(|g| g.points.as_slice())
    }

    /// Fractions the cached grid was built with.
    pub fn grid_range(&self) -> Option<(f64, f64)> {
        self.dense_grid.as_ref().map(|g| (g.min_location, g.max_location))
    }

    /// Build the dense grid only if none exists yet; returns the cached grid.
    pub fn ensure_grid(&mut self, min_location: f64, max_location: f64) -> Result<&[usize]> {
        if self.dense_grid.is_none() {
            self.rebuild_grid(min_location, max_location)?;
        }
        Ok(self.dense_grid().unwrap_or(&[]))
    }

    /// Always rebuild the dense grid from the given fractions.
    pub fn rebuild_grid(&mut self, min_location: f64, max_location: f64) -> Result<&[usize]> {
        validate_location_range(min_location, max_location)?;
        let n = self.len();
        let lo = (min_location * n as f64) as usize;
        let hi = (max_location * n as f64) as usize;
        let last = n.saturating_sub(1);
        let points = integer_grid(lo, hi, self.dense_locations)
            .into_iter()
            .map(|p| p.min(last))
            .collect();
        let grid = DenseGrid { min_location, max_location, points };
        Ok(self.dense_grid.insert(grid).points.as_slice())
    }

    /// Draw `num_locations` positions, with replacement, from the dense grid.
    ///
    /// The grid is built on the first call only: later calls reuse it and the
    /// fractions passed here are ignored. Use [`rebuild_grid`](Self::rebuild_grid)
    /// to change the range.
    pub fn build_locations(&mut self, min_location: f64, max_location: f64, num_locations: usize) -> Result<Vec<usize>> {
        if let Some((lo, hi)) = self.grid_range() {
            if lo != min_location || hi != max_location {
                warn!(
                    cached_min = lo, cached_max = hi,
                    requested_min = min_location, requested_max = max_location,
                    "dense grid already built; ignoring new location range"
                );
            }
        }
        self.ensure_grid(min_location, max_location)?;
        self.sample_locations(num_locations)
    }

    fn sample_locations(&mut self, num_locations: usize) -> Result<Vec<usize>> {
        let points = match &self.dense_grid {
            Some(g) => &g.points,
            None => return Ok(Vec::new()),
        };
        if num_locations == 0 {
            return Ok(Vec::new());
        }
        let pick = Uniform::new(0, points.len())
            .map_err(|e| CalibratorError::Sampling(e.to_string()))?;
        Ok((0..num_locations).map(|_| points[pick.sample(&mut self.rng)]).collect())
    }

    /// One row per sampled location, all at the calibrator's current threshold.
    ///
    /// Locations are drawn with replacement, so rows can repeat.
    pub fn build_dataset(&mut self, min_location: f64, max_location: f64, num_locations: usize) -> Result<AnomalyDataset> {
        let positions = self.build_locations(min_location, max_location, num_locations)?;
        let n = self.len();
        let mut signals = Array2::<f64>::zeros((positions.len(), n));

        for (i, &pos) in positions.iter().enumerate() {
            let injection = inject(
                &mut self.rng,
                &self.original_signal,
                Some(pos),
                Some(self.curr_threshold),
                self.window,
            )?;
            signals.row_mut(i).assign(&injection.anomalous);
        }

        info!(
            rows = positions.len(),
            signal_len = n,
            threshold = self.curr_threshold,
            "built anomaly dataset"
        );
        Ok(AnomalyDataset { signals, positions, threshold: self.curr_threshold })
    }

    /// [`build_dataset`](Self::build_dataset) with the configured range and row count.
    pub fn build_default_dataset(&mut self) -> Result<AnomalyDataset> {
        self.build_dataset(self.min_location, self.max_location, self.num_locations)
    }

    /// Write the original vs. last-injected comparison into the image folder.
    /// Injects at a random position first if nothing was injected yet.
    pub fn plot(&mut self) -> Result<PathBuf> {
        let anomalous = match &self.anomalous_signal {
            Some(a) => a.clone(),
            None => self.inject_anomaly(None, None)?.clone(),
        };
        plotting::plot_normal_and_anomalous_signal(&self.original_signal, &anomalous, &self.image_folder)
    }

    pub fn plot_dataset(&self, dataset: &AnomalyDataset) -> Result<PathBuf> {
        plotting::plot_anomaly_dataset(dataset, &self.original_signal, &self.image_folder)
    }
}
