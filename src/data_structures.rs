use ndarray::{Array1, Array2, ArrayView1};

/// Outcome of a single injection on a copy of the base signal
#[derive(Clone, Debug)]
pub struct Injection {
    pub anomalous: Array1<f64>,
    pub position: usize,
    pub threshold: f64,
    pub local_mean: f64, // mean over the clipped window around `position`
}

impl Injection {
    /// Size of the perturbation written at `position`
    pub fn delta(&self) -> f64 {
        self.threshold * self.local_mean
    }
}

/// One anomalous variant of the base signal per sampled location.
#[derive(Clone, Debug)]
pub struct AnomalyDataset {
    pub signals: Array2<f64>,  // shape (num_locations, n)
    pub positions: Vec<usize>, // row i was perturbed at positions[i]; may repeat
    pub threshold: f64,        // shared by every row
}

impl AnomalyDataset {
    pub fn n_rows(&self) -> usize {
        self.signals.nrows()
    }

    pub fn signal_len(&self) -> usize {
        self.signals.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.signals.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.signals.row(i)
    }
}
