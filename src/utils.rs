use ndarray::{arr1, Array1};

// ------------------------ helpers ------------------------
pub fn linspace(a: f64, b: f64, n: usize) -> Array1<f64> {
    if n == 0 {
        return Array1::zeros(0);
    }
    if n == 1 {
        return arr1(&[a]);
    }
    let step = (b - a) / (n as f64 - 1.0);
    let mut xs = Array1::from((0..n).map(|i| a + step * i as f64).collect::<Vec<_>>());
    // endpoint is exact, interior points keep their rounding
    xs[n - 1] = b;
    xs
}

/// Evenly spaced points between `lo` and `hi` (both inclusive), truncated to indices.
/// Duplicates are kept when `n` exceeds the number of distinct integers in range.
pub fn integer_grid(lo: usize, hi: usize, n: usize) -> Vec<usize> {
    linspace(lo as f64, hi as f64, n)
        .iter()
        .map(|&v| v as usize)
        .collect()
}

pub fn abs_difference(a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
    (a - b).mapv(f64::abs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_endpoints() {
        let xs = linspace(0.0, 1.0, 5);
        assert_eq!(xs.len(), 5);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[4], 1.0);
        assert!((xs[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn integer_grid_is_inclusive_and_sorted() {
        let g = integer_grid(100, 900, 1000);
        assert_eq!(g.len(), 1000);
        assert_eq!(g[0], 100);
        assert_eq!(*g.last().unwrap(), 900);
        assert!(g.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn integer_grid_truncates() {
        // 0, 2.5, 5 -> 0, 2, 5
        assert_eq!(integer_grid(0, 5, 3), vec![0, 2, 5]);
    }

    #[test]
    fn integer_grid_does_not_round_up() {
        // 19 * (1000 / 38) lands a hair below 500 and must stay 499
        let xs = linspace(0.0, 1000.0, 39);
        let g = integer_grid(0, 1000, 39);
        assert_eq!(g[19], 499);
        for (x, &p) in xs.iter().zip(g.iter()) {
            assert_eq!(p, x.trunc() as usize);
        }
        assert_eq!(g[38], 1000);
    }

    #[test]
    fn abs_difference_is_elementwise() {
        let a = arr1(&[1.0, -2.0, 3.0]);
        let b = arr1(&[0.5, 1.0, 3.0]);
        assert_eq!(abs_difference(&a, &b), arr1(&[0.5, 3.0, 0.0]));
    }
}
