use anomaly_calibrator::{
    add_anomaly, identify_mean, load_signal, AnomalyCalibrator, CalibratorConfig,
};
use ndarray::Array1;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;

fn sine(n: usize) -> Array1<f64> {
    Array1::from((0..n).map(|i| 20.0 + 5.0 * (i as f64 / 25.0).sin()).collect::<Vec<_>>())
}

fn reference_mean(values: &[f64], position: usize, window: usize) -> f64 {
    let left = position.saturating_sub(window);
    let right = (position + window).min(values.len());
    let slice = &values[left..right];
    slice.iter().sum::<f64>() / slice.len() as f64
}

fn signal_case_strategy() -> impl Strategy<Value = (Vec<f64>, usize, usize)> {
    (2usize..200).prop_flat_map(|n| {
        (
            prop::collection::vec(-1000.0f64..1000.0, n),
            0usize..n,
            1usize..80,
        )
    })
}

proptest! {
    #[test]
    fn local_mean_matches_clipped_slice((values, position, window) in signal_case_strategy()) {
        let signal = Array1::from(values.clone());
        let got = identify_mean(&signal, position, window);
        let want = reference_mean(&values, position, window);
        prop_assert!((got - want).abs() <= 1e-9 * want.abs().max(1.0));
    }

    #[test]
    fn injection_touches_only_the_chosen_index(
        (values, position, window) in signal_case_strategy(),
        threshold in prop_oneof![-0.5f64..-0.001, 0.001f64..0.5],
    ) {
        let signal = Array1::from(values);
        let mut rng = StdRng::seed_from_u64(0);
        let out = add_anomaly(&mut rng, &signal, Some(position), Some(threshold), window).unwrap();
        let expected = signal[position] + threshold * identify_mean(&signal, position, window);
        for i in 0..signal.len() {
            if i == position {
                prop_assert!((out[i] - expected).abs() < 1e-9);
            } else {
                prop_assert_eq!(out[i], signal[i]);
            }
        }
    }
}

#[test]
fn plateau_example_adds_two() {
    let mut signal = Array1::<f64>::zeros(100);
    for i in 45..56 {
        signal[i] = 10.0;
    }
    let mut rng = StdRng::seed_from_u64(99);
    let out = add_anomaly(&mut rng, &signal, Some(50), Some(0.2), 5).unwrap();
    assert_eq!(out[50], signal[50] + 2.0);
}

#[test]
fn default_dataset_on_thousand_samples() {
    let config = CalibratorConfig { seed: Some(2024), ..Default::default() };
    let mut cal = AnomalyCalibrator::new(sine(1000), &config).unwrap();
    let ds = cal.build_dataset(0.1, 0.9, 5).unwrap();

    assert_eq!(ds.shape(), (5, 1000));
    for (i, &pos) in ds.positions.iter().enumerate() {
        assert!((100..=900).contains(&pos));
        let base = cal.original_signal();
        let differing: Vec<usize> = (0..1000).filter(|&j| ds.row(i)[j] != base[j]).collect();
        assert_eq!(differing, vec![pos]);
    }
}

#[test]
fn first_location_range_wins_until_rebuilt() {
    let config = CalibratorConfig { seed: Some(8), ..Default::default() };
    let mut cal = AnomalyCalibrator::new(sine(1000), &config).unwrap();

    let early = cal.build_locations(0.0, 0.3, 100).unwrap();
    let grid = cal.dense_grid().unwrap().to_vec();
    let late = cal.build_locations(0.6, 1.0, 100).unwrap();

    assert_eq!(cal.dense_grid().unwrap(), grid.as_slice());
    assert!(early.iter().chain(late.iter()).all(|p| grid.contains(p)));
    assert!(late.iter().all(|&p| p <= 300));

    cal.rebuild_grid(0.6, 1.0).unwrap();
    let moved = cal.build_locations(0.6, 1.0, 100).unwrap();
    assert!(moved.iter().all(|&p| (600..1000).contains(&p)));
}

#[test]
fn seeded_calibrators_agree() {
    let config = CalibratorConfig { seed: Some(77), ..Default::default() };
    let mut a = AnomalyCalibrator::new(sine(400), &config).unwrap();
    let mut b = AnomalyCalibrator::new(sine(400), &config).unwrap();

    assert_eq!(a.threshold(), b.threshold());
    let xa = a.inject_anomaly(None, None).unwrap().clone();
    let xb = b.inject_anomaly(None, None).unwrap().clone();
    assert_eq!(xa, xb);
    assert_eq!(a.build_default_dataset().unwrap().signals, b.build_default_dataset().unwrap().signals);
}

#[test]
fn csv_to_dataset() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "ds,y").unwrap();
    for i in 0..200 {
        writeln!(f, "2024-01-01 {:02}:{:02}:00,{}", i / 60, i % 60, 10.0 + (i % 7) as f64).unwrap();
    }
    f.flush().unwrap();

    let signal = load_signal(f.path(), "y", Some("ds")).unwrap();
    assert_eq!(signal.len(), 200);

    let config = CalibratorConfig { seed: Some(5), threshold: Some(-0.1), num_locations: 4, ..Default::default() };
    let mut cal = AnomalyCalibrator::new(signal, &config).unwrap();
    let ds = cal.build_default_dataset().unwrap();
    assert_eq!(ds.shape(), (4, 200));
    for (i, &pos) in ds.positions.iter().enumerate() {
        assert!(ds.row(i)[pos] < cal.original_signal()[pos]);
    }
}
