use ndarray::{Array1, ArrayView1};
use plotters::prelude::*;
use plotters::style::Palette99;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::data_structures::AnomalyDataset;
use crate::error::{CalibratorError, Result};
use crate::utils::abs_difference;

pub const COMPARISON_FILE: &str = "normal_vs_anomalous_signal.png";
pub const OVERLAY_FILE: &str = "anomalous_dataset_overlay.png";

const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
const NAVY: RGBColor = RGBColor(0, 0, 128);

fn plot_err<E: std::fmt::Display>(e: E) -> CalibratorError {
    CalibratorError::Plot(e.to_string())
}

// y-range over several series, padded so nothing sits on the frame
fn y_range<'a, I>(series: I) -> (f64, f64)
where
    I: IntoIterator<Item = ArrayView1<'a, f64>>,
{
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for s in series {
        for &v in s.iter().filter(|v| v.is_finite()) {
            if v < y_min { y_min = v; }
            if v > y_max { y_max = v; }
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = 0.05 * (y_max - y_min).max(1e-6);
    (y_min - pad, y_max + pad)
}

fn x_end(n: usize) -> f64 {
    (n.saturating_sub(1)).max(1) as f64
}

fn prepare(folder: &Path, file: &str) -> Result<PathBuf> {
    create_dir_all(folder)?;
    Ok(folder.join(file))
}

/// Two panels: both signals on top, `|anomalous - original|` below.
pub fn plot_normal_and_anomalous_signal(
    signal: &Array1<f64>,
    anomaly_signal: &Array1<f64>,
    folder: &Path,
) -> Result<PathBuf> {
    let out_path = prepare(folder, COMPARISON_FILE)?;
    draw_comparison(&out_path, signal, anomaly_signal)?;
    info!(path = %out_path.display(), "wrote comparison plot");
    Ok(out_path)
}

// the backend borrows `out_path` until the drawing area is dropped
fn draw_comparison(out_path: &Path, signal: &Array1<f64>, anomaly_signal: &Array1<f64>) -> Result<()> {
    let n = signal.len();
    let diff = abs_difference(anomaly_signal, signal);

    let root = BitMapBackend::new(out_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let areas = root.split_evenly((2, 1));

    let (lo, hi) = y_range([signal.view(), anomaly_signal.view()]);
    let mut top = ChartBuilder::on(&areas[0])
        .margin(15)
        .set_left_and_bottom_label_area_size(40)
        .build_cartesian_2d(0.0..x_end(n), lo..hi)
        .map_err(plot_err)?;
    top.configure_mesh()
        .x_desc("Time (t)")
        .y_desc("Temperature (y)")
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(plot_err)?;

    top.draw_series(LineSeries::new(
        anomaly_signal.iter().enumerate().map(|(i, &v)| (i as f64, v)),
        DARK_ORANGE.stroke_width(2),
    ))
    .map_err(plot_err)?
    .label("Anomalous Signal")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DARK_ORANGE));
    top.draw_series(LineSeries::new(
        signal.iter().enumerate().map(|(i, &v)| (i as f64, v)),
        NAVY.stroke_width(1),
    ))
    .map_err(plot_err)?
    .label("Non anomalous Signal")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], NAVY));
    top.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    let (lo, hi) = y_range([diff.view()]);
    let mut bottom = ChartBuilder::on(&areas[1])
        .margin(15)
        .set_left_and_bottom_label_area_size(40)
        .build_cartesian_2d(0.0..x_end(n), lo..hi)
        .map_err(plot_err)?;
    bottom.configure_mesh()
        .x_desc("Time (t)")
        .y_desc("|Signal - Anomalous Signal|")
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(plot_err)?;
    bottom.draw_series(LineSeries::new(
        diff.iter().enumerate().map(|(i, &v)| (i as f64, v)),
        BLACK.stroke_width(1),
    ))
    .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Every dataset row overlaid, base signal drawn last in black.
pub fn plot_anomaly_dataset(
    dataset: &AnomalyDataset,
    signal: &Array1<f64>,
    folder: &Path,
) -> Result<PathBuf> {
    let out_path = prepare(folder, OVERLAY_FILE)?;
    draw_overlay(&out_path, dataset, signal)?;
    info!(path = %out_path.display(), rows = dataset.n_rows(), "wrote dataset overlay");
    Ok(out_path)
}

fn draw_overlay(out_path: &Path, dataset: &AnomalyDataset, signal: &Array1<f64>) -> Result<()> {
    let n = signal.len();

    let root = BitMapBackend::new(out_path, (1200, 500)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (lo, hi) = y_range(dataset.signals.rows().into_iter().chain([signal.view()]));
    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .set_left_and_bottom_label_area_size(40)
        .caption(
            format!("Anomalous variants  |  rows: {}  threshold: {:.3}", dataset.n_rows(), dataset.threshold),
            ("sans-serif", 18),
        )
        .build_cartesian_2d(0.0..x_end(n), lo..hi)
        .map_err(plot_err)?;
    chart.configure_mesh()
        .x_desc("Time (t)")
        .y_desc("y")
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(plot_err)?;

    for (k, row) in dataset.signals.rows().into_iter().enumerate() {
        let style = Palette99::pick(k).stroke_width(1);
        let pts = row.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect::<Vec<_>>();
        chart.draw_series(LineSeries::new(pts, style)).map_err(plot_err)?;
    }
    chart
        .draw_series(LineSeries::new(
            signal.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            BLACK.stroke_width(1),
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}
