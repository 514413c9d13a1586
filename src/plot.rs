use std::{ops::Range, path::Path};

use plotters::prelude::*;

use crate::{
    dataset::Dataset,
    error::{FitErr, Result},
};

const SIZE: (u32, u32) = (1024, 768);
const POINT_SIZE: u32 = 3;

/// Renders a 3D scatter plot of the raw points as an SVG file.
///
/// Height and number of entities span the horizontal plane, memory is the
/// vertical axis.
///
/// # Errors
/// Returns `FitErr::Plot` if the backend fails to draw or write the file.
pub fn scatter_3d(dataset: &Dataset, path: &Path) -> Result<()> {
    let records = dataset.records();
    let heights = span(records.iter().map(|r| r.height));
    let entities = span(records.iter().map(|r| r.num_entities));
    let memory = span(records.iter().map(|r| r.memory_mb));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Memory usage", ("sans-serif", 24))
        .margin(20)
        .build_cartesian_3d(heights.clone(), memory.clone(), entities.clone())
        .map_err(plot_err)?;

    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.3;
        pb.scale = 0.8;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()
        .map_err(plot_err)?;

    let label = ("sans-serif", 16).into_font().color(&BLACK);
    let axis_labels = [
        ("Height", (heights.end, memory.start, entities.start)),
        ("Number of entities", (heights.start, memory.start, entities.end)),
        ("Memory (MB)", (heights.start, memory.end, entities.start)),
    ];
    chart
        .draw_series(
            axis_labels
                .into_iter()
                .map(|(text, pos)| Text::new(text, pos, label.clone())),
        )
        .map_err(plot_err)?;

    chart
        .draw_series(records.iter().map(|r| {
            Circle::new(
                (r.height, r.memory_mb, r.num_entities),
                POINT_SIZE,
                BLUE.filled(),
            )
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    log::info!("wrote scatter plot of {} point(s) to {}", records.len(), path.display());
    Ok(())
}

/// Smallest range holding every value, widened by one on each side when all
/// values are equal.
fn span(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if lo == hi {
        return lo - 1.0..hi + 1.0;
    }
    lo..hi
}

fn plot_err<E: std::error::Error>(e: E) -> FitErr {
    FitErr::Plot(e.to_string())
}
