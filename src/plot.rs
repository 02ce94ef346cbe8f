//! chart rendering of an [`Analysis`]. the drawing itself needs the `plot` feature,
//! without it [`render`] returns [`LabError::PlotUnavailable`].

use std::path::{Path, PathBuf};

use crate::{analysis::Analysis, error::LabError};

/// one line of the chart: the per configuration averages of one kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// # Description
/// what gets drawn, independent of the backend
/// * `log2_x`: x values are log2 of the real value, cache sizes double at each step
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub log2_x: bool,
    pub series: Vec<Series>,
}

impl ChartData {
    pub fn new(analysis: &Analysis) -> Self {
        let log2_x = analysis.independent.is_size();
        let series = analysis
            .groups
            .iter()
            .map(|(kernel, rows)| Series {
                name: kernel.clone(),
                points: rows
                    .iter()
                    .filter(|row| row.x > 0)
                    .filter_map(|row| {
                        let x = row.x as f64;
                        let x = if log2_x { x.log2() } else { x };
                        row.aggregate.average().map(|y| (x, y))
                    })
                    .collect(),
            })
            .filter(|s| !s.points.is_empty())
            .collect();
        let x_label = analysis.independent.axis_label().to_string();
        let y_label = analysis.dependent.axis_label();
        ChartData {
            title: format!("{} vs {}", y_label, x_label),
            x_label,
            y_label,
            log2_x,
            series,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// the text of an x axis tick
    pub fn format_x(&self, x: f64) -> String {
        if self.log2_x {
            format!("{}kB", 2f64.powf(x).round())
        } else {
            format!("{}", x)
        }
    }

    /// (x range, y range) with some room around the points
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let points = || self.series.iter().flat_map(|s| s.points.iter());
        let fold = |values: Vec<f64>| {
            values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(*v), hi.max(*v))
                })
        };
        let (x_lo, x_hi) = fold(points().map(|p| p.0).collect());
        let (y_lo, y_hi) = fold(points().map(|p| p.1).collect());
        let x_pad = ((x_hi - x_lo) * 0.05).max(0.5);
        let y_pad = ((y_hi - y_lo) * 0.1).max(y_hi.abs() * 0.1).max(1e-9);
        // rates and times are never negative, keep the axis at or above 0 for them
        let y_min = if y_lo >= 0.0 {
            (y_lo - y_pad).max(0.0)
        } else {
            y_lo - y_pad
        };
        ((x_lo - x_pad, x_hi + x_pad), (y_min, y_hi + y_pad))
    }
}

/// `plot_<x>_vs_<y>.png`, stat keys made file name friendly
pub fn default_output(analysis: &Analysis) -> PathBuf {
    let y: String = analysis
        .dependent
        .to_string()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    PathBuf::from(format!("plot_{}_vs_{}.png", analysis.independent, y))
}

#[cfg(feature = "plot")]
mod backend {
    use plotters::coord::Shift;
    use plotters::prelude::*;

    use super::ChartData;

    const SIZE: (u32, u32) = (1000, 600);

    fn err(e: impl std::fmt::Display) -> String {
        e.to_string()
    }

    fn draw<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, data: &ChartData) -> Result<(), String> {
        root.fill(&WHITE).map_err(err)?;
        let ((x_lo, x_hi), (y_lo, y_hi)) = data.bounds();
        let mut chart = ChartBuilder::on(root)
            .margin(20)
            .caption(&data.title, ("sans-serif", 24).into_font())
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
            .map_err(err)?;

        let format_x = |x: &f64| data.format_x(*x);
        chart
            .configure_mesh()
            .x_desc(data.x_label.as_str())
            .y_desc(data.y_label.as_str())
            .x_label_formatter(&format_x)
            .draw()
            .map_err(err)?;

        for (i, series) in data.series.iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    series.points.iter().copied(),
                    color.stroke_width(2),
                ))
                .map_err(err)?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart
                .draw_series(
                    series
                        .points
                        .iter()
                        .map(|p| Circle::new(*p, 4, color.filled())),
                )
                .map_err(err)?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(err)?;
        root.present().map_err(err)?;
        Ok(())
    }

    pub fn render(data: &ChartData, path: &std::path::Path) -> Result<(), String> {
        let is_svg = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);
        if is_svg {
            draw(&SVGBackend::new(path, SIZE).into_drawing_area(), data)
        } else {
            draw(&BitMapBackend::new(path, SIZE).into_drawing_area(), data)
        }
    }
}

/// whether this build can draw charts
pub fn available() -> bool {
    cfg!(feature = "plot")
}

/// # Description
/// draw `data` into `path`, svg for a `.svg` extension, a bitmap otherwise
/// # Return
/// `Err(PlotUnavailable)` when built without the `plot` feature
pub fn render(data: &ChartData, path: &Path) -> Result<(), LabError> {
    #[cfg(feature = "plot")]
    {
        backend::render(data, path).map_err(LabError::Plot)
    }
    #[cfg(not(feature = "plot"))]
    {
        let _ = (data, path);
        Err(LabError::PlotUnavailable)
    }
}
