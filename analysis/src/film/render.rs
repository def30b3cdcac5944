use ndarray::{Array1, Array3, ArrayView2, Axis};
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;
use std::process::{Command, Stdio};

use super::options::{Aspect, FilmOptions, PlotOptions};
use super::Animator;
use crate::utils::error::{AnalysisError, Result};

/// Smallest frame width that leaves room for the colour bar and labels
pub const MIN_FRAME_WIDTH: u32 = 200;

/// Draws frames with `plotters` and stitches them together with `ffmpeg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlottersAnimator;

impl PlottersAnimator {
    pub fn new() -> Self {
        PlottersAnimator
    }
}

impl Animator for PlottersAnimator {
    fn make_film_2d(
        &mut self,
        x: &Array1<f64>,
        y: &Array1<f64>,
        field: &Array3<f64>,
        plot_options: &PlotOptions,
        options: &FilmOptions,
    ) -> Result<()> {
        check_inputs(x, y, field, options)?;

        std::fs::create_dir_all(&options.frame_dir)?;
        std::fs::create_dir_all(&options.film_dir)?;
        let stale = clear_frames(options)?;
        if stale > 0 {
            log::debug!("Removed {stale} old {} frames", options.file_name);
        }

        let size = frame_size(x, y, options);
        log::debug!(
            "{}: {} frames of {}x{} px",
            options.file_name,
            field.len_of(Axis(0)),
            size.0,
            size.1
        );

        for (it, frame) in field.axis_iter(Axis(0)).enumerate() {
            let path = options.frame_path(it);
            draw_frame(
                &path,
                size,
                x,
                y,
                frame,
                plot_options,
                options,
                &options.title[it],
            )?;
            log::trace!("Wrote {}", path.display());
        }

        encode(options)?;
        log::info!("Wrote {}", options.film_path().display());
        Ok(())
    }
}

/// Deletes frames left in `frame_dir` by an earlier film of the same name.
///
/// The encoder reads every consecutively numbered frame it finds.
pub fn clear_frames(options: &FilmOptions) -> Result<usize> {
    let prefix = format!("{}_", options.file_name);
    let mut removed = 0;
    for entry in std::fs::read_dir(&options.frame_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let is_frame = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".png"))
            .map_or(false, |index| {
                !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())
            });
        if is_frame && path.is_file() {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn check_inputs(
    x: &Array1<f64>,
    y: &Array1<f64>,
    field: &Array3<f64>,
    options: &FilmOptions,
) -> Result<()> {
    let (nt, nx, ny) = field.dim();
    if nx != x.len() || ny != y.len() {
        return Err(AnalysisError::UnexpectedShape {
            name: options.file_name.clone(),
            expected: format!("(t, {}, {})", x.len(), y.len()),
            found: field.shape().to_vec(),
        });
    }
    if nt == 0 || nx == 0 || ny == 0 {
        return Err(AnalysisError::Precondition {
            msg: format!("{} has an empty dimension {:?}", options.file_name, field.shape()),
        });
    }
    if options.title.len() != nt {
        return Err(AnalysisError::Precondition {
            msg: format!("{} titles for {} frames", options.title.len(), nt),
        });
    }
    if options.frame_width < MIN_FRAME_WIDTH {
        return Err(AnalysisError::Precondition {
            msg: format!(
                "frame width {} px is below the minimum of {} px",
                options.frame_width, MIN_FRAME_WIDTH
            ),
        });
    }
    Ok(())
}

/// Outer edges of the grid, where cell `i` spans `[c[i], c[i] + dc)`
fn cell_edges(coords: &Array1<f64>) -> (f64, f64) {
    let n = coords.len();
    let step = if n > 1 { coords[1] - coords[0] } else { 1.0 };
    (coords[0], coords[n - 1] + step)
}

fn colorbar_width(options: &FilmOptions) -> u32 {
    (options.frame_width / 6).max(80)
}

/// Pixel size of each frame; both sides are even so the encoder accepts them.
pub fn frame_size(x: &Array1<f64>, y: &Array1<f64>, options: &FilmOptions) -> (u32, u32) {
    let width = options.frame_width;
    let plot_width = width.saturating_sub(colorbar_width(options)) as f64;

    let ratio = match options.aspect {
        Aspect::Equal => {
            let (x0, x1) = cell_edges(x);
            let (y0, y1) = cell_edges(y);
            let ratio = (y1 - y0) / (x1 - x0);
            if ratio.is_finite() && ratio > 0.0 {
                ratio.clamp(0.25, 4.0)
            } else {
                1.0
            }
        }
        Aspect::Auto => 0.75,
    };

    let height = (plot_width * ratio).round() as u32 + 2 * options.bbox.margin();
    (width & !1, height.max(MIN_FRAME_WIDTH / 2) & !1)
}

fn plot_error<E: Display>(err: E) -> AnalysisError {
    AnalysisError::Plot {
        msg: err.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_frame(
    path: &Path,
    size: (u32, u32),
    x: &Array1<f64>,
    y: &Array1<f64>,
    frame: ArrayView2<f64>,
    plot_options: &PlotOptions,
    options: &FilmOptions,
    title: &str,
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let (plot_area, cbar_area) = root.split_horizontally(size.0 - colorbar_width(options));
    let margin = options.bbox.margin();

    let (x0, x1) = cell_edges(x);
    let (y0, y1) = cell_edges(y);
    let dx = (x1 - x0) / x.len() as f64;
    let dy = (y1 - y0) / y.len() as f64;

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(margin)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(options.xlabel.as_str())
        .y_desc(options.ylabel.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(frame.indexed_iter().map(|((ix, iy), &value)| {
            let color = plot_options.color(value);
            Rectangle::new(
                [(x[ix], y[iy]), (x[ix] + dx, y[iy] + dy)],
                color.filled(),
            )
        }))
        .map_err(plot_error)?;

    draw_colorbar(&cbar_area, plot_options, options)?;

    root.present().map_err(plot_error)?;
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    plot_options: &PlotOptions,
    options: &FilmOptions,
) -> Result<()> {
    let (lo, hi) = if plot_options.is_degenerate() {
        let centre = plot_options.levels.first().copied().unwrap_or(0.0);
        (centre - 1.0, centre + 1.0)
    } else {
        (
            plot_options.levels[0],
            plot_options.levels[plot_options.levels.len() - 1],
        )
    };

    let mut bar = ChartBuilder::on(area)
        .margin(options.bbox.margin())
        .margin_top(options.bbox.margin() + 30)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(plot_error)?;

    bar.configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_labels(options.cbar_ticks)
        .y_desc(options.cbar_label.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(plot_error)?;

    if plot_options.is_degenerate() {
        bar.draw_series(std::iter::once(Rectangle::new(
            [(0.0, lo), (1.0, hi)],
            plot_options.band_color(0).filled(),
        )))
        .map_err(plot_error)?;
    } else {
        bar.draw_series((0..plot_options.n_bands()).map(|band| {
            Rectangle::new(
                [
                    (0.0, plot_options.levels[band]),
                    (1.0, plot_options.levels[band + 1]),
                ],
                plot_options.band_color(band).filled(),
            )
        }))
        .map_err(plot_error)?;
    }
    Ok(())
}

/// Arguments handed to the encoder for `options`
pub fn encoder_args(options: &FilmOptions) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-framerate".to_string(),
        options.fps.to_string(),
        "-i".to_string(),
        options.frame_pattern().display().to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        options.film_path().display().to_string(),
    ]
}

fn encode(options: &FilmOptions) -> Result<()> {
    let output = Command::new(&options.encoder)
        .args(encoder_args(options))
        .stdin(Stdio::null())
        .output()
        .map_err(|e| AnalysisError::Encoder {
            msg: format!("could not run {}: {e}", options.encoder),
        })?;

    if !output.status.success() {
        log::error!("{}", String::from_utf8_lossy(&output.stderr));
        return Err(AnalysisError::Encoder {
            msg: format!(
                "{} exited with {} while writing {}",
                options.encoder,
                output.status,
                options.film_path().display()
            ),
        });
    }
    Ok(())
}
