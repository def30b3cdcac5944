use plotters::style::RGBColor;
use std::path::PathBuf;

use super::Quantity;
use crate::run::RunMetadata;

/// Films are written here, relative to the run directory
pub const FILM_DIR: &str = "analysis/moments";
/// Individual frames are written here, relative to the run directory
pub const FRAME_DIR: &str = "analysis/moments/film_frames";

/// How the plot area is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    /// One metre in x takes as many pixels as one metre in y
    Equal,
    /// Fixed 4:3 plot area regardless of the box
    Auto,
}

/// Whitespace kept around the plot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundingBox {
    Tight,
    Standard,
}

impl BoundingBox {
    pub fn margin(&self) -> u32 {
        match self {
            BoundingBox::Tight => 10,
            BoundingBox::Standard => 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    /// Diverging dark blue → white → dark red
    Seismic,
}

impl ColorMap {
    /// Colour at `fraction` in [0, 1]; values outside are clamped.
    pub fn color(&self, fraction: f64) -> RGBColor {
        let anchors: &[(f64, f64, f64)] = match self {
            ColorMap::Seismic => &[
                (0.0, 0.0, 0.3),
                (0.0, 0.0, 1.0),
                (1.0, 1.0, 1.0),
                (1.0, 0.0, 0.0),
                (0.5, 0.0, 0.0),
            ],
        };

        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.5
        };
        let position = fraction * (anchors.len() - 1) as f64;
        let lower = (position.floor() as usize).min(anchors.len() - 2);
        let weight = position - lower as f64;

        let (r0, g0, b0) = anchors[lower];
        let (r1, g1, b1) = anchors[lower + 1];
        let channel = |a: f64, b: f64| ((a + (b - a) * weight) * 255.0).round() as u8;

        RGBColor(channel(r0, r1), channel(g0, g1), channel(b0, b1))
    }
}

/// Options that decide how field values become colours
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Ascending contour levels; fixed for every frame of a film
    pub levels: Vec<f64>,
    pub cmap: ColorMap,
}

impl PlotOptions {
    pub fn new(levels: Vec<f64>) -> Self {
        PlotOptions {
            levels,
            cmap: ColorMap::Seismic,
        }
    }

    /// Whether the levels span a zero-width range
    pub fn is_degenerate(&self) -> bool {
        match (self.levels.first(), self.levels.last()) {
            (Some(lo), Some(hi)) => !(hi > lo),
            _ => true,
        }
    }

    pub fn n_bands(&self) -> usize {
        self.levels.len().saturating_sub(1).max(1)
    }

    /// Band containing `value`; values beyond the outer levels fall in the end bands.
    pub fn band(&self, value: f64) -> usize {
        if self.is_degenerate() {
            return 0;
        }
        let above = self.levels.partition_point(|&level| level <= value);
        above.saturating_sub(1).min(self.n_bands() - 1)
    }

    /// Colour of band `band`, taken at its midpoint
    pub fn band_color(&self, band: usize) -> RGBColor {
        if self.is_degenerate() {
            return self.cmap.color(0.5);
        }
        let lo = self.levels[0];
        let hi = self.levels[self.levels.len() - 1];
        let mid = (self.levels[band] + self.levels[band + 1]) / 2.0;
        self.cmap.color((mid - lo) / (hi - lo))
    }

    pub fn color(&self, value: f64) -> RGBColor {
        self.band_color(self.band(value))
    }
}

/// Everything needed to turn one field into a film
#[derive(Debug, Clone, PartialEq)]
pub struct FilmOptions {
    /// Base name of the frames and of the video
    pub file_name: String,
    pub film_dir: PathBuf,
    pub frame_dir: PathBuf,
    pub aspect: Aspect,
    pub xlabel: String,
    pub ylabel: String,
    /// Number of labels on the colour bar
    pub cbar_ticks: usize,
    pub cbar_label: String,
    pub bbox: BoundingBox,
    pub fps: u32,
    /// Frame width in pixels; the height follows from `aspect`
    pub frame_width: u32,
    /// Video encoder executable
    pub encoder: String,
    /// One title per frame
    pub title: Vec<String>,
}

impl FilmOptions {
    pub fn for_quantity(meta: &RunMetadata, quantity: &Quantity) -> Self {
        FilmOptions {
            file_name: quantity.file_name.to_string(),
            film_dir: meta.run_dir.join(FILM_DIR),
            frame_dir: meta.run_dir.join(FRAME_DIR),
            aspect: Aspect::Equal,
            xlabel: "x (m)".to_string(),
            ylabel: "y (m)".to_string(),
            cbar_ticks: 5,
            cbar_label: quantity.cbar_label.to_string(),
            bbox: BoundingBox::Tight,
            fps: meta.film.fps,
            frame_width: meta.film.frame_width,
            encoder: meta.film.ffmpeg.clone(),
            title: super::frame_titles(&meta.t),
        }
    }

    /// Path of frame `it`
    pub fn frame_path(&self, it: usize) -> PathBuf {
        self.frame_dir.join(format!("{}_{:05}.png", self.file_name, it))
    }

    /// printf-style pattern matching every frame, for the encoder
    pub fn frame_pattern(&self) -> PathBuf {
        self.frame_dir.join(format!("{}_%05d.png", self.file_name))
    }

    pub fn film_path(&self) -> PathBuf {
        self.film_dir.join(format!("{}.mp4", self.file_name))
    }
}
