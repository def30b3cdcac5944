//! Films of each fluctuating moment over the course of a run.
//!
//! Every quantity goes through the same pipeline: fetch the spectral field,
//! select the species, transform to real space, scale by `rho_star`, fix the
//! contour levels from the data range and hand the field to an [`Animator`].
//! Only one real-space field is alive at a time.

pub mod options;
pub mod render;

use ndarray::{Array1, Array3};

use crate::field::calculate_contours;
use crate::run::{read_moment, Run, RunMetadata, NTOT, PHI};
use crate::utils::error::Result;
use crate::utils::io::ArraySource;

pub use options::{Aspect, BoundingBox, ColorMap, FilmOptions, PlotOptions};
pub use render::PlottersAnimator;

/// Describes one film: which field to read and how to label it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity {
    pub file_name: &'static str,
    pub variable: &'static str,
    /// `None` for fields without a species dimension
    pub species: Option<usize>,
    pub cbar_label: &'static str,
}

const UPAR: &str = "upar_igomega_by_mode";
const TPAR: &str = "tpar_igomega_by_mode";
const TPERP: &str = "tperp_igomega_by_mode";

/// Films produced by [`render_all`], in order
pub const QUANTITIES: [Quantity; 9] = [
    Quantity {
        file_name: "phi",
        variable: PHI,
        species: None,
        cbar_label: "φ",
    },
    Quantity {
        file_name: "ntot_i",
        variable: NTOT,
        species: Some(0),
        cbar_label: "δn_i / n_r",
    },
    Quantity {
        file_name: "ntot_e",
        variable: NTOT,
        species: Some(1),
        cbar_label: "δn_e / n_r",
    },
    Quantity {
        file_name: "upar_i",
        variable: UPAR,
        species: Some(0),
        cbar_label: "u_i,∥",
    },
    Quantity {
        file_name: "upar_e",
        variable: UPAR,
        species: Some(1),
        cbar_label: "u_e,∥",
    },
    Quantity {
        file_name: "tpar_i",
        variable: TPAR,
        species: Some(0),
        cbar_label: "δT_i,∥ / T_r",
    },
    Quantity {
        file_name: "tpar_e",
        variable: TPAR,
        species: Some(1),
        cbar_label: "δT_e,∥ / T_r",
    },
    Quantity {
        file_name: "tperp_i",
        variable: TPERP,
        species: Some(0),
        cbar_label: "δT_i,⊥ / T_r",
    },
    Quantity {
        file_name: "tperp_e",
        variable: TPERP,
        species: Some(1),
        cbar_label: "δT_e,⊥ / T_r",
    },
];

/// Turns a `(t, x, y)` field into a film.
pub trait Animator {
    fn make_film_2d(
        &mut self,
        x: &Array1<f64>,
        y: &Array1<f64>,
        field: &Array3<f64>,
        plot_options: &PlotOptions,
        options: &FilmOptions,
    ) -> Result<()>;
}

/// One title per time step showing the elapsed time in microseconds
pub fn frame_titles(t: &Array1<f64>) -> Vec<String> {
    let Some(&t0) = t.first() else {
        return vec![];
    };
    t.iter()
        .map(|&ti| {
            let micros = ((ti - t0) * 1e6).round_ties_even() as i64;
            format!("Time = {micros:04} μs")
        })
        .collect()
}

/// Reads, transforms and animates a single quantity.
pub fn render_quantity<S, A>(
    meta: &RunMetadata,
    source: &S,
    quantity: &Quantity,
    animator: &mut A,
) -> Result<()>
where
    S: ArraySource + ?Sized,
    A: Animator + ?Sized,
{
    let field = read_moment(meta, source, quantity.variable, quantity.species)?;

    let plot_options = PlotOptions::new(calculate_contours(&field));
    let options = FilmOptions::for_quantity(meta, quantity);

    animator.make_film_2d(&meta.x, &meta.y, &field, &plot_options, &options)?;
    drop(field);

    log::info!("Finished {} film", quantity.file_name);
    Ok(())
}

/// Renders every entry of [`QUANTITIES`] in order, stopping at the first failure.
pub fn render_all<S, A>(meta: &RunMetadata, source: &S, animator: &mut A) -> Result<()>
where
    S: ArraySource + ?Sized,
    A: Animator + ?Sized,
{
    for quantity in QUANTITIES.iter() {
        render_quantity(meta, source, quantity, animator)?;
    }
    Ok(())
}

/// Renders every film for an opened run.
pub fn render_run<A: Animator + ?Sized>(run: &Run, animator: &mut A) -> Result<()> {
    render_all(&run.meta, &run.cdf_file, animator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{grid_source, run_parameters};
    use crate::utils::error::AnalysisError;
    use ndarray::{arr1, ArrayD, IxDyn};
    use std::collections::HashMap;

    /// Records every invocation instead of drawing
    #[derive(Default)]
    struct RecordingAnimator {
        calls: Vec<(FilmOptions, PlotOptions, (usize, usize, usize))>,
        fail_on: Option<&'static str>,
    }

    impl Animator for RecordingAnimator {
        fn make_film_2d(
            &mut self,
            x: &Array1<f64>,
            y: &Array1<f64>,
            field: &Array3<f64>,
            plot_options: &PlotOptions,
            options: &FilmOptions,
        ) -> Result<()> {
            assert_eq!(x.len(), field.dim().1);
            assert_eq!(y.len(), field.dim().2);
            if self.fail_on == Some(options.file_name.as_str()) {
                return Err(AnalysisError::Encoder {
                    msg: "refused".to_string(),
                });
            }
            self.calls
                .push((options.clone(), plot_options.clone(), field.dim()));
            Ok(())
        }
    }

    /// Grid plus every moment, all zero
    fn zero_source(nt: usize, nkx: usize, nky: usize) -> HashMap<String, ArrayD<f64>> {
        let mut source = grid_source(nt, nkx, nky);
        source.insert(
            PHI.to_string(),
            ArrayD::zeros(IxDyn(&[nt, nky, nkx, 2])),
        );
        for variable in [NTOT, UPAR, TPAR, TPERP] {
            source.insert(
                variable.to_string(),
                ArrayD::zeros(IxDyn(&[nt, 2, nky, nkx, 2])),
            );
        }
        source
    }

    #[test]
    fn test_frame_titles() {
        let titles = frame_titles(&arr1(&[2.0e-3, 2.0e-3 + 1.2e-6, 2.0e-3 + 25.0e-6]));
        assert_eq!(titles, vec!["Time = 0000 μs", "Time = 0001 μs", "Time = 0025 μs"]);
        assert!(frame_titles(&arr1(&[])).is_empty());
    }

    #[test]
    fn test_zero_field_still_animates() {
        let source = zero_source(3, 4, 3);
        let meta = RunMetadata::load(run_parameters(), "run", &source).unwrap();
        let mut animator = RecordingAnimator::default();

        render_quantity(&meta, &source, &QUANTITIES[0], &mut animator).unwrap();

        assert_eq!(animator.calls.len(), 1);
        let (options, plot_options, dim) = &animator.calls[0];
        assert_eq!(options.file_name, "phi");
        assert_eq!(*dim, (3, 4, 5));
        assert!(!plot_options.levels.is_empty());
        assert!(plot_options.levels.iter().all(|l| l.is_finite()));
        assert_eq!(options.title.len(), 3);
    }

    #[test]
    fn test_render_all_in_order() {
        let source = zero_source(2, 3, 2);
        let meta = RunMetadata::load(run_parameters(), "run", &source).unwrap();
        let mut animator = RecordingAnimator::default();

        render_all(&meta, &source, &mut animator).unwrap();

        let names: Vec<&str> = animator
            .calls
            .iter()
            .map(|(options, _, _)| options.file_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "phi", "ntot_i", "ntot_e", "upar_i", "upar_e", "tpar_i", "tpar_e", "tperp_i",
                "tperp_e"
            ]
        );
    }

    #[test]
    fn test_render_all_stops_at_first_failure() {
        let source = zero_source(2, 3, 2);
        let meta = RunMetadata::load(run_parameters(), "run", &source).unwrap();
        let mut animator = RecordingAnimator {
            fail_on: Some("upar_i"),
            ..Default::default()
        };

        let err = render_all(&meta, &source, &mut animator).unwrap_err();
        assert!(matches!(err, AnalysisError::Encoder { .. }));
        assert_eq!(animator.calls.len(), 3);
    }

    #[test]
    fn test_missing_moment_aborts() {
        let mut source = zero_source(2, 3, 2);
        source.remove(TPAR);
        let meta = RunMetadata::load(run_parameters(), "run", &source).unwrap();
        let mut animator = RecordingAnimator::default();

        let err = render_all(&meta, &source, &mut animator).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingVariable { name } if name == TPAR));
        assert_eq!(animator.calls.len(), 5);
    }

    #[test]
    fn test_film_options_for_quantity() {
        let source = zero_source(2, 3, 2);
        let mut params = run_parameters();
        params.film.fps = 12;
        let meta = RunMetadata::load(params, "run", &source).unwrap();

        let options = FilmOptions::for_quantity(&meta, &QUANTITIES[2]);
        assert_eq!(options.file_name, "ntot_e");
        assert_eq!(options.fps, 12);
        assert_eq!(options.cbar_ticks, 5);
        assert_eq!(options.aspect, Aspect::Equal);
        assert_eq!(options.bbox, BoundingBox::Tight);
        assert_eq!(
            options.frame_path(7),
            std::path::PathBuf::from("run/analysis/moments/film_frames/ntot_e_00007.png")
        );
        assert_eq!(
            options.film_path(),
            std::path::PathBuf::from("run/analysis/moments/ntot_e.mp4")
        );
    }
}
