//! Extraction of spectral moments from a source file and their conversion to
//! real-space fields.
//!
//! GS2 stores each moment with a trailing `ri` dimension holding the real and
//! imaginary parts, in the layouts `(t, ky, kx, ri)` (potential) and
//! `(t, species, ky, kx, ri)` (per-species moments). Fields leave this module
//! ordered `(t, kx, ky)` in mode space or `(t, x, y)` in real space.

use ndarray::{Array3, Array4, ArrayBase, Axis, Data, Dimension, Ix4, Ix5};
use ndrustfft::Complex;

use crate::utils::error::{AnalysisError, Result};
use crate::utils::fft::{forward_2d, inverse_2d};
use crate::utils::io::ArraySource;

/// Number of contour levels used to fix the colour scale of a film
pub const N_CONTOURS: usize = 30;

/// Reads the spectral array `name`, optionally restricted to one species.
///
/// With `species = None` the variable must not carry a species dimension; with
/// `Some(index)` it must, and only that species is returned.
pub fn get_field<S: ArraySource + ?Sized>(
    source: &S,
    name: &str,
    species: Option<usize>,
) -> Result<Array3<Complex<f64>>> {
    let raw = source.read_array(name)?;
    let found = raw.shape().to_vec();
    let shape_error = |expected: &str| AnalysisError::UnexpectedShape {
        name: name.to_string(),
        expected: expected.to_string(),
        found: found.clone(),
    };

    let raw: Array4<f64> = match species {
        None => raw
            .into_dimensionality::<Ix4>()
            .map_err(|_| shape_error("(t, ky, kx, ri)"))?,
        Some(index) => {
            let raw = raw
                .into_dimensionality::<Ix5>()
                .map_err(|_| shape_error("(t, species, ky, kx, ri)"))?;
            let count = raw.len_of(Axis(1));
            if index >= count {
                return Err(AnalysisError::SpeciesOutOfRange {
                    name: name.to_string(),
                    index,
                    count,
                });
            }
            raw.index_axis_move(Axis(1), index)
        }
    };

    let (nt, nky, nkx, nri) = raw.dim();
    if nri != 2 {
        return Err(shape_error("trailing ri dimension of length 2"));
    }
    if nky == 0 || nkx == 0 {
        return Err(shape_error("at least one kx and one ky mode"));
    }

    // Combine real/imag and swap to (t, kx, ky)
    Ok(Array3::from_shape_fn((nt, nkx, nky), |(it, ikx, iky)| {
        Complex::new(raw[[it, iky, ikx, 0]], raw[[it, iky, ikx, 1]])
    }))
}

/// Converts a `(t, kx, ky)` spectral field to `(t, x, y)` real space.
pub fn field_to_real_space(spectral: &Array3<Complex<f64>>) -> Array3<f64> {
    inverse_2d(spectral)
}

/// Converts a `(t, x, y)` real field back to `(t, kx, ky)` modes.
///
/// Fails unless `y` has the odd length produced by [`field_to_real_space`].
pub fn real_space_to_field(real: &Array3<f64>) -> Result<Array3<Complex<f64>>> {
    let ny = real.len_of(Axis(2));
    if ny % 2 == 0 {
        return Err(AnalysisError::Precondition {
            msg: format!("real-space y grid must have odd length, got {ny}"),
        });
    }
    Ok(forward_2d(real))
}

/// Contour levels spanning `[-max|field|, max|field|]`.
///
/// The levels are exactly symmetric about zero. An all-zero field yields
/// `N_CONTOURS` zeros.
pub fn calculate_contours<S, D>(field: &ArrayBase<S, D>) -> Vec<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let max = field
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));

    let steps = (N_CONTOURS - 1) as f64;
    (0..N_CONTOURS)
        .map(|i| max * (2.0 * i as f64 - steps) / steps)
        .collect()
}

/// Fetches `name`, transforms it to real space and scales it by `rho_star`.
pub fn load_real_field<S: ArraySource + ?Sized>(
    source: &S,
    name: &str,
    species: Option<usize>,
    rho_star: f64,
) -> Result<Array3<f64>> {
    let spectral = get_field(source, name, species)?;
    log::debug!("{name} (species {species:?}) has modes {:?}", spectral.dim());

    let mut real = field_to_real_space(&spectral);
    drop(spectral);

    real.mapv_inplace(|v| v * rho_star);
    Ok(real)
}
