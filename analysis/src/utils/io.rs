use ndarray::{Array1, Array2, ArrayD, Ix1, Ix2};
use std::collections::HashMap;

use super::error::{AnalysisError, Result};

/// Read access to named arrays of a source file.
///
/// Every read goes back to the source; nothing is cached.
pub trait ArraySource {
    /// Reads the whole of variable `name` as `f64`.
    fn read_array(&self, name: &str) -> Result<ArrayD<f64>>;
}

impl ArraySource for netcdf::File {
    fn read_array(&self, name: &str) -> Result<ArrayD<f64>> {
        let variable = self
            .variable(name)
            .ok_or_else(|| AnalysisError::MissingVariable {
                name: name.to_string(),
            })?;
        Ok(variable.values::<f64>(None, None)?)
    }
}

/// In-memory source, keyed by variable name
impl ArraySource for HashMap<String, ArrayD<f64>> {
    fn read_array(&self, name: &str) -> Result<ArrayD<f64>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| AnalysisError::MissingVariable {
                name: name.to_string(),
            })
    }
}

/// Reads a one-dimensional variable, e.g. a coordinate array
pub fn read_1d<S: ArraySource + ?Sized>(source: &S, name: &str) -> Result<Array1<f64>> {
    let array = source.read_array(name)?;
    let found = array.shape().to_vec();
    array
        .into_dimensionality::<Ix1>()
        .map_err(|_| AnalysisError::UnexpectedShape {
            name: name.to_string(),
            expected: "(n,)".to_string(),
            found,
        })
}

/// Reads a two-dimensional variable, e.g. a (t, species) flux
pub fn read_2d<S: ArraySource + ?Sized>(source: &S, name: &str) -> Result<Array2<f64>> {
    let array = source.read_array(name)?;
    let found = array.shape().to_vec();
    array
        .into_dimensionality::<Ix2>()
        .map_err(|_| AnalysisError::UnexpectedShape {
            name: name.to_string(),
            expected: "(n, m)".to_string(),
            found,
        })
}
