use gs2_common::{FilmParameters, ReferenceParameters, RunParameters, SpeciesParameters};
use ndarray::{Array1, Array2, ArrayD};
use std::collections::HashMap;

use crate::run::HEAT_FLUX;

/// Deuterium-like two species run
pub(crate) fn run_parameters() -> RunParameters {
    RunParameters {
        netcdf_file: "run.out.nc".to_string(),
        reference: ReferenceParameters {
            nref: 1e19,
            tref: 500.0,
            amin: 0.5,
            bref: 1.0,
            mref: 2.0,
            rmaj: 0.8,
        },
        g_exb: 0.1,
        lab_frame: false,
        version: 1,
        species: vec![
            SpeciesParameters {
                mass: 1.0,
                tprim: 3.0,
                fprim: 1.0,
            },
            SpeciesParameters {
                mass: 2.7e-4,
                tprim: 3.0,
                fprim: 1.0,
            },
        ],
        film: FilmParameters::default(),
    }
}

/// GS2-style mode grid with `nkx` kx modes (zero, positive, then negative) and
/// `nky` non-negative ky modes, plus a heat flux of 1 (ions) and 2 (electrons).
pub(crate) fn grid_source(nt: usize, nkx: usize, nky: usize) -> HashMap<String, ArrayD<f64>> {
    let dk = 0.1;
    let kx = Array1::from_shape_fn(nkx, |i| {
        let m = if i <= (nkx - 1) / 2 {
            i as f64
        } else {
            i as f64 - nkx as f64
        };
        m * dk
    });
    let ky = Array1::from_shape_fn(nky, |i| i as f64 * dk);
    let t = Array1::from_shape_fn(nt, |i| 10.0 + i as f64);
    let flux = Array2::from_shape_fn((nt, 2), |(_, s)| (s + 1) as f64);

    let mut source = HashMap::new();
    source.insert("kx".to_string(), kx.into_dyn());
    source.insert("ky".to_string(), ky.into_dyn());
    source.insert("t".to_string(), t.into_dyn());
    source.insert(HEAT_FLUX.to_string(), flux.into_dyn());
    source
}
