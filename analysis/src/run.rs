use gs2_common::{read_toml, FilmParameters, RunParameters, SpeciesParameters};
use ndarray::{Array1, Array3, Axis};
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::field::load_real_field;
use crate::utils::error::{AnalysisError, Result};
use crate::utils::fft::{real_ny, real_space_grid};
use crate::utils::io::{read_1d, read_2d, ArraySource};

/// Spectral potential, `(t, ky, kx, ri)`
pub const PHI: &str = "phi_igomega_by_mode";
/// Spectral density perturbation, `(t, species, ky, kx, ri)`
pub const NTOT: &str = "ntot_igomega_by_mode";
/// Electrostatic heat flux, `(t, species)`
pub const HEAT_FLUX: &str = "es_heat_flux";

/// Species names, in the order GS2 stores them
pub const SPECIES_SUFFIX: [&str; 2] = ["i", "e"];

/// Everything known about a run before any field is read.
///
/// Built once; fields are returned by the loaders rather than stored here.
#[derive(Debug, Clone)]
pub struct RunMetadata {
    /// Directory holding the run toml; outputs go below it
    pub run_dir: PathBuf,

    // Grid
    pub nx: usize,
    pub ny: usize,
    pub nt: usize,
    pub nkx: usize,
    pub nky: usize,

    // Reference scales
    pub nref: f64,
    pub tref: f64,
    pub vth: f64,
    pub rhoref: f64,
    pub amin: f64,
    pub rho_star: f64,
    pub rmaj: f64,

    pub g_exb: f64,
    pub lab_frame: bool,
    pub version: u32,
    pub species: [SpeciesParameters; 2],
    pub film: FilmParameters,

    /// Radial coordinate (m)
    pub x: Array1<f64>,
    /// Binormal coordinate (m)
    pub y: Array1<f64>,
    /// Time (s)
    pub t: Array1<f64>,
}

impl RunMetadata {
    /// Combines the run description with the grid stored in `source`.
    pub fn load<S: ArraySource + ?Sized>(
        params: RunParameters,
        run_dir: impl Into<PathBuf>,
        source: &S,
    ) -> Result<Self> {
        let species: [SpeciesParameters; 2] =
            params
                .species
                .try_into()
                .map_err(|s: Vec<SpeciesParameters>| AnalysisError::Precondition {
                    msg: format!("expected 2 species (ion, electron), got {}", s.len()),
                })?;

        let kx = read_1d(source, "kx")?;
        let ky = read_1d(source, "ky")?;
        let t = read_1d(source, "t")?;
        if kx.len() < 2 || ky.len() < 2 {
            return Err(AnalysisError::Precondition {
                msg: format!(
                    "need at least two kx and ky modes, got {} and {}",
                    kx.len(),
                    ky.len()
                ),
            });
        }

        let reference = params.reference;
        let vth = reference.vth();
        let rhoref = reference.rhoref();

        let nkx = kx.len();
        let nky = ky.len();
        let nx = nkx;
        let ny = real_ny(nky);

        let meta = RunMetadata {
            run_dir: run_dir.into(),
            nx,
            ny,
            nt: t.len(),
            nkx,
            nky,
            nref: reference.nref,
            tref: reference.tref,
            vth,
            rhoref,
            amin: reference.amin,
            rho_star: reference.rho_star(),
            rmaj: reference.rmaj,
            g_exb: params.g_exb,
            lab_frame: params.lab_frame,
            version: params.version,
            species,
            film: params.film,
            x: real_space_grid(&kx, nx) * rhoref,
            y: real_space_grid(&ky, ny) * rhoref,
            t: t * (reference.amin / vth),
        };
        log::debug!(
            "grid (nt, nx, ny) = ({}, {}, {}), rho_star = {:.4e}",
            meta.nt,
            meta.nx,
            meta.ny,
            meta.rho_star
        );

        Ok(meta)
    }
}

/// Reads a spectral moment and returns it in real space, scaled by `rho_star`.
pub fn read_moment<S: ArraySource + ?Sized>(
    meta: &RunMetadata,
    source: &S,
    variable: &str,
    species: Option<usize>,
) -> Result<Array3<f64>> {
    log::info!("Reading {}...", moment_name(variable, species));
    load_real_field(source, variable, species, meta.rho_star)
}

/// Reads the heat flux time series of one species, in gyro-Bohm units.
pub fn read_heat_flux<S: ArraySource + ?Sized>(source: &S, species: usize) -> Result<Array1<f64>> {
    log::info!("Reading q_{}...", species_suffix(species));
    let flux = read_2d(source, HEAT_FLUX)?;
    let count = flux.len_of(Axis(1));
    if species >= count {
        return Err(AnalysisError::SpeciesOutOfRange {
            name: HEAT_FLUX.to_string(),
            index: species,
            count,
        });
    }
    Ok(flux.index_axis_move(Axis(1), species))
}

/// A run opened from its toml description, holding the GS2 output file open.
pub struct Run {
    pub meta: RunMetadata,
    pub cdf_file: netcdf::File,
}

impl Run {
    /// Opens the run described by the toml at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let params = read_toml(path)?;

        let run_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let cdf_path = run_dir.join(&params.netcdf_file);
        log::info!("Opening {}", cdf_path.display());
        let cdf_file = netcdf::open(&cdf_path)?;

        let meta = RunMetadata::load(params, run_dir, &cdf_file)?;
        Ok(Run { meta, cdf_file })
    }

    pub fn read_phi(&self) -> Result<Array3<f64>> {
        read_moment(&self.meta, &self.cdf_file, PHI, None)
    }

    pub fn read_ntot(&self, species: usize) -> Result<Array3<f64>> {
        read_moment(&self.meta, &self.cdf_file, NTOT, Some(species))
    }

    pub fn read_heat_flux(&self, species: usize) -> Result<Array1<f64>> {
        read_heat_flux(&self.cdf_file, species)
    }
}

fn species_suffix(species: usize) -> impl Display {
    SPECIES_SUFFIX
        .get(species)
        .map(|s| s.to_string())
        .unwrap_or_else(|| species.to_string())
}

/// Short name of a moment, e.g. `ntot_e`
fn moment_name(variable: &str, species: Option<usize>) -> String {
    let base = variable.trim_end_matches("_igomega_by_mode");
    match species {
        Some(s) => format!("{base}_{}", species_suffix(s)),
        None => base.to_string(),
    }
}
