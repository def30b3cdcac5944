use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{constants::*, error::CommonError};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunParameters {
    /// GS2 output file, relative to the directory holding this toml
    pub netcdf_file: String,
    /// Reference (normalizing) quantities of the run
    pub reference: ReferenceParameters,
    /// Flow shear rate
    pub g_exb: f64,
    /// Whether results are expressed in the lab frame rather than the rotating frame
    #[serde(default = "bool::default")]
    pub lab_frame: bool,
    /// Version tag encoded into output file names
    #[serde(default = "default_version")]
    pub version: u32,
    /// Species parameters, ions first then electrons
    pub species: Vec<SpeciesParameters>,
    /// Film rendering parameters
    #[serde(default)]
    pub film: FilmParameters,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ReferenceParameters {
    /// Reference density (m^-3)
    pub nref: f64,
    /// Reference temperature (eV)
    pub tref: f64,
    /// Minor radius (m)
    pub amin: f64,
    /// Reference magnetic field (T)
    pub bref: f64,
    /// Reference mass in units of the proton mass
    pub mref: f64,
    /// Major radius (m)
    pub rmaj: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SpeciesParameters {
    /// Mass in units of the reference mass
    pub mass: f64,
    /// Normalized temperature gradient
    pub tprim: f64,
    /// Normalized density gradient
    pub fprim: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FilmParameters {
    /// Frame rate of the assembled video
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Width of each frame in pixels
    #[serde(default = "default_frame_width")]
    pub frame_width: u32,
    /// Encoder executable
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
}

impl Default for FilmParameters {
    fn default() -> Self {
        FilmParameters {
            fps: default_fps(),
            frame_width: default_frame_width(),
            ffmpeg: default_ffmpeg(),
        }
    }
}

fn default_version() -> u32 {
    1
}

fn default_fps() -> u32 {
    30
}

fn default_frame_width() -> u32 {
    800
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

impl ReferenceParameters {
    /// Reference thermal speed (m/s), sqrt(2 T_ref / m_ref)
    pub fn vth(&self) -> f64 {
        (2.0 * self.tref * ELEMENTARY_CHARGE / (self.mref * PROTON_MASS)).sqrt()
    }

    /// Reference gyroradius (m)
    pub fn rhoref(&self) -> f64 {
        self.mref * PROTON_MASS * self.vth() / (ELEMENTARY_CHARGE * self.bref)
    }

    /// rho_ref / a_min
    pub fn rho_star(&self) -> f64 {
        self.rhoref() / self.amin
    }
}

/// Reads the run description at `path`.
pub fn read_toml(path: impl AsRef<Path>) -> Result<RunParameters, CommonError> {
    let path = path.as_ref();
    let display = || path.display().to_string();

    let contents =
        std::fs::read_to_string(path).map_err(|err| CommonError::RunFileUnreadable {
            path: display(),
            err,
        })?;

    toml::from_str(&contents).map_err(|e| CommonError::RunFileInvalid {
        path: display(),
        msg: e.to_string(),
    })
}

#[test]
fn test_deserialize_toml() {
    let netcdf_file = "v_id_1.out.nc";
    let nref = 1.3e19;
    let tref = 250.0;
    let amin = 0.58;
    let bref = 0.5;
    let mref = 2.0;
    let rmaj = 0.85;
    let g_exb = 0.15;

    let toml_contents: String = format!(
        "\
    netcdf_file                 = \"{netcdf_file}\"\n\
    g_exb                       = {g_exb}\n\
    lab_frame                   = true\n\n\
    \
    [reference]\n\
    nref                        = {nref:e}\n\
    tref                        = {tref:?}\n\
    amin                        = {amin}\n\
    bref                        = {bref}\n\
    mref                        = {mref:?}\n\
    rmaj                        = {rmaj}\n\n\
    \
    [[species]]\n\
    mass                        = 1.0\n\
    tprim                       = 4.5\n\
    fprim                       = 0.8\n\n\
    \
    [[species]]\n\
    mass                        = 2.7e-4\n\
    tprim                       = 4.5\n\
    fprim                       = 0.8\n\
    "
    );

    let toml: RunParameters = toml::from_str(&toml_contents).unwrap();

    assert_eq!(toml.netcdf_file, netcdf_file);
    assert_eq!(toml.g_exb, g_exb);
    assert!(toml.lab_frame);
    assert_eq!(toml.version, 1);
    assert_eq!(toml.reference.nref, nref);
    assert_eq!(toml.reference.rmaj, rmaj);
    assert_eq!(toml.species.len(), 2);
    assert_eq!(toml.species[1].mass, 2.7e-4);
    assert_eq!(toml.film, FilmParameters::default());
    assert_eq!(toml.film.fps, 30);
}

#[test]
fn test_partial_film_section() {
    let toml_contents = "\
    netcdf_file = \"run.out.nc\"\n\
    g_exb = 0.0\n\
    species = []\n\
    [reference]\n\
    nref = 1.0\n\
    tref = 1.0\n\
    amin = 1.0\n\
    bref = 1.0\n\
    mref = 1.0\n\
    rmaj = 1.0\n\
    [film]\n\
    fps = 12\n\
    ";

    let toml: RunParameters = toml::from_str(toml_contents).unwrap();
    assert!(!toml.lab_frame);
    assert_eq!(toml.film.fps, 12);
    assert_eq!(toml.film.frame_width, 800);
    assert_eq!(toml.film.ffmpeg, "ffmpeg");
}

#[test]
fn test_reference_derived_quantities() {
    use approx::assert_relative_eq;

    // Deuterium at 1 keV in 1 T
    let reference = ReferenceParameters {
        nref: 1e19,
        tref: 1000.0,
        amin: 0.5,
        bref: 1.0,
        mref: 2.0,
        rmaj: 1.5,
    };

    let vth = (2.0 * 1000.0 * ELEMENTARY_CHARGE / (2.0 * PROTON_MASS)).sqrt();
    assert_relative_eq!(reference.vth(), vth, max_relative = 1e-12);
    assert_relative_eq!(
        reference.rhoref(),
        2.0 * PROTON_MASS * vth / ELEMENTARY_CHARGE,
        max_relative = 1e-12
    );
    assert_relative_eq!(
        reference.rho_star(),
        reference.rhoref() / 0.5,
        max_relative = 1e-12
    );
}

#[test]
fn test_missing_file_is_read_error() {
    let err = read_toml("definitely/not/a/run.toml").unwrap_err();
    assert!(matches!(err, CommonError::RunFileUnreadable { .. }));
    assert!(err.to_string().contains("definitely/not/a/run.toml"));
}

#[test]
fn test_missing_key_is_invalid_run_file() {
    let dir = std::env::temp_dir().join(format!("gs2-common-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("no_reference.toml");
    std::fs::write(&path, "netcdf_file = \"run.out.nc\"\ng_exb = 0.0\nspecies = []\n").unwrap();

    let err = read_toml(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();
    match err {
        CommonError::RunFileInvalid { path: p, msg } => {
            assert!(p.ends_with("no_reference.toml"));
            assert!(msg.contains("reference"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}
