//! Summary file for comparison with beam emission spectroscopy data: heat-flux
//! statistics in SI units plus the density and potential fields.

use ndarray::{Array1, Array3};
use std::path::{Path, PathBuf};

use crate::run::{read_heat_flux, read_moment, Run, RunMetadata, NTOT, PHI};
use crate::utils::error::{AnalysisError, Result};
use crate::utils::io::ArraySource;

/// Potential normalization written to `phinorm_V`
pub const PHINORM_V: f64 = 2.2054e+02;
/// Flux-surface label written to `psi`
pub const PSI: f64 = 0.49;

const SUMMARY_DIR: &str = "analysis/exp_bes_write";
const FILE_PREFIX: &str = "gs2_27268_0.25";

/// Converts a gyro-Bohm heat flux to physical units.
pub fn heat_flux_si(meta: &RunMetadata, q: &Array1<f64>) -> Array1<f64> {
    q * (meta.nref * meta.tref * meta.vth * meta.rhoref.powi(2) / meta.amin.powi(2))
}

/// Trapezoidal integral of `y` over `x`
pub fn trapezoid(y: &Array1<f64>, x: &Array1<f64>) -> f64 {
    x.windows(2)
        .into_iter()
        .zip(y.windows(2))
        .map(|(dx, dy)| (dx[1] - dx[0]) * (dy[0] + dy[1]) / 2.0)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatFluxStats {
    /// Time average over the whole window
    pub mean: f64,
    /// Population standard deviation of the series, used as the error bar
    pub std: f64,
}

impl HeatFluxStats {
    pub fn from_series(t: &Array1<f64>, q: &Array1<f64>) -> Result<Self> {
        if t.len() != q.len() {
            return Err(AnalysisError::Precondition {
                msg: format!("{} times but {} heat flux values", t.len(), q.len()),
            });
        }
        if t.len() < 2 {
            return Err(AnalysisError::Precondition {
                msg: "time average needs at least two time points".to_string(),
            });
        }

        let elapsed = t[t.len() - 1] - t[0];
        if elapsed == 0.0 {
            return Err(AnalysisError::Precondition {
                msg: "time window has zero length".to_string(),
            });
        }

        Ok(HeatFluxStats {
            mean: trapezoid(q, t) / elapsed,
            std: q.std(0.0),
        })
    }
}

/// Every value written to the summary file, fully populated before writing.
#[derive(Debug, Clone)]
pub struct SummaryRecord {
    pub nref: f64,
    pub tref: f64,
    pub g_exb: f64,
    /// 0 - rotating frame, 1 - lab frame
    pub lab_frame: i32,
    pub phinorm_v: f64,
    pub heat_flux: HeatFluxStats,
    pub psi: f64,

    pub r: Array1<f64>,
    pub z: Array1<f64>,
    pub times: Array1<f64>,

    pub charge: [f64; 2],
    pub mass: [f64; 2],
    pub dens: [f64; 2],
    pub temp: [f64; 2],
    pub tprim: [f64; 2],
    pub fprim: [f64; 2],

    /// Ion density perturbation, (t, r, z)
    pub ntot: Array3<f64>,
    /// Potential, (t, r, z)
    pub phi: Array3<f64>,
}

impl SummaryRecord {
    pub fn build<S: ArraySource + ?Sized>(meta: &RunMetadata, source: &S) -> Result<Self> {
        let ntot = read_moment(meta, source, NTOT, Some(0))?;
        let phi = read_moment(meta, source, PHI, None)?;
        for (name, field) in [("ntot", &ntot), ("phi", &phi)] {
            if field.dim() != (meta.nt, meta.nx, meta.ny) {
                return Err(AnalysisError::UnexpectedShape {
                    name: name.to_string(),
                    expected: format!("({}, {}, {})", meta.nt, meta.nx, meta.ny),
                    found: field.shape().to_vec(),
                });
            }
        }

        let q_i = read_heat_flux(source, 0)?;
        let hflux = heat_flux_si(meta, &q_i);
        let heat_flux = HeatFluxStats::from_series(&meta.t, &hflux)?;
        log::debug!(
            "qheat = {:.5e} W/m^2, dqheat = {:.5e} W/m^2",
            heat_flux.mean,
            heat_flux.std
        );

        let [ion, electron] = meta.species;

        Ok(SummaryRecord {
            nref: meta.nref,
            tref: meta.tref,
            g_exb: meta.g_exb,
            lab_frame: if meta.lab_frame { 1 } else { 0 },
            phinorm_v: PHINORM_V,
            heat_flux,
            psi: PSI,
            r: &meta.x + meta.rmaj,
            z: meta.y.clone(),
            times: &meta.t - meta.t[0],
            charge: [1.0, 1.0],
            mass: [ion.mass, electron.mass],
            dens: [1.0, 1.0],
            temp: [1.0, 1.0],
            tprim: [ion.tprim; 2],
            fprim: [ion.fprim; 2],
            ntot,
            phi,
        })
    }
}

/// Renders `x` rounded to two decimals the way the legacy file names did (`2.0`, `2.35`).
pub fn format_rounded(x: f64) -> String {
    let rounded = (x * 100.0).round_ties_even() / 100.0;
    if rounded == rounded.trunc() {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}

/// Location of the summary file for this run
pub fn summary_path(meta: &RunMetadata) -> PathBuf {
    meta.run_dir.join(SUMMARY_DIR).join(format!(
        "{FILE_PREFIX}_{}_{}_{}.cdf",
        format_rounded(meta.species[0].tprim),
        format_rounded(meta.g_exb),
        meta.version
    ))
}

/// Writes `record` to `path`, replacing any existing file.
pub fn write_summary(record: &SummaryRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let (nt, nr, nz) = record.ntot.dim();

    let mut file = netcdf::create(path)?;
    file.add_dimension("NR", nr)?;
    file.add_dimension("NZ", nz)?;
    file.add_dimension("NT", nt)?;
    file.add_dimension("none", 1)?;
    file.add_dimension("species", 2)?;
    file.add_dimension("dimpsi", 1)?;

    put_f64(&mut file, "nref_m-3", &["none"], &[record.nref], None)?;
    put_f64(&mut file, "tref_eV", &["none"], &[record.tref], None)?;
    put_f64(&mut file, "g_exb", &["none"], &[record.g_exb], None)?;
    {
        let mut lab = file.add_variable::<i32>("lab_frame", &["none"])?;
        lab.add_attribute("units", "0 - rot frame, 1 - lab frame")?;
        lab.put_values(&[record.lab_frame], None, None)?;
    }
    put_f64(&mut file, "phinorm_V", &["none"], &[record.phinorm_v], None)?;
    put_f64(
        &mut file,
        "qheat",
        &["dimpsi"],
        &[record.heat_flux.mean],
        Some("W/m^2"),
    )?;
    put_f64(
        &mut file,
        "dqheat",
        &["dimpsi"],
        &[record.heat_flux.std],
        Some("W/m^2"),
    )?;
    put_f64(&mut file, "psi", &["dimpsi"], &[record.psi], None)?;

    put_f64(&mut file, "r", &["NR"], &to_vec(&record.r), None)?;
    put_f64(&mut file, "z", &["NZ"], &to_vec(&record.z), None)?;
    put_f64(&mut file, "times", &["NT"], &to_vec(&record.times), None)?;

    put_f64(&mut file, "charge", &["species"], &record.charge, None)?;
    put_f64(&mut file, "mass", &["species"], &record.mass, None)?;
    put_f64(&mut file, "dens", &["species"], &record.dens, None)?;
    put_f64(&mut file, "temp", &["species"], &record.temp, None)?;
    put_f64(&mut file, "tprim", &["species"], &record.tprim, None)?;
    put_f64(&mut file, "fprim", &["species"], &record.fprim, None)?;

    put_f64(&mut file, "ntot", &["NT", "NR", "NZ"], &to_vec(&record.ntot), None)?;
    put_f64(&mut file, "phi", &["NT", "NR", "NZ"], &to_vec(&record.phi), None)?;

    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Builds the summary for `run` and writes it to [`summary_path`].
pub fn write(run: &Run) -> Result<PathBuf> {
    let record = SummaryRecord::build(&run.meta, &run.cdf_file)?;
    let path = summary_path(&run.meta);
    write_summary(&record, &path)?;
    Ok(path)
}

fn put_f64(
    file: &mut netcdf::MutableFile,
    name: &str,
    dims: &[&str],
    values: &[f64],
    units: Option<&str>,
) -> Result<()> {
    let mut var = file.add_variable::<f64>(name, dims)?;
    if let Some(units) = units {
        var.add_attribute("units", units)?;
    }
    var.put_values(values, None, None)?;
    Ok(())
}

/// Values in logical (row-major) order
fn to_vec<'a, I: IntoIterator<Item = &'a f64>>(array: I) -> Vec<f64> {
    array.into_iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn test_constant_two_point_average() {
        let a = 3.7e4;
        let stats = HeatFluxStats::from_series(&arr1(&[0.0, 1.0]), &arr1(&[a, a])).unwrap();
        assert_eq!(stats.mean, a);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    fn test_trapezoid_average_of_ramp() {
        // q = 2t on [1, 3] averages to 4
        let t = arr1(&[1.0, 1.5, 2.5, 3.0]);
        let q = &t * 2.0;
        let stats = HeatFluxStats::from_series(&t, &q).unwrap();
        assert_abs_diff_eq!(stats.mean, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_std_is_population_std() {
        let t = arr1(&[0.0, 1.0, 2.0, 3.0]);
        let q = arr1(&[1.0, 3.0, 1.0, 3.0]);
        let stats = HeatFluxStats::from_series(&t, &q).unwrap();
        assert_abs_diff_eq!(stats.std, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_stats_preconditions() {
        assert!(HeatFluxStats::from_series(&arr1(&[0.0]), &arr1(&[1.0])).is_err());
        assert!(HeatFluxStats::from_series(&arr1(&[0.0, 1.0]), &arr1(&[1.0])).is_err());
        assert!(HeatFluxStats::from_series(&arr1(&[2.0, 2.0]), &arr1(&[1.0, 1.0])).is_err());
    }

    #[test]
    fn test_format_rounded() {
        assert_eq!(format_rounded(4.567), "4.57");
        assert_eq!(format_rounded(3.0), "3.0");
        assert_eq!(format_rounded(0.1), "0.1");
        assert_eq!(format_rounded(2.999), "3.0");
        assert_eq!(format_rounded(-0.149), "-0.15");
    }
}
