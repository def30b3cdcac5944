//! Synthetic GS2 output for integration tests.
#![allow(dead_code)]

use gs2_common::ReferenceParameters;
use std::path::{Path, PathBuf};

pub const MOMENTS: [&str; 4] = [
    "ntot_igomega_by_mode",
    "upar_igomega_by_mode",
    "tpar_igomega_by_mode",
    "tperp_igomega_by_mode",
];

pub const REFERENCE: ReferenceParameters = ReferenceParameters {
    nref: 3.0e19,
    tref: 800.0,
    amin: 0.58,
    bref: 0.45,
    mref: 2.0,
    rmaj: 0.85,
};

/// Spacing of the kx and ky grids in units of 1/rho_ref
pub const DK: f64 = 0.2;

/// Shape and content of a synthetic run
pub struct Synthetic {
    pub nt: usize,
    pub nkx: usize,
    pub nky: usize,
    /// GS2 time stamps, normalized
    pub t: Vec<f64>,
    /// Ion heat flux at every time, gyro-Bohm units
    pub ion_flux: f64,
    /// Real part of the (kx = 0, ky = DK) mode of every field
    pub amplitude: f64,
    pub lab_frame: bool,
    pub version: u32,
    pub ion_tprim: f64,
    pub g_exb: f64,
}

impl Default for Synthetic {
    fn default() -> Self {
        Synthetic {
            nt: 2,
            nkx: 3,
            nky: 2,
            t: vec![10.0, 12.0],
            ion_flux: 1.7,
            amplitude: 0.0,
            lab_frame: false,
            version: 1,
            ion_tprim: 2.35,
            g_exb: 0.1,
        }
    }
}

/// Writes `run.toml` and `run.out.nc` into `dir` and returns the toml path.
pub fn write_run(dir: &Path, synthetic: &Synthetic) -> PathBuf {
    write_netcdf(&dir.join("run.out.nc"), synthetic, &[]);
    write_toml(dir, synthetic)
}

/// Like [`write_run`] but leaves out the variables in `skip`.
pub fn write_run_without(dir: &Path, synthetic: &Synthetic, skip: &[&str]) -> PathBuf {
    write_netcdf(&dir.join("run.out.nc"), synthetic, skip);
    write_toml(dir, synthetic)
}

fn write_toml(dir: &Path, synthetic: &Synthetic) -> PathBuf {
    let contents = format!(
        r#"netcdf_file = "run.out.nc"
g_exb = {g_exb:?}
lab_frame = {lab_frame}
version = {version}

[reference]
nref = {nref:?}
tref = {tref:?}
amin = {amin:?}
bref = {bref:?}
mref = {mref:?}
rmaj = {rmaj:?}

[[species]]
mass = 1.0
tprim = {tprim:?}
fprim = 0.9

[[species]]
mass = 2.7e-4
tprim = 2.0
fprim = 0.9
"#,
        g_exb = synthetic.g_exb,
        lab_frame = synthetic.lab_frame,
        version = synthetic.version,
        nref = REFERENCE.nref,
        tref = REFERENCE.tref,
        amin = REFERENCE.amin,
        bref = REFERENCE.bref,
        mref = REFERENCE.mref,
        rmaj = REFERENCE.rmaj,
        tprim = synthetic.ion_tprim,
    );
    let path = dir.join("run.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

fn write_netcdf(path: &Path, synthetic: &Synthetic, skip: &[&str]) {
    let Synthetic { nt, nkx, nky, .. } = *synthetic;
    assert_eq!(synthetic.t.len(), nt);

    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("t", nt).unwrap();
    file.add_dimension("species", 2).unwrap();
    file.add_dimension("ky", nky).unwrap();
    file.add_dimension("kx", nkx).unwrap();
    file.add_dimension("ri", 2).unwrap();

    // kx in FFT order: zero, positive, negative
    let kx: Vec<f64> = (0..nkx)
        .map(|i| {
            let m = if i <= (nkx - 1) / 2 {
                i as f64
            } else {
                i as f64 - nkx as f64
            };
            m * DK
        })
        .collect();
    let ky: Vec<f64> = (0..nky).map(|i| i as f64 * DK).collect();
    let flux: Vec<f64> = (0..nt)
        .flat_map(|_| [synthetic.ion_flux, 5.0 * synthetic.ion_flux])
        .collect();

    let mut put = |name: &str, dims: &[&str], values: &[f64]| {
        if skip.contains(&name) {
            return;
        }
        let mut var = file.add_variable::<f64>(name, dims).unwrap();
        var.put_values(values, None, None).unwrap();
    };

    put("t", &["t"], &synthetic.t);
    put("kx", &["kx"], &kx);
    put("ky", &["ky"], &ky);
    put("es_heat_flux", &["t", "species"], &flux);

    // One mode: real part at (ky = 1, kx = 0)
    let mode = |iky: usize, ikx: usize, ri: usize| {
        if iky == 1 && ikx == 0 && ri == 0 {
            synthetic.amplitude
        } else {
            0.0
        }
    };

    let mut phi = Vec::with_capacity(nt * nky * nkx * 2);
    for _ in 0..nt {
        for iky in 0..nky {
            for ikx in 0..nkx {
                for ri in 0..2 {
                    phi.push(mode(iky, ikx, ri));
                }
            }
        }
    }
    put("phi_igomega_by_mode", &["t", "ky", "kx", "ri"], &phi);

    // Species s carries (s + 1) times the mode
    let mut moment = Vec::with_capacity(nt * 2 * nky * nkx * 2);
    for _ in 0..nt {
        for s in 0..2 {
            for iky in 0..nky {
                for ikx in 0..nkx {
                    for ri in 0..2 {
                        moment.push((s + 1) as f64 * mode(iky, ikx, ri));
                    }
                }
            }
        }
    }
    for name in MOMENTS {
        put(name, &["t", "species", "ky", "kx", "ri"], &moment);
    }
}

pub fn read_values(path: &Path, name: &str) -> Vec<f64> {
    let file = netcdf::open(path).unwrap();
    let var = file.variable(name).unwrap();
    var.values::<f64>(None, None).unwrap().iter().copied().collect()
}
