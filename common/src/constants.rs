/// Proton mass in kg
pub const PROTON_MASS: f64 = 1.672_621_923_69e-27;

/// Elementary charge in C (also J per eV)
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
