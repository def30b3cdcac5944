pub mod error;
pub mod fft;
pub mod io;
