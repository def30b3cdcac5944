pub mod constants;
pub mod error;
pub mod parameters;

pub use constants::*;
pub use error::*;
pub use parameters::*;
