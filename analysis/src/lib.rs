pub mod field;
pub mod film;
pub mod run;
pub mod summary;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
