#[macro_use]
mod macros;

pub mod currency;
pub mod energy;
pub mod points;
