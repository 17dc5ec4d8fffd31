// Allow-listed math table available to user expressions
pub mod math;

pub use math::*;
