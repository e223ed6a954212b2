//! Safe SQL builder: identifiers from resolved config only, values as parameters.

mod builder;
pub mod params;

pub use builder::*;
pub use params::*;
