pub mod provider;
pub mod types;

pub use provider::*;
pub use types::*;
