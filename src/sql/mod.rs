//! Safe SQL builder: identifiers from entity descriptors only, values as parameters.

mod builder;
mod filter;
pub mod params;
pub use builder::*;
pub use filter::{Filter, Predicate};
pub use params::*;
