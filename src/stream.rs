//! Stream combinators for frame subscriptions

pub mod distinct;

pub use distinct::{Distinct, DistinctExt};
