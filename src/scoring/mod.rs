/// Additive credit scoring with human-readable explanations

pub mod scorer;

mod explain;

pub use scorer::*;
