/// Behavioral feature extraction from wallet activity records

pub mod extractor;

pub use extractor::*;
