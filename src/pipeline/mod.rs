/// Batch scoring pipeline: wallet list in, score tables out

pub mod runner;

pub use runner::*;
