/// Batch run statistics and terminal report

pub mod summary;

pub use summary::*;
