/// Deterministic synthetic lending activity, derived from wallet identifiers

pub mod activity;

pub use activity::*;
