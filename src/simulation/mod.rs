pub mod diagnostics;
pub mod generator;
pub mod scenario;
pub mod shock;
