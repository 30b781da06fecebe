pub mod engine;
pub mod netting;
pub mod summary;
