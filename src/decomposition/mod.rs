pub mod quarterly;
