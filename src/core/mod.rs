pub mod error;
pub mod period;
pub mod side;
pub mod trade;
