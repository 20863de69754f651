pub mod limits;
pub mod order;
pub mod pricing;
