pub mod plan;
pub mod price;
pub mod validate;
