pub mod cost;

pub use cost::{characteristic, optimum, price, CostError};
