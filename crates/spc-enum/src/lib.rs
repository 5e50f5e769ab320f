pub mod enumerator;
pub mod tree;

pub use enumerator::{Enumerator, SupplyIter};
pub use tree::SupplyTree;
