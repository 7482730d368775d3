pub mod nodes;
pub mod providers;

pub use nodes::*;
pub use providers::*;
