//! Plan graph: action nodes joined by synchronization edges

pub mod store;
pub mod types;

pub use store::PlanGraph;
pub use types::*;
