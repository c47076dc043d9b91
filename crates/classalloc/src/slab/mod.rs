pub mod pool;
pub mod size_class;

pub use pool::FreeListPool;
pub use size_class::{ClassTable, Route, RouteCounters};
