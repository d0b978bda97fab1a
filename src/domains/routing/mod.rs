pub mod grid;
pub mod planner;
pub mod point_expander;
pub mod resolver;
pub mod router;
pub mod segment;
pub mod trimmer;
pub mod types;

pub use grid::*;
pub use planner::*;
pub use point_expander::*;
pub use resolver::*;
pub use router::*;
pub use segment::*;
pub use trimmer::*;
pub use types::*;
