pub mod board;
pub mod edge;
pub mod heap;
pub mod pathfinder;
