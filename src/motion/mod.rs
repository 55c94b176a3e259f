pub mod field;
pub mod flow;
pub mod warp;
