pub mod clock;
pub mod config;
pub mod scheduler;
pub mod session;
pub mod surface;
