pub mod cache;
pub mod decode;
pub mod store;
