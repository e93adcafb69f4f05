pub mod aggregate;
pub mod clock;
pub mod config;
pub mod error;
pub mod store;
pub mod visit;
pub mod visitor;
