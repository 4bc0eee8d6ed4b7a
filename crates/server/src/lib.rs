pub mod cli;
pub mod errors;
pub mod observability;
pub mod routes;
pub mod startup;

pub use startup::{run, serve};
