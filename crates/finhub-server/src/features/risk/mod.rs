//! Risk management boundary

mod routes;

pub use routes::routes;
