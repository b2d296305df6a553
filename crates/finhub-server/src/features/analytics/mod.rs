//! Financial analytics boundary

mod routes;

pub use routes::routes;
