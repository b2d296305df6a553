//! Financial reporting boundary

mod routes;

pub use routes::routes;
