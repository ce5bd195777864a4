//! HTTP API for the order index

pub mod handlers;
pub mod routes;

pub use handlers::{ApiState, DynApiState};
pub use routes::{create_dyn_router, create_router};
