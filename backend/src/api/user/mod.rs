//! User profile API.

pub mod handlers;
pub mod routes;
