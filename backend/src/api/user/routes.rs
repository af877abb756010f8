//! Defines the HTTP routes for user profiles.
//!
//! Every route here sits behind the bearer-token middleware.

use super::handlers::me;
use crate::auth::middleware::jwt_auth;
use axum::{Router, middleware, routing::get};

pub fn user_router() -> Router {
    Router::new().route("/me", get(me).layer(middleware::from_fn(jwt_auth)))
}
