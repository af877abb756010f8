//! Authentication module for registration, login and identity resolution.
//!
//! This module provides the public interface for user authentication-related functionalities
//! such as registration, token issuance and the bearer-token middleware.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
