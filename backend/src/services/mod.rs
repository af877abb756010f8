//! Module for core business logic services.
//!
//! Services sit between the HTTP handlers and the repositories and hold the
//! rules that are not plain persistence.

pub mod user_service;
