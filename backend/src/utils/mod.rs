//! Small helpers shared across the application.

pub mod jwt;
