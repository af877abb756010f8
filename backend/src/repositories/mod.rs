//! Persistence layer: one repository per table.

pub mod user_repository;
