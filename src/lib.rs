//! Cache-first renderer for a Directus-backed campaign site.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
