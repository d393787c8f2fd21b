//! Portfolio REST API: content management for a personal portfolio site with
//! an in-process response cache and a search and filter engine.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
