//! Application services orchestrating domain logic and persistence.

pub mod admin;
pub mod blogs;
pub mod error;
pub mod messages;
pub mod notify;
pub mod projects;
pub mod repos;
pub mod search;
pub mod seed;
pub mod services;
pub mod skills;
pub mod subscribers;
pub mod users;
