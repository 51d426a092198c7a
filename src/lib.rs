pub mod config;
pub mod humanize;
pub mod observability;
pub mod protocol;
pub mod registry;
pub mod service;
