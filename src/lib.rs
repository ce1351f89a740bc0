//! Salary benchmark analytics over recruiting API postings.

pub mod api;
pub mod benchmark;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
