pub mod capture;
pub mod commands;
pub mod config;
pub mod session;
pub mod submission;
