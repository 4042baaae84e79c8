//! Utility functions shared by handlers, services and repositories.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`client_ip`] - Client address extraction behind optional proxies
//! - [`user_agent`] - Mobile/desktop classification
//! - [`time_ago`] - Humanised relative timestamps
//! - [`db_error`] - Database error classification

pub mod client_ip;
pub mod code_generator;
pub mod db_error;
pub mod time_ago;
pub mod user_agent;
