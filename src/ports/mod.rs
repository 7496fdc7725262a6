//! Port traits for the collaborators around the domain.

pub mod config_port;
pub mod data_port;
pub mod holdings_port;
pub mod report_port;
