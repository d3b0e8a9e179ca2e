//! Core traits for the monitor sync tool
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DesiredSource`]: Fetch desired-state name listings (Traefik, Docker)
//! - [`MonitorService`]: Remote-procedure boundary around the monitor service

pub mod monitor_service;
pub mod source;

pub use monitor_service::MonitorService;
pub use source::DesiredSource;
