//! Assembly task lifecycle management.
//!
//! A job is expanded into one task per trade stage. Crews schedule, start,
//! and complete those tasks; defects found on site are reported as issues
//! that block completion until resolved and may spawn replacement orders.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
