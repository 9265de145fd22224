//! Assembly tracker: installation task lifecycle for manufacturing jobs.
//!
//! This crate tracks the on-site assembly work of a job from provisioning to
//! completion: which trade does which stage, when it is planned, who is
//! assigned, what evidence was collected, and which defects block it.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage, the job catalog, and
//!   the production-order subsystem
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: Lifecycle, provisioning, query, and issue orchestration
//!
//! # Modules
//!
//! - [`assembly`]: Task lifecycle, provisioning, rollups, and issues
//! - [`config`]: TOML configuration
//! - [`telemetry`]: Structured log output

pub mod assembly;
pub mod config;
pub mod telemetry;
