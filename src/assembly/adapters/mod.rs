//! Adapter implementations for assembly ports.

pub mod memory;
pub mod postgres;

mod clock;

pub use clock::FixedClock;
