//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the spool-gate bridge:
//! the pending-scan lifecycle, gate edge correlation, and the main loop
//! cadence.  All interaction with the reader and the printer host happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod runner;
pub mod service;
