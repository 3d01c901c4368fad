//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the orchestration of the zone node: the service
//! driving sample cycles, the command reconciler and the report and
//! command shapes exchanged with the backend.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod reconciler;
pub mod report;
pub mod service;
