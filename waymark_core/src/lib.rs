#![forbid(unsafe_code)]

//! Core domain model and session logic for the waymark workout journal.
//!
//! This crate provides:
//! - Domain types (coordinates, workout kinds, metrics, the workout entity)
//! - Raw form-field validation
//! - The in-memory workout store and its snapshot contract
//! - Snapshot persistence and CSV export
//! - The session controller tying external events to store mutation and
//!   render requests

pub mod types;
pub mod error;
pub mod validate;
pub mod store;
pub mod history;
pub mod view;
pub mod session;
pub mod csv_export;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::{Coords, Metrics, Workout, WorkoutKind};
pub use store::{WorkoutRecord, WorkoutStore};
pub use history::{HistoryFile, MemorySnapshot, Snapshot};
pub use view::{FormView, ListEntry, ListView, MapView, MarkerStyle, RawFields};
pub use session::{Session, SubmitOutcome};
pub use validate::fields_are_valid;
pub use config::Config;
pub use csv_export::export_store;
