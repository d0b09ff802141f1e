//! Persistence of canonical observations.

pub mod sqlite;

pub use sqlite::{ObservationStore, StoreStats, StoredObservation};
