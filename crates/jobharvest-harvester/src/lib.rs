//! Harvest cycles: runs the platform adapters concurrently, merges their
//! listings into the store, sweeps stale rows, and schedules repeat cycles.

pub mod error;
pub mod merger;
pub mod orchestrator;
pub mod scheduler;
pub mod sweeper;

pub use error::HarvestError;
pub use merger::{save_listings, MergeReport};
pub use orchestrator::Harvester;
pub use scheduler::{CycleScheduler, CycleState, CycleStatus, CycleTicket, TicketStatus};
pub use sweeper::sweep_old_listings;
