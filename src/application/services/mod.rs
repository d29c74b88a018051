//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (Console) but are themselves
//! concrete structs, not traits.

mod approval;
mod hierarchy;
mod spawner;

pub use approval::ApprovalService;
pub use hierarchy::{HierarchyReport, HierarchyService, Removal};
pub use spawner::{SpawnerService, WaveReport, DRAGON_FIRE, ORC_BASIC};
