mod engine;
mod metadata;
mod outcome;
mod route;
mod router;
mod snapshot;

pub use engine::{CollectSettings, CollectionEngine, CycleReport};
pub use outcome::{StageOutcome, StageStatus};
pub use route::{RouteMode, RouteReport};
pub use snapshot::{Snapshot, Topology, TrackedConnection};
