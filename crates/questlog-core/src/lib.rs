// Core business logic: what's done, what's unlockable, what to show
pub mod catalog;
pub mod config;
pub mod constants;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod progress;
pub mod providers;
pub mod query;
pub mod stats;

pub use catalog::{CatalogLocation, CatalogSource, LoadReport, QuestRepository};
pub use config::Config;
pub use eligibility::{EligibilityEngine, GateRule, QuestStatus};
pub use error::Error;
pub use models::Quest;
pub use progress::{ProgressStore, ProgressTracker};
pub use query::{list_quests, FilterMode, QueryCriteria, SortOrder, TrackPolicy, TraderFilter};
pub use stats::{collector_stat, compute_stats, trader_breakdown, Stat, Stats, TraderBreakdown};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
