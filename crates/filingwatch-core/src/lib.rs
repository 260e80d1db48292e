pub mod amount;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod presets;
pub mod provider;

pub use amount::{format_amount, normalize_date, parse_amount};
pub use dedup::{EngineState, is_new};
pub use engine::{CycleOutcome, MarketConfig, ResolutionEngine};
pub use error::ProviderError;
pub use extract::{FactsDocument, RawObservation, extract};
pub use model::{FilingSummary, MetricObservation, Outcome, ResolutionRecord};
pub use presets::{MetricPreset, ProviderKind, parse_tag_list};
pub use provider::{MetricLookup, PeriodHint, Provider, ReportPeriod};
