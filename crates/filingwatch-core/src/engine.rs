//! The resolution engine: one check cycle per call.
//!
//! ```text
//! IDLE → LISTING → CHECKING_NOVELTY → FETCHING_FACTS → EXTRACTING → COMPARING → RESOLVED
//! ```
//!
//! Every gate can exit early back to idle. [`EngineState`] is only written
//! in the resolved step, so a filing whose facts are not yet published is
//! retried on the next cycle instead of being skipped forever.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::amount::format_amount;
use crate::dedup::{EngineState, is_new};
use crate::error::ProviderError;
use crate::model::{FilingSummary, Outcome, ResolutionRecord};
use crate::provider::{MetricLookup, Provider};

/// What a single engine watches for.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    /// Candidate tags in priority order.
    pub tags: Vec<String>,
    pub threshold: Decimal,
    /// Form types passed to the listings call. Empty means provider default window.
    pub forms: Vec<String>,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    NoFilings,
    NoNewFiling { filing: FilingSummary },
    FactsUnavailable { filing: FilingSummary },
    MetricNotFound { filing: FilingSummary },
    Resolved(Box<ResolutionRecord>),
}

impl CycleOutcome {
    pub fn record(&self) -> Option<&ResolutionRecord> {
        match self {
            Self::Resolved(record) => Some(record.as_ref()),
            _ => None,
        }
    }

    /// Short status for operators watching the loop.
    pub fn status(&self) -> &'static str {
        match self {
            Self::NoFilings => "no filings",
            Self::NoNewFiling { .. } => "no new filing",
            Self::FactsUnavailable { .. } => "facts unavailable",
            Self::MetricNotFound { .. } => "metric not found",
            Self::Resolved(_) => "resolved",
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFilings => f.write_str("no filings"),
            Self::NoNewFiling { filing } => {
                write!(f, "no new filing (latest {} already resolved)", filing.filing_id)
            }
            Self::FactsUnavailable { filing } => {
                write!(f, "facts unavailable for {} {}, will retry", filing.form_type, filing.filing_id)
            }
            Self::MetricNotFound { filing } => {
                write!(f, "metric not found for {} {}, will retry", filing.form_type, filing.filing_id)
            }
            Self::Resolved(record) => write!(
                f,
                "resolved {} {}: {} {} vs threshold {} => {}",
                record.filing.form_type,
                record.filing.filing_id,
                record.metric.tag,
                format_amount(record.metric.value),
                format_amount(record.threshold),
                record.outcome
            ),
        }
    }
}

/// Single-filer, single-metric resolution engine.
///
/// Cycles take `&mut self`, so one engine never runs two cycles at once.
pub struct ResolutionEngine {
    provider: Box<dyn Provider>,
    config: MarketConfig,
    state: EngineState,
}

impl ResolutionEngine {
    pub fn new(provider: Box<dyn Provider>, config: MarketConfig) -> Self {
        Self::with_state(provider, config, EngineState::new())
    }

    pub fn with_state(provider: Box<dyn Provider>, config: MarketConfig, state: EngineState) -> Self {
        Self {
            provider,
            config,
            state,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Run one cycle stamped with the current UTC time.
    pub async fn check_once(&mut self) -> Result<CycleOutcome, ProviderError> {
        self.check_once_at(Utc::now()).await
    }

    /// Run one cycle. Transport, auth, and config failures propagate;
    /// not-found and parse failures end the cycle without a resolution.
    pub async fn check_once_at(&mut self, now: DateTime<Utc>) -> Result<CycleOutcome, ProviderError> {
        let provider = self.provider.name();

        debug!(provider, "listing recent filings");
        let filings = match self.provider.list_recent_filings(&self.config.forms).await {
            Ok(filings) => filings,
            Err(err) if absorbable(&err) => {
                warn!(provider, error = %err, "listing absorbed as empty");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let Some(latest) = filings.into_iter().next() else {
            return Ok(CycleOutcome::NoFilings);
        };

        if !is_new(&latest, &self.state) {
            return Ok(CycleOutcome::NoNewFiling { filing: latest });
        }
        info!(
            provider,
            form = %latest.form_type,
            filing_id = %latest.filing_id,
            filed_on = %latest.filed_on,
            "new filing detected"
        );

        let lookup = match self.provider.fetch_metric(&self.config.tags).await {
            Ok(lookup) => lookup,
            Err(err) if absorbable(&err) => {
                warn!(provider, error = %err, "facts fetch absorbed");
                MetricLookup::FactsUnavailable
            }
            Err(err) => return Err(err),
        };

        let (metric, filer_name) = match lookup {
            MetricLookup::FactsUnavailable => {
                return Ok(CycleOutcome::FactsUnavailable { filing: latest });
            }
            MetricLookup::MetricNotFound => {
                return Ok(CycleOutcome::MetricNotFound { filing: latest });
            }
            MetricLookup::Found {
                observation,
                filer_name,
            } => (observation, filer_name),
        };

        let outcome = Outcome::decide(metric.value, self.config.threshold);

        let record = ResolutionRecord {
            filer_identifier: self.provider.filer_identifier().to_string(),
            filer_name: filer_name.unwrap_or_else(|| "Unknown".to_string()),
            filing: latest,
            metric,
            threshold: self.config.threshold,
            outcome,
            resolved_at: now,
        };
        self.state.mark_resolved(&record.filing.filing_id);

        info!(
            provider,
            filing_id = %record.filing.filing_id,
            tag = %record.metric.tag,
            value = %record.metric.value,
            threshold = %record.threshold,
            outcome = %record.outcome,
            "filing resolved"
        );
        Ok(CycleOutcome::Resolved(Box::new(record)))
    }
}

fn absorbable(err: &ProviderError) -> bool {
    matches!(err, ProviderError::NotFound(_) | ProviderError::Parse(_))
}
