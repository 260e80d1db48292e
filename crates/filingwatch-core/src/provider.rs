//! Capability interface shared by every disclosure provider.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::extract::{FactsDocument, extract};
use crate::model::{FilingSummary, MetricObservation};

/// Reporting period of a periodic financial statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Annual,
    Half,
    Q1,
    Q3,
}

impl ReportPeriod {
    /// Order tried after the inferred period when none is given explicitly.
    pub const FALLBACK_ORDER: [ReportPeriod; 4] = [Self::Half, Self::Annual, Self::Q3, Self::Q1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Half => "half",
            Self::Q1 => "q1",
            Self::Q3 => "q3",
        }
    }

    /// Short fiscal-period label (`FY`, `HY`, `Q1`, `Q3`).
    pub fn fiscal_label(&self) -> &'static str {
        match self {
            Self::Annual => "FY",
            Self::Half => "HY",
            Self::Q1 => "Q1",
            Self::Q3 => "Q3",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "business" | "q4" | "fy" => Ok(Self::Annual),
            "half" | "semiannual" | "q2" | "hy" => Ok(Self::Half),
            "q1" | "first" => Ok(Self::Q1),
            "q3" | "third" => Ok(Self::Q3),
            other => Err(ProviderError::Config(format!(
                "unsupported period '{other}', expected one of: annual, half, q1, q3"
            ))),
        }
    }
}

/// Which statement to fetch for providers that publish per-period tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeriodHint {
    pub year: i32,
    pub period: ReportPeriod,
}

/// Result of a provider metric lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricLookup {
    /// No facts document exists for the filer (or any candidate period).
    FactsUnavailable,
    /// Facts exist but no candidate tag produced a valid observation.
    MetricNotFound,
    Found {
        observation: MetricObservation,
        filer_name: Option<String>,
    },
}

/// A disclosure source scoped to one filer.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider name for logs (`sec`, `dart`).
    fn name(&self) -> &'static str;

    /// The filer this client watches (CIK or corporation code).
    fn filer_identifier(&self) -> &str;

    /// Recent filings, newest first. Empty when the filer has none matching.
    async fn list_recent_filings(
        &self,
        form_filter: &[String],
    ) -> Result<Vec<FilingSummary>, ProviderError>;

    /// The filer's facts document, or `None` when it does not exist.
    async fn fetch_facts(
        &self,
        hint: Option<PeriodHint>,
    ) -> Result<Option<Box<dyn FactsDocument>>, ProviderError>;

    /// Fetch facts and extract the first matching candidate tag.
    async fn fetch_metric(&self, candidate_tags: &[String]) -> Result<MetricLookup, ProviderError> {
        let facts = match self.fetch_facts(None).await {
            Ok(Some(facts)) => facts,
            Ok(None) => return Ok(MetricLookup::FactsUnavailable),
            Err(err) if err.is_not_found() => return Ok(MetricLookup::FactsUnavailable),
            Err(err) => return Err(err),
        };

        Ok(match extract(facts.as_ref(), candidate_tags) {
            Some(observation) => MetricLookup::Found {
                observation,
                filer_name: facts.entity_name().map(str::to_string),
            },
            None => MetricLookup::MetricNotFound,
        })
    }
}
