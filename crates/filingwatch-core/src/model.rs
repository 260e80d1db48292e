//! Records exchanged between provider clients, the engine, and the CLI.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One disclosure event from a provider listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingSummary {
    pub form_type: String,
    /// Accession number (SEC) or receipt number (DART). Dedup key.
    pub filing_id: String,
    /// ISO 8601 date string.
    pub filed_on: String,
}

/// A numeric fact selected from a provider facts document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricObservation {
    /// The candidate tag that matched.
    pub tag: String,
    pub value: Decimal,
    /// ISO 8601 date string.
    pub period_end: String,
    pub currency: String,
    pub source_filing_id: Option<String>,
    pub fiscal_year: Option<String>,
    pub fiscal_period: Option<String>,
    pub form: Option<String>,
    pub filed_on: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    /// `Yes` only when `value` strictly exceeds `threshold`.
    pub fn decide(value: Decimal, threshold: Decimal) -> Self {
        if value > threshold { Self::Yes } else { Self::No }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evidence for a single resolved filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub filer_identifier: String,
    pub filer_name: String,
    pub filing: FilingSummary,
    pub metric: MetricObservation,
    pub threshold: Decimal,
    pub outcome: Outcome,
    pub resolved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn strictly_greater_is_yes() {
        assert_eq!(Outcome::decide(dec("150000000000"), dec("125000000000")), Outcome::Yes);
        assert_eq!(Outcome::decide(dec("100"), dec("125")), Outcome::No);
    }

    #[test]
    fn equality_is_no() {
        assert_eq!(Outcome::decide(dec("125000000000"), dec("125000000000")), Outcome::No);
        assert_eq!(Outcome::decide(dec("1.50"), dec("1.5")), Outcome::No);
    }

    #[test]
    fn negative_values_compare_numerically() {
        assert_eq!(Outcome::decide(dec("-5"), dec("-10")), Outcome::Yes);
        assert_eq!(Outcome::decide(dec("-10"), dec("0")), Outcome::No);
    }

    #[test]
    fn outcome_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Outcome::Yes).unwrap(), "\"YES\"");
        let parsed: Outcome = serde_json::from_str("\"NO\"").unwrap();
        assert_eq!(parsed, Outcome::No);
    }

    #[test]
    fn record_json_has_nested_evidence() {
        let record = ResolutionRecord {
            filer_identifier: "0000320193".into(),
            filer_name: "Apple Inc.".into(),
            filing: FilingSummary {
                form_type: "10-Q".into(),
                filing_id: "0001-23-000123".into(),
                filed_on: "2023-08-04".into(),
            },
            metric: MetricObservation {
                tag: "Revenues".into(),
                value: dec("150000000000"),
                period_end: "2023-07-01".into(),
                currency: "usd".into(),
                source_filing_id: Some("0001-23-000123".into()),
                fiscal_year: Some("2023".into()),
                fiscal_period: Some("Q3".into()),
                form: Some("10-Q".into()),
                filed_on: Some("2023-08-04".into()),
            },
            threshold: dec("125000000000"),
            outcome: Outcome::Yes,
            resolved_at: DateTime::parse_from_rfc3339("2023-08-04T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["outcome"], "YES");
        assert_eq!(json["filing"]["filing_id"], "0001-23-000123");
        assert_eq!(json["metric"]["value"], "150000000000");
        assert_eq!(json["threshold"], "125000000000");
    }
}
