//! Metric extraction over provider-owned facts documents.
//!
//! Candidate tags form a fallback chain: the first tag with at least one
//! valid observation wins, even when a later tag would hold a newer value.
//! Within a tag, the observation with the latest `period_end` is selected;
//! ties go to the one listed last by the provider.

use tracing::debug;

use crate::amount::{normalize_date, parse_amount};
use crate::model::MetricObservation;

/// An observation as the provider recorded it, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawObservation {
    pub amount: Option<String>,
    pub period_end: Option<String>,
    pub filing_id: Option<String>,
    pub currency: String,
    pub fiscal_year: Option<String>,
    pub fiscal_period: Option<String>,
    pub form: Option<String>,
    pub filed_on: Option<String>,
}

/// Narrow accessor over a provider's facts document.
///
/// Only the provider client that produced the document knows its shape.
pub trait FactsDocument: Send + Sync {
    /// Display name of the filer, when the document carries one.
    fn entity_name(&self) -> Option<&str>;

    /// All observations recorded under `tag` in the filer's reporting unit,
    /// in the provider's native order.
    fn observations(&self, tag: &str) -> Vec<RawObservation>;
}

/// Select the best observation for the first candidate tag that yields one.
pub fn extract(facts: &dyn FactsDocument, candidate_tags: &[String]) -> Option<MetricObservation> {
    for tag in candidate_tags {
        let best = facts
            .observations(tag)
            .into_iter()
            .filter_map(|raw| validate(tag, raw))
            // max_by_key keeps the last of equal keys.
            .max_by_key(|obs| obs.period_end.clone());

        if let Some(obs) = best {
            debug!(tag = %tag, period_end = %obs.period_end, "metric tag matched");
            return Some(obs);
        }
        debug!(tag = %tag, "no valid observations for tag");
    }
    None
}

fn validate(tag: &str, raw: RawObservation) -> Option<MetricObservation> {
    let amount = raw.amount.as_deref()?;
    let period_raw = raw.period_end.as_deref()?;
    let filing_id = raw.filing_id.filter(|id| !id.trim().is_empty())?;

    let Some(value) = parse_amount(amount) else {
        debug!(tag, amount, "skipping observation with unparseable amount");
        return None;
    };
    let Some(period_end) = normalize_date(period_raw) else {
        debug!(tag, period = period_raw, "skipping observation with unparseable period end");
        return None;
    };

    Some(MetricObservation {
        tag: tag.to_string(),
        value,
        period_end,
        currency: raw.currency,
        source_filing_id: Some(filing_id),
        fiscal_year: raw.fiscal_year.filter(|s| !s.is_empty()),
        fiscal_period: raw.fiscal_period.filter(|s| !s.is_empty()),
        form: raw.form.filter(|s| !s.is_empty()),
        filed_on: raw.filed_on.filter(|s| !s.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Mutex;

    /// In-memory facts keyed by tag that records which tags were inspected.
    #[derive(Default)]
    struct MapFacts {
        tags: HashMap<String, Vec<RawObservation>>,
        inspected: Mutex<Vec<String>>,
    }

    impl MapFacts {
        fn with(mut self, tag: &str, rows: Vec<RawObservation>) -> Self {
            self.tags.insert(tag.to_string(), rows);
            self
        }

        fn inspected(&self) -> Vec<String> {
            self.inspected.lock().unwrap().clone()
        }
    }

    impl FactsDocument for MapFacts {
        fn entity_name(&self) -> Option<&str> {
            Some("Test Corp")
        }

        fn observations(&self, tag: &str) -> Vec<RawObservation> {
            self.inspected.lock().unwrap().push(tag.to_string());
            self.tags.get(tag).cloned().unwrap_or_default()
        }
    }

    fn obs(amount: &str, end: &str, accn: &str) -> RawObservation {
        RawObservation {
            amount: Some(amount.into()),
            period_end: Some(end.into()),
            filing_id: Some(accn.into()),
            currency: "usd".into(),
            ..Default::default()
        }
    }

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn fallback_stops_at_first_present_tag() {
        let facts = MapFacts::default()
            .with("B", vec![obs("200", "2023-06-30", "b-1")])
            .with("C", vec![obs("999", "2024-06-30", "c-1")]);

        let found = extract(&facts, &tags(&["A", "B", "C"])).unwrap();
        assert_eq!(found.tag, "B");
        assert_eq!(found.value, dec("200"));
        assert_eq!(facts.inspected(), vec!["A", "B"]);
    }

    #[test]
    fn latest_period_end_wins() {
        let facts = MapFacts::default().with(
            "Revenues",
            vec![
                obs("100", "2023-03-31", "q1"),
                obs("300", "2023-09-30", "q3"),
                obs("200", "2023-06-30", "q2"),
            ],
        );
        let found = extract(&facts, &tags(&["Revenues"])).unwrap();
        assert_eq!(found.value, dec("300"));
        assert_eq!(found.source_filing_id.as_deref(), Some("q3"));
    }

    #[test]
    fn ties_go_to_last_listed() {
        let facts = MapFacts::default().with(
            "Revenues",
            vec![
                obs("100", "2023-09-30", "original"),
                obs("105", "2023-09-30", "amended"),
            ],
        );
        let found = extract(&facts, &tags(&["Revenues"])).unwrap();
        assert_eq!(found.source_filing_id.as_deref(), Some("amended"));
    }

    #[test]
    fn incomplete_observations_are_discarded() {
        let mut no_accn = obs("500", "2024-12-31", "x");
        no_accn.filing_id = None;
        let mut no_end = obs("500", "2024-12-31", "y");
        no_end.period_end = None;
        let mut no_val = obs("500", "2024-12-31", "z");
        no_val.amount = None;

        let facts = MapFacts::default().with(
            "Revenues",
            vec![no_accn, no_end, no_val, obs("42", "2020-12-31", "ok")],
        );
        let found = extract(&facts, &tags(&["Revenues"])).unwrap();
        assert_eq!(found.source_filing_id.as_deref(), Some("ok"));
    }

    #[test]
    fn placeholder_amount_skips_only_that_entry() {
        let facts = MapFacts::default().with(
            "Revenues",
            vec![obs("1,234,500", "2023-03-31", "good"), obs("—", "2023-06-30", "blank")],
        );
        let found = extract(&facts, &tags(&["Revenues"])).unwrap();
        assert_eq!(found.value, dec("1234500"));
    }

    #[test]
    fn tag_with_only_invalid_entries_falls_through() {
        let facts = MapFacts::default()
            .with("A", vec![obs("NaN", "2023-06-30", "a")])
            .with("B", vec![obs("7", "2022-06-30", "b")]);
        let found = extract(&facts, &tags(&["A", "B"])).unwrap();
        assert_eq!(found.tag, "B");
    }

    #[test]
    fn absent_when_nothing_matches() {
        let facts = MapFacts::default();
        assert!(extract(&facts, &tags(&["A", "B"])).is_none());
        assert!(extract(&facts, &[]).is_none());
    }

    #[test]
    fn period_end_is_normalised() {
        let facts = MapFacts::default().with(
            "매출액",
            vec![obs("302,231,360", "2023.01.01 ~ 2023.12.31", "20240312000736")],
        );
        let found = extract(&facts, &tags(&["매출액"])).unwrap();
        assert_eq!(found.period_end, "2023-12-31");
    }
}
