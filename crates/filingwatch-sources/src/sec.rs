//! SEC EDGAR client: recent submissions and XBRL company facts.
//!
//! EDGAR requires a `User-Agent` with contact details and allows at most
//! 10 requests per second per client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use filingwatch_core::{FactsDocument, FilingSummary, PeriodHint, Provider, ProviderError, RawObservation};
use serde::Deserialize;
use tracing::{info, warn};

use crate::http::{build_client, decode, get_text};
use crate::throttle::RateLimiter;

pub const SEC_API_BASE: &str = "https://data.sec.gov";

/// Namespaces searched, in order, for an unqualified tag.
const DEFAULT_NAMESPACES: &[&str] = &["us-gaap", "ifrs-full"];

/// Tunables for [`SecClient`].
#[derive(Debug, Clone)]
pub struct SecConfig {
    pub user_agent: String,
    pub min_interval: Duration,
    pub timeout: Duration,
    /// XBRL unit key observations must be reported in (`USD`).
    pub unit: String,
    pub base_url: String,
}

impl Default for SecConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("filingwatch/{} contact@example.com", env!("CARGO_PKG_VERSION")),
            min_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(10),
            unit: "USD".to_string(),
            base_url: SEC_API_BASE.to_string(),
        }
    }
}

// ── Wire types ──

#[derive(Debug, Deserialize)]
pub struct Submissions {
    #[serde(default)]
    pub filings: SubmissionFilings,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionFilings {
    #[serde(default)]
    pub recent: RecentFilings,
}

/// Parallel arrays, one index per filing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    #[serde(default)]
    pub accession_number: Vec<String>,
    #[serde(default)]
    pub filing_date: Vec<String>,
    #[serde(default)]
    pub form: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFacts {
    #[serde(default)]
    pub entity_name: Option<String>,
    /// namespace → tag → concept
    #[serde(default)]
    pub facts: HashMap<String, HashMap<String, Concept>>,
}

#[derive(Debug, Deserialize)]
pub struct Concept {
    /// unit → observations
    #[serde(default)]
    pub units: HashMap<String, Vec<FactEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FactEntry {
    #[serde(default)]
    pub val: Option<serde_json::Value>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub accn: Option<String>,
    #[serde(default)]
    pub fy: Option<serde_json::Value>,
    #[serde(default)]
    pub fp: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub filed: Option<String>,
}

// ── Client ──

/// Rate-limited EDGAR client scoped to one CIK.
pub struct SecClient {
    http: reqwest::Client,
    limiter: RateLimiter,
    cik: String,
    unit: String,
    base_url: String,
}

impl SecClient {
    /// Create a client for `cik` (padded to 10 digits).
    pub fn new(cik: &str, config: SecConfig) -> Result<Self, ProviderError> {
        let cik = pad_cik(cik)?;
        if config.user_agent.trim().is_empty() {
            return Err(ProviderError::Config("SEC requires a non-empty User-Agent".into()));
        }
        Ok(Self {
            http: build_client(&config.user_agent, config.timeout)?,
            limiter: RateLimiter::new(config.min_interval),
            cik,
            unit: config.unit,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn cik(&self) -> &str {
        &self.cik
    }

    /// Fetch the submissions document. `None` when EDGAR has no such CIK.
    pub async fn submissions(&self) -> Result<Option<Submissions>, ProviderError> {
        let url = format!("{}/submissions/CIK{}.json", self.base_url, self.cik);
        match get_text(&self.http, &self.limiter, &url, &[]).await {
            Ok(body) => decode(&body, "submissions").map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Fetch the XBRL company-facts document. `None` when none is published.
    pub async fn company_facts(&self) -> Result<Option<CompanyFacts>, ProviderError> {
        let url = format!("{}/api/xbrl/companyfacts/CIK{}.json", self.base_url, self.cik);
        match get_text(&self.http, &self.limiter, &url, &[]).await {
            Ok(body) => decode(&body, "companyfacts").map(Some),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl Provider for SecClient {
    fn name(&self) -> &'static str {
        "sec"
    }

    fn filer_identifier(&self) -> &str {
        &self.cik
    }

    async fn list_recent_filings(
        &self,
        form_filter: &[String],
    ) -> Result<Vec<FilingSummary>, ProviderError> {
        let Some(submissions) = self.submissions().await? else {
            warn!(cik = %self.cik, "no submissions document for CIK");
            return Ok(Vec::new());
        };
        let filings = recent_filings(&submissions.filings.recent, form_filter);
        info!(cik = %self.cik, count = filings.len(), "listed recent filings");
        Ok(filings)
    }

    async fn fetch_facts(
        &self,
        _hint: Option<PeriodHint>,
    ) -> Result<Option<Box<dyn FactsDocument>>, ProviderError> {
        Ok(self.company_facts().await?.map(|facts| {
            Box::new(SecFacts::new(facts, &self.unit)) as Box<dyn FactsDocument>
        }))
    }
}

/// Zip the parallel arrays, keep matching forms, and order newest first.
pub fn recent_filings(recent: &RecentFilings, form_filter: &[String]) -> Vec<FilingSummary> {
    let mut filings: Vec<FilingSummary> = recent
        .form
        .iter()
        .zip(&recent.accession_number)
        .zip(&recent.filing_date)
        .filter(|((form, _), _)| form_filter.is_empty() || form_filter.iter().any(|f| f == *form))
        .map(|((form, accn), date)| FilingSummary {
            form_type: form.clone(),
            filing_id: accn.clone(),
            filed_on: date.clone(),
        })
        .collect();
    // Stable: same-day filings keep EDGAR's order.
    filings.sort_by(|a, b| b.filed_on.cmp(&a.filed_on));
    filings
}

/// Pad a CIK to EDGAR's 10-digit form.
pub fn pad_cik(cik: &str) -> Result<String, ProviderError> {
    let trimmed = cik.trim().trim_start_matches("CIK").trim_start_matches('0');
    if trimmed.is_empty() || trimmed.len() > 10 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProviderError::Config(format!("invalid CIK '{}'", cik.trim())));
    }
    Ok(format!("{trimmed:0>10}"))
}

// ── Facts accessor ──

/// Company facts restricted to one reporting unit.
pub struct SecFacts {
    facts: CompanyFacts,
    unit: String,
}

impl SecFacts {
    pub fn new(facts: CompanyFacts, unit: &str) -> Self {
        Self {
            facts,
            unit: unit.to_string(),
        }
    }

    fn concept(&self, tag: &str) -> Option<&Concept> {
        match tag.split_once(':') {
            Some((ns, name)) => self.facts.facts.get(ns)?.get(name),
            None => DEFAULT_NAMESPACES
                .iter()
                .find_map(|ns| self.facts.facts.get(*ns)?.get(tag)),
        }
    }
}

impl FactsDocument for SecFacts {
    fn entity_name(&self) -> Option<&str> {
        self.facts.entity_name.as_deref()
    }

    fn observations(&self, tag: &str) -> Vec<RawObservation> {
        let Some(concept) = self.concept(tag) else {
            return Vec::new();
        };
        let Some(entries) = concept
            .units
            .iter()
            .find(|(unit, _)| unit.eq_ignore_ascii_case(&self.unit))
            .map(|(_, entries)| entries)
        else {
            return Vec::new();
        };

        let currency = self.unit.to_ascii_lowercase();
        entries
            .iter()
            .map(|entry| RawObservation {
                amount: entry.val.as_ref().and_then(json_scalar),
                period_end: entry.end.clone(),
                filing_id: entry.accn.clone(),
                currency: currency.clone(),
                fiscal_year: entry.fy.as_ref().and_then(json_scalar),
                fiscal_period: entry.fp.clone(),
                form: entry.form.clone(),
                filed_on: entry.filed.clone(),
            })
            .collect()
    }
}

/// Render a JSON number or string as text; anything else is absent.
fn json_scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
