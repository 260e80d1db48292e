use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use filingwatch_core::{
    FactsDocument, FilingSummary, MetricLookup, PeriodHint, Provider, ProviderError, RawObservation,
    ReportPeriod, extract, normalize_date,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::context::{ReportingContext, period_candidates, year_candidates};
use super::corp_code::{CorpCodeEntry, is_corp_code, unpack_corp_codes};
use super::types::{
    CompanyOverview, DisclosureRow, Envelope, StatementRow, check_status, report_code, report_label,
};
use crate::http::{build_client, decode, get_bytes, get_text};
use crate::throttle::RateLimiter;

pub const DART_API_BASE: &str = "https://opendart.fss.or.kr/api";

/// Most filings returned by one listing.
const MAX_LISTED_FILINGS: usize = 30;

/// Disclosure kind of periodic reports (business, half-year, quarterly).
const PERIODIC_KIND: &str = "A";

#[derive(Debug, Clone)]
pub struct DartConfig {
    pub api_key: String,
    pub min_interval: Duration,
    pub timeout: Duration,
    /// Listing window, in days back from today.
    pub list_days: i64,
    /// Fixed fiscal year; inferred from the newest periodic report when unset.
    pub year: Option<i32>,
    /// Fixed reporting period; inferred when unset.
    pub period: Option<ReportPeriod>,
    /// Prefer consolidated (`CFS`) over separate (`OFS`) statements.
    pub consolidated: bool,
    pub base_url: String,
}

impl Default for DartConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            min_interval: Duration::from_millis(200),
            timeout: Duration::from_secs(10),
            list_days: 90,
            year: None,
            period: None,
            consolidated: true,
            base_url: DART_API_BASE.to_string(),
        }
    }
}

/// Rate-limited OpenDART client scoped to one corporation code.
pub struct DartClient {
    http: reqwest::Client,
    limiter: RateLimiter,
    corp_code: String,
    api_key: String,
    list_days: i64,
    year: Option<i32>,
    period: Option<ReportPeriod>,
    fs_div: &'static str,
    base_url: String,
}

impl DartClient {
    pub fn new(corp_code: &str, config: DartConfig) -> Result<Self, ProviderError> {
        let corp_code = corp_code.trim();
        if !is_corp_code(corp_code) {
            return Err(ProviderError::Config(format!(
                "invalid corporation code '{corp_code}', expected 8 digits"
            )));
        }
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Config("OpenDART requires an API key".into()));
        }
        Ok(Self {
            http: build_client(&user_agent(), config.timeout)?,
            limiter: RateLimiter::new(config.min_interval),
            corp_code: corp_code.to_string(),
            api_key: config.api_key.trim().to_string(),
            list_days: config.list_days.max(1),
            year: config.year,
            period: config.period,
            fs_div: if config.consolidated { "CFS" } else { "OFS" },
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn corp_code(&self) -> &str {
        &self.corp_code
    }

    /// Download and unpack the full corporation code list.
    ///
    /// Runs before a client exists, since it is how a name or stock code
    /// becomes the corporation code the client is scoped to.
    pub async fn corp_code_list(config: &DartConfig) -> Result<Vec<CorpCodeEntry>, ProviderError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(ProviderError::Config("OpenDART requires an API key".into()));
        }
        let http = build_client(&user_agent(), config.timeout)?;
        let limiter = RateLimiter::new(config.min_interval);
        let url = format!("{}/corpCode.xml", config.base_url.trim_end_matches('/'));
        let body = get_bytes(&http, &limiter, &url, &[("crtfc_key", api_key.to_string())]).await?;
        let entries = unpack_corp_codes(&body)?;
        info!(count = entries.len(), "downloaded corporation code list");
        Ok(entries)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("crtfc_key", self.api_key.clone()),
            ("corp_code", self.corp_code.clone()),
        ];
        query.extend(params.iter().cloned());
        let body = get_text(&self.http, &self.limiter, &url, &query).await?;
        decode(&body, endpoint)
    }

    /// Disclosures inside the listing window, optionally of one kind.
    /// "No data" is an empty list.
    pub async fn list_filings(&self, kind: Option<&str>) -> Result<Vec<DisclosureRow>, ProviderError> {
        let end = Local::now().date_naive();
        let begin = end - chrono::Duration::days(self.list_days);
        let mut params = vec![
            ("bgn_de", yyyymmdd(begin)),
            ("end_de", yyyymmdd(end)),
            ("page_count", "100".to_string()),
        ];
        if let Some(kind) = kind {
            params.push(("pblntf_ty", kind.to_string()));
        }

        let envelope: Envelope<DisclosureRow> = self.call("list.json", &params).await?;
        match check_status(&envelope.status, &envelope.message) {
            Ok(()) => Ok(envelope.list),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Single-company key accounts for one fiscal year and period.
    /// `None` when OpenDART has no table for that period.
    pub async fn financial_statements(
        &self,
        year: i32,
        period: ReportPeriod,
    ) -> Result<Option<Vec<StatementRow>>, ProviderError> {
        let params = [
            ("bsns_year", year.to_string()),
            ("reprt_code", report_code(period).to_string()),
        ];
        let envelope: Envelope<StatementRow> = self.call("fnlttSinglAcnt.json", &params).await?;
        match check_status(&envelope.status, &envelope.message) {
            Ok(()) if envelope.list.is_empty() => Ok(None),
            Ok(()) => Ok(Some(envelope.list)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn company(&self) -> Result<CompanyOverview, ProviderError> {
        let overview: CompanyOverview = self.call("company.json", &[]).await?;
        check_status(&overview.status, &overview.message)?;
        Ok(overview)
    }

    /// Registered name from `company.json`; lookup failures only cost the name.
    async fn company_name(&self) -> Option<String> {
        match self.company().await {
            Ok(overview) => overview.corp_name.filter(|n| !n.trim().is_empty()),
            Err(err) => {
                debug!(corp_code = %self.corp_code, error = %err, "company overview unavailable");
                None
            }
        }
    }

    /// Year and period implied by the newest periodic report.
    pub async fn reporting_context(&self) -> Result<ReportingContext, ProviderError> {
        let rows = self.list_filings(Some(PERIODIC_KIND)).await?;
        let newest = merge_listings(rows).into_iter().next();
        Ok(newest.map(ReportingContext::from_filing).unwrap_or_default())
    }

    async fn statement_table(
        &self,
        hint: PeriodHint,
        context: &ReportingContext,
    ) -> Result<Option<StatementTable>, ProviderError> {
        let rows = self.financial_statements(hint.year, hint.period).await?;
        Ok(rows.map(|rows| StatementTable::new(rows, hint, self.fs_div, context)))
    }
}

#[async_trait]
impl Provider for DartClient {
    fn name(&self) -> &'static str {
        "dart"
    }

    fn filer_identifier(&self) -> &str {
        &self.corp_code
    }

    async fn list_recent_filings(
        &self,
        form_filter: &[String],
    ) -> Result<Vec<FilingSummary>, ProviderError> {
        let rows = if form_filter.is_empty() {
            self.list_filings(None).await?
        } else {
            let mut rows = Vec::new();
            for kind in form_filter {
                rows.extend(self.list_filings(Some(kind)).await?);
            }
            rows
        };
        let filings: Vec<FilingSummary> = merge_listings(rows).into_iter().map(summarize).collect();
        info!(corp_code = %self.corp_code, count = filings.len(), "listed recent disclosures");
        Ok(filings)
    }

    async fn fetch_facts(
        &self,
        hint: Option<PeriodHint>,
    ) -> Result<Option<Box<dyn FactsDocument>>, ProviderError> {
        let context = self.reporting_context().await?;
        let hint = match hint {
            Some(hint) => hint,
            None => {
                let year = year_candidates(self.year, context.year, Local::now().year())[0];
                let period = period_candidates(self.period, context.period)[0];
                PeriodHint { year, period }
            }
        };
        Ok(self
            .statement_table(hint, &context)
            .await?
            .map(|table| Box::new(table) as Box<dyn FactsDocument>))
    }

    async fn fetch_metric(&self, candidate_tags: &[String]) -> Result<MetricLookup, ProviderError> {
        let context = self.reporting_context().await?;
        let years = year_candidates(self.year, context.year, Local::now().year());
        let periods = period_candidates(self.period, context.period);
        debug!(?years, ?periods, "searching statement tables");

        let ctx = &context;
        let lookup = search_periods(&years, &periods, candidate_tags, move |hint| {
            self.statement_table(hint, ctx)
        })
        .await?;

        match lookup {
            MetricLookup::Found {
                observation,
                filer_name: None,
            } => Ok(MetricLookup::Found {
                observation,
                filer_name: self.company_name().await,
            }),
            other => Ok(other),
        }
    }
}

/// Walk years × periods in order, fetching each distinct table at most once.
///
/// Tables present without a matching account make the result
/// `MetricNotFound`; no tables at all is `FactsUnavailable`.
pub(crate) async fn search_periods<F, Fut>(
    years: &[i32],
    periods: &[ReportPeriod],
    candidate_tags: &[String],
    mut fetch: F,
) -> Result<MetricLookup, ProviderError>
where
    F: FnMut(PeriodHint) -> Fut,
    Fut: Future<Output = Result<Option<StatementTable>, ProviderError>>,
{
    let mut tried = HashSet::new();
    let mut saw_table = false;

    for &year in years {
        for &period in periods {
            let hint = PeriodHint { year, period };
            if !tried.insert(hint) {
                continue;
            }
            let Some(table) = fetch(hint).await? else {
                debug!(year, period = %period, "no statement table");
                continue;
            };
            saw_table = true;
            if let Some(observation) = extract(&table, candidate_tags) {
                info!(year, period = %period, tag = %observation.tag, "metric found in statement table");
                return Ok(MetricLookup::Found {
                    observation,
                    filer_name: table.entity_name().map(str::to_string),
                });
            }
        }
    }

    Ok(if saw_table {
        MetricLookup::MetricNotFound
    } else {
        MetricLookup::FactsUnavailable
    })
}

/// Drop duplicate receipts and order newest first, capped at 30.
fn merge_listings(rows: Vec<DisclosureRow>) -> Vec<DisclosureRow> {
    let mut seen = HashSet::new();
    let mut rows: Vec<DisclosureRow> = rows
        .into_iter()
        .filter(|r| !r.rcept_no.is_empty() && seen.insert(r.rcept_no.clone()))
        .collect();
    rows.sort_by(|a, b| (&b.rcept_dt, &b.rcept_no).cmp(&(&a.rcept_dt, &a.rcept_no)));
    rows.truncate(MAX_LISTED_FILINGS);
    rows
}

fn summarize(row: DisclosureRow) -> FilingSummary {
    FilingSummary {
        filed_on: normalize_date(&row.rcept_dt).unwrap_or_else(|| row.rcept_dt.clone()),
        form_type: row.report_nm,
        filing_id: row.rcept_no,
    }
}

fn user_agent() -> String {
    format!("filingwatch/{}", env!("CARGO_PKG_VERSION"))
}

fn yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// One fetched `fnlttSinglAcnt` table, attributed to the report it came from.
#[derive(Debug, Clone)]
pub struct StatementTable {
    rows: Vec<StatementRow>,
    hint: PeriodHint,
    fs_div: &'static str,
    corp_name: Option<String>,
    receipt_no: Option<String>,
    filed_on: Option<String>,
}

impl StatementTable {
    pub fn new(rows: Vec<StatementRow>, hint: PeriodHint, fs_div: &'static str, context: &ReportingContext) -> Self {
        Self {
            rows,
            hint,
            fs_div,
            corp_name: context.corp_name().map(str::to_string),
            receipt_no: context.receipt_no().map(str::to_string),
            filed_on: context.filed_on(),
        }
    }

    fn matching_rows(&self, tag: &str) -> Vec<&StatementRow> {
        let wanted = tag.trim().to_lowercase();
        let matching: Vec<&StatementRow> = self
            .rows
            .iter()
            .filter(|r| {
                r.account_nm.trim().to_lowercase() == wanted || r.account_id.as_deref() == Some(tag.trim())
            })
            .collect();

        let preferred: Vec<&StatementRow> = matching
            .iter()
            .copied()
            .filter(|r| {
                r.fs_div
                    .as_deref()
                    .is_none_or(|d| d.trim().is_empty() || d.eq_ignore_ascii_case(self.fs_div))
            })
            .collect();
        if preferred.is_empty() { matching } else { preferred }
    }
}

impl FactsDocument for StatementTable {
    fn entity_name(&self) -> Option<&str> {
        self.corp_name.as_deref()
    }

    fn observations(&self, tag: &str) -> Vec<RawObservation> {
        self.matching_rows(tag)
            .into_iter()
            .map(|row| RawObservation {
                amount: row.thstrm_amount.clone(),
                period_end: row.thstrm_dt.clone(),
                filing_id: row
                    .rcept_no
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .or_else(|| self.receipt_no.clone()),
                currency: row
                    .currency
                    .as_deref()
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| "krw".to_string()),
                fiscal_year: row
                    .bsns_year
                    .clone()
                    .filter(|s| !s.is_empty())
                    .or_else(|| Some(self.hint.year.to_string())),
                fiscal_period: Some(self.hint.period.fiscal_label().to_string()),
                form: Some(report_label(self.hint.period).to_string()),
                filed_on: self.filed_on.clone(),
            })
            .collect()
    }
}
