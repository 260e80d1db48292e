//! OpenDART response shapes.
//!
//! Every endpoint answers HTTP 200 and reports failures through a
//! `status`/`message` pair in the body.

use filingwatch_core::{ProviderError, ReportPeriod};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub list: Vec<T>,
}

/// One row of `list.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisclosureRow {
    #[serde(default)]
    pub corp_name: String,
    #[serde(default)]
    pub report_nm: String,
    #[serde(default)]
    pub rcept_no: String,
    /// `YYYYMMDD`
    #[serde(default)]
    pub rcept_dt: String,
}

/// One account row of `fnlttSinglAcnt.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementRow {
    #[serde(default)]
    pub rcept_no: Option<String>,
    #[serde(default)]
    pub bsns_year: Option<String>,
    #[serde(default)]
    pub reprt_code: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub account_nm: String,
    /// `CFS` (consolidated) or `OFS` (separate).
    #[serde(default)]
    pub fs_div: Option<String>,
    #[serde(default)]
    pub thstrm_dt: Option<String>,
    #[serde(default)]
    pub thstrm_amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// `company.json`, which is flat rather than list-shaped.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyOverview {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub corp_name: Option<String>,
}

/// Map an OpenDART body status to the provider error taxonomy.
pub fn check_status(status: &str, message: &str) -> Result<(), ProviderError> {
    match status {
        "000" => Ok(()),
        "013" => Err(ProviderError::NotFound(format!("OpenDART: {message}"))),
        "010" | "011" | "012" | "901" => {
            Err(ProviderError::Auth(format!("OpenDART status {status}: {message}")))
        }
        "100" | "101" => Err(ProviderError::Config(format!("OpenDART status {status}: {message}"))),
        _ => Err(ProviderError::Transport(format!("OpenDART status {status}: {message}"))),
    }
}

/// `reprt_code` query value for a reporting period.
pub fn report_code(period: ReportPeriod) -> &'static str {
    match period {
        ReportPeriod::Q1 => "11011",
        ReportPeriod::Half => "11012",
        ReportPeriod::Q3 => "11013",
        ReportPeriod::Annual => "11014",
    }
}

pub fn report_label(period: ReportPeriod) -> &'static str {
    match period {
        ReportPeriod::Q1 => "Q1 Report",
        ReportPeriod::Half => "Semiannual Report",
        ReportPeriod::Q3 => "Q3 Report",
        ReportPeriod::Annual => "Annual Report",
    }
}
