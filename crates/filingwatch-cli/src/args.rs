use std::path::PathBuf;

use clap::Parser;
use filingwatch_core::{MetricPreset, ProviderKind, ReportPeriod};

#[derive(Debug, Clone, Parser)]
#[command(name = "filingwatch")]
#[command(
    version,
    about = "Watch one filer's disclosures and resolve YES/NO when a reported metric beats a threshold",
    long_about = None
)]
pub struct Args {
    /// Disclosure source: sec or dart
    #[arg(long, env = "FILINGWATCH_PROVIDER", default_value = "sec")]
    pub provider: ProviderKind,

    /// CIK (sec) or corporation code, stock code, or name (dart)
    #[arg(long, visible_alias = "cik")]
    pub filer: Option<String>,

    /// Resolve YES when the metric is strictly greater than this
    #[arg(long, visible_alias = "estimate")]
    pub threshold: Option<String>,

    /// Comma-separated candidate tags, highest priority first
    #[arg(long, conflicts_with = "preset")]
    pub tags: Option<String>,

    /// Built-in tag list: revenue or net-income
    #[arg(long)]
    pub preset: Option<MetricPreset>,

    /// Form types (sec) or disclosure kinds (dart) to watch
    #[arg(long, value_delimiter = ',')]
    pub forms: Vec<String>,

    /// Fiscal year to read statements for (dart)
    #[arg(long)]
    pub year: Option<i32>,

    /// Reporting period: annual, half, q1, q3 (dart)
    #[arg(long)]
    pub period: Option<ReportPeriod>,

    /// XBRL unit observations must be reported in (sec)
    #[arg(long, default_value = "USD")]
    pub unit: String,

    /// Use separate instead of consolidated statements (dart)
    #[arg(long)]
    pub separate: bool,

    /// Seconds between polling cycles
    #[arg(long, env = "POLL_INTERVAL_SEC", default_value_t = 600)]
    pub interval: u64,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Print only the JSON record on resolution
    #[arg(long)]
    pub json_only: bool,

    /// Stop the loop on authentication failures instead of logging and retrying
    #[arg(long)]
    pub fail_fast_on_auth: bool,

    /// User-Agent sent to SEC EDGAR (must include contact details)
    #[arg(long, env = "SEC_USER_AGENT")]
    pub user_agent: Option<String>,

    /// OpenDART API key (falls back to OPEN_DART_API_KEY)
    #[arg(long, env = "DART_API_KEY", hide_env_values = true)]
    pub dart_api_key: Option<String>,

    /// Extracted CORPCODE.xml used instead of downloading the list (dart)
    #[arg(long, env = "DART_CORP_CODE_FILE")]
    pub corp_code_file: Option<PathBuf>,

    #[arg(long, env = "SEC_MIN_REQUEST_INTERVAL_MS", default_value_t = 100, hide = true)]
    pub sec_min_interval_ms: u64,

    #[arg(long, env = "DART_MIN_REQUEST_INTERVAL_MS", default_value_t = 200, hide = true)]
    pub dart_min_interval_ms: u64,

    /// Days of disclosures to list (dart)
    #[arg(long, env = "DART_DEFAULT_LIST_DAYS", default_value_t = 90)]
    pub dart_list_days: i64,

    #[arg(long, env = "HTTP_TIMEOUT_SEC", default_value_t = 10, hide = true)]
    pub http_timeout_sec: u64,
}
