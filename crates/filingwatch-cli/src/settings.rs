//! Turn parsed arguments (plus prompts) into a watcher configuration and a provider client.

use std::time::Duration;

use anyhow::{Context, bail};
use filingwatch_core::{
    MarketConfig, MetricPreset, Provider, ProviderKind, parse_amount, parse_tag_list,
};
use filingwatch_sources::dart::corp_code::{is_corp_code, load_corp_codes, resolve_corp_code};
use filingwatch_sources::{DartClient, DartConfig, SecClient, SecConfig};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::args::Args;
use crate::poll::PollOptions;
use crate::prompt::Prompter;

/// Fully resolved watcher settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: ProviderKind,
    pub filer: String,
    pub threshold: Decimal,
    pub tags: Vec<String>,
    pub forms: Vec<String>,
    pub interval: Duration,
    pub once: bool,
    pub json_only: bool,
    pub fail_fast_on_auth: bool,
}

impl Settings {
    pub fn market_config(&self) -> MarketConfig {
        MarketConfig {
            tags: self.tags.clone(),
            threshold: self.threshold,
            forms: self.forms.clone(),
        }
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: self.interval,
            once: self.once,
            json_only: self.json_only,
            fail_fast_on_auth: self.fail_fast_on_auth,
        }
    }
}

/// Fill in settings from `args`, prompting for a missing filer, threshold, or tag list.
pub fn resolve(args: &Args, prompt: &mut dyn Prompter) -> anyhow::Result<Settings> {
    let filer = match args.filer.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(filer) => filer.to_string(),
        None => {
            let question = match args.provider {
                ProviderKind::Sec => "Company CIK",
                ProviderKind::Dart => "Corporation code, stock code, or name",
            };
            prompt.ask(question)?.trim().to_string()
        }
    };
    if filer.is_empty() {
        bail!("a filer identifier is required");
    }

    let threshold_raw = match args.threshold.as_deref() {
        Some(raw) => raw.to_string(),
        None => prompt.ask("Threshold (e.g. 125000000000)")?,
    };
    let threshold = parse_threshold(&threshold_raw)?;

    let tags = match (&args.tags, args.preset) {
        (Some(list), _) => parse_tag_list(list),
        (None, Some(preset)) => args.provider.preset_tags(preset),
        (None, None) => {
            let answer = prompt.ask("Candidate tags, comma-separated (blank for revenue preset)")?;
            if answer.trim().is_empty() {
                args.provider.preset_tags(MetricPreset::Revenue)
            } else {
                parse_tag_list(&answer)
            }
        }
    };
    if tags.is_empty() {
        bail!("at least one candidate tag is required");
    }

    let forms: Vec<String> = args
        .forms
        .iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    let forms = if forms.is_empty() {
        args.provider.default_forms()
    } else {
        forms
    };

    Ok(Settings {
        provider: args.provider,
        filer,
        threshold,
        tags,
        forms,
        interval: Duration::from_secs(args.interval.max(1)),
        once: args.once,
        json_only: args.json_only,
        fail_fast_on_auth: args.fail_fast_on_auth,
    })
}

fn parse_threshold(raw: &str) -> anyhow::Result<Decimal> {
    match parse_amount(raw) {
        Some(value) => Ok(value),
        None => bail!("threshold must be numeric, got '{}'", raw.trim()),
    }
}

/// Construct the provider client for `settings.provider`.
///
/// A DART filer given by name or stock code is resolved against the
/// corporation code list first, which may mean downloading it.
pub async fn build_provider(args: &Args, settings: &Settings) -> anyhow::Result<Box<dyn Provider>> {
    let timeout = Duration::from_secs(args.http_timeout_sec.max(1));
    match settings.provider {
        ProviderKind::Sec => {
            if args.year.is_some() || args.period.is_some() || args.separate {
                warn!("--year, --period and --separate only apply to dart; ignoring");
            }
            let mut config = SecConfig {
                min_interval: Duration::from_millis(args.sec_min_interval_ms),
                timeout,
                unit: args.unit.trim().to_string(),
                ..SecConfig::default()
            };
            if let Some(user_agent) = args.user_agent.as_deref().filter(|s| !s.trim().is_empty()) {
                config.user_agent = user_agent.trim().to_string();
            }
            let client = SecClient::new(&settings.filer, config).context("configuring SEC client")?;
            Ok(Box::new(client))
        }
        ProviderKind::Dart => {
            let api_key = dart_api_key(args)?;
            let config = DartConfig {
                api_key,
                min_interval: Duration::from_millis(args.dart_min_interval_ms),
                timeout,
                list_days: args.dart_list_days,
                year: args.year,
                period: args.period,
                consolidated: !args.separate,
                ..DartConfig::default()
            };
            let corp_code = dart_corp_code(args, &config, &settings.filer).await?;
            let client = DartClient::new(&corp_code, config).context("configuring OpenDART client")?;
            Ok(Box::new(client))
        }
    }
}

fn dart_api_key(args: &Args) -> anyhow::Result<String> {
    args.dart_api_key
        .clone()
        .or_else(|| std::env::var("OPEN_DART_API_KEY").ok())
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .context("OpenDART needs an API key: set DART_API_KEY or OPEN_DART_API_KEY")
}

async fn dart_corp_code(args: &Args, config: &DartConfig, filer: &str) -> anyhow::Result<String> {
    let filer = filer.trim();
    if is_corp_code(filer) {
        return Ok(filer.to_string());
    }
    let (entries, source) = match args.corp_code_file.as_deref() {
        Some(path) => (load_corp_codes(path)?, path.display().to_string()),
        None => {
            let entries = DartClient::corp_code_list(config)
                .await
                .context("downloading the OpenDART corporation code list (set DART_CORP_CODE_FILE to use a local copy)")?;
            (entries, "the OpenDART corporation code list".to_string())
        }
    };
    let corp_code = resolve_corp_code(filer, &entries).with_context(|| format!("resolving '{filer}' against {source}"))?;
    info!(query = filer, corp_code = %corp_code, "resolved corporation code");
    Ok(corp_code)
}
