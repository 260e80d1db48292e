//! Vertical card display for resolution records.
//!
//! Renders a [`ResolutionRecord`] as a grouped, human-readable card,
//! followed by the record as pretty JSON.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Context;
use filingwatch_core::{ResolutionRecord, format_amount};
use rust_decimal::Decimal;

use crate::settings::Settings;

// ── Public API ──

/// Startup summary, written to stderr so stdout carries only records.
pub fn print_banner(settings: &Settings) {
    eprint!("{}", render_banner(settings));
}

/// Emit a resolved record: card then JSON, or JSON alone.
pub fn write_record(out: &mut dyn Write, record: &ResolutionRecord, json_only: bool) -> anyhow::Result<()> {
    if !json_only {
        out.write_all(render_card(record).as_bytes())?;
    }
    writeln!(out, "{}", render_json(record)?)?;
    out.flush()?;
    Ok(())
}

pub fn render_banner(settings: &Settings) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "=== filingwatch v{} ===", env!("CARGO_PKG_VERSION"));
    field(&mut s, "provider", settings.provider.as_str());
    field(&mut s, "filer", &settings.filer);
    field(&mut s, "threshold", &format_amount(settings.threshold));
    field(&mut s, "tags", &settings.tags.join(", "));
    field(&mut s, "forms", &settings.forms.join(", "));
    if settings.once {
        field(&mut s, "mode", "single cycle");
    } else {
        field(&mut s, "interval", &format!("{}s", settings.interval.as_secs()));
    }
    s.push('\n');
    s
}

pub fn render_card(record: &ResolutionRecord) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "=== RESOLVED: {} ===", record.outcome);
    let _ = writeln!(s, "{} ({})", record.filer_name, record.filer_identifier);
    s.push('\n');

    let metric = &record.metric;
    let currency = metric.currency.to_uppercase();

    section(&mut s, "Filing");
    field(&mut s, "form_type", &record.filing.form_type);
    field(&mut s, "filing_id", &record.filing.filing_id);
    field(&mut s, "filed_on", &record.filing.filed_on);
    s.push('\n');

    section(&mut s, "Metric");
    field(&mut s, "tag", &metric.tag);
    field(&mut s, "value", &money(metric.value, &currency));
    field(&mut s, "period_end", &metric.period_end);
    optional(&mut s, "fiscal_year", metric.fiscal_year.as_deref());
    optional(&mut s, "fiscal_period", metric.fiscal_period.as_deref());
    optional(&mut s, "form", metric.form.as_deref());
    optional(&mut s, "source_filing_id", metric.source_filing_id.as_deref());
    s.push('\n');

    section(&mut s, "Decision");
    field(&mut s, "threshold", &money(record.threshold, &currency));
    field(&mut s, "outcome", record.outcome.as_str());
    field(
        &mut s,
        "resolved_at",
        &record.resolved_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    );
    s.push('\n');
    s
}

pub fn render_json(record: &ResolutionRecord) -> anyhow::Result<String> {
    serde_json::to_string_pretty(record).context("serialising resolution record")
}

// ── Field rendering ──

fn section(s: &mut String, header: &str) {
    let _ = writeln!(s, "{header}");
}

fn field(s: &mut String, name: &str, value: &str) {
    let _ = writeln!(s, "  {:<26} {}", name, value);
}

fn optional(s: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        field(s, name, value);
    }
}

fn money(value: Decimal, currency: &str) -> String {
    if currency.is_empty() {
        format_amount(value)
    } else {
        format!("{} {currency}", format_amount(value))
    }
}
