//! Fiscal year and period inference from DART disclosure names.
//!
//! Periodic reports are named like `사업보고서 (2023.12)`,
//! `반기보고서 (2024.06)` or `분기보고서 (2024.03)`. When no year or period
//! is configured, the newest periodic report decides where to look first.

use filingwatch_core::{ReportPeriod, normalize_date};

use super::types::DisclosureRow;

/// Keyword → period, checked in order against the lowercased report name.
const PERIOD_KEYWORDS: &[(&str, ReportPeriod)] = &[
    ("반기", ReportPeriod::Half),
    ("semi", ReportPeriod::Half),
    ("사업", ReportPeriod::Annual),
    ("연간", ReportPeriod::Annual),
    ("1분기", ReportPeriod::Q1),
    ("1q", ReportPeriod::Q1),
    ("3분기", ReportPeriod::Q3),
    ("3q", ReportPeriod::Q3),
];

/// Where the newest periodic report points.
#[derive(Debug, Clone, Default)]
pub struct ReportingContext {
    pub year: Option<i32>,
    pub period: Option<ReportPeriod>,
    pub filing: Option<DisclosureRow>,
}

impl ReportingContext {
    /// The year in the report name (`(2023.12)`) wins over the receipt date's year.
    pub fn from_filing(row: DisclosureRow) -> Self {
        let year = year_from_report_name(&row.report_nm).or_else(|| year_from_receipt_date(&row.rcept_dt));
        let period = period_from_report_name(&row.report_nm);
        Self {
            year,
            period,
            filing: Some(row),
        }
    }

    pub fn corp_name(&self) -> Option<&str> {
        self.filing
            .as_ref()
            .map(|f| f.corp_name.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn receipt_no(&self) -> Option<&str> {
        self.filing
            .as_ref()
            .map(|f| f.rcept_no.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn filed_on(&self) -> Option<String> {
        self.filing.as_ref().and_then(|f| normalize_date(&f.rcept_dt))
    }
}

/// Years to try: the explicit year alone, else inferred (or current) and the one before.
pub fn year_candidates(explicit: Option<i32>, inferred: Option<i32>, current_year: i32) -> Vec<i32> {
    if let Some(year) = explicit {
        return vec![year];
    }
    let base = inferred.unwrap_or(current_year);
    vec![base, base - 1]
}

/// Periods to try: the explicit period alone, else the inferred period
/// followed by the full fallback order.
pub fn period_candidates(explicit: Option<ReportPeriod>, inferred: Option<ReportPeriod>) -> Vec<ReportPeriod> {
    if let Some(period) = explicit {
        return vec![period];
    }
    inferred
        .into_iter()
        .chain(ReportPeriod::FALLBACK_ORDER)
        .collect()
}

/// The `20YY` year inside a report name such as `사업보고서 (2023.12)`.
pub fn year_from_report_name(name: &str) -> Option<i32> {
    let pos = year_position(name)?;
    name[pos..pos + 4].parse().ok()
}

pub fn period_from_report_name(name: &str) -> Option<ReportPeriod> {
    let lower = name.to_lowercase();
    if let Some((_, period)) = PERIOD_KEYWORDS.iter().find(|(kw, _)| lower.contains(kw)) {
        return Some(*period);
    }
    match month_from_report_name(name)? {
        3 => Some(ReportPeriod::Q1),
        6 => Some(ReportPeriod::Half),
        9 => Some(ReportPeriod::Q3),
        12 => Some(ReportPeriod::Annual),
        _ => None,
    }
}

fn month_from_report_name(name: &str) -> Option<u32> {
    let pos = year_position(name)?;
    let rest = name.as_bytes().get(pos + 4..pos + 7)?;
    if rest[0] != b'.' || !rest[1].is_ascii_digit() || !rest[2].is_ascii_digit() {
        return None;
    }
    Some(u32::from(rest[1] - b'0') * 10 + u32::from(rest[2] - b'0'))
}

/// Byte offset of the first `20DD` run. Digits are ASCII, so the offset is a char boundary.
fn year_position(name: &str) -> Option<usize> {
    name.as_bytes()
        .windows(4)
        .position(|w| w[0] == b'2' && w[1] == b'0' && w[2].is_ascii_digit() && w[3].is_ascii_digit())
}

fn year_from_receipt_date(rcept_dt: &str) -> Option<i32> {
    let head = rcept_dt.get(..4)?;
    head.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use filingwatch_core::ReportPeriod::*;

    fn row(report_nm: &str, rcept_dt: &str) -> DisclosureRow {
        DisclosureRow {
            corp_name: "삼성전자".into(),
            report_nm: report_nm.into(),
            rcept_no: "20240312000736".into(),
            rcept_dt: rcept_dt.into(),
        }
    }

    #[test]
    fn annual_report_context() {
        let ctx = ReportingContext::from_filing(row("사업보고서 (2023.12)", "20240312"));
        assert_eq!(ctx.year, Some(2023));
        assert_eq!(ctx.period, Some(Annual));
        assert_eq!(ctx.corp_name(), Some("삼성전자"));
        assert_eq!(ctx.filed_on().as_deref(), Some("2024-03-12"));
    }

    #[test]
    fn annual_2023_candidate_order() {
        let ctx = ReportingContext::from_filing(row("사업보고서 (2023.12)", "20240312"));
        assert_eq!(year_candidates(None, ctx.year, 2026), vec![2023, 2022]);
        assert_eq!(
            period_candidates(None, ctx.period),
            vec![Annual, Half, Annual, Q3, Q1]
        );
    }

    #[test]
    fn explicit_values_override_inference() {
        assert_eq!(year_candidates(Some(2021), Some(2023), 2026), vec![2021]);
        assert_eq!(period_candidates(Some(Q3), Some(Annual)), vec![Q3]);
    }

    #[test]
    fn no_context_uses_current_year_and_fallback_order() {
        assert_eq!(year_candidates(None, None, 2026), vec![2026, 2025]);
        assert_eq!(period_candidates(None, None), vec![Half, Annual, Q3, Q1]);
    }

    #[test]
    fn period_keywords() {
        assert_eq!(period_from_report_name("반기보고서 (2024.06)"), Some(Half));
        assert_eq!(period_from_report_name("[기재정정]사업보고서 (2022.12)"), Some(Annual));
        assert_eq!(period_from_report_name("Semi-annual Report"), Some(Half));
        assert_eq!(period_from_report_name("3Q report"), Some(Q3));
    }

    #[test]
    fn quarterly_reports_infer_from_month() {
        assert_eq!(period_from_report_name("분기보고서 (2024.03)"), Some(Q1));
        assert_eq!(period_from_report_name("분기보고서 (2024.09)"), Some(Q3));
        assert_eq!(period_from_report_name("분기보고서"), None);
    }

    #[test]
    fn year_falls_back_to_receipt_date() {
        let ctx = ReportingContext::from_filing(row("주요사항보고서", "20250102"));
        assert_eq!(ctx.year, Some(2025));
        assert_eq!(ctx.period, None);
    }

    #[test]
    fn year_from_name_ignores_other_digits() {
        assert_eq!(year_from_report_name("제55기 사업보고서 (2023.12)"), Some(2023));
        assert_eq!(year_from_report_name("사업보고서"), None);
    }
}
