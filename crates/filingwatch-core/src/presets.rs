//! Built-in candidate tag lists and form filters per provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

const SEC_REVENUE: &[&str] = &[
    "RevenueFromContractWithCustomerExcludingAssessedTax",
    "SalesRevenueNet",
    "Revenues",
];

const SEC_NET_INCOME: &[&str] = &["NetIncomeLoss", "ProfitLoss"];

const DART_REVENUE: &[&str] = &["매출액", "매출총액", "영업수익", "Revenue"];

const DART_NET_INCOME: &[&str] = &["당기순이익(손실)", "당기순이익", "분기순이익", "반기순이익"];

/// Which upstream disclosure system a watcher polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// US SEC EDGAR.
    Sec,
    /// Korea FSS OpenDART.
    Dart,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sec => "sec",
            Self::Dart => "dart",
        }
    }

    /// Forms watched when the operator gives none.
    pub fn default_forms(&self) -> Vec<String> {
        let forms: &[&str] = match self {
            Self::Sec => &["10-Q", "10-K"],
            // DART disclosure kind A: periodic reports.
            Self::Dart => &["A"],
        };
        forms.iter().map(|s| s.to_string()).collect()
    }

    pub fn preset_tags(&self, preset: MetricPreset) -> Vec<String> {
        let tags = match (self, preset) {
            (Self::Sec, MetricPreset::Revenue) => SEC_REVENUE,
            (Self::Sec, MetricPreset::NetIncome) => SEC_NET_INCOME,
            (Self::Dart, MetricPreset::Revenue) => DART_REVENUE,
            (Self::Dart, MetricPreset::NetIncome) => DART_NET_INCOME,
        };
        tags.iter().map(|s| s.to_string()).collect()
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sec" | "edgar" | "us" => Ok(Self::Sec),
            "dart" | "opendart" | "kr" => Ok(Self::Dart),
            other => Err(ProviderError::Config(format!(
                "unknown provider '{other}', expected sec or dart"
            ))),
        }
    }
}

/// Named metric whose tag list is built in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricPreset {
    Revenue,
    NetIncome,
}

impl FromStr for MetricPreset {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "revenue" => Ok(Self::Revenue),
            "netincome" => Ok(Self::NetIncome),
            _ => Err(ProviderError::Config(format!(
                "unknown preset '{}', expected revenue or net-income",
                s.trim()
            ))),
        }
    }
}

/// Split a comma-separated tag list, dropping blanks and keeping order.
pub fn parse_tag_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
