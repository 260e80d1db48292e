//! OpenDART (Korea FSS) client: disclosure listings and per-period
//! single-company financial statement tables.

mod client;
pub mod context;
pub mod corp_code;
pub mod types;

pub use client::{DART_API_BASE, DartClient, DartConfig, StatementTable};
pub use context::ReportingContext;
pub use corp_code::{CorpCodeEntry, load_corp_codes, resolve_corp_code};
