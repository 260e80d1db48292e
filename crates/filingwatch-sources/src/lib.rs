//! Provider clients: SEC EDGAR and OpenDART behind the core `Provider` trait.

#[cfg(any(feature = "sec", feature = "dart"))]
mod http;
pub mod throttle;

#[cfg(feature = "dart")]
pub mod dart;
#[cfg(feature = "sec")]
pub mod sec;

#[cfg(feature = "dart")]
pub use dart::{DartClient, DartConfig};
#[cfg(feature = "sec")]
pub use sec::{SecClient, SecConfig};
pub use throttle::RateLimiter;
