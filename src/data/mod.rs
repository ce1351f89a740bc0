//! Posting and exchange-rate sources.

pub mod hh;
pub mod posting;
pub mod rates;
