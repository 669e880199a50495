//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use rac_core::{BerthId, Pnr};
use regex::Regex;

/// PNRs are 1-20 ASCII letters, digits, `-` or `_`, starting alphanumeric.
static PNR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,19}$").unwrap());

/// Validates user input as a PNR before it reaches the core.
pub fn parse_pnr(s: &str) -> Result<Pnr> {
    let s = s.trim();
    if !PNR_RE.is_match(s) {
        bail!("Invalid PNR: {s:?}. Use letters and digits, e.g. 4521873690");
    }
    Pnr::new(s).with_context(|| format!("invalid PNR {s}"))
}

pub fn parse_berth(s: &str) -> Result<BerthId> {
    s.parse()
        .with_context(|| format!("Invalid berth: {s:?}. Use coach-number form, e.g. S1-23"))
}
