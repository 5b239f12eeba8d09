//! Calendar derivation over the month counter.
//!
//! The clock itself (`cultivation_core::clock::WorldClock`) is nothing more
//! than a monotonic month count (§4.1): "no other mutator" than
//! `advance_one_month`. Season is therefore computed here as a pure function
//! of the month count rather than carried as clock state.

use serde::{Deserialize, Serialize};

/// One of the four seasons, derived from the month-within-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    /// Months 3-5.
    Spring,
    /// Months 6-8.
    Summer,
    /// Months 9-11.
    Autumn,
    /// Months 12, 1-2.
    Winter,
}

/// Derive the season for a given calendar month (`1..=12`, per §3's
/// `Month = (clock mod 12) + 1`).
#[allow(clippy::missing_const_for_fn)]
pub fn season_for_month(month: u32) -> Season {
    match month {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Autumn,
        _ => Season::Winter,
    }
}
