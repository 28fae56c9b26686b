//! Bed metrics: socket totals and the width check against the expected
//! number of sockets per species.
//!
//! Everything here is a pure function of the measured counts. Bed length is
//! recorded with the measurement but never enters these computations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator placed between species fragments in the aggregate remark.
pub const REMARK_SEPARATOR: &str = " | ";

/// How a measured bed width compares to the expected width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidthStatus {
    Correct,
    Over(u32),
    Under(u32),
}

impl WidthStatus {
    pub fn classify(sockets_across_width: u32, expected_width: u32) -> Self {
        use std::cmp::Ordering;
        match sockets_across_width.cmp(&expected_width) {
            Ordering::Equal => WidthStatus::Correct,
            Ordering::Greater => WidthStatus::Over(sockets_across_width - expected_width),
            Ordering::Less => WidthStatus::Under(expected_width - sockets_across_width),
        }
    }
}

impl fmt::Display for WidthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidthStatus::Correct => f.write_str("Correct"),
            WidthStatus::Over(delta) => write!(f, "+{}", delta),
            WidthStatus::Under(delta) => write!(f, "-{}", delta),
        }
    }
}

/// Result of [`compute`] for one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedMetrics {
    pub total_sockets: u64,
    /// `None` when the width was not measured (zero sockets).
    pub fragment: Option<String>,
}

/// Computes the socket total and the remark fragment for one species.
///
/// The total is always `bed_count * sockets_across_width`, widened so the
/// product cannot overflow. A width of zero means the species was not
/// measured and yields no fragment.
pub fn compute(
    bed_count: u32,
    sockets_across_width: u32,
    expected_width: u32,
    species_label: &str,
) -> BedMetrics {
    let total_sockets = u64::from(bed_count) * u64::from(sockets_across_width);

    let fragment = (sockets_across_width != 0).then(|| {
        let status = WidthStatus::classify(sockets_across_width, expected_width);
        format!("{}: {}", species_label, status)
    });

    BedMetrics {
        total_sockets,
        fragment,
    }
}

/// Joins the non-empty fragments in the order given.
///
/// Returns an empty string when nothing was flagged.
pub fn aggregate_remark<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .filter(|f| !f.as_ref().is_empty())
        .map(|f| f.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(REMARK_SEPARATOR)
}
