//! Premium-feature pricing.
//!
//! A pure function: no persistence, no network, deterministic for identical
//! input. Callers quote first and mutate the ledger afterwards.

/// Fixed fee for rewriting commit dates.
pub const DATE_CUSTOMIZATION_FEE: i64 = 2;

/// Fixed fee per custom contributor.
pub const PER_CONTRIBUTOR_FEE: i64 = 2;

/// Premium options selected on a transfer request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PremiumSelection {
    /// When true, original commit dates are preserved and no date fee
    /// applies regardless of the supplied range.
    pub keep_original_dates: bool,
    /// Optional start of the rewrite date range.
    pub start_date: Option<String>,
    /// Contributor names as submitted; blank entries are ignored,
    /// duplicates are counted individually.
    pub contributors: Vec<String>,
}

/// Cost and human-readable feature labels for a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Total coin cost; zero when no premium option is selected.
    pub cost: i64,
    /// Ordered feature labels, suitable for transaction reasons.
    pub features: Vec<String>,
}

impl Quote {
    /// Joined feature labels for log and transaction text.
    pub fn feature_summary(&self) -> String {
        self.features.join(", ")
    }
}

/// Price a premium selection.
///
/// # Examples
/// ```
/// use gitghost_backend::domain::pricing::{PremiumSelection, quote};
///
/// let free = quote(&PremiumSelection::default());
/// assert_eq!(free.cost, 0);
/// assert!(free.features.is_empty());
/// ```
pub fn quote(selection: &PremiumSelection) -> Quote {
    let mut cost = 0;
    let mut features = Vec::new();

    if !selection.keep_original_dates
        && selection
            .start_date
            .as_deref()
            .is_some_and(|date| !date.is_empty())
    {
        cost += DATE_CUSTOMIZATION_FEE;
        features.push("custom dates".to_owned());
    }

    let contributor_count = selection
        .contributors
        .iter()
        .filter(|name| !name.trim().is_empty())
        .count() as i64;

    if contributor_count > 0 {
        let contributor_cost = contributor_count * PER_CONTRIBUTOR_FEE;
        cost += contributor_cost;
        let plural = if contributor_count > 1 { "s" } else { "" };
        features.push(format!(
            "{contributor_count} custom contributor{plural} ({contributor_cost} coins)"
        ));
    }

    Quote { cost, features }
}
