//! Nil/full and frequency classification of returns
//!
//! The document carries no explicit discriminator. A return is nil when its
//! nil-return marker says `yes`; otherwise it is full, and its frequency is
//! given by whichever of the four `<F>Total` structures its full-return
//! structure contains.

use crate::core::document::{paths, Element, Navigator, MULTI_RETURN_PREFIX};
use crate::domain::Frequency;

/// Local names of the per-frequency line containers
pub const FREQUENCY_MARKERS: [(&str, Frequency); 4] = [
    ("DailyTotal", Frequency::Day),
    ("WeeklyTotal", Frequency::Week),
    ("MonthlyTotal", Frequency::Month),
    ("YearlyTotal", Frequency::Year),
];

/// Value of the nil-return marker that makes a return nil
const NIL_RETURN_YES: &str = "yes";

/// Outcome of classifying one return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_nil: bool,
    /// `None` for nil returns and for full returns without a frequency structure
    pub frequency: Option<Frequency>,
}

/// Classifies a return node
///
/// Frequency is only probed for full returns.
pub fn classify_return(nav: &Navigator<'_>, ret: Element<'_, '_>) -> Classification {
    let is_nil = is_nil_return(nav, ret);
    let frequency = if is_nil {
        None
    } else {
        get_return_frequency(nav, ret)
    };
    Classification { is_nil, frequency }
}

/// Whether the return declares itself nil
///
/// Only the exact text `yes` counts; a missing marker or any other value
/// means the return is full.
pub fn is_nil_return(nav: &Navigator<'_>, ret: Element<'_, '_>) -> bool {
    nav.text_opt(ret, paths::IS_NIL_RETURN).as_deref() == Some(NIL_RETURN_YES)
}

/// Frequency of a full return, from the `<F>Total` child of its full-return
/// structure
///
/// Returns `None` when there is no full-return structure or it carries none of
/// the four markers. Should several be present, the first in document order
/// wins.
pub fn get_return_frequency(nav: &Navigator<'_>, ret: Element<'_, '_>) -> Option<Frequency> {
    let full = nav.get(ret, paths::FULL_RETURN)?;
    full.children().find_map(|child| {
        FREQUENCY_MARKERS
            .iter()
            .find(|(marker, _)| nav.has_name(child, &qualified(marker)))
            .map(|(_, frequency)| *frequency)
    })
}

/// Path of the line container for `frequency`, relative to the full-return
/// structure
pub fn frequency_container(frequency: Frequency) -> String {
    let marker = FREQUENCY_MARKERS
        .iter()
        .find(|(_, f)| *f == frequency)
        .map(|(marker, _)| *marker)
        .unwrap_or_default();
    qualified(marker)
}

fn qualified(local: &str) -> String {
    format!("{MULTI_RETURN_PREFIX}:{local}")
}
