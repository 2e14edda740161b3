//! Per-return mapping
//!
//! Turns one return element into a [`MappedReturn`]: everything the document
//! itself says about the return. The region code and due date come from the
//! collaborators later, when [`MappedReturn::into_canonical`] assembles the
//! final record.

use super::classify::{classify_return, Classification};
use super::dates::parse_iso_date;
use super::lines::get_return_lines;
use super::meters::{get_meters, get_reading};
use crate::core::document::{paths, Navigator, ReturnEntry};
use crate::core::import::ImportContext;
use crate::core::validation::Violation;
use crate::domain::{
    CanonicalReturn, Frequency, LicenceNumber, Meter, Reading, RegionCode, ReturnId, ReturnLine,
    ReturnReference, RillError,
};
use chrono::NaiveDate;

/// Why a return could not be mapped
#[derive(Debug)]
pub enum MappingError {
    /// Structure every return needs is missing; the import cannot go on
    Fatal(RillError),

    /// A value in this return cannot go into a canonical record; only this
    /// return is rejected
    Invalid(Violation),
}

impl From<RillError> for MappingError {
    fn from(err: RillError) -> Self {
        MappingError::Fatal(err)
    }
}

/// Result of mapping one return
pub type MappingResult<T> = std::result::Result<T, MappingError>;

/// Document-derived data for one return
#[derive(Debug, Clone, PartialEq)]
pub struct MappedReturn {
    pub licence_number: LicenceNumber,
    pub return_reference: ReturnReference,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_nil: bool,
    pub frequency: Option<Frequency>,
    pub reading: Option<Reading>,
    pub meters: Vec<Meter>,
    pub lines: Vec<ReturnLine>,
}

impl MappedReturn {
    /// Canonical identifier of this return in `region`
    pub fn return_id(&self, region: RegionCode) -> ReturnId {
        ReturnId::build(
            region,
            &self.licence_number,
            &self.return_reference,
            self.start_date,
            self.end_date,
        )
    }

    /// Assembles the canonical record
    pub fn into_canonical(
        self,
        return_id: ReturnId,
        due_date: NaiveDate,
        context: &ImportContext,
    ) -> CanonicalReturn {
        CanonicalReturn {
            return_id,
            licence_number: self.licence_number,
            received_date: context.received_date,
            start_date: self.start_date,
            end_date: self.end_date,
            due_date,
            frequency: self.frequency,
            is_nil: self.is_nil,
            reading: self.reading,
            meters: self.meters,
            lines: self.lines,
            user: context.user.clone(),
            version_number: context.version_number,
            is_current: context.is_current,
            is_under_query: context.is_under_query,
            metadata: context.metadata.clone(),
        }
    }
}

fn required_text(
    nav: &Navigator<'_>,
    entry: &ReturnEntry<'_, '_>,
    path: &str,
) -> Result<String, RillError> {
    nav.text_opt(entry.node, path)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            RillError::missing_element(path, &format!("return of licence {}", entry.licence_number))
        })
}

/// Turns a value problem into a rejection of the return on `field`
pub(crate) fn invalid(field: impl Into<String>) -> impl FnOnce(String) -> MappingError {
    let field = field.into();
    move |message| MappingError::Invalid(Violation::new(field, message))
}

/// Maps one extracted return
///
/// Nil returns carry no reading, meters or lines. Full returns without a
/// frequency structure keep their reading but skip line and meter extraction.
///
/// # Errors
///
/// [`MappingError::Fatal`] if the reference, cycle dates or a line date are
/// missing. [`MappingError::Invalid`] if a value is present but unusable: a
/// licence number or reference that cannot form a return identifier, a
/// malformed date, or a non-numeric volume.
pub fn map_return(nav: &Navigator<'_>, entry: &ReturnEntry<'_, '_>) -> MappingResult<MappedReturn> {
    let raw_reference = required_text(nav, entry, paths::RETURN_REFERENCE)?;
    let raw_start = required_text(nav, entry, paths::START_DATE)?;
    let raw_end = required_text(nav, entry, paths::END_DATE)?;

    let licence_number =
        LicenceNumber::new(entry.licence_number.as_str()).map_err(invalid("licenceNumber"))?;
    let return_reference = ReturnReference::new(raw_reference).map_err(invalid("returnId"))?;
    let start_date = parse_iso_date(&raw_start, paths::START_DATE).map_err(invalid("startDate"))?;
    let end_date = parse_iso_date(&raw_end, paths::END_DATE).map_err(invalid("endDate"))?;

    let Classification { is_nil, frequency } = classify_return(nav, entry.node);

    let (reading, meters, lines) = if is_nil {
        (None, Vec::new(), Vec::new())
    } else {
        let reading = Some(get_reading(nav, entry.node));
        match frequency {
            Some(frequency) => (
                reading,
                get_meters(nav, entry.node),
                get_return_lines(nav, entry.node, frequency)?,
            ),
            None => (reading, Vec::new(), Vec::new()),
        }
    };

    tracing::debug!(
        licence_number = %licence_number,
        return_reference = %return_reference,
        is_nil = is_nil,
        frequency = frequency.map(|f| f.as_str()).unwrap_or("none"),
        line_count = lines.len(),
        meter_count = meters.len(),
        "Mapped return"
    );

    Ok(MappedReturn {
        licence_number,
        return_reference,
        start_date,
        end_date,
        is_nil,
        frequency,
        reading,
        meters,
        lines,
    })
}
