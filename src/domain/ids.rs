//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through an import. Each type
//! validates its format on construction so that the canonical return
//! identifier can be assembled without further checks.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Date format used in identifiers and serialised records
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Version prefix of the canonical return identifier
pub const RETURN_ID_VERSION: &str = "v1";

/// Pattern every canonical return identifier must match
pub const RETURN_ID_PATTERN: &str =
    r"^v1:[1-8]:[^:]+:[0-9]+:\d{4}-\d{2}-\d{2}:\d{4}-\d{2}-\d{2}$";

fn return_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RETURN_ID_PATTERN).expect("return id pattern is valid"))
}

/// Abstraction licence number newtype wrapper
///
/// Licence numbers are free-form (e.g. `03/28/01/0001`) but may not be empty
/// and may not contain `:`, which separates the parts of a [`ReturnId`].
///
/// # Examples
///
/// ```
/// use rill::domain::ids::LicenceNumber;
///
/// let licence = LicenceNumber::new("03/28/01/0001").unwrap();
/// assert_eq!(licence.as_str(), "03/28/01/0001");
/// assert!(LicenceNumber::new("01:02").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicenceNumber(String);

impl LicenceNumber {
    /// Creates a new LicenceNumber, trimming surrounding whitespace
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err("Licence number cannot be empty".to_string());
        }
        if value.contains(':') {
            return Err(format!("Licence number cannot contain ':', got: {value}"));
        }
        Ok(Self(value))
    }

    /// Returns the licence number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LicenceNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LicenceNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LicenceNumber> for String {
    fn from(value: LicenceNumber) -> Self {
        value.0
    }
}

/// Return reference newtype wrapper (ASCII digits only)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReturnReference(String);

impl ReturnReference {
    /// Creates a new ReturnReference
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into().trim().to_string();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!(
                "Return reference must consist of digits only, got: '{value}'"
            ));
        }
        Ok(Self(value))
    }

    /// Returns the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReturnReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReturnReference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ReturnReference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReturnReference> for String {
    fn from(value: ReturnReference) -> Self {
        value.0
    }
}

/// Regulator region code (1-8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RegionCode(u8);

impl RegionCode {
    /// Creates a new RegionCode
    ///
    /// # Examples
    ///
    /// ```
    /// use rill::domain::ids::RegionCode;
    ///
    /// assert_eq!(RegionCode::new(3).unwrap().value(), 3);
    /// assert!(RegionCode::new(0).is_err());
    /// assert!(RegionCode::new(9).is_err());
    /// ```
    pub fn new(code: u8) -> Result<Self, String> {
        if !(1..=8).contains(&code) {
            return Err(format!("Region code must be between 1 and 8, got: {code}"));
        }
        Ok(Self(code))
    }

    /// Returns the numeric code
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for RegionCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegionCode> for u8 {
    fn from(value: RegionCode) -> Self {
        value.0
    }
}

/// Canonical return identifier
///
/// Format: `v1:{region}:{licence}:{reference}:{start}:{end}`. The identifier is
/// a pure function of its inputs, so re-importing the same document yields the
/// same identifiers.
///
/// # Examples
///
/// ```
/// use rill::domain::ids::{LicenceNumber, RegionCode, ReturnId, ReturnReference};
/// use chrono::NaiveDate;
///
/// let id = ReturnId::build(
///     RegionCode::new(1).unwrap(),
///     &LicenceNumber::new("01/123").unwrap(),
///     &ReturnReference::new("10012345").unwrap(),
///     NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2020, 3, 31).unwrap(),
/// );
/// assert_eq!(id.as_str(), "v1:1:01/123:10012345:2019-04-01:2020-03-31");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReturnId(String);

impl ReturnId {
    /// Builds the identifier from its parts
    pub fn build(
        region: RegionCode,
        licence_number: &LicenceNumber,
        return_reference: &ReturnReference,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self(format!(
            "{RETURN_ID_VERSION}:{region}:{licence_number}:{return_reference}:{}:{}",
            start_date.format(ISO_DATE_FORMAT),
            end_date.format(ISO_DATE_FORMAT)
        ))
    }

    /// Parses an existing identifier, checking it against [`RETURN_ID_PATTERN`]
    pub fn parse(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if !return_id_regex().is_match(&value) {
            return Err(format!("Invalid return id format: {value}"));
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReturnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReturnId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReturnId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ReturnId> for String {
    fn from(value: ReturnId) -> Self {
        value.0
    }
}

impl AsRef<str> for ReturnId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
