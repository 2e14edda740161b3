//! Canonical return domain model
//!
//! This module defines [`CanonicalReturn`], the record produced for every
//! return found in an imported document, together with its nested reading,
//! meter and line types. Records serialise with camelCase keys.

use super::ids::{LicenceNumber, ReturnId};
use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Reporting frequency of a return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Day,
    Week,
    Month,
    Year,
}

impl Frequency {
    /// Lowercase name used in serialised records
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Day => "day",
            Frequency::Week => "week",
            Frequency::Month => "month",
            Frequency::Year => "year",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Frequency::Day),
            "week" => Ok(Frequency::Week),
            "month" => Ok(Frequency::Month),
            "year" => Ok(Frequency::Year),
            _ => Err(format!(
                "Invalid frequency: {s}. Expected one of: day, week, month, year"
            )),
        }
    }
}

/// Whether a volume was measured by a meter or estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingType {
    Measured,
    Estimated,
}

/// Units a reading is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    /// Cubic metres
    #[serde(rename = "m³")]
    CubicMetres,
}

/// Method recorded on every reading imported from this document type
pub const READING_METHOD_ABSTRACTION_VOLUMES: &str = "abstractionVolumes";

/// Overall reading details of a full return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(rename = "type")]
    pub reading_type: ReadingType,
    pub method: String,
    pub units: Option<Units>,
    pub total_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// A meter used to take readings for a return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    pub manufacturer: String,
    pub serial_number: String,
    pub meter_details_provided: bool,
    pub multiplier: u32,
}

impl Meter {
    /// Creates a meter record with details marked as provided
    pub fn new(manufacturer: impl Into<String>, serial_number: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            serial_number: serial_number.into(),
            meter_details_provided: true,
            multiplier: 1,
        }
    }
}

/// One reporting period of a full return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLine {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quantity: Option<f64>,
    pub time_period: Frequency,
    pub reading_type: ReadingType,
}

/// Kind of user submitting returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Internal,
    External,
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "internal" => Ok(UserType::Internal),
            "external" => Ok(UserType::External),
            _ => Err(format!(
                "Invalid user type: {s}. Expected 'internal' or 'external'"
            )),
        }
    }
}

/// User the returns are submitted on behalf of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnUser {
    pub email: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub entity_id: String,
}

/// A return converted from the imported document
///
/// Built once per return by the importer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReturn {
    pub return_id: ReturnId,
    pub licence_number: LicenceNumber,
    pub received_date: Option<NaiveDate>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub due_date: NaiveDate,
    pub frequency: Option<Frequency>,
    pub is_nil: bool,
    #[serde(with = "reading_or_empty")]
    pub reading: Option<Reading>,
    pub meters: Vec<Meter>,
    pub lines: Vec<ReturnLine>,
    pub user: ReturnUser,
    pub version_number: u32,
    pub is_current: bool,
    pub is_under_query: bool,
    pub metadata: serde_json::Value,
}

/// Serialises a missing reading as `{}` rather than `null`
mod reading_or_empty {
    use super::*;

    pub fn serialize<S: Serializer>(reading: &Option<Reading>, s: S) -> Result<S::Ok, S::Error> {
        match reading {
            Some(reading) => reading.serialize(s),
            None => s.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Reading>, D::Error> {
        let value = serde_json::Value::deserialize(d)?;
        match value {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Object(ref map) if map.is_empty() => Ok(None),
            other => serde_json::from_value(other)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
