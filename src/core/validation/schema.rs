//! Canonical return schema
//!
//! [`CanonicalReturnSchema`] checks a record the way a downstream consumer
//! sees it: as serialised JSON, against the JSON Schema embedded from
//! `schema/canonical_return.json`. Checking the serialised value rather than
//! the Rust struct also catches serialisation mistakes (a wrong key, a date in
//! the wrong format).
//!
//! One rule spans fields and is checked after the schema: every line's
//! `timePeriod` must equal the return's `frequency`.

use super::report::ValidationReport;
use crate::domain::CanonicalReturn;
use jsonschema::Validator;
use serde_json::Value;
use std::sync::OnceLock;

const SCHEMA_JSON: &str = include_str!("../../../schema/canonical_return.json");

fn compiled_schema() -> &'static Validator {
    static VALIDATOR: OnceLock<Validator> = OnceLock::new();
    VALIDATOR.get_or_init(|| {
        let schema: Value =
            serde_json::from_str(SCHEMA_JSON).expect("embedded return schema is valid JSON");
        Validator::new(&schema).expect("embedded return schema compiles")
    })
}

/// Validates assembled records before they are accepted
pub trait ReturnValidator: Send + Sync {
    /// Checks `record`, returning every violated constraint
    fn validate(&self, record: &CanonicalReturn) -> ValidationReport;
}

/// The canonical return schema
#[derive(Clone, Copy)]
pub struct CanonicalReturnSchema {
    validator: &'static Validator,
}

impl CanonicalReturnSchema {
    pub fn new() -> Self {
        Self {
            validator: compiled_schema(),
        }
    }

    /// Validates an already serialised record
    pub fn validate_value(&self, value: &Value) -> ValidationReport {
        let mut report = ValidationReport::new();

        for error in self.validator.iter_errors(value) {
            let field = field_path(&error.instance_path().to_string());
            report.add(field, error.to_string());
        }

        check_line_periods(&mut report, value);
        report
    }
}

impl Default for CanonicalReturnSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CanonicalReturnSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonicalReturnSchema").finish_non_exhaustive()
    }
}

impl ReturnValidator for CanonicalReturnSchema {
    fn validate(&self, record: &CanonicalReturn) -> ValidationReport {
        match serde_json::to_value(record) {
            Ok(value) => self.validate_value(&value),
            Err(e) => {
                let mut report = ValidationReport::new();
                report.add("", format!("record could not be serialised: {e}"));
                report
            }
        }
    }
}

/// Converts a JSON pointer (`/lines/0/timePeriod`) to `lines[0].timePeriod`
fn field_path(pointer: &str) -> String {
    let mut path = String::new();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if segment.parse::<usize>().is_ok() {
            path.push_str(&format!("[{segment}]"));
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&segment);
        }
    }
    path
}

fn check_line_periods(report: &mut ValidationReport, record: &Value) {
    let Some(frequency) = record.get("frequency").and_then(Value::as_str) else {
        return;
    };
    let Some(lines) = record.get("lines").and_then(Value::as_array) else {
        return;
    };

    for (i, line) in lines.iter().enumerate() {
        let period = line.get("timePeriod").and_then(Value::as_str);
        if period.is_some_and(|p| p != frequency) {
            report.add(
                format!("lines[{i}].timePeriod"),
                format!("must equal the return frequency '{frequency}'"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> Value {
        json!({
            "returnId": "v1:4:03/28/01/0001:10012345:2019-04-01:2020-03-31",
            "licenceNumber": "03/28/01/0001",
            "receivedDate": "2020-04-10",
            "startDate": "2019-04-01",
            "endDate": "2020-03-31",
            "dueDate": "2020-04-28",
            "frequency": "month",
            "isNil": false,
            "reading": {
                "type": "measured",
                "method": "abstractionVolumes",
                "units": "m³",
                "totalFlag": false
            },
            "meters": [{
                "manufacturer": "Pontyclun",
                "serialNumber": "-",
                "meterDetailsProvided": true,
                "multiplier": 1
            }],
            "lines": [{
                "startDate": "2019-04-01",
                "endDate": "2019-04-30",
                "quantity": 12.5,
                "timePeriod": "month",
                "readingType": "measured"
            }],
            "user": {"email": "import@example.gov.uk", "type": "internal", "entityId": "e-1"},
            "versionNumber": 1,
            "isCurrent": true,
            "isUnderQuery": false,
            "metadata": {}
        })
    }

    fn nil_record() -> Value {
        let mut record = full_record();
        record["isNil"] = json!(true);
        record["frequency"] = json!(null);
        record["reading"] = json!({});
        record["meters"] = json!([]);
        record["lines"] = json!([]);
        record
    }

    fn fields(report: &ValidationReport) -> Vec<&str> {
        let mut fields: Vec<&str> = report.violations.iter().map(|v| v.field.as_str()).collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }

    #[test]
    fn test_valid_full_record() {
        let report = CanonicalReturnSchema::new().validate_value(&full_record());
        assert!(report.is_valid(), "{}", report.format_summary());
    }

    #[test]
    fn test_valid_nil_record() {
        let report = CanonicalReturnSchema::new().validate_value(&nil_record());
        assert!(report.is_valid(), "{}", report.format_summary());
    }

    #[test]
    fn test_bad_return_id() {
        let mut record = full_record();
        record["returnId"] = json!("v1:9:01/1:1:2019-04-01:2020-03-31");
        let report = CanonicalReturnSchema::new().validate_value(&record);
        assert_eq!(fields(&report), vec!["returnId"]);
    }

    #[test]
    fn test_missing_due_date() {
        let mut record = full_record();
        record.as_object_mut().unwrap().remove("dueDate");
        let report = CanonicalReturnSchema::new().validate_value(&record);
        assert!(!report.is_valid());
        assert!(report.format_summary().contains("dueDate"));
    }

    #[test]
    fn test_bad_date_format() {
        let mut record = full_record();
        record["startDate"] = json!("01/04/2019");
        let report = CanonicalReturnSchema::new().validate_value(&record);
        assert_eq!(fields(&report), vec!["startDate"]);
    }

    #[test]
    fn test_full_record_requires_frequency_and_lines() {
        let mut record = full_record();
        record["frequency"] = json!(null);
        record["lines"] = json!([]);
        let report = CanonicalReturnSchema::new().validate_value(&record);
        assert_eq!(fields(&report), vec!["frequency", "lines"]);
    }

    #[test]
    fn test_line_time_period_must_match_frequency() {
        let mut record = full_record();
        record["lines"][0]["timePeriod"] = json!("day");
        let report = CanonicalReturnSchema::new().validate_value(&record);
        assert_eq!(fields(&report), vec!["lines[0].timePeriod"]);
    }

    #[test]
    fn test_nil_record_with_lines_is_rejected() {
        let mut record = nil_record();
        record["lines"] = full_record()["lines"].clone();
        record["reading"] = full_record()["reading"].clone();
        let report = CanonicalReturnSchema::new().validate_value(&record);
        assert_eq!(fields(&report), vec!["lines", "reading"]);
    }

    #[test]
    fn test_units_and_enums() {
        let mut record = full_record();
        record["reading"]["units"] = json!("Ml");
        record["reading"]["type"] = json!("guessed");
        record["user"]["type"] = json!("admin");
        record["meters"][0]["multiplier"] = json!(10);
        let report = CanonicalReturnSchema::new().validate_value(&record);
        assert_eq!(
            fields(&report),
            vec!["meters[0].multiplier", "reading.type", "reading.units", "user.type"]
        );
    }

    #[test]
    fn test_null_units_are_allowed() {
        let mut record = full_record();
        record["reading"]["units"] = json!(null);
        assert!(CanonicalReturnSchema::new().validate_value(&record).is_valid());
    }

    #[test]
    fn test_not_an_object() {
        let report = CanonicalReturnSchema::new().validate_value(&json!([]));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_field_path() {
        assert_eq!(field_path(""), "");
        assert_eq!(field_path("/frequency"), "frequency");
        assert_eq!(field_path("/lines/0/timePeriod"), "lines[0].timePeriod");
        assert_eq!(field_path("/meters/12"), "meters[12]");
    }
}
