//! Return line extraction

use super::classify::frequency_container;
use super::dates::{line_period, parse_iso_date};
use super::mapper::{invalid, MappingResult};
use crate::core::document::{paths, Element, Navigator};
use crate::domain::{Frequency, ReadingType, ReturnLine, RillError};

/// Estimated-indicator value meaning the volume was measured
const MEASURED_INDICATOR: &str = "N";

/// Reading type of a line from its estimated indicator
///
/// Only the literal `N` means measured. `Y`, any other value, or a missing
/// indicator all mean estimated.
pub fn reading_type_for_indicator(indicator: Option<&str>) -> ReadingType {
    match indicator {
        Some(MEASURED_INDICATOR) => ReadingType::Measured,
        _ => ReadingType::Estimated,
    }
}

/// Parses an abstracted volume
///
/// An absent or empty volume is `None`.
///
/// # Errors
///
/// Returns a description of the problem if the text is not a finite number.
pub fn parse_quantity(text: Option<&str>) -> Result<Option<f64>, String> {
    let text = match text.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(text) => text,
    };
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(format!(
            "Invalid abstracted volume '{text}' in {}",
            paths::LINE_VOLUME
        )),
    }
}

/// Lines of a full return of the given frequency, in document order
///
/// Each element child of the frequency container is one line.
///
/// # Errors
///
/// [`MappingError::Fatal`](super::mapper::MappingError::Fatal) if a line has
/// no date, and
/// [`MappingError::Invalid`](super::mapper::MappingError::Invalid) for an
/// invalid date or a non-numeric volume.
pub fn get_return_lines(
    nav: &Navigator<'_>,
    ret: Element<'_, '_>,
    frequency: Frequency,
) -> MappingResult<Vec<ReturnLine>> {
    let container = format!("{}/{}", paths::FULL_RETURN, frequency_container(frequency));
    let Some(container) = nav.get(ret, &container) else {
        return Ok(Vec::new());
    };

    container
        .children()
        .enumerate()
        .map(|(index, line)| map_line(nav, line, index, frequency))
        .collect()
}

fn map_line(
    nav: &Navigator<'_>,
    line: Element<'_, '_>,
    index: usize,
    frequency: Frequency,
) -> MappingResult<ReturnLine> {
    let raw_date = nav
        .text_opt(line, paths::LINE_DATE)
        .ok_or_else(|| RillError::missing_element(paths::LINE_DATE, line.local_name()))?;
    let date = parse_iso_date(&raw_date, paths::LINE_DATE)
        .map_err(invalid(format!("lines[{index}].startDate")))?;
    let (start_date, end_date) = line_period(date, frequency);

    let quantity = parse_quantity(nav.text_opt(line, paths::LINE_VOLUME).as_deref())
        .map_err(invalid(format!("lines[{index}].quantity")))?;
    let indicator = nav.text_opt(line, paths::LINE_ESTIMATED_INDICATOR);

    Ok(ReturnLine {
        start_date,
        end_date,
        quantity,
        time_period: frequency,
        reading_type: reading_type_for_indicator(indicator.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{Namespaces, XmlDocument, MULTI_RETURN_NAMESPACE};
    use crate::core::mapping::mapper::MappingError;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn full_return(container: &str, lines: &str) -> String {
        format!(
            r#"<tns:Return xmlns:tns="{MULTI_RETURN_NAMESPACE}"><tns:GorPart><tns:FullReturnStructure><tns:{container}>{lines}</tns:{container}></tns:FullReturnStructure></tns:GorPart></tns:Return>"#
        )
    }

    fn line(date: &str, volume: Option<&str>, indicator: Option<&str>) -> String {
        let mut xml = format!("<tns:Line><tns:Date>{date}</tns:Date>");
        if let Some(volume) = volume {
            xml.push_str(&format!("<tns:AbstractedVolume>{volume}</tns:AbstractedVolume>"));
        }
        if let Some(indicator) = indicator {
            xml.push_str(&format!("<tns:EstimatedIndicator>{indicator}</tns:EstimatedIndicator>"));
        }
        xml.push_str("</tns:Line>");
        xml
    }

    fn lines_of(xml: &str, frequency: Frequency) -> MappingResult<Vec<ReturnLine>> {
        let doc = XmlDocument::parse(xml).unwrap();
        let ns = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
        let nav = Navigator::new(&ns);
        get_return_lines(&nav, doc.root(), frequency)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test_case(Some("N"), ReadingType::Measured ; "n is measured")]
    #[test_case(Some("Y"), ReadingType::Estimated ; "y is estimated")]
    #[test_case(Some("n"), ReadingType::Estimated ; "lowercase is estimated")]
    #[test_case(None, ReadingType::Estimated ; "missing is estimated")]
    fn test_reading_type_for_indicator(indicator: Option<&str>, expected: ReadingType) {
        assert_eq!(reading_type_for_indicator(indicator), expected);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(Some("12.5")).unwrap(), Some(12.5));
        assert_eq!(parse_quantity(Some(" 0 ")).unwrap(), Some(0.0));
        assert_eq!(parse_quantity(Some("")).unwrap(), None);
        assert_eq!(parse_quantity(None).unwrap(), None);
        assert!(parse_quantity(Some("lots")).unwrap_err().contains("lots"));
        assert!(parse_quantity(Some("NaN")).is_err());
    }

    #[test]
    fn test_monthly_lines() {
        let xml = full_return(
            "MonthlyTotal",
            &format!(
                "{}{}",
                line("2019-04-01", Some("12.5"), Some("N")),
                line("2019-05-01", None, None)
            ),
        );
        let lines = lines_of(&xml, Frequency::Month).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].start_date, date("2019-04-01"));
        assert_eq!(lines[0].end_date, date("2019-04-30"));
        assert_eq!(lines[0].quantity, Some(12.5));
        assert_eq!(lines[0].reading_type, ReadingType::Measured);
        assert_eq!(lines[1].end_date, date("2019-05-31"));
        assert_eq!(lines[1].quantity, None);
        assert_eq!(lines[1].reading_type, ReadingType::Estimated);
        assert!(lines.iter().all(|l| l.time_period == Frequency::Month));
    }

    #[test]
    fn test_weekly_line_uses_regulatory_week() {
        let xml = full_return("WeeklyTotal", &line("2019-01-01", Some("3"), Some("Y")));
        let lines = lines_of(&xml, Frequency::Week).unwrap();

        assert_eq!(lines[0].start_date, date("2018-12-30"));
        assert_eq!(lines[0].end_date, date("2019-01-05"));
    }

    #[test]
    fn test_missing_container_yields_no_lines() {
        let xml = full_return("DailyTotal", "");
        assert!(lines_of(&xml, Frequency::Year).unwrap().is_empty());
    }

    fn invalid_field(result: MappingResult<Vec<ReturnLine>>) -> String {
        match result {
            Err(MappingError::Invalid(violation)) => violation.field,
            other => panic!("expected an invalid line, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_line_date_rejects_return() {
        let xml = full_return(
            "DailyTotal",
            &format!(
                "{}{}",
                line("2019-04-01", Some("1"), None),
                line("2019-13-01", Some("1"), None)
            ),
        );
        assert_eq!(invalid_field(lines_of(&xml, Frequency::Day)), "lines[1].startDate");
    }

    #[test]
    fn test_missing_line_date_is_fatal() {
        let xml = full_return(
            "DailyTotal",
            "<tns:Line><tns:AbstractedVolume>1</tns:AbstractedVolume></tns:Line>",
        );
        match lines_of(&xml, Frequency::Day) {
            Err(MappingError::Fatal(err)) => assert!(err.to_string().contains("tns:Date")),
            other => panic!("expected a fatal error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_volume_rejects_return() {
        let xml = full_return("YearlyTotal", &line("2019-04-01", Some("abc"), None));
        assert_eq!(invalid_field(lines_of(&xml, Frequency::Year)), "lines[0].quantity");
    }
}
