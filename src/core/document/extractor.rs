//! Permit and return extraction
//!
//! Flattens the `permit → returns` nesting of a submission into an ordered
//! list of returns, each tagged with its permit's licence number.
//!
//! Licence numbers are kept as written. Whether one is usable in a return
//! identifier is decided per return during mapping.

use super::navigator::{Element, Navigator, MULTI_RETURN_PREFIX};
use crate::domain::{LicenceNumber, Result, RillError};
use std::collections::HashSet;

/// Document paths, relative to the node named in each comment
pub mod paths {
    /// Below the document root
    pub const PERMIT: &str = "tns:Permit";
    /// Below a permit
    pub const LICENCE_NUMBER: &str = "tns:IrPermitNo";
    /// Below a permit
    pub const RETURN: &str = "tns:Return";
    /// Below a return
    pub const RETURN_REFERENCE: &str = "tns:ReturnReference";
    /// Below a return
    pub const START_DATE: &str = "tns:ReturnReportingPeriodStartDate";
    /// Below a return
    pub const END_DATE: &str = "tns:ReturnReportingPeriodEndDate";
    /// Below a return
    pub const IS_NIL_RETURN: &str = "tns:GorPart/tns:NilReturnStructure/tns:IsNilReturn";
    /// Below a return
    pub const FULL_RETURN: &str = "tns:GorPart/tns:FullReturnStructure";
    /// Below a full return structure
    pub const UNIT_OF_MEASUREMENT: &str = "tns:UnitOfMeasurement";
    /// Below a full return structure
    pub const METER_USAGE: &str = "tns:MeterUsage";
    /// Below a meter usage entry
    pub const WAS_METER_USED: &str = "tns:WasMeterUsed";
    /// Below a meter usage entry
    pub const MANUFACTURER: &str = "tns:MeterDetails/tns:ListedManufacturer";
    /// Below a meter usage entry
    pub const SERIAL_NUMBER: &str = "tns:MeterDetails/tns:SerialNumber";
    /// Below a return line
    pub const LINE_DATE: &str = "tns:Date";
    /// Below a return line
    pub const LINE_VOLUME: &str = "tns:AbstractedVolume";
    /// Below a return line
    pub const LINE_ESTIMATED_INDICATOR: &str = "tns:EstimatedIndicator";
}

/// A return found in the document, with the licence of its permit
#[derive(Debug, Clone)]
pub struct ReturnEntry<'a, 'input> {
    /// Licence number of the enclosing permit, trimmed but not validated
    pub licence_number: String,

    /// Zero-based position of the enclosing permit
    pub permit_index: usize,

    /// The return element
    pub node: Element<'a, 'input>,
}

/// Extracts all returns in document order
///
/// Permits are visited in document order and, within each permit, returns in
/// document order. The root element must be bound to the multi-return
/// namespace.
///
/// # Errors
///
/// Returns [`RillError::Parse`] if the root is in the wrong namespace or a
/// permit has no licence number element.
pub fn extract_returns<'a, 'input>(
    nav: &Navigator<'_>,
    root: Element<'a, 'input>,
) -> Result<Vec<ReturnEntry<'a, 'input>>> {
    nav.ensure_namespace(root, MULTI_RETURN_PREFIX)?;

    let mut entries = Vec::new();
    for (permit_index, permit) in nav.find(root, paths::PERMIT).into_iter().enumerate() {
        let licence_number = nav
            .text_opt(permit, paths::LICENCE_NUMBER)
            .ok_or_else(|| RillError::missing_element(paths::LICENCE_NUMBER, paths::PERMIT))?
            .trim()
            .to_string();

        let returns = nav.find(permit, paths::RETURN);
        tracing::debug!(
            licence_number = %licence_number,
            permit_index = permit_index,
            return_count = returns.len(),
            "Found permit"
        );

        entries.extend(returns.into_iter().map(|node| ReturnEntry {
            licence_number: licence_number.clone(),
            permit_index,
            node,
        }));
    }

    Ok(entries)
}

/// Distinct valid licence numbers of `entries`, in first-seen order
///
/// Licence numbers that cannot form a return identifier are left out; their
/// returns are rejected individually.
pub fn distinct_licence_numbers(entries: &[ReturnEntry<'_, '_>]) -> Vec<LicenceNumber> {
    let mut seen = HashSet::new();
    let mut licence_numbers = Vec::new();
    for entry in entries {
        if !seen.insert(entry.licence_number.as_str()) {
            continue;
        }
        if let Ok(licence_number) = LicenceNumber::new(entry.licence_number.as_str()) {
            licence_numbers.push(licence_number);
        }
    }
    licence_numbers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::navigator::{Namespaces, XmlDocument, MULTI_RETURN_NAMESPACE};

    fn submission(body: &str) -> String {
        format!(r#"<tns:GORSubmission xmlns:tns="{MULTI_RETURN_NAMESPACE}">{body}</tns:GORSubmission>"#)
    }

    fn permit(licence: &str, references: &[&str]) -> String {
        let returns: String = references
            .iter()
            .map(|r| format!("<tns:Return><tns:ReturnReference>{r}</tns:ReturnReference></tns:Return>"))
            .collect();
        format!("<tns:Permit><tns:IrPermitNo>{licence}</tns:IrPermitNo>{returns}</tns:Permit>")
    }

    #[test]
    fn test_extract_flattens_in_document_order() {
        let xml = submission(&format!(
            "{}{}",
            permit("01/001", &["1", "2"]),
            permit("01/002", &["3"])
        ));
        let doc = XmlDocument::parse(&xml).unwrap();
        let ns = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
        let nav = Navigator::new(&ns);

        let entries = extract_returns(&nav, doc.root()).unwrap();
        let summary: Vec<(String, usize, String)> = entries
            .iter()
            .map(|e| {
                (
                    e.licence_number.clone(),
                    e.permit_index,
                    nav.text(e.node, paths::RETURN_REFERENCE, ""),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("01/001".to_string(), 0, "1".to_string()),
                ("01/001".to_string(), 0, "2".to_string()),
                ("01/002".to_string(), 1, "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_empty_submission() {
        let xml = submission("");
        let doc = XmlDocument::parse(&xml).unwrap();
        let ns = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
        let nav = Navigator::new(&ns);

        assert!(extract_returns(&nav, doc.root()).unwrap().is_empty());
    }

    #[test]
    fn test_permit_without_returns_contributes_nothing() {
        let xml = submission(&permit("01/001", &[]));
        let doc = XmlDocument::parse(&xml).unwrap();
        let ns = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
        let nav = Navigator::new(&ns);

        assert!(extract_returns(&nav, doc.root()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_licence_number_is_parse_failure() {
        let xml = submission("<tns:Permit><tns:Return/></tns:Permit>");
        let doc = XmlDocument::parse(&xml).unwrap();
        let ns = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
        let nav = Navigator::new(&ns);

        let err = extract_returns(&nav, doc.root()).unwrap_err();
        assert!(matches!(err, RillError::Parse(_)));
        assert!(err.to_string().contains("tns:IrPermitNo"));
    }

    #[test]
    fn test_wrong_namespace_is_parse_failure() {
        let xml = r#"<GORSubmission xmlns="urn:other"/>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let ns = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
        let nav = Navigator::new(&ns);

        assert!(matches!(
            extract_returns(&nav, doc.root()),
            Err(RillError::Parse(_))
        ));
    }

    #[test]
    fn test_distinct_licence_numbers() {
        let xml = submission(&format!(
            "{}{}{}",
            permit("01/002", &["1"]),
            permit("01/001", &["2", "3"]),
            permit("01/002", &["4"])
        ));
        let doc = XmlDocument::parse(&xml).unwrap();
        let ns = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
        let nav = Navigator::new(&ns);

        let entries = extract_returns(&nav, doc.root()).unwrap();
        let licences: Vec<String> = distinct_licence_numbers(&entries)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(licences, vec!["01/002", "01/001"]);
    }

    #[test]
    fn test_invalid_licence_number_is_kept_for_mapping() {
        let xml = submission(&format!(
            "{}{}",
            permit("01:002", &["1"]),
            permit("01/001", &["2"])
        ));
        let doc = XmlDocument::parse(&xml).unwrap();
        let ns = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
        let nav = Navigator::new(&ns);

        let entries = extract_returns(&nav, doc.root()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].licence_number, "01:002");

        let licences: Vec<String> = distinct_licence_numbers(&entries)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(licences, vec!["01/001"]);
    }
}
