//! Meter and overall reading extraction for full returns

use crate::core::document::{paths, Element, Navigator};
use crate::domain::returns::READING_METHOD_ABSTRACTION_VOLUMES;
use crate::domain::{Meter, Reading, ReadingType, Units};

/// Placeholder for meter details the document leaves out
pub const MISSING_DETAIL: &str = "-";

const METER_USED: &str = "Y";
const CUBIC_METRES: &str = "CubicMetres";

fn meter_usages<'a, 'input>(
    nav: &Navigator<'_>,
    ret: Element<'a, 'input>,
) -> Vec<Element<'a, 'input>> {
    let path = format!("{}/{}", paths::FULL_RETURN, paths::METER_USAGE);
    nav.find(ret, &path)
}

fn was_meter_used(nav: &Navigator<'_>, usage: Element<'_, '_>) -> bool {
    nav.text_opt(usage, paths::WAS_METER_USED).as_deref() == Some(METER_USED)
}

/// Meters of a full return
///
/// Only usage entries flagged `Y` produce a meter. Manufacturer and serial
/// number default to `-` when absent.
pub fn get_meters(nav: &Navigator<'_>, ret: Element<'_, '_>) -> Vec<Meter> {
    meter_usages(nav, ret)
        .into_iter()
        .filter(|usage| was_meter_used(nav, *usage))
        .map(|usage| {
            Meter::new(
                nav.text(usage, paths::MANUFACTURER, MISSING_DETAIL),
                nav.text(usage, paths::SERIAL_NUMBER, MISSING_DETAIL),
            )
        })
        .collect()
}

/// Overall reading type: measured when the first meter usage entry is `Y`
pub fn get_overall_reading_type(nav: &Navigator<'_>, ret: Element<'_, '_>) -> ReadingType {
    match meter_usages(nav, ret).first() {
        Some(usage) if was_meter_used(nav, *usage) => ReadingType::Measured,
        _ => ReadingType::Estimated,
    }
}

/// Units for a unit-of-measurement value; only `CubicMetres` is recognised
pub fn units_from_text(text: Option<&str>) -> Option<Units> {
    match text {
        Some(CUBIC_METRES) => Some(Units::CubicMetres),
        _ => None,
    }
}

/// Units declared by a full return
pub fn get_units(nav: &Navigator<'_>, ret: Element<'_, '_>) -> Option<Units> {
    let path = format!("{}/{}", paths::FULL_RETURN, paths::UNIT_OF_MEASUREMENT);
    units_from_text(nav.text_opt(ret, &path).as_deref())
}

/// Overall reading of a full return
pub fn get_reading(nav: &Navigator<'_>, ret: Element<'_, '_>) -> Reading {
    Reading {
        reading_type: get_overall_reading_type(nav, ret),
        method: READING_METHOD_ABSTRACTION_VOLUMES.to_string(),
        units: get_units(nav, ret),
        total_flag: false,
        total: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{Namespaces, XmlDocument, MULTI_RETURN_NAMESPACE};

    fn full_return(body: &str) -> String {
        format!(
            r#"<tns:Return xmlns:tns="{MULTI_RETURN_NAMESPACE}"><tns:GorPart><tns:FullReturnStructure>{body}</tns:FullReturnStructure></tns:GorPart></tns:Return>"#
        )
    }

    fn usage(used: &str, details: &str) -> String {
        format!(
            "<tns:MeterUsage><tns:WasMeterUsed>{used}</tns:WasMeterUsed><tns:MeterDetails>{details}</tns:MeterDetails></tns:MeterUsage>"
        )
    }

    fn with_nav<T>(xml: &str, f: impl FnOnce(&Navigator<'_>, Element<'_, '_>) -> T) -> T {
        let doc = XmlDocument::parse(xml).unwrap();
        let ns = Namespaces::multi_return(MULTI_RETURN_NAMESPACE);
        let nav = Navigator::new(&ns);
        f(&nav, doc.root())
    }

    #[test]
    fn test_meters_keep_only_used_entries() {
        let xml = full_return(&format!(
            "{}{}",
            usage(
                "Y",
                "<tns:ListedManufacturer>Pontyclun</tns:ListedManufacturer><tns:SerialNumber>SN-1</tns:SerialNumber>"
            ),
            usage("N", "<tns:ListedManufacturer>Other</tns:ListedManufacturer>")
        ));
        let meters = with_nav(&xml, |nav, ret| get_meters(nav, ret));

        assert_eq!(meters, vec![Meter::new("Pontyclun", "SN-1")]);
    }

    #[test]
    fn test_missing_serial_defaults_to_dash() {
        let xml = full_return(&usage(
            "Y",
            "<tns:ListedManufacturer>Pontyclun</tns:ListedManufacturer>",
        ));
        let meters = with_nav(&xml, |nav, ret| get_meters(nav, ret));

        assert_eq!(meters[0].serial_number, "-");
        assert_eq!(meters[0].manufacturer, "Pontyclun");
    }

    #[test]
    fn test_missing_manufacturer_defaults_to_dash() {
        let xml = full_return(&usage("Y", "<tns:SerialNumber>ABC</tns:SerialNumber>"));
        let meters = with_nav(&xml, |nav, ret| get_meters(nav, ret));

        assert_eq!(meters[0].manufacturer, "-");
        assert_eq!(meters[0].serial_number, "ABC");
    }

    #[test]
    fn test_no_meter_usage() {
        let xml = full_return("<tns:DailyTotal/>");
        let (meters, reading_type) = with_nav(&xml, |nav, ret| {
            (get_meters(nav, ret), get_overall_reading_type(nav, ret))
        });

        assert!(meters.is_empty());
        assert_eq!(reading_type, ReadingType::Estimated);
    }

    #[test]
    fn test_overall_reading_type_follows_first_entry() {
        let measured = full_return(&format!("{}{}", usage("Y", ""), usage("N", "")));
        let estimated = full_return(&format!("{}{}", usage("N", ""), usage("Y", "")));

        assert_eq!(
            with_nav(&measured, |nav, ret| get_overall_reading_type(nav, ret)),
            ReadingType::Measured
        );
        assert_eq!(
            with_nav(&estimated, |nav, ret| get_overall_reading_type(nav, ret)),
            ReadingType::Estimated
        );
    }

    #[test]
    fn test_units_from_text() {
        assert_eq!(units_from_text(Some("CubicMetres")), Some(Units::CubicMetres));
        assert_eq!(units_from_text(Some("Megalitres")), None);
        assert_eq!(units_from_text(None), None);
    }

    #[test]
    fn test_reading() {
        let xml = full_return(&format!(
            "<tns:UnitOfMeasurement>CubicMetres</tns:UnitOfMeasurement>{}",
            usage("Y", "")
        ));
        let reading = with_nav(&xml, |nav, ret| get_reading(nav, ret));

        assert_eq!(reading.reading_type, ReadingType::Measured);
        assert_eq!(reading.method, "abstractionVolumes");
        assert_eq!(reading.units, Some(Units::CubicMetres));
        assert!(!reading.total_flag);
        assert_eq!(reading.total, None);
    }
}
