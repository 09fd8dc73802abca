//! Water quality constituents

use crate::inp::error::SchemaError;
use crate::inp::lexing::Tokens;
use crate::inp::record::Cursor;
use crate::inp::schema::RecordType;

crate::keyword_enum! {
    pub enum ConcentrationUnit {
        MilligramsPerLiter => "MG/L",
        MicrogramsPerLiter => "UG/L",
        CountsPerLiter => "#/L",
    }
}

/// Placeholder written when a pollutant has no co-pollutant.
pub const NO_CO_POLLUTANT: &str = "*";

#[derive(Debug, Clone, PartialEq)]
pub struct Pollutant {
    pub name: String,
    pub units: ConcentrationUnit,
    pub rain_concentration: f64,
    pub groundwater_concentration: f64,
    pub rdii_concentration: f64,
    pub decay: f64,
    pub snow_only: bool,
    pub co_pollutant: String,
    pub co_fraction: f64,
    pub dwf_concentration: f64,
    pub initial_concentration: f64,
}

impl Default for Pollutant {
    fn default() -> Self {
        Pollutant {
            name: String::new(),
            units: ConcentrationUnit::MilligramsPerLiter,
            rain_concentration: 0.0,
            groundwater_concentration: 0.0,
            rdii_concentration: 0.0,
            decay: 0.0,
            snow_only: false,
            co_pollutant: NO_CO_POLLUTANT.to_string(),
            co_fraction: 0.0,
            dwf_concentration: 0.0,
            initial_concentration: 0.0,
        }
    }
}

crate::impl_record! {
    Pollutant {
        kind: "Pollutant",
        identifier: ["Name"],
        fields: {
            "Name" => name,
            "Units" => units,
            "Crain" => rain_concentration,
            "Cgw" => groundwater_concentration,
            "Crdii" => rdii_concentration,
            "Kdecay" => decay,
            "SnowOnly" => snow_only,
            "CoPollutant" => co_pollutant,
            "CoFrac" => co_fraction,
            "Cdwf" => dwf_concentration,
            "Cinit" => initial_concentration,
        },
    }
}

impl RecordType for Pollutant {
    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let pollutant = Pollutant {
            name: cursor.required("Name")?,
            units: cursor.required("Units")?,
            rain_concentration: cursor.required("Crain")?,
            groundwater_concentration: cursor.required("Cgw")?,
            rdii_concentration: cursor.required("Crdii")?,
            decay: cursor.required("Kdecay")?,
            snow_only: cursor.optional("SnowOnly", false)?,
            co_pollutant: cursor.optional("CoPollutant", NO_CO_POLLUTANT.to_string())?,
            co_fraction: cursor.optional("CoFrac", 0.0)?,
            dwf_concentration: cursor.optional("Cdwf", 0.0)?,
            initial_concentration: cursor.optional("Cinit", 0.0)?,
        };
        cursor.finish()?;
        Ok(pollutant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inp::coercion::Value;
    use crate::inp::record::Record;

    fn line(text: &str) -> Tokens {
        text.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_pollutant_defaults() {
        let pollutant = Pollutant::parse(&[line("TSS MG/L 0 0 0 0")]).unwrap();
        assert_eq!(pollutant.units, ConcentrationUnit::MilligramsPerLiter);
        assert!(!pollutant.snow_only);
        assert_eq!(pollutant.co_pollutant, "*");
        assert_eq!(
            pollutant.to_tokens(),
            vec![line("TSS MG/L 0 0 0 0 NO * 0 0 0")]
        );
    }

    #[test]
    fn test_pollutant_full_line() {
        let pollutant =
            Pollutant::parse(&[line("Lead ug/L 0 0 0 0.1 YES TSS 0.25 1 2")]).unwrap();
        assert_eq!(pollutant.units, ConcentrationUnit::MicrogramsPerLiter);
        assert!(pollutant.snow_only);
        assert_eq!(pollutant.co_pollutant, "TSS");
        assert_eq!(pollutant.get("CoFrac"), Ok(Value::Float(0.25)));
    }

    #[test]
    fn test_pollutant_unknown_units() {
        assert_eq!(
            Pollutant::parse(&[line("TSS KG 0 0 0 0")]),
            Err(SchemaError::invalid("Units", "KG"))
        );
    }
}
