//! Irregular cross sections in HEC-2 layout
//!
//! ```text
//! NC 0.05 0.05 0.02
//! X1 T1 4 10 30 0 0 0 1 1 0
//! GR 12 0 10 10 10 30 12 40
//! ```
//!
//! An `NC` line holds for every transect after it until the next `NC` line.

use crate::inp::error::SchemaError;
use crate::inp::lexing::Tokens;
use crate::inp::record::{parse_pairs, Cursor};
use crate::inp::schema::{Grouping, RecordType};
use crate::inp::sections::network::render_f64;

const ROUGHNESS_TAG: &str = "NC";
const HEADER_TAG: &str = "X1";
const GEOMETRY_TAG: &str = "GR";

/// Elevation/station pairs written per `GR` line.
pub const PAIRS_PER_LINE: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transect {
    pub name: String,
    pub roughness_left: f64,
    pub roughness_right: f64,
    pub roughness_channel: f64,
    pub bank_station_left: f64,
    pub bank_station_right: f64,
    pub modifier_meander: f64,
    pub modifier_stations: f64,
    pub modifier_elevations: f64,
    /// `(elevation, station)` pairs in file order.
    pub station_elevations: Vec<(f64, f64)>,
}

crate::impl_record! {
    Transect {
        kind: "Transect",
        identifier: ["Name"],
        fields: {
            "Name" => name,
            "RoughnessLeft" => roughness_left,
            "RoughnessRight" => roughness_right,
            "RoughnessChannel" => roughness_channel,
            "BankStationLeft" => bank_station_left,
            "BankStationRight" => bank_station_right,
            "ModifierMeander" => modifier_meander,
            "ModifierStations" => modifier_stations,
            "ModifierElevations" => modifier_elevations,
            "StationElevations" => station_elevations,
        },
    }
}

impl RecordType for Transect {
    const GROUPING: Grouping = Grouping::HeaderBlock {
        header: HEADER_TAG,
        carry: &[ROUGHNESS_TAG],
    };
    const TABLE_EXPORT: bool = false;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut transect = Transect::default();
        let mut declared_stations = None;
        for line in lines {
            let Some((tag, values)) = line.split_first() else {
                continue;
            };
            if tag.eq_ignore_ascii_case(ROUGHNESS_TAG) {
                let mut cursor = Cursor::new(values);
                transect.roughness_left = cursor.required("Nleft")?;
                transect.roughness_right = cursor.required("Nright")?;
                transect.roughness_channel = cursor.required("Nchanl")?;
                cursor.finish()?;
            } else if tag.eq_ignore_ascii_case(HEADER_TAG) {
                let mut cursor = Cursor::new(values);
                transect.name = cursor.required("Name")?;
                declared_stations = Some(cursor.required::<f64>("Nsta")?);
                transect.bank_station_left = cursor.required("Xleft")?;
                transect.bank_station_right = cursor.required("Xright")?;
                for placeholder in ["X1_6", "X1_7", "X1_8"] {
                    let _: f64 = cursor.optional(placeholder, 0.0)?;
                }
                transect.modifier_meander = cursor.optional("Lfactor", 0.0)?;
                transect.modifier_stations = cursor.optional("Wfactor", 0.0)?;
                transect.modifier_elevations = cursor.optional("Eoffset", 0.0)?;
                cursor.finish()?;
            } else if tag.eq_ignore_ascii_case(GEOMETRY_TAG) {
                transect
                    .station_elevations
                    .extend(parse_pairs::<f64, f64>(values, "Elev", "Station")?);
            } else {
                return Err(SchemaError::UnknownKeyword(tag.clone()));
            }
        }

        let declared = declared_stations.ok_or_else(|| SchemaError::missing(HEADER_TAG))?;
        if declared as usize != transect.station_elevations.len() {
            tracing::debug!(
                transect = %transect.name,
                declared,
                found = transect.station_elevations.len(),
                "station count on X1 line does not match GR data"
            );
        }
        Ok(transect)
    }

    fn lines(&self) -> Vec<Tokens> {
        let mut lines = vec![
            vec![
                ROUGHNESS_TAG.to_string(),
                render_f64(self.roughness_left),
                render_f64(self.roughness_right),
                render_f64(self.roughness_channel),
            ],
            vec![
                HEADER_TAG.to_string(),
                self.name.clone(),
                self.station_elevations.len().to_string(),
                render_f64(self.bank_station_left),
                render_f64(self.bank_station_right),
                "0".to_string(),
                "0".to_string(),
                "0".to_string(),
                render_f64(self.modifier_meander),
                render_f64(self.modifier_stations),
                render_f64(self.modifier_elevations),
            ],
        ];
        for chunk in self.station_elevations.chunks(PAIRS_PER_LINE) {
            let mut line = vec![GEOMETRY_TAG.to_string()];
            for (elevation, station) in chunk {
                line.push(render_f64(*elevation));
                line.push(render_f64(*station));
            }
            lines.push(line);
        }
        lines
    }
}
