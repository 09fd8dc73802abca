//! Hydrology: rain gages, subcatchments and what hangs off them

use crate::inp::coercion::Value;
use crate::inp::error::SchemaError;
use crate::inp::lexing::Tokens;
use crate::inp::record::{Cursor, Field};
use crate::inp::schema::{Grouping, RecordType};
use crate::inp::sections::network::{parse_point_lines, point_lines, render_f64};

crate::keyword_enum! {
    /// How rainfall values are recorded.
    pub enum RainFormat {
        Intensity => "INTENSITY",
        Volume => "VOLUME",
        Cumulative => "CUMULATIVE",
    }
}

crate::keyword_enum! {
    pub enum RainUnits {
        Inches => "IN",
        Millimeters => "MM",
    }
}

/// Where a gage gets its data from.
#[derive(Debug, Clone, PartialEq)]
pub enum RainSource {
    Timeseries(String),
    File {
        filename: String,
        station: String,
        units: RainUnits,
    },
}

impl Default for RainSource {
    fn default() -> Self {
        RainSource::Timeseries(String::new())
    }
}

impl RainSource {
    fn parse(tokens: &[String]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::new(tokens);
        let keyword = cursor.next_token().ok_or_else(|| SchemaError::missing("Source"))?;
        let source = if keyword.eq_ignore_ascii_case("TIMESERIES") {
            RainSource::Timeseries(cursor.required("Timeseries")?)
        } else if keyword.eq_ignore_ascii_case("FILE") {
            RainSource::File {
                filename: cursor.required("Filename")?,
                station: cursor.required("Station")?,
                units: cursor.required("Units")?,
            }
        } else {
            return Err(SchemaError::UnknownKeyword(keyword.to_string()));
        };
        cursor.finish()?;
        Ok(source)
    }

    fn tokens(&self) -> Tokens {
        match self {
            RainSource::Timeseries(name) => vec!["TIMESERIES".to_string(), name.clone()],
            RainSource::File {
                filename,
                station,
                units,
            } => vec![
                "FILE".to_string(),
                filename.clone(),
                station.clone(),
                units.to_string(),
            ],
        }
    }
}

impl Field for RainSource {
    fn from_token(_token: &str) -> Option<Self> {
        None
    }

    fn to_value(&self) -> Value {
        Value::List(self.tokens().into_iter().map(Value::Text).collect())
    }

    fn from_value(value: Value) -> Option<Self> {
        let tokens: Vec<String> = value.as_list()?.iter().map(Value::render).collect();
        RainSource::parse(&tokens).ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RainGage {
    pub name: String,
    pub format: RainFormat,
    /// Recording interval, decimal hours or `H:MM`.
    pub interval: Value,
    pub snow_catch_factor: f64,
    pub source: RainSource,
}

crate::impl_record! {
    RainGage {
        kind: "RainGage",
        identifier: ["Name"],
        fields: {
            "Name" => name,
            "Format" => format,
            "Interval" => interval,
            "SCF" => snow_catch_factor,
            "Source" => source,
        },
    }
}

impl RecordType for RainGage {
    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        Ok(RainGage {
            name: cursor.required("Name")?,
            format: cursor.required("Format")?,
            interval: cursor.required("Interval")?,
            snow_catch_factor: cursor.required("SCF")?,
            source: RainSource::parse(cursor.rest())?,
        })
    }

    fn lines(&self) -> Vec<Tokens> {
        let mut line = vec![
            self.name.clone(),
            self.format.to_string(),
            self.interval.render(),
            render_f64(self.snow_catch_factor),
        ];
        line.extend(self.source.tokens());
        vec![line]
    }
}

/// Map position of a rain gage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Symbol {
    pub gage: String,
    pub x: f64,
    pub y: f64,
}

crate::impl_record! {
    Symbol {
        kind: "Symbol",
        identifier: ["Gage"],
        fields: { "Gage" => gage, "X" => x, "Y" => y },
    }
}

impl RecordType for Symbol {
    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let symbol = Symbol {
            gage: cursor.required("Gage")?,
            x: cursor.required("X")?,
            y: cursor.required("Y")?,
        };
        cursor.finish()?;
        Ok(symbol)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subcatchment {
    pub name: String,
    pub rain_gage: String,
    pub outlet: String,
    pub area: f64,
    pub imperviousness: f64,
    pub width: f64,
    pub slope: f64,
    pub curb_length: f64,
    pub snow_pack: Option<String>,
}

crate::impl_record! {
    Subcatchment {
        kind: "Subcatchment",
        identifier: ["Name"],
        fields: {
            "Name" => name,
            "RainGage" => rain_gage,
            "Outlet" => outlet,
            "Area" => area,
            "Imperv" => imperviousness,
            "Width" => width,
            "Slope" => slope,
            "CurbLen" => curb_length,
            "SnowPack" => snow_pack,
        },
    }
}

impl RecordType for Subcatchment {
    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let subcatchment = Subcatchment {
            name: cursor.required("Name")?,
            rain_gage: cursor.required("RainGage")?,
            outlet: cursor.required("Outlet")?,
            area: cursor.required("Area")?,
            imperviousness: cursor.required("Imperv")?,
            width: cursor.required("Width")?,
            slope: cursor.required("Slope")?,
            curb_length: cursor.optional("CurbLen", 0.0)?,
            snow_pack: cursor.optional("SnowPack", None)?,
        };
        cursor.finish()?;
        Ok(subcatchment)
    }
}

crate::keyword_enum! {
    /// Where runoff from one subarea is sent.
    pub enum RouteTo {
        Outlet => "OUTLET",
        Impervious => "IMPERVIOUS",
        Pervious => "PERVIOUS",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subarea {
    pub subcatchment: String,
    pub n_impervious: f64,
    pub n_pervious: f64,
    pub storage_impervious: f64,
    pub storage_pervious: f64,
    pub pct_zero: f64,
    pub route_to: RouteTo,
    pub pct_routed: f64,
}

crate::impl_record! {
    Subarea {
        kind: "Subarea",
        identifier: ["Subcatch"],
        fields: {
            "Subcatch" => subcatchment,
            "N_Imperv" => n_impervious,
            "N_Perv" => n_pervious,
            "S_Imperv" => storage_impervious,
            "S_Perv" => storage_pervious,
            "PctZero" => pct_zero,
            "RouteTo" => route_to,
            "PctRouted" => pct_routed,
        },
    }
}

impl RecordType for Subarea {
    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let subarea = Subarea {
            subcatchment: cursor.required("Subcatch")?,
            n_impervious: cursor.required("N_Imperv")?,
            n_pervious: cursor.required("N_Perv")?,
            storage_impervious: cursor.required("S_Imperv")?,
            storage_pervious: cursor.required("S_Perv")?,
            pct_zero: cursor.required("PctZero")?,
            route_to: cursor.optional("RouteTo", RouteTo::Outlet)?,
            pct_routed: cursor.optional("PctRouted", 100.0)?,
        };
        cursor.finish()?;
        Ok(subarea)
    }
}

crate::keyword_enum! {
    /// Infiltration model named at the end of a line.
    pub enum InfiltrationMethod {
        Horton => "HORTON",
        ModifiedHorton => "MODIFIED_HORTON",
        GreenAmpt => "GREEN_AMPT",
        ModifiedGreenAmpt => "MODIFIED_GREEN_AMPT",
        CurveNumber => "CURVE_NUMBER",
    }
}

/// Parameters of one infiltration model.
#[derive(Debug, Clone, PartialEq)]
pub enum InfiltrationParams {
    Horton {
        max_rate: f64,
        min_rate: f64,
        decay: f64,
        dry_time: f64,
        max_infiltration: f64,
    },
    GreenAmpt {
        suction: f64,
        conductivity: f64,
        initial_deficit: f64,
    },
    CurveNumber {
        curve_number: f64,
        conductivity: f64,
        dry_time: f64,
    },
}

impl InfiltrationParams {
    fn tag(&self) -> &'static str {
        match self {
            InfiltrationParams::Horton { .. } => "HORTON",
            InfiltrationParams::GreenAmpt { .. } => "GREEN_AMPT",
            InfiltrationParams::CurveNumber { .. } => "CURVE_NUMBER",
        }
    }

    fn numbers(&self) -> Vec<f64> {
        match *self {
            InfiltrationParams::Horton {
                max_rate,
                min_rate,
                decay,
                dry_time,
                max_infiltration,
            } => vec![max_rate, min_rate, decay, dry_time, max_infiltration],
            InfiltrationParams::GreenAmpt {
                suction,
                conductivity,
                initial_deficit,
            } => vec![suction, conductivity, initial_deficit],
            InfiltrationParams::CurveNumber {
                curve_number,
                conductivity,
                dry_time,
            } => vec![curve_number, conductivity, dry_time],
        }
    }

    fn horton(tokens: &[String]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::new(tokens);
        let params = InfiltrationParams::Horton {
            max_rate: cursor.required("MaxRate")?,
            min_rate: cursor.required("MinRate")?,
            decay: cursor.required("Decay")?,
            dry_time: cursor.required("DryTime")?,
            max_infiltration: cursor.required("MaxInf")?,
        };
        cursor.finish()?;
        Ok(params)
    }

    fn green_ampt(tokens: &[String]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::new(tokens);
        let params = InfiltrationParams::GreenAmpt {
            suction: cursor.required("Suction")?,
            conductivity: cursor.required("Ksat")?,
            initial_deficit: cursor.required("IMD")?,
        };
        warn_dropped(&params, cursor.rest());
        Ok(params)
    }

    fn curve_number(tokens: &[String]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::new(tokens);
        let params = InfiltrationParams::CurveNumber {
            curve_number: cursor.required("CurveNo")?,
            conductivity: cursor.required("Ksat")?,
            dry_time: cursor.required("DryTime")?,
        };
        warn_dropped(&params, cursor.rest());
        Ok(params)
    }

    fn for_method(method: InfiltrationMethod, tokens: &[String]) -> Result<Self, SchemaError> {
        match method {
            InfiltrationMethod::Horton | InfiltrationMethod::ModifiedHorton => Self::horton(tokens),
            InfiltrationMethod::GreenAmpt | InfiltrationMethod::ModifiedGreenAmpt => {
                Self::green_ampt(tokens)
            }
            InfiltrationMethod::CurveNumber => Self::curve_number(tokens),
        }
    }
}

/// Values past a model's parameter list are not kept; say so.
fn warn_dropped(params: &InfiltrationParams, extra: &[String]) {
    if !extra.is_empty() {
        tracing::warn!(
            model = params.tag(),
            dropped = extra.len(),
            values = %extra.join(" "),
            "extra infiltration values ignored"
        );
    }
}

impl Default for InfiltrationParams {
    fn default() -> Self {
        InfiltrationParams::CurveNumber {
            curve_number: 0.0,
            conductivity: 0.0,
            dry_time: 0.0,
        }
    }
}

/// Tagged list: the model name followed by its parameters.
impl Field for InfiltrationParams {
    fn from_token(_token: &str) -> Option<Self> {
        None
    }

    fn to_value(&self) -> Value {
        let mut items = vec![Value::from(self.tag())];
        items.extend(self.numbers().into_iter().map(Value::Float));
        Value::List(items)
    }

    fn from_value(value: Value) -> Option<Self> {
        let tokens: Vec<String> = value.as_list()?.iter().map(Value::render).collect();
        let (tag, numbers) = tokens.split_first()?;
        let method = InfiltrationMethod::parse(tag)?;
        InfiltrationParams::for_method(method, numbers).ok()
    }
}

/// Infiltration parameters of a subcatchment.
///
/// Without an explicit method keyword the model follows from the number of
/// values: five for Horton, three for Green-Ampt, anything else is read as
/// curve number (extra values are ignored).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Infiltration {
    pub subcatchment: String,
    pub params: InfiltrationParams,
    /// Model keyword given on the line, if any.
    pub method: Option<InfiltrationMethod>,
}

crate::impl_record! {
    Infiltration {
        kind: "Infiltration",
        identifier: ["Subcatch"],
        fields: {
            "Subcatch" => subcatchment,
            "Params" => params,
            "Method" => method,
        },
    }
}

impl RecordType for Infiltration {
    const TABLE_EXPORT: bool = false;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let subcatchment: String = cursor.required("Subcatch")?;
        let values = cursor.rest();

        let method = values.last().and_then(|token| InfiltrationMethod::parse(token));
        let params = match method {
            Some(method) => InfiltrationParams::for_method(method, &values[..values.len() - 1])?,
            None => match values.len() {
                5 => InfiltrationParams::horton(values)?,
                3 => InfiltrationParams::green_ampt(values)?,
                _ => InfiltrationParams::curve_number(values)?,
            },
        };
        Ok(Infiltration {
            subcatchment,
            params,
            method,
        })
    }

    fn lines(&self) -> Vec<Tokens> {
        let mut line = vec![self.subcatchment.clone()];
        line.extend(self.params.numbers().into_iter().map(render_f64));
        if let Some(method) = self.method {
            line.push(method.to_string());
        }
        vec![line]
    }
}

/// Outline of a subcatchment, one source line per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub subcatchment: String,
    pub vertices: Vec<(f64, f64)>,
}

crate::impl_record! {
    Polygon {
        kind: "Polygon",
        identifier: ["Subcatch"],
        fields: { "Subcatch" => subcatchment, "Polygon" => vertices },
    }
}

impl RecordType for Polygon {
    const GROUPING: Grouping = Grouping::RepeatedKey;
    const TABLE_EXPORT: bool = false;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let (subcatchment, vertices) = parse_point_lines(lines, "Subcatch")?;
        Ok(Polygon {
            subcatchment,
            vertices,
        })
    }

    fn lines(&self) -> Vec<Tokens> {
        point_lines(&self.subcatchment, &self.vertices)
    }
}

/// Initial pollutant buildup on a subcatchment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loading {
    pub subcatchment: String,
    pub buildup: Vec<(String, f64)>,
}

crate::impl_record! {
    Loading {
        kind: "Loading",
        identifier: ["Subcatch"],
        fields: { "Subcatch" => subcatchment, "PollutantBuildup" => buildup },
    }
}

impl RecordType for Loading {
    const GROUPING: Grouping = Grouping::RepeatedKey;
    const TABLE_EXPORT: bool = false;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut subcatchment = None;
        let mut buildup = Vec::new();
        for line in lines {
            let mut cursor = Cursor::new(line);
            let name: String = cursor.required("Subcatch")?;
            subcatchment.get_or_insert(name);
            while cursor.remaining() > 0 {
                let pollutant: String = cursor.required("Pollutant")?;
                let amount: f64 = cursor.required("InitBuildup")?;
                buildup.push((pollutant, amount));
            }
        }
        Ok(Loading {
            subcatchment: subcatchment.ok_or_else(|| SchemaError::missing("Subcatch"))?,
            buildup,
        })
    }

    fn lines(&self) -> Vec<Tokens> {
        self.buildup
            .iter()
            .map(|(pollutant, amount)| {
                vec![self.subcatchment.clone(), pollutant.clone(), render_f64(*amount)]
            })
            .collect()
    }
}
