//! Conveyance network: junctions, conduits and their map geometry

use crate::inp::error::SchemaError;
use crate::inp::lexing::Tokens;
use crate::inp::record::{parse_pairs, Cursor};
use crate::inp::schema::{Grouping, RecordType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Junction {
    pub name: String,
    pub elevation: f64,
    pub max_depth: f64,
    pub init_depth: f64,
    pub surcharge_depth: f64,
    pub ponded_area: f64,
}

crate::impl_record! {
    Junction {
        kind: "Junction",
        identifier: ["Name"],
        fields: {
            "Name" => name,
            "Elevation" => elevation,
            "MaxDepth" => max_depth,
            "InitDepth" => init_depth,
            "SurDepth" => surcharge_depth,
            "Aponded" => ponded_area,
        },
    }
}

impl RecordType for Junction {
    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let junction = Junction {
            name: cursor.required("Name")?,
            elevation: cursor.required("Elevation")?,
            max_depth: cursor.optional("MaxDepth", 0.0)?,
            init_depth: cursor.optional("InitDepth", 0.0)?,
            surcharge_depth: cursor.optional("SurDepth", 0.0)?,
            ponded_area: cursor.optional("Aponded", 0.0)?,
        };
        cursor.finish()?;
        Ok(junction)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conduit {
    pub name: String,
    pub from_node: String,
    pub to_node: String,
    pub length: f64,
    pub roughness: f64,
    pub in_offset: f64,
    pub out_offset: f64,
    pub init_flow: f64,
    pub max_flow: f64,
}

crate::impl_record! {
    Conduit {
        kind: "Conduit",
        identifier: ["Name"],
        fields: {
            "Name" => name,
            "FromNode" => from_node,
            "ToNode" => to_node,
            "Length" => length,
            "Roughness" => roughness,
            "InOffset" => in_offset,
            "OutOffset" => out_offset,
            "InitFlow" => init_flow,
            "MaxFlow" => max_flow,
        },
    }
}

impl RecordType for Conduit {
    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let conduit = Conduit {
            name: cursor.required("Name")?,
            from_node: cursor.required("FromNode")?,
            to_node: cursor.required("ToNode")?,
            length: cursor.required("Length")?,
            roughness: cursor.required("Roughness")?,
            in_offset: cursor.required("InOffset")?,
            out_offset: cursor.required("OutOffset")?,
            init_flow: cursor.optional("InitFlow", 0.0)?,
            max_flow: cursor.optional("MaxFlow", 0.0)?,
        };
        cursor.finish()?;
        Ok(conduit)
    }
}

/// Map position of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coordinate {
    pub node: String,
    pub x: f64,
    pub y: f64,
}

crate::impl_record! {
    Coordinate {
        kind: "Coordinate",
        identifier: ["Node"],
        fields: { "Node" => node, "X" => x, "Y" => y },
    }
}

impl RecordType for Coordinate {
    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let mut cursor = Cursor::first_line(lines);
        let coordinate = Coordinate {
            node: cursor.required("Node")?,
            x: cursor.required("X")?,
            y: cursor.required("Y")?,
        };
        cursor.finish()?;
        Ok(coordinate)
    }
}

/// Interior bend points of a link, one source line per point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vertices {
    pub link: String,
    pub vertices: Vec<(f64, f64)>,
}

crate::impl_record! {
    Vertices {
        kind: "Vertices",
        identifier: ["Link"],
        fields: { "Link" => link, "Vertices" => vertices },
    }
}

impl RecordType for Vertices {
    const GROUPING: Grouping = Grouping::RepeatedKey;
    const TABLE_EXPORT: bool = false;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError> {
        let (link, vertices) = parse_point_lines(lines, "Link")?;
        Ok(Vertices { link, vertices })
    }

    fn lines(&self) -> Vec<Tokens> {
        point_lines(&self.link, &self.vertices)
    }
}

/// `Name x y` lines sharing one name.
pub(crate) fn parse_point_lines(
    lines: &[Tokens],
    name_field: &str,
) -> Result<(String, Vec<(f64, f64)>), SchemaError> {
    let mut name = None;
    let mut points = Vec::with_capacity(lines.len());
    for line in lines {
        let mut cursor = Cursor::new(line);
        let line_name: String = cursor.required(name_field)?;
        name.get_or_insert(line_name);
        let rest = cursor.rest();
        if rest.len() != 2 {
            return Err(SchemaError::Malformed(format!(
                "expected one `X Y` pair per line, found {} values",
                rest.len()
            )));
        }
        points.extend(parse_pairs::<f64, f64>(rest, "X", "Y")?);
    }
    let name = name.ok_or_else(|| SchemaError::missing(name_field))?;
    Ok((name, points))
}

pub(crate) fn point_lines(name: &str, points: &[(f64, f64)]) -> Vec<Tokens> {
    points
        .iter()
        .map(|(x, y)| vec![name.to_string(), render_f64(*x), render_f64(*y)])
        .collect()
}

pub(crate) fn render_f64(value: f64) -> String {
    crate::inp::coercion::Value::Float(value).render()
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
    fn test_junction_defaults() {
        let junction = Junction::parse(&[line("J1 10.5")]).unwrap();
        assert_eq!(junction.name, "J1");
        assert_eq!(junction.elevation, 10.5);
        assert_eq!(junction.max_depth, 0.0);
        assert_eq!(junction.get("Aponded"), Ok(Value::Float(0.0)));
    }

    #[test]
    fn test_junction_missing_elevation() {
        assert_eq!(
            Junction::parse(&[line("J1")]),
            Err(SchemaError::missing("Elevation"))
        );
    }

    #[test]
    fn test_conduit_requires_offsets() {
        let conduit = Conduit::parse(&[line("C1 J1 J2 400 0.01 0 0")]).unwrap();
        assert_eq!(conduit.from_node, "J1");
        assert_eq!(conduit.to_node, "J2");
        assert_eq!(
            Conduit::parse(&[line("C1 J1 J2 400 0.01")]),
            Err(SchemaError::missing("InOffset"))
        );
    }

    #[test]
    fn test_set_validates_field_names_and_types() {
        let mut junction = Junction::parse(&[line("J1 10")]).unwrap();
        assert!(junction.set("MaxDepth", Value::Int(4)).is_ok());
        assert_eq!(junction.max_depth, 4.0);
        assert!(junction.set("Depth", Value::Int(4)).is_err());
        assert!(junction.set("Elevation", Value::from("high")).is_err());
    }

    #[test]
    fn test_vertices_collect_points() {
        let vertices = Vertices::parse(&[line("C1 1 2"), line("C1 3 4")]).unwrap();
        assert_eq!(vertices.vertices, vec![(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(
            vertices.to_tokens(),
            vec![line("C1 1 2"), line("C1 3 4")]
        );
    }
}
