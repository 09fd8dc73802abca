//! Read → write → read cycles over whole project files

use std::fs;
use swmm_inp::inp::sections::curves::{Curve, CurveKind, Pattern, PatternKind};
use swmm_inp::inp::sections::network::Junction;
use swmm_inp::inp::testing::assert_document;
use swmm_inp::{Document, ParseError, SchemaError, SectionError, Value};

fn read_sample(path: &str) -> String {
    fs::read_to_string(path).expect("Failed to read sample file")
}

fn example() -> Document {
    Document::read(&read_sample("samples/example.inp")).expect("sample to parse")
}

#[test]
fn test_sample_sections_in_source_order() {
    let doc = example();
    assert_document(&doc)
        .section_names(&[
            "TITLE",
            "OPTIONS",
            "EVAPORATION",
            "RAINGAGES",
            "SUBCATCHMENTS",
            "SUBAREAS",
            "INFILTRATION",
            "JUNCTIONS",
            "OUTFALLS",
            "CONDUITS",
            "TRANSECTS",
            "POLLUTANTS",
            "LOADINGS",
            "PATTERNS",
            "CURVES",
            "TIMESERIES",
            "CONTROLS",
            "REPORT",
            "TAGS",
            "MAP",
            "COORDINATES",
            "VERTICES",
            "POLYGONS",
            "SYMBOLS",
        ])
        .title("Example drainage model\nTwo subcatchments draining to one outfall")
        .setting("OPTIONS", "ALLOW_PONDING", false)
        .setting("OPTIONS", "MIN_SLOPE", 0)
        .setting("EVAPORATION", "CONSTANT", 0)
        .setting("REPORT", "NODES", vec!["J1", "J2", "O1"])
        .raw("OUTFALLS", &[";;Name  Elevation  Type  Stage Data  Gated", "O1      95         FREE              NO"]);
}

#[test]
fn test_sample_records() {
    let doc = example();
    assert_document(&doc)
        .objects("JUNCTIONS", |junctions| {
            junctions.keys(&["J1", "J2"]).record("J2", |j2| {
                j2.field("Elevation", 98.5).field("InitDepth", 0.0);
            });
        })
        .objects("SUBCATCHMENTS", |subcatchments| {
            subcatchments.count(2).record("S1", |s1| {
                s1.field("Outlet", "J1").missing("SnowPack");
            });
        })
        .objects("RAINGAGES", |gages| {
            gages.record("RG1", |rg1| {
                rg1.renders("Interval", "00:15:00")
                    .renders("Source", "TIMESERIES TS1");
            });
        })
        .objects("PATTERNS", |patterns| {
            patterns.record("DWF", |dwf| {
                dwf.field("Type", "HOURLY")
                    .field("Factors", vec![0.5, 0.6, 0.7, 0.8, 0.9, 1.0]);
            });
        })
        .objects("TIMESERIES", |series| {
            series.keys(&["TS1", "TS2"]).record("TS1", |ts1| {
                ts1.line_count(3);
            });
        })
        .objects("TRANSECTS", |transects| {
            transects.record("T1", |t1| {
                t1.field("RoughnessChannel", 0.02).line_count(3);
            });
        })
        .objects("CONTROLS", |controls| {
            controls.kind("Control").record("R1", |r1| {
                r1.field("Priority", 1.0);
            });
        })
        .objects("TAGS", |tags| {
            tags.record(["Node", "J1"], |tag| {
                tag.field("Tag", "Upstream");
            });
        });
}

#[test]
fn test_sample_round_trip_tables() {
    let doc = example();
    let text = doc.write(false);
    let reread = Document::read(&text).expect("written text to parse");
    assert_eq!(reread, doc);
    assert_eq!(reread.write(false), text);
}

#[test]
fn test_sample_round_trip_fast() {
    let doc = example();
    let text = doc.write(true);
    let reread = Document::read(&text).expect("written text to parse");
    assert_eq!(reread, doc);
}

#[test]
fn test_write_does_not_mutate() {
    let doc = example();
    let before = doc.clone();
    let _ = doc.write(false);
    let _ = doc.write(true);
    assert_eq!(doc, before);
}

#[test]
fn test_patterns_fast_write() {
    let doc = Document::read("[PATTERNS]\nP1 MONTHLY 1 1 1 1 1 1 1 1 1 1 1 1\n").unwrap();
    let pattern = doc
        .objects("PATTERNS")
        .and_then(|patterns| patterns.get_as::<Pattern>("P1"))
        .unwrap();
    assert_eq!(pattern.kind, PatternKind::Monthly);
    assert_eq!(pattern.factors, vec![1.0; 12]);
    assert_eq!(
        doc.write(true),
        "[PATTERNS]\nP1 MONTHLY 1 1 1 1 1 1 1 1 1 1 1 1\n\n"
    );
}

#[test]
fn test_curves_continuation() {
    let doc = Document::read("[CURVES]\nC1 STORAGE 0 100\nC1 2 200\n").unwrap();
    let curves = doc.objects("CURVES").unwrap();
    assert_eq!(curves.len(), 1);
    let curve = curves.get_as::<Curve>("C1").unwrap();
    assert_eq!(curve.kind, CurveKind::Storage);
    assert_eq!(curve.points, vec![(0.0, 100.0), (2.0, 200.0)]);
    assert_eq!(doc.write(false), "[CURVES]\nC1 STORAGE 0 100\nC1 2 200\n\n");
}

#[test]
fn test_edit_then_round_trip() {
    let mut doc = example();
    let junctions = doc.objects_mut("JUNCTIONS").unwrap();
    junctions.set_field("J1", "MaxDepth", Value::Float(6.5)).unwrap();
    junctions.set_field("J2", "Name", Value::from("J2a")).unwrap();
    junctions
        .insert(Junction {
            name: "J3".into(),
            elevation: 97.0,
            ..Junction::default()
        })
        .unwrap();

    let reread = Document::read(&doc.write(false)).unwrap();
    assert_document(&reread).objects("JUNCTIONS", |junctions| {
        junctions
            .keys(&["J1", "J2a", "J3"])
            .record("J1", |j1| {
                j1.field("MaxDepth", 6.5);
            });
    });
}

#[test]
fn test_raw_sections_survive_untouched() {
    let text = "[OUTFALLS]\n;;comment kept\nO1 95 FREE NO\n\nO2 94 FREE NO\n";
    let doc = Document::read(text).unwrap();
    assert_eq!(
        doc.write(false),
        "[OUTFALLS]\n;;comment kept\nO1 95 FREE NO\n\nO2 94 FREE NO\n\n"
    );
}

#[test]
fn test_missing_required_field_aborts_read() {
    let text = "[TITLE]\nx\n\n[CONDUITS]\nC1 J1 J2 400 0.01 0 0\nC2 J2 J3 400\n";
    assert_eq!(
        Document::read(text),
        Err(ParseError::Schema(SectionError::new(
            "CONDUITS",
            5,
            SchemaError::missing("Roughness")
        )))
    );
}

#[test]
fn test_orphan_control_line_reports_its_line() {
    let text = "[CONTROLS]\nIF NODE J1 DEPTH > 1\nRULE R1\n";
    let err = Document::read(text).unwrap_err();
    assert_eq!(err.to_string(), "[CONTROLS] line 2: `IF` does not belong to any record");
}

#[test]
fn test_integral_floats_round_trip() {
    let text = "[EVAPORATION]\nCONSTANT 0.0\nDRY_ONLY NO\n\n\
                [MAP]\nDIMENSIONS 0.000 0.000 100.000 100.000\n\n\
                [RAINGAGES]\nRG1 INTENSITY 1.0 1.0 TIMESERIES TS1\n";
    let doc = Document::read(text).unwrap();
    for fast in [false, true] {
        let reread = Document::read(&doc.write(fast)).expect("written text to parse");
        assert_eq!(reread, doc);
    }
    assert_document(&doc)
        .setting("EVAPORATION", "CONSTANT", 0.0)
        .setting("MAP", "DIMENSIONS", vec![0, 0, 100, 100])
        .objects("RAINGAGES", |gages| {
            gages.record("RG1", |rg1| {
                rg1.field("Interval", 1.0).renders("Interval", "1");
            });
        });
}

#[test]
fn test_trailing_roughness_line_is_rejected() {
    let text = "[TRANSECTS]\nNC 0.1 0.1 0.1\nX1 T1 0 0 0\nNC 0.2 0.2 0.2\n";
    assert_eq!(
        Document::read(text),
        Err(ParseError::Schema(SectionError::new(
            "TRANSECTS",
            3,
            SchemaError::OrphanLine {
                line_index: 3,
                token: "NC".into()
            }
        )))
    );
}

#[test]
fn test_vertical_tab_is_whitespace() {
    let text = "[TITLE]\nA\u{b}B\n\n[OUTFALLS]\nO1\u{b}95 FREE\n";
    let doc = Document::read(text).unwrap();
    assert_document(&doc)
        .title("A\u{b}B")
        .raw("OUTFALLS", &["O1\u{b}95 FREE"]);
    assert_eq!(doc.write(false), format!("{text}\n"));
}
