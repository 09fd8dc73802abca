//! Property-based tests for token inference and rendering

use proptest::prelude::*;
use swmm_inp::{infer, infer_checked, Document, Value};

proptest! {
    #[test]
    fn infer_is_total(token in "[^ \t\r\n;]{1,24}") {
        let (value, warning) = infer_checked(&token);
        if warning.is_some() {
            prop_assert_eq!(value, Value::Text(token.clone()));
        }
    }

    #[test]
    fn integers_round_trip(n in any::<i64>()) {
        let token = n.to_string();
        prop_assert_eq!(infer(&token), Value::Int(n));
        prop_assert_eq!(Value::Int(n).render(), token);
    }

    #[test]
    fn booleans_round_trip(flag in any::<bool>()) {
        let rendered = Value::Bool(flag).render();
        prop_assert_eq!(infer(&rendered), Value::Bool(flag));
    }

    #[test]
    fn float_rendering_is_stable(x in -1.0e12f64..1.0e12f64) {
        let rendered = Value::Float(x).render();
        prop_assert_eq!(infer(&rendered).render(), rendered);
    }

    #[test]
    fn junction_elevations_survive_a_round_trip(elevation in -1000.0f64..10000.0) {
        let rendered = Value::Float(elevation).render();
        let text = format!("[JUNCTIONS]\nJ1 {rendered}\n");
        let doc = Document::read(&text).unwrap();
        let written = doc.write(true);
        prop_assert_eq!(Document::read(&written).unwrap(), doc);
    }
}

#[test]
fn text_never_becomes_a_number() {
    for token in ["J1", "CFS", "1-2", "A.5", "+"] {
        assert!(matches!(infer(token), Value::Text(_)), "{token}");
    }
}
