//! Value resolution through text overrides, live widget values and drags.

use sketchbox_core::{DragController, Point, ValueController};
use sketchbox_params::{
    LiveValues, ParameterDrag, ParameterGroup, ParameterKind, ParameterParseError, TextSource,
    Value,
};
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};

fn overrides(pairs: &[(&str, &str)]) -> TextSource {
    TextSource::from_map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn radius_group() -> ParameterGroup {
    let mut group = ParameterGroup::new();
    group
        .define("R", ParameterKind::numeric(0.0, 100.0, 1.0, 10.0).unwrap())
        .unwrap();
    group
}

#[test]
fn test_numeric_override_range_checked() {
    let group = radius_group();

    let err = group.values(&overrides(&[("R", "150")])).unwrap_err();
    assert!(matches!(
        err,
        ParameterParseError::OutOfRange { value, .. } if value == 150.0
    ));

    let values = group.values(&overrides(&[("R", "50")])).unwrap();
    assert_eq!(values.get("R"), Some(&Value::Number(50.0)));

    let values = group.values(&overrides(&[])).unwrap();
    assert_eq!(values.get("R"), Some(&Value::Number(10.0)));
}

#[test]
fn test_malformed_override_aborts_pass() {
    let mut group = radius_group();
    group.define("flag", ParameterKind::toggle(false)).unwrap();

    let err = group
        .values(&overrides(&[("R", "20"), ("flag", "yes")]))
        .unwrap_err();
    assert_eq!(err.name(), "flag");
}

#[test]
fn test_toggle_grammar_is_exact() {
    let mut group = ParameterGroup::new();
    group.define("t", ParameterKind::toggle(false)).unwrap();

    for bad in ["True", "1", " true", ""] {
        assert!(
            group.values(&overrides(&[("t", bad)])).is_err(),
            "'{}' should be rejected",
            bad
        );
    }
    let values = group.values(&overrides(&[("t", "true")])).unwrap();
    assert_eq!(values.get("t"), Some(&Value::Bool(true)));
}

#[test]
fn test_color_grammar() {
    let mut group = ParameterGroup::new();
    group
        .define("c", ParameterKind::color(Default::default()).unwrap())
        .unwrap();

    let values = group.values(&overrides(&[("c", "FF00FF00")])).unwrap();
    match values.get("c") {
        Some(Value::Color(c)) => {
            assert_eq!((c.a, c.r, c.g, c.b), (1.0, 0.0, 1.0, 0.0));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        group.values(&overrides(&[("c", "#00FF00")])),
        Err(ParameterParseError::Color { .. })
    ));
}

#[test]
fn test_choice_override_maps_label_to_value() {
    let mut group = ParameterGroup::new();
    group
        .define(
            "mode",
            ParameterKind::choice_map(
                vec![
                    ("none".to_string(), Value::Number(0.0)),
                    ("best".to_string(), Value::Number(6.0)),
                ],
                "none",
                false,
            )
            .unwrap(),
        )
        .unwrap();

    let values = group.values(&overrides(&[("mode", "best")])).unwrap();
    assert_eq!(values.get("mode"), Some(&Value::Number(6.0)));
    assert!(matches!(
        group.values(&overrides(&[("mode", "6")])),
        Err(ParameterParseError::UnknownChoice { .. })
    ));
}

#[test]
fn test_point_and_angle_grammar() {
    let mut group = ParameterGroup::new();
    group
        .define("p", ParameterKind::point(Point::ORIGIN).unwrap())
        .unwrap();
    group.define("a", ParameterKind::angle(0.0).unwrap()).unwrap();

    let values = group
        .values(&overrides(&[("p", "1.5, -2"), ("a", "-1.5707963267948966")]))
        .unwrap();
    assert_eq!(values.get("p"), Some(&Value::Point(Point::new(1.5, -2.0))));
    let a = values.get("a").and_then(Value::as_number).unwrap();
    assert!((a - 3.0 * FRAC_PI_2).abs() < 1e-9);
}

#[test]
fn test_custom_override_is_json() {
    let mut group = ParameterGroup::new();
    group
        .define("c", ParameterKind::custom(Value::Number(1.0)))
        .unwrap();
    let values = group.values(&overrides(&[("c", "[1, \"two\"]")])).unwrap();
    assert_eq!(
        values.get("c"),
        Some(&Value::List(vec![
            Value::Number(1.0),
            Value::Text("two".to_string())
        ]))
    );
    assert!(group.values(&overrides(&[("c", "{\"a\": 1}")])).is_err());
}

#[test]
fn test_overrides_layer_over_fallback() {
    let base = overrides(&[("R", "20")]);
    let mut extra = HashMap::new();
    extra.insert("R".to_string(), "30".to_string());
    let layered = base.with_overrides(extra);

    let values = radius_group().values(&layered).unwrap();
    assert_eq!(values.get("R"), Some(&Value::Number(30.0)));
}

#[test]
fn test_live_values_fall_back_to_default() {
    let group = radius_group();
    let live = LiveValues::new();
    assert_eq!(
        group.values(&live).unwrap().get("R"),
        Some(&Value::Number(10.0))
    );

    live.set("R", Value::Number(42.0));
    assert_eq!(
        group.values(&live).unwrap().get("R"),
        Some(&Value::Number(42.0))
    );

    live.clear();
    assert!(live.is_empty());
}

#[test]
fn test_infinite_drag_updates_live_value() {
    let mut group = ParameterGroup::new();
    group
        .define("zoom", ParameterKind::infinite(1.0, 0.5).unwrap())
        .unwrap();
    let live = LiveValues::new();
    let drag = ParameterDrag::new(group.get("zoom").unwrap(), live.clone()).unwrap();
    let mut dc = DragController::new(ValueController::new(drag));

    dc.press(Point::new(0.0, 0.0));
    dc.motion(Point::new(0.0, -4.0));
    dc.release(Point::new(0.0, -4.0));
    assert_eq!(live.get("zoom"), Some(Value::Number(3.0)));

    // second drag starts from the stored value
    dc.press(Point::new(0.0, 0.0));
    dc.motion(Point::new(0.0, 2.0));
    dc.release(Point::new(0.0, 2.0));
    assert_eq!(live.get("zoom"), Some(Value::Number(2.0)));
}

#[test]
fn test_angle_drag_is_absolute_and_wrapped() {
    let mut group = ParameterGroup::new();
    group.define("a", ParameterKind::angle(1.0).unwrap()).unwrap();
    let live = LiveValues::new();
    let seen = std::rc::Rc::new(std::cell::Cell::new(0.0));
    let sink = seen.clone();
    let drag = ParameterDrag::new(group.get("a").unwrap(), live.clone())
        .unwrap()
        .on_change(move |v| sink.set(v));
    let mut dc = DragController::new(ValueController::new(drag));

    dc.press(Point::new(10.0, 0.0));
    dc.motion(Point::new(-10.0, 0.0));
    let a = live.get("a").and_then(|v| v.as_number()).unwrap();
    assert!((a - PI).abs() < 1e-12);

    dc.motion(Point::new(0.0, -10.0));
    let a = live.get("a").and_then(|v| v.as_number()).unwrap();
    assert!((a - 3.0 * FRAC_PI_2).abs() < 1e-12);
    assert_eq!(seen.get(), a);
}

#[test]
fn test_drag_needs_continuous_kind() {
    let mut group = ParameterGroup::new();
    group.define("t", ParameterKind::toggle(false)).unwrap();
    assert!(ParameterDrag::new(group.get("t").unwrap(), LiveValues::new()).is_none());
}
