mod common;

use common::{load_geometry, Area};
use plugboard::property::PropertyType;
use plugboard::value::AnyValue;

const WIDE_PICTURE: &str = "\
Test :
**********
*        *
*        *
*        *
**********";

#[test]
fn rectangle_computes_area_and_picture() {
    let mm = load_geometry();
    mm.change_input("Rectangle", "Name", AnyValue::new("Test".to_string()))
        .expect("name binds");

    let shared = mm.at("Rectangle").expect("registered");
    let wrapped = Area::wrap_inputs(Area::inputs(), (1.23, 4.56)).expect("wrap");
    let out = shared.lock().unwrap().run(wrapped).expect("run");

    let area = *out.at("Area").unwrap().value::<f64>().unwrap();
    assert!((area - 5.6088).abs() < 1e-9, "area was {area}");
    let picture = out.at("Picture").unwrap().value::<String>().unwrap();
    assert_eq!(picture, WIDE_PICTURE);
}

#[test]
fn rectangle_through_the_dispatch_entry_point() {
    let mm = load_geometry();
    let (area,) = mm
        .run_as::<Area>("Rectangle", (1.23, 4.56))
        .expect("dispatch");
    assert!((area - 5.6088).abs() < 1e-9);
}

#[test]
fn tall_rectangles_draw_narrow() {
    let mm = load_geometry();
    let shared = mm.at("Rectangle").expect("registered");
    let wrapped = Area::wrap_inputs(Area::inputs(), (4.56, 1.23)).expect("wrap");
    let out = shared.lock().unwrap().run(wrapped).expect("run");
    let picture = out.at("Picture").unwrap().value::<String>().unwrap();
    let lines: Vec<&str> = picture.lines().collect();
    // name line + 10 rows of width 5
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[1], "*****");
    assert_eq!(lines[2], "*   *");
    assert_eq!(lines[10], "*****");
}

#[test]
fn name_defaults_to_the_empty_string() {
    let mm = load_geometry();
    let shared = mm.at("Rectangle").expect("registered");
    let wrapped = Area::wrap_inputs(Area::inputs(), (2.0, 2.0)).expect("wrap");
    let out = shared.lock().unwrap().run(wrapped).expect("run");
    let picture = out.at("Picture").unwrap().value::<String>().unwrap();
    assert!(picture.starts_with(" :\n"), "unnamed rectangle: {picture}");
}

#[test]
fn metadata_is_visible_on_the_instance() {
    let mm = load_geometry();
    let shared = mm.at("Rectangle").expect("registered");
    let guard = shared.lock().unwrap();
    assert_eq!(
        guard.description().expect("description set"),
        "Computes the area of a rectangle"
    );
    assert_eq!(
        guard.citations().expect("citations available"),
        ["Euclid. The Elements. 300 BCE".to_string()]
    );
    assert!(guard.satisfies(Area::type_key()));
}
