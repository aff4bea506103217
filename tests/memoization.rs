mod common;

use std::sync::Arc;

use common::{Area, FreeArea, PointlessOption, Prism, SketchyArea, TaggedTally, Tally};
use plugboard::field::FieldMap;
use plugboard::manager::ModuleManager;
use plugboard::property::PropertyType;
use plugboard::value::AnyValue;

fn tally_manager() -> ModuleManager {
    let mut mm = ModuleManager::new();
    mm.add_module("Tally", Arc::new(Tally)).expect("register");
    mm.change_input("Tally", "Option 1", AnyValue::new(1i64))
        .expect("bind option");
    mm
}

#[test]
fn a_run_is_cached_and_reset_clears_it() {
    let mm = tally_manager();
    let shared = mm.at("Tally").expect("registered");

    assert!(!shared.lock().unwrap().is_cached(&FieldMap::new()));

    let (value,) = mm.run_as::<PointlessOption>("Tally", ()).expect("run");
    assert_eq!(value, 2);
    assert!(shared.lock().unwrap().is_cached(&FieldMap::new()));

    shared.lock().unwrap().reset_cache().expect("reset");
    assert!(!shared.lock().unwrap().is_cached(&FieldMap::new()));

    // recomputation works and repopulates the cache
    let (value,) = mm.run_as::<PointlessOption>("Tally", ()).expect("re-run");
    assert_eq!(value, 2);
    assert!(shared.lock().unwrap().is_cached(&FieldMap::new()));
}

#[test]
fn a_cache_hit_returns_the_stored_results() {
    let mm = tally_manager();
    let (first,) = mm.run_as::<PointlessOption>("Tally", ()).expect("cold run");
    let (second,) = mm.run_as::<PointlessOption>("Tally", ()).expect("warm run");
    assert_eq!(first, second);

    let shared = mm.at("Tally").expect("registered");
    let guard = shared.lock().unwrap();
    assert_eq!(guard.calls().len(), 2, "both calls are profiled");
    assert!(
        guard.calls()[1].submodules.is_empty(),
        "a memoized call runs no submodules"
    );
}

#[test]
fn opting_out_of_memoization_suppresses_storage() {
    let mut mm = ModuleManager::new();
    mm.add_module("Sketchy", Arc::new(SketchyArea)).expect("register");

    let (area,) = mm.run_as::<Area>("Sketchy", (2.0, 3.0)).expect("run");
    assert_eq!(area, 6.0);

    let shared = mm.at("Sketchy").expect("registered");
    let guard = shared.lock().unwrap();
    assert!(!guard.is_memoizable());
    let wrapped = Area::wrap_inputs(Area::inputs(), (2.0, 3.0)).expect("wrap");
    assert!(!guard.is_cached(&wrapped), "nothing was stored");
}

#[test]
fn memoizability_follows_the_bound_submodules() {
    let mut mm = ModuleManager::new();
    mm.add_module("Prism", Arc::new(Prism)).expect("register");
    mm.add_module("Sketchy", Arc::new(SketchyArea)).expect("register");
    mm.add_module("Free", Arc::new(FreeArea)).expect("register");

    mm.change_submod("Prism", "area", "Sketchy").expect("wire sketchy");
    {
        let shared = mm.at("Prism").expect("registered");
        assert!(
            !shared.lock().unwrap().is_memoizable(),
            "a non-memoizable submodule poisons the parent"
        );
    }

    mm.change_submod("Prism", "area", "Free").expect("rewire free");
    {
        let shared = mm.at("Prism").expect("registered");
        assert!(
            shared.lock().unwrap().is_memoizable(),
            "rebinding to a memoizable submodule restores it"
        );
    }
}

#[test]
fn transparent_inputs_never_reach_the_digest() {
    let mut mm = ModuleManager::new();
    mm.add_module("Tagged", Arc::new(TaggedTally)).expect("register");
    mm.change_input("Tagged", "Option 1", AnyValue::new(1i64))
        .expect("bind option");

    let shared = mm.at("Tagged").expect("registered");
    let first = shared.lock().unwrap().digest(&FieldMap::new()).expect("digest");

    mm.change_input("Tagged", "Label", AnyValue::new("renamed".to_string()))
        .expect("bind label");
    let relabeled = shared.lock().unwrap().digest(&FieldMap::new()).expect("digest");
    assert_eq!(first, relabeled, "a transparent value must not shift the digest");

    mm.change_input("Tagged", "Option 1", AnyValue::new(2i64))
        .expect("rebind option");
    let shifted = shared.lock().unwrap().digest(&FieldMap::new()).expect("digest");
    assert_ne!(first, shifted, "an opaque value must shift the digest");
}

#[test]
fn copies_share_their_cache_identity() {
    let mut mm = tally_manager();
    mm.copy_module("Tally", "Understudy").expect("copy");

    {
        let original = mm.at("Tally").expect("original");
        let copy = mm.at("Understudy").expect("copy");
        assert!(
            *original.lock().unwrap() == *copy.lock().unwrap(),
            "a fresh copy is value-equal to its original"
        );
    }

    mm.run_as::<PointlessOption>("Understudy", ()).expect("run the copy");

    let original = mm.at("Tally").expect("original");
    assert!(
        original.lock().unwrap().is_cached(&FieldMap::new()),
        "memoization hits transfer between copies"
    );
}
