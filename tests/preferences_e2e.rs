use prefkit::{
    InMemoryPreferenceStore, Json, PrefError, Preference, PreferenceStore, PreferencesConfig,
    StoredValue, TypedPreferences, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Theme {
    Light,
    Dark,
    Custom { accent: String },
}

impl Preference for Theme {}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct Profile {
    name: String,
    age: u8,
    favourites: Vec<String>,
}

impl Preference for Profile {}

fn prefs() -> (Arc<InMemoryPreferenceStore>, TypedPreferences) {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let prefs = TypedPreferences::new(store.clone());
    (store, prefs)
}

#[test]
fn every_primitive_round_trips() {
    let (_, prefs) = prefs();

    prefs.put("bool", &true).unwrap();
    prefs.put("float", &2.5f32).unwrap();
    prefs.put("int", &i32::MIN).unwrap();
    prefs.put("long", &i64::MAX).unwrap();
    prefs.put("double", &std::f64::consts::PI).unwrap();
    prefs.put("string", &"héllo".to_string()).unwrap();

    assert!(prefs.get("bool", false).unwrap());
    assert!((prefs.get("float", 0.0f32).unwrap() - 2.5).abs() < f32::EPSILON);
    assert_eq!(prefs.get("int", 0i32).unwrap(), i32::MIN);
    assert_eq!(prefs.get("long", 0i64).unwrap(), i64::MAX);
    assert_eq!(prefs.get("double", 0.0f64).unwrap().to_bits(), std::f64::consts::PI.to_bits());
    assert_eq!(prefs.get("string", String::new()).unwrap(), "héllo");
    assert_eq!(prefs.size().unwrap(), 6);
}

#[test]
fn absent_keys_yield_defaults() {
    let (_, prefs) = prefs();

    assert!(prefs.get("b", true).unwrap());
    assert_eq!(prefs.get("i", 42i32).unwrap(), 42);
    assert_eq!(prefs.get("d", -1.5f64).unwrap().to_bits(), (-1.5f64).to_bits());
    assert_eq!(prefs.get("s", "fallback".to_string()).unwrap(), "fallback");
    assert_eq!(prefs.get("theme", Theme::Light).unwrap(), Theme::Light);
    assert_eq!(prefs.get("profile", Profile::default()).unwrap(), Profile::default());
    assert_eq!(prefs.size().unwrap(), 0);
}

#[test]
fn double_is_stored_as_decimal_string() {
    let (store, prefs) = prefs();
    prefs.put("ratio", &0.75f64).unwrap();
    assert_eq!(
        store.get_value("ratio").unwrap(),
        Some(StoredValue::String("0.75".to_string()))
    );

    // A double written by hand is read back the same way.
    store.put_string("ratio", "1e3").unwrap();
    assert_eq!(prefs.get("ratio", 0.0f64).unwrap().to_bits(), 1000.0f64.to_bits());
}

#[test]
fn user_types_round_trip_through_json() {
    let (store, prefs) = prefs();
    let profile = Profile {
        name: "ada".to_string(),
        age: 36,
        favourites: vec!["engines".to_string(), "poetry".to_string()],
    };
    let theme = Theme::Custom {
        accent: "#ff8800".to_string(),
    };

    prefs.put("profile", &profile).unwrap();
    prefs.put("theme", &theme).unwrap();

    assert_eq!(prefs.get("profile", Profile::default()).unwrap(), profile);
    assert_eq!(prefs.get("theme", Theme::Dark).unwrap(), theme);
    assert!(matches!(
        store.get_value("profile").unwrap(),
        Some(StoredValue::String(_))
    ));
}

#[test]
fn collections_round_trip() {
    let (_, prefs) = prefs();

    let tags: HashSet<String> = ["a", "b", "c"].iter().map(ToString::to_string).collect();
    let mut weights = BTreeMap::new();
    weights.insert("x".to_string(), 1.5f64);
    weights.insert("y".to_string(), -0.25f64);

    prefs.put("tags", &tags).unwrap();
    prefs.put("weights", &weights).unwrap();
    prefs.put("matrix", &vec![vec![1u8, 2], vec![3]]).unwrap();

    assert_eq!(prefs.get("tags", HashSet::<String>::new()).unwrap(), tags);
    assert_eq!(prefs.get("weights", BTreeMap::<String, f64>::new()).unwrap(), weights);
    assert_eq!(
        prefs.get("matrix", Vec::<Vec<u8>>::new()).unwrap(),
        vec![vec![1, 2], vec![3]]
    );
}

#[test]
fn json_wrapper_stores_foreign_types() {
    let (_, prefs) = prefs();
    let window = Json(Some((1920u32, 1080u32)));
    prefs.put("window", &window).unwrap();

    let got = prefs.get("window", Json(None::<(u32, u32)>)).unwrap();
    assert_eq!(*got, Some((1920, 1080)));
}

#[test]
fn overwriting_with_another_type_reports_mismatch() {
    let (_, prefs) = prefs();
    prefs.put("slot", &"text".to_string()).unwrap();

    let err = prefs.get("slot", 0i32).unwrap_err();
    assert!(err.is_storage(), "unexpected error: {err}");

    prefs.put("slot", &7i32).unwrap();
    assert_eq!(prefs.get("slot", 0i32).unwrap(), 7);
}

#[test]
fn corrupted_json_is_surfaced() {
    let (store, prefs) = prefs();
    store.put_string("profile", "{\"name\":").unwrap();

    let err = prefs.get("profile", Profile::default()).unwrap_err();
    assert!(matches!(err, PrefError::Codec(_)));
}

#[test]
fn contains_remove_and_clear() {
    let (store, prefs) = prefs();
    prefs.put("a", &1i32).unwrap();
    prefs.put("b", &Theme::Dark).unwrap();

    assert!(prefs.contains("a").unwrap());
    assert!(prefs.contains("b").unwrap());
    assert!(!prefs.contains("c").unwrap());

    prefs.remove("a").unwrap();
    assert!(!prefs.contains("a").unwrap());
    assert_eq!(prefs.size().unwrap(), 1);

    // Removing twice is harmless.
    prefs.remove("a").unwrap();

    prefs.clear().unwrap();
    assert_eq!(prefs.size().unwrap(), 0);
    assert!(store.is_empty().unwrap());
}

#[test]
fn store_is_shared_with_direct_access() {
    let (store, prefs) = prefs();
    store.put_long("direct", 99).unwrap();
    assert_eq!(prefs.get("direct", 0i64).unwrap(), 99);

    prefs.put("typed", &false).unwrap();
    assert!(!prefs.store().get_bool("typed", true).unwrap());
}

#[test]
fn key_validation() {
    let prefs = TypedPreferences::builder(Arc::new(InMemoryPreferenceStore::new()))
        .config(PreferencesConfig {
            max_key_length: Some(8),
            ..PreferencesConfig::default()
        })
        .build();

    assert!(matches!(
        prefs.put("", &1i32),
        Err(PrefError::Validation(ValidationError::EmptyKey))
    ));
    assert!(matches!(
        prefs.get("much_too_long", 1i32),
        Err(PrefError::Validation(ValidationError::KeyTooLong { max_length: 8, .. }))
    ));
    assert!(prefs.put("short", &1i32).is_ok());
}
