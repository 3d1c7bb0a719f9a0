use discharge_core::PatientCandidate;
use discharge_fhir::{
    default_abha_address, normalize_abha_addresses, normalize_abha_value, AbhaOption,
    ExternalIdentity,
};
use serde_json::json;

fn option(value: &str, label: &str, primary: bool) -> AbhaOption {
    AbhaOption {
        value: value.to_string(),
        label: label.to_string(),
        primary,
    }
}

#[test]
fn primary_first_then_lexicographic() {
    let record = json!({
        "attributes": {
            "abhaAddresses": [
                { "address": "a@b", "isPrimary": false },
                "c@d",
                { "address": "e@f", "isPrimary": true }
            ]
        }
    });

    let options = normalize_abha_value(&record);
    assert_eq!(
        options,
        vec![
            option("e@f", "e@f (primary)", true),
            option("a@b", "a@b", false),
            option("c@d", "c@d", false),
        ]
    );
    assert_eq!(default_abha_address(&options).map(|o| o.value.as_str()), Some("e@f"));
}

#[test]
fn nested_location_is_preferred_over_flat() {
    let record = json!({
        "attributes": { "abhaAddresses": ["nested@abdm"] },
        "abhaAddresses": ["flat@abdm"]
    });
    assert_eq!(
        normalize_abha_value(&record),
        vec![option("nested@abdm", "nested@abdm", false)]
    );

    let flat_only = json!({ "abhaAddresses": ["flat@abdm"] });
    assert_eq!(
        normalize_abha_value(&flat_only),
        vec![option("flat@abdm", "flat@abdm", false)]
    );
}

#[test]
fn unusable_entries_are_dropped() {
    let record = json!({
        "abhaAddresses": [null, 42, true, "", "   ", {}, ["x@y"], "ok@abdm"]
    });
    assert_eq!(
        normalize_abha_value(&record),
        vec![option("ok@abdm", "ok@abdm", false)]
    );
    assert!(normalize_abha_value(&json!({ "name": "no addresses" })).is_empty());
}

#[test]
fn object_without_address_falls_back_to_json_text() {
    let entry = json!({ "handle": "odd@abdm", "isPrimary": true });
    let identity = ExternalIdentity::from_value(&entry).unwrap();

    assert_eq!(
        identity,
        ExternalIdentity::Opaque {
            text: r#"{"handle":"odd@abdm","isPrimary":true}"#.to_string(),
            primary: true,
        }
    );
    let option = identity.to_option();
    assert_eq!(option.value, option.label);
    assert!(option.primary);
}

#[test]
fn typed_candidate_uses_the_same_rules() {
    let candidate: PatientCandidate = serde_json::from_value(json!({
        "name": "Asha Verma",
        "abhaAddresses": ["z@abdm", { "address": "m@abdm", "primary": true }, "b@abdm"]
    }))
    .unwrap();

    let values: Vec<String> = normalize_abha_addresses(&candidate)
        .into_iter()
        .map(|option| option.value)
        .collect();
    assert_eq!(values, ["m@abdm", "b@abdm", "z@abdm"]);
}
