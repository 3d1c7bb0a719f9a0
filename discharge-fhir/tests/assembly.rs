use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use discharge_core::{
    DischargeError, DischargeInput, MedicationLine, PatientCandidate, SectionTexts, SummaryConfig,
    Upload, UploadData,
};
use discharge_fhir::payload::{PLACEHOLDER_DATA, PLACEHOLDER_MEDIA_TYPE};
use discharge_fhir::{
    build_discharge_bundle, build_discharge_bundle_str, build_discharge_bundle_value,
    bundle_to_value, now_with_offset, BundleAssembler, IdSource, RandomIds, Token,
};
use serde_json::{json, Value};

fn candidate() -> PatientCandidate {
    PatientCandidate {
        name: "Ravi Kumar".to_string(),
        gender: Some("M".to_string()),
        birth_date: Some("12-11-1975".to_string()),
        phone: Some("+91-9000000002".to_string()),
        ..PatientCandidate::default()
    }
}

fn input() -> DischargeInput {
    DischargeInput {
        patient: Some(candidate()),
        sections: SectionTexts {
            chief_complaints: "Chest pain".to_string(),
            care_plan: "Cardiology follow-up".to_string(),
            ..SectionTexts::default()
        },
        medications: vec![
            MedicationLine::new("Aspirin 75 mg"),
            MedicationLine::new("Atorvastatin 20 mg"),
        ],
        ..DischargeInput::default()
    }
}

fn build(input: &DischargeInput) -> Value {
    let bundle = build_discharge_bundle(input, &SummaryConfig::default()).expect("bundle");
    bundle_to_value(&bundle).expect("json")
}

fn resources(bundle: &Value) -> Vec<&Value> {
    bundle["entry"]
        .as_array()
        .expect("entries")
        .iter()
        .map(|entry| &entry["resource"])
        .collect()
}

fn resource_types(bundle: &Value) -> Vec<&str> {
    resources(bundle)
        .into_iter()
        .map(|resource| resource["resourceType"].as_str().unwrap())
        .collect()
}

fn find<'a>(bundle: &'a Value, resource_type: &str) -> Vec<&'a Value> {
    resources(bundle)
        .into_iter()
        .filter(|resource| resource["resourceType"] == resource_type)
        .collect()
}

fn section<'a>(bundle: &'a Value, title: &str) -> &'a Value {
    find(bundle, "Composition")[0]["section"]
        .as_array()
        .unwrap()
        .iter()
        .find(|section| section["title"] == title)
        .unwrap_or_else(|| panic!("missing section {title}"))
}

fn collect_references<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("reference" | "url", Value::String(text)) => out.push(text),
                    _ => collect_references(child, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_references(item, out)),
        _ => {}
    }
}

#[test]
fn every_internal_reference_resolves() {
    let bundle = build(&input());

    let full_urls: HashSet<&str> = bundle["entry"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["fullUrl"].as_str().unwrap())
        .collect();

    let mut references = Vec::new();
    for resource in resources(&bundle) {
        collect_references(resource, &mut references);
    }

    assert!(!references.is_empty());
    for reference in references {
        assert!(full_urls.contains(reference), "dangling reference {reference}");
    }
}

#[test]
fn entries_follow_fixed_order_with_distinct_ids() {
    let bundle = build(&input());

    assert_eq!(
        resource_types(&bundle),
        [
            "Composition",
            "Patient",
            "Practitioner",
            "Encounter",
            "MedicationRequest",
            "MedicationRequest",
            "CarePlan",
            "DocumentReference",
            "Binary",
        ]
    );

    let orders = find(&bundle, "MedicationRequest");
    assert_eq!(orders[0]["medicationCodeableConcept"]["text"], "Aspirin 75 mg");
    assert_eq!(orders[1]["medicationCodeableConcept"]["text"], "Atorvastatin 20 mg");

    let mut ids: HashSet<&str> = resources(&bundle)
        .into_iter()
        .map(|resource| resource["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 9);

    for entry in bundle["entry"].as_array().unwrap() {
        assert_eq!(
            entry["fullUrl"].as_str().unwrap(),
            format!("urn:uuid:{}", entry["resource"]["id"].as_str().unwrap())
        );
    }

    assert!(ids.insert(bundle["id"].as_str().unwrap()));
    let identifier = bundle["identifier"]["value"].as_str().unwrap();
    assert_eq!(bundle["identifier"]["system"], "urn:ietf:rfc:3986");
    assert!(identifier.starts_with("urn:uuid:"));
    assert!(ids.insert(&identifier["urn:uuid:".len()..]));
    assert_eq!(bundle["type"], "document");
}

#[test]
fn timestamps_are_shared_across_records() {
    let bundle = build(&input());
    let timestamp = bundle["timestamp"].as_str().unwrap();

    assert_eq!(bundle["meta"]["lastUpdated"], timestamp);
    let encounter = find(&bundle, "Encounter")[0];
    assert_eq!(encounter["period"]["start"], timestamp);
    assert_eq!(encounter["period"]["end"], timestamp);
    assert_eq!(encounter["class"]["code"], "AMB");
    for order in find(&bundle, "MedicationRequest") {
        assert_eq!(order["authoredOn"], timestamp);
    }
    assert_eq!(find(&bundle, "Composition")[0]["date"], timestamp);
}

#[test]
fn every_section_has_exactly_one_form() {
    let bundle = build(&input());
    let sections = find(&bundle, "Composition")[0]["section"].as_array().unwrap().clone();
    assert_eq!(sections.len(), 10);

    for section in &sections {
        let has_text = section.get("text").is_some();
        let has_entry = section.get("entry").is_some();
        assert!(has_text ^ has_entry, "section {}", section["title"]);

        let linkable = matches!(
            section["title"].as_str().unwrap(),
            "Medications" | "Care plan" | "Document reference"
        );
        if !linkable {
            assert!(has_text);
        }
    }

    assert_eq!(section(&bundle, "Medications")["entry"].as_array().unwrap().len(), 2);
    assert_eq!(section(&bundle, "Care plan")["entry"][0]["type"], "CarePlan");
    assert_eq!(
        section(&bundle, "Document reference")["entry"][0]["type"],
        "DocumentReference"
    );
    assert!(section(&bundle, "Chief complaints")["text"]["div"]
        .as_str()
        .unwrap()
        .contains(">Chest pain</p>"));
}

#[test]
fn section_codes_match_vocabulary() {
    let bundle = build(&input());
    let coding = &section(&bundle, "Medications")["code"]["coding"][0];
    assert_eq!(
        coding,
        &json!({
            "system": "http://snomed.info/sct",
            "code": "1003606003",
            "display": "Medication history section"
        })
    );
}

#[test]
fn blank_care_plan_yields_no_plan_record() {
    for text in ["", "   \n\t"] {
        let mut input = input();
        input.sections.care_plan = text.to_string();
        let bundle = build(&input);

        assert!(find(&bundle, "CarePlan").is_empty());
        let care_plan = section(&bundle, "Care plan");
        assert!(care_plan.get("entry").is_none());
        assert!(care_plan["text"]["div"].as_str().unwrap().contains(">No data</p>"));
    }
}

#[test]
fn no_medications_means_narrative_medications_section() {
    let mut input = input();
    input.medications.clear();
    input.sections.medications = "Continue home medicines".to_string();
    let bundle = build(&input);

    assert!(find(&bundle, "MedicationRequest").is_empty());
    let medications = section(&bundle, "Medications");
    assert!(medications.get("entry").is_none());
    assert!(medications["text"]["div"]
        .as_str()
        .unwrap()
        .contains(">Continue home medicines</p>"));
}

#[test]
fn blank_medication_uses_fallback_label() {
    let mut input = input();
    input.medications = vec![MedicationLine::new("")];
    let bundle = build(&input);

    let order = find(&bundle, "MedicationRequest")[0];
    assert_eq!(order["medicationCodeableConcept"]["text"], "Medication");
    let dosage = &order["dosageInstruction"][0];
    assert_eq!(dosage["route"]["coding"][0]["code"], "26643006");
    assert_eq!(dosage["method"]["coding"][0]["code"], "421521009");
    assert_eq!(dosage["timing"]["repeat"]["frequency"], 1);
}

#[test]
fn absent_optional_fields_are_omitted() {
    let mut input = input();
    input.patient = Some(PatientCandidate {
        name: "Meera Nair".to_string(),
        birth_date: Some("31-02-1980".to_string()),
        ..PatientCandidate::default()
    });
    let bundle = build(&input);
    let patient = find(&bundle, "Patient")[0];

    for field in ["address", "identifier", "birthDate", "gender", "telecom"] {
        assert!(patient.get(field).is_none(), "{field} should be absent");
    }
    assert_eq!(patient["language"], "en-IN");
}

#[test]
fn present_optional_fields_are_emitted() {
    let mut input = input();
    if let Some(patient) = input.patient.as_mut() {
        patient.address = Some("12 MG Road, Bengaluru".to_string());
        patient.health_id = Some("91-0000-1111-2222".to_string());
    }
    input.abha_address = Some("ravi@abdm".to_string());
    let bundle = build(&input);
    let patient = find(&bundle, "Patient")[0];

    assert_eq!(patient["address"][0]["text"], "12 MG Road, Bengaluru");
    assert_eq!(patient["identifier"][0]["value"], "91-0000-1111-2222");
    assert_eq!(patient["birthDate"], "1975-11-12");
    assert_eq!(patient["gender"], "male");
    assert!(patient["telecom"]
        .as_array()
        .unwrap()
        .contains(&json!({ "system": "url", "value": "ravi@abdm" })));
}

#[test]
fn missing_placeholder_is_used_without_upload() {
    let bundle = build(&input());
    let binary = find(&bundle, "Binary")[0];

    assert_eq!(binary["contentType"], PLACEHOLDER_MEDIA_TYPE.as_str());
    assert_eq!(binary["data"], PLACEHOLDER_DATA);

    let document = find(&bundle, "DocumentReference")[0];
    assert_eq!(
        document["content"][0]["attachment"]["url"],
        format!("urn:uuid:{}", binary["id"].as_str().unwrap())
    );
}

#[test]
fn uploaded_file_replaces_placeholder() {
    let mut input = input();
    input.upload = Some(
        Upload::new(
            "application/pdf",
            Some("lab-report.pdf".to_string()),
            UploadData::DataUrl("data:application/pdf;base64,JVBERi0xLjcK".to_string()),
        )
        .unwrap(),
    );
    let bundle = build(&input);

    let binary = find(&bundle, "Binary")[0];
    assert_eq!(binary["data"], "JVBERi0xLjcK");
    let attachment = &find(&bundle, "DocumentReference")[0]["content"][0]["attachment"];
    assert_eq!(attachment["title"], "lab-report.pdf");
    assert_eq!(attachment["contentType"], "application/pdf");
}

#[test]
fn disallowed_upload_is_rejected_at_the_boundary() {
    let err = Upload::new("image/png", None, UploadData::Bytes(vec![1, 2, 3])).unwrap_err();
    assert!(matches!(err, DischargeError::UnsupportedMediaType(_)));

    let raw = json!({
        "patient": { "name": "Ravi Kumar" },
        "upload": { "mediaType": "image/png", "data": { "bytes": [1, 2, 3] } }
    });
    let err = build_discharge_bundle_str(&raw.to_string(), &SummaryConfig::default()).unwrap_err();
    assert!(matches!(err, DischargeError::UnsupportedMediaType(kind) if kind == "image/png"));

    let err = build_discharge_bundle_value(&raw, &SummaryConfig::default()).unwrap_err();
    assert!(matches!(err, DischargeError::UnsupportedMediaType(_)));
}

#[test]
fn allowed_upload_type_passes_json_entry_point() {
    let raw = json!({
        "patient": { "name": "Ravi Kumar" },
        "upload": {
            "mediaType": "image/jpeg",
            "fileName": "scan.jpg",
            "data": { "bytes": [255, 216, 255] }
        }
    });
    let bundle = build_discharge_bundle_value(&raw, &SummaryConfig::default()).unwrap();
    let bundle = bundle_to_value(&bundle).unwrap();

    let binary = find(&bundle, "Binary")[0];
    assert_eq!(binary["contentType"], "image/jpeg");
    assert_eq!(binary["data"], "/9j/");
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = build_discharge_bundle_str("{ not json", &SummaryConfig::default()).unwrap_err();
    assert!(matches!(err, DischargeError::Parse(_)));
}

#[test]
fn missing_patient_aborts_the_build() {
    let mut input = input();
    input.patient = None;
    let err = build_discharge_bundle(&input, &SummaryConfig::default()).unwrap_err();
    assert!(matches!(err, DischargeError::MissingPatient));
}

/// Counts minted identities through a shared cell.
struct CountingIds(Rc<Cell<usize>>);

impl IdSource for CountingIds {
    fn next_id(&mut self) -> Token {
        self.0.set(self.0.get() + 1);
        RandomIds.next_id()
    }
}

#[test]
fn missing_patient_mints_nothing() {
    let mut input = input();
    input.patient = None;
    let config = SummaryConfig::default();
    let minted = Rc::new(Cell::new(0));

    let mut assembler = BundleAssembler::with_id_source(&config, CountingIds(Rc::clone(&minted)));
    assert!(matches!(
        assembler.assemble(&input),
        Err(DischargeError::MissingPatient)
    ));
    assert!(matches!(
        assembler.assemble_at(&input, now_with_offset()),
        Err(DischargeError::MissingPatient)
    ));
    assert_eq!(minted.get(), 0);
}

#[test]
fn successful_build_mints_one_id_per_record_plus_two() {
    let config = SummaryConfig::default();
    let minted = Rc::new(Cell::new(0));

    let bundle = BundleAssembler::with_id_source(&config, CountingIds(Rc::clone(&minted)))
        .assemble(&input())
        .unwrap();
    assert_eq!(minted.get(), bundle.entry.len() + 2);
}

#[test]
fn blank_selected_address_falls_back_to_default() {
    let mut input = input();
    if let Some(patient) = input.patient.as_mut() {
        patient.abha_addresses = Some(vec![json!("x@abdm")]);
    }

    for selected in [None, Some(""), Some("  ")] {
        input.abha_address = selected.map(str::to_string);
        let bundle = build(&input);
        let patient = find(&bundle, "Patient")[0];
        assert!(
            patient["telecom"]
                .as_array()
                .unwrap()
                .contains(&json!({ "system": "url", "value": "x@abdm" })),
            "selection {selected:?}"
        );
    }
}

#[test]
fn unknown_clinician_is_reported() {
    let mut input = input();
    input.clinician_id = Some("dr-nobody".to_string());
    let err = build_discharge_bundle(&input, &SummaryConfig::default()).unwrap_err();
    assert!(matches!(err, DischargeError::UnknownClinician(id) if id == "dr-nobody"));
}

#[test]
fn selected_clinician_becomes_author() {
    let mut input = input();
    input.clinician_id = Some("dr-kavya-iyer".to_string());
    let bundle = build(&input);

    let practitioner = find(&bundle, "Practitioner")[0];
    assert_eq!(practitioner["name"][0]["text"], "Dr. Kavya Iyer");
    assert_eq!(practitioner["identifier"][0]["value"], "71-6610-2945-1187");
    assert_eq!(
        find(&bundle, "Composition")[0]["author"][0]["reference"],
        format!("urn:uuid:{}", practitioner["id"].as_str().unwrap())
    );
}

#[test]
fn narratives_share_the_configured_locale() {
    let config = SummaryConfig {
        language: "hi-IN".to_string(),
        ..SummaryConfig::default()
    };
    let bundle = build_discharge_bundle(&input(), &config).unwrap();
    let bundle = bundle_to_value(&bundle).unwrap();

    for resource in resources(&bundle) {
        assert_eq!(resource["language"], "hi-IN");
        if let Some(div) = resource["text"]["div"].as_str() {
            assert!(div.starts_with(
                r#"<div xmlns="http://www.w3.org/1999/xhtml" lang="hi-IN" xml:lang="hi-IN"><p lang="hi-IN" xml:lang="hi-IN">"#
            ));
        }
    }
}
