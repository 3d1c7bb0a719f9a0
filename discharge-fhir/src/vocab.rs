//! Fixed terminology bindings and profile URLs.

use discharge_core::SectionKind;

use crate::model::{CodeableConcept, Coding};

pub const SNOMED_CT: &str = "http://snomed.info/sct";
pub const V2_IDENTIFIER_TYPE: &str = "http://terminology.hl7.org/CodeSystem/v2-0203";
pub const V3_ACT_CODE: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

pub const BUNDLE_IDENTIFIER_SYSTEM: &str = "urn:ietf:rfc:3986";
pub const HEALTH_ID_SYSTEM: &str = "https://healthid.ndhm.gov.in";

const PROFILE_BASE: &str = "https://nrces.in/ndhm/fhir/r4/StructureDefinition/";

pub const DOCUMENT_BUNDLE_PROFILE: &str = "DocumentBundle";
pub const DISCHARGE_SUMMARY_PROFILE: &str = "DischargeSummaryRecord";
pub const PATIENT_PROFILE: &str = "Patient";
pub const PRACTITIONER_PROFILE: &str = "Practitioner";
pub const ENCOUNTER_PROFILE: &str = "Encounter";
pub const MEDICATION_REQUEST_PROFILE: &str = "MedicationRequest";
pub const CARE_PLAN_PROFILE: &str = "CarePlan";
pub const DOCUMENT_REFERENCE_PROFILE: &str = "DocumentReference";
pub const BINARY_PROFILE: &str = "Binary";

pub fn profile_url(name: &str) -> String {
    format!("{PROFILE_BASE}{name}")
}

/// A (system, code, display) triple used verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concept {
    pub system: &'static str,
    pub code: &'static str,
    pub display: &'static str,
}

impl Concept {
    pub const fn new(system: &'static str, code: &'static str, display: &'static str) -> Self {
        Self {
            system,
            code,
            display,
        }
    }

    pub fn coding(&self) -> Coding {
        Coding {
            system: self.system.to_string(),
            code: self.code.to_string(),
            display: self.display.to_string(),
        }
    }

    pub fn codeable(&self) -> CodeableConcept {
        CodeableConcept {
            coding: vec![self.coding()],
            text: None,
        }
    }
}

pub const DISCHARGE_SUMMARY: Concept = Concept::new(SNOMED_CT, "373942005", "Discharge summary");
pub const RECORD_ARTIFACT: Concept = Concept::new(SNOMED_CT, "419891008", "Record artifact");
pub const AMBULATORY: Concept = Concept::new(V3_ACT_CODE, "AMB", "ambulatory");
pub const ORAL_ROUTE: Concept = Concept::new(SNOMED_CT, "26643006", "Oral Route");
pub const SWALLOW: Concept = Concept::new(SNOMED_CT, "421521009", "Swallow");
pub const MEDICAL_RECORD_NUMBER: Concept =
    Concept::new(V2_IDENTIFIER_TYPE, "MR", "Medical record number");
pub const MEDICAL_LICENSE_NUMBER: Concept =
    Concept::new(V2_IDENTIFIER_TYPE, "MD", "Medical License number");

pub fn section_concept(kind: SectionKind) -> Concept {
    match kind {
        SectionKind::ChiefComplaints => {
            Concept::new(SNOMED_CT, "422843007", "Chief complaint section")
        }
        SectionKind::PhysicalExamination => {
            Concept::new(SNOMED_CT, "425044008", "Physical exam section")
        }
        SectionKind::Allergies => Concept::new(SNOMED_CT, "722446000", "Allergy record"),
        SectionKind::MedicalHistory => {
            Concept::new(SNOMED_CT, "1003642006", "Past medical history section")
        }
        SectionKind::FamilyHistory => {
            Concept::new(SNOMED_CT, "422432008", "Family history section")
        }
        SectionKind::Investigations => {
            Concept::new(SNOMED_CT, "721981007", "Diagnostic studies report")
        }
        SectionKind::Procedures => {
            Concept::new(SNOMED_CT, "1003640003", "History of past procedure section")
        }
        SectionKind::Medications => {
            Concept::new(SNOMED_CT, "1003606003", "Medication history section")
        }
        SectionKind::CarePlan => Concept::new(SNOMED_CT, "734163000", "Care plan"),
        SectionKind::DocumentReference => DISCHARGE_SUMMARY,
    }
}
