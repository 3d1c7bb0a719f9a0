//! One constructor per record kind.
//!
//! Builders are pure: identities are minted by the assembler and the build
//! timestamp arrives through [`BuildContext`], so nothing here reads a clock
//! or a random source.

use discharge_core::{AdministrativeGender, Clinician, MedicationLine, PatientCandidate};

use crate::ids::Token;
use crate::model::{
    Address, Attachment, Binary, CarePlan, CarePlanActivity, CarePlanDetail, CodeableConcept,
    Composition, ContactPoint, ContactSystem, Dosage, DocumentContent, DocumentReference,
    Encounter, HumanName, Identifier, MedicationRequest, Meta, Patient, Period, Practitioner,
    Qualification, Reference, Section, Timing, TimingRepeat,
};
use crate::narrative::Narrative;
use crate::payload::EncodedPayload;
use crate::time::{to_canonical_date, BuildTimestamp};
use crate::vocab::{self, profile_url};

/// Label used when a medication line is left blank.
pub const MEDICATION_FALLBACK: &str = "Medication";
/// Standard instruction attached to every order.
pub const DOSAGE_TEXT: &str = "1 tablet once a day";
pub const COMPOSITION_TITLE: &str = "Discharge Summary";
pub const CARE_PLAN_TITLE: &str = "Care Plan";

/// Values shared by every record of one build.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub timestamp: BuildTimestamp,
    pub language: &'a str,
}

impl<'a> BuildContext<'a> {
    pub fn new(timestamp: BuildTimestamp, language: &'a str) -> Self {
        Self {
            timestamp,
            language,
        }
    }

    fn meta(&self, profile: &str) -> Meta {
        Meta {
            version_id: None,
            last_updated: self.timestamp,
            profile: vec![profile_url(profile)],
        }
    }

    fn narrative(&self, text: &str) -> Narrative {
        Narrative::generated(self.language, text)
    }
}

/// Subject record; `None` only when no candidate is selected.
pub fn build_patient(
    ctx: &BuildContext<'_>,
    id: Token,
    candidate: Option<&PatientCandidate>,
    abha_address: Option<&str>,
) -> Option<Patient> {
    let candidate = candidate?;

    let gender = non_blank(candidate.gender.as_deref()).map(AdministrativeGender::from_input);
    let birth_date = non_blank(candidate.birth_date.as_deref()).and_then(|raw| {
        let canonical = to_canonical_date(raw);
        if canonical.is_none() {
            tracing::warn!(birth_date = raw, "omitting unparseable birth date");
        }
        canonical
    });

    let identifier = non_blank(candidate.health_id.as_deref())
        .map(|health_id| Identifier {
            kind: Some(vocab::MEDICAL_RECORD_NUMBER.codeable()),
            system: vocab::HEALTH_ID_SYSTEM.to_string(),
            value: health_id.to_string(),
        })
        .into_iter()
        .collect();

    let telecom = contact_points(
        candidate.phone.as_deref(),
        candidate.email.as_deref(),
        abha_address,
    );

    let address = non_blank(candidate.address.as_deref())
        .map(|text| Address {
            text: text.to_string(),
        })
        .into_iter()
        .collect();

    let mut summary = vec![candidate.name.trim().to_string()];
    if let Some(gender) = gender {
        summary.push(gender.as_str().to_string());
    }
    if let Some(birth_date) = &birth_date {
        summary.push(format!("born {birth_date}"));
    }

    Some(Patient {
        id,
        meta: ctx.meta(vocab::PATIENT_PROFILE),
        language: ctx.language.to_string(),
        text: ctx.narrative(&summary.join(", ")),
        identifier,
        name: vec![HumanName {
            text: candidate.name.trim().to_string(),
        }],
        telecom,
        gender,
        birth_date,
        address,
    })
}

/// Author record from the read-only roster.
pub fn build_practitioner(ctx: &BuildContext<'_>, id: Token, clinician: &Clinician) -> Practitioner {
    let qualification = non_blank(Some(clinician.qualification.as_str()))
        .map(|text| Qualification {
            code: CodeableConcept::text(text),
        })
        .into_iter()
        .collect();

    Practitioner {
        id,
        meta: ctx.meta(vocab::PRACTITIONER_PROFILE),
        language: ctx.language.to_string(),
        text: ctx.narrative(&format!(
            "{} ({})",
            clinician.name, clinician.qualification
        )),
        identifier: vec![Identifier {
            kind: Some(vocab::MEDICAL_LICENSE_NUMBER.codeable()),
            system: clinician.registration.system.clone(),
            value: clinician.registration.value.clone(),
        }],
        name: vec![HumanName {
            text: clinician.name.clone(),
        }],
        telecom: contact_points(clinician.phone.as_deref(), clinician.email.as_deref(), None),
        qualification,
    }
}

/// Ambulatory encounter spanning the build instant.
pub fn build_encounter(ctx: &BuildContext<'_>, id: Token, subject: &Reference) -> Encounter {
    Encounter {
        id,
        meta: ctx.meta(vocab::ENCOUNTER_PROFILE),
        language: ctx.language.to_string(),
        text: ctx.narrative(&format!("Ambulatory encounter on {}", ctx.timestamp)),
        status: "finished",
        class: vocab::AMBULATORY.coding(),
        subject: subject.clone(),
        period: Period {
            start: ctx.timestamp,
            end: ctx.timestamp,
        },
    }
}

/// One order per line, in input order. `ids` must be as long as `lines`.
pub fn build_medication_requests(
    ctx: &BuildContext<'_>,
    ids: &[Token],
    lines: &[MedicationLine],
    subject: &Reference,
    requester: &Reference,
) -> Vec<MedicationRequest> {
    ids.iter()
        .zip(lines)
        .map(|(id, line)| {
            let description = match line.description.trim() {
                "" => MEDICATION_FALLBACK,
                text => text,
            };

            MedicationRequest {
                id: id.clone(),
                meta: ctx.meta(vocab::MEDICATION_REQUEST_PROFILE),
                language: ctx.language.to_string(),
                text: ctx.narrative(&format!("{description}, {DOSAGE_TEXT}")),
                status: "active",
                intent: "order",
                medication_codeable_concept: CodeableConcept::text(description),
                subject: subject.clone(),
                authored_on: ctx.timestamp,
                requester: requester.clone(),
                dosage_instruction: vec![standard_dosage()],
            }
        })
        .collect()
}

fn standard_dosage() -> Dosage {
    Dosage {
        text: DOSAGE_TEXT.to_string(),
        timing: Timing {
            repeat: TimingRepeat {
                frequency: 1,
                period: 1,
                period_unit: "d",
            },
        },
        route: vocab::ORAL_ROUTE.codeable(),
        method: vocab::SWALLOW.codeable(),
    }
}

/// Whether the care-plan text yields a plan record at all.
pub fn has_care_plan(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Plan record; `None` for blank text.
pub fn build_care_plan(
    ctx: &BuildContext<'_>,
    id: Token,
    text: &str,
    subject: &Reference,
    author: &Reference,
) -> Option<CarePlan> {
    if !has_care_plan(text) {
        return None;
    }

    Some(CarePlan {
        id,
        meta: ctx.meta(vocab::CARE_PLAN_PROFILE),
        language: ctx.language.to_string(),
        text: ctx.narrative(text),
        status: "active",
        intent: "plan",
        title: CARE_PLAN_TITLE.to_string(),
        subject: subject.clone(),
        created: ctx.timestamp,
        author: author.clone(),
        activity: vec![CarePlanActivity {
            detail: CarePlanDetail {
                status: "in-progress",
                description: text.to_string(),
            },
        }],
    })
}

/// Reference-document pointing at the payload's `Binary` by `urn:uuid`.
pub fn build_document_reference(
    ctx: &BuildContext<'_>,
    id: Token,
    payload: &EncodedPayload,
    binary: &Reference,
    subject: &Reference,
    author: &Reference,
) -> DocumentReference {
    DocumentReference {
        id,
        meta: ctx.meta(vocab::DOCUMENT_REFERENCE_PROFILE),
        language: ctx.language.to_string(),
        text: ctx.narrative(&format!("Attached document: {}", payload.title)),
        status: "current",
        doc_status: "final",
        kind: vocab::RECORD_ARTIFACT.codeable(),
        subject: subject.clone(),
        date: ctx.timestamp,
        author: vec![author.clone()],
        content: vec![DocumentContent {
            attachment: Attachment {
                content_type: payload.media_type.as_str().to_string(),
                title: Some(payload.title.clone()),
                url: binary.reference.clone(),
                creation: ctx.timestamp,
            },
        }],
    }
}

pub fn build_binary(ctx: &BuildContext<'_>, id: Token, payload: &EncodedPayload) -> Binary {
    Binary {
        id,
        meta: ctx.meta(vocab::BINARY_PROFILE),
        language: ctx.language.to_string(),
        content_type: payload.media_type.as_str().to_string(),
        data: payload.data.clone(),
    }
}

/// The summary record heading the bundle.
pub fn build_composition(
    ctx: &BuildContext<'_>,
    id: Token,
    patient_name: &str,
    subject: &Reference,
    encounter: &Reference,
    author: &Reference,
    sections: Vec<Section>,
) -> Composition {
    let mut kind = vocab::DISCHARGE_SUMMARY.codeable();
    kind.text = Some(vocab::DISCHARGE_SUMMARY.display.to_string());

    Composition {
        id,
        meta: ctx.meta(vocab::DISCHARGE_SUMMARY_PROFILE),
        language: ctx.language.to_string(),
        text: ctx.narrative(&format!("Discharge summary for {}", patient_name.trim())),
        status: "final",
        kind,
        subject: subject.clone(),
        encounter: encounter.clone(),
        date: ctx.timestamp,
        author: vec![author.clone()],
        title: COMPOSITION_TITLE.to_string(),
        section: sections,
    }
}

fn contact_points(
    phone: Option<&str>,
    email: Option<&str>,
    url: Option<&str>,
) -> Vec<ContactPoint> {
    [
        (ContactSystem::Phone, phone, Some("mobile")),
        (ContactSystem::Email, email, None),
        (ContactSystem::Url, url, None),
    ]
    .into_iter()
    .filter_map(|(system, value, usage)| {
        non_blank(value).map(|value| ContactPoint {
            system,
            value: value.to_string(),
            usage,
        })
    })
    .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
