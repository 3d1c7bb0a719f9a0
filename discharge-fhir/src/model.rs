//! FHIR R4 wire models emitted by the assembler.
//!
//! Only the elements the discharge summary produces are modelled. Optional
//! elements are `Option`/`Vec` and skipped when absent, so a missing source
//! value never shows up as `null` or `""`.

use discharge_core::AdministrativeGender;
use serde::Serialize;

use crate::ids::Token;
use crate::narrative::Narrative;
use crate::time::BuildTimestamp;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: &'static str,
    pub id: Token,
    pub meta: Meta,
    pub identifier: Identifier,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub timestamp: BuildTimestamp,
    pub entry: Vec<BundleEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub full_url: String,
    pub resource: Resource,
}

impl BundleEntry {
    pub fn new(resource: Resource) -> Self {
        Self {
            full_url: resource.id().urn(),
            resource,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Composition(Composition),
    Patient(Patient),
    Practitioner(Practitioner),
    Encounter(Encounter),
    MedicationRequest(MedicationRequest),
    CarePlan(CarePlan),
    DocumentReference(DocumentReference),
    Binary(Binary),
}

impl Resource {
    pub fn id(&self) -> &Token {
        match self {
            Self::Composition(r) => r.id(),
            Self::Patient(r) => r.id(),
            Self::Practitioner(r) => r.id(),
            Self::Encounter(r) => r.id(),
            Self::MedicationRequest(r) => r.id(),
            Self::CarePlan(r) => r.id(),
            Self::DocumentReference(r) => r.id(),
            Self::Binary(r) => r.id(),
        }
    }
}

/// A resource that can be pointed at from inside the bundle.
pub trait FhirResource {
    const TYPE: &'static str;

    fn id(&self) -> &Token;

    fn reference(&self) -> Reference {
        Reference::to(Self::TYPE, self.id())
    }
}

macro_rules! fhir_resource {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl FhirResource for $ty {
                const TYPE: &'static str = stringify!($ty);

                fn id(&self) -> &Token {
                    &self.id
                }
            }
        )+
    };
}

fhir_resource!(
    Composition,
    Patient,
    Practitioner,
    Encounter,
    MedicationRequest,
    CarePlan,
    DocumentReference,
    Binary,
);

// ============================================================================
// Data types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub last_updated: BuildTimestamp,
    pub profile: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CodeableConcept>,
    pub system: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coding {
    pub system: String,
    pub code: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeableConcept {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.into()),
        }
    }
}

/// Typed internal reference, `urn:uuid:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub reference: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

impl Reference {
    pub fn to(resource_type: &str, id: &Token) -> Self {
        Self {
            reference: id.urn(),
            resource_type: resource_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HumanName {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactSystem {
    Phone,
    Email,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactPoint {
    pub system: ContactSystem,
    pub value: String,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub usage: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub start: BuildTimestamp,
    pub end: BuildTimestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
    pub creation: BuildTimestamp,
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub id: Token,
    pub meta: Meta,
    pub language: String,
    pub text: Narrative,
    pub status: &'static str,
    #[serde(rename = "type")]
    pub kind: CodeableConcept,
    pub subject: Reference,
    pub encounter: Reference,
    pub date: BuildTimestamp,
    pub author: Vec<Reference>,
    pub title: String,
    pub section: Vec<Section>,
}

/// Composition section: narrative text or entry links, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub code: CodeableConcept,
    #[serde(flatten)]
    pub content: SectionContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionContent {
    Narrative { text: Narrative },
    Entries { entry: Vec<Reference> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Token,
    pub meta: Meta,
    pub language: String,
    pub text: Narrative,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
    pub name: Vec<HumanName>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    pub id: Token,
    pub meta: Meta,
    pub language: String,
    pub text: Narrative,
    pub identifier: Vec<Identifier>,
    pub name: Vec<HumanName>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualification: Vec<Qualification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Qualification {
    pub code: CodeableConcept,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: Token,
    pub meta: Meta,
    pub language: String,
    pub text: Narrative,
    pub status: &'static str,
    pub class: Coding,
    pub subject: Reference,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    pub id: Token,
    pub meta: Meta,
    pub language: String,
    pub text: Narrative,
    pub status: &'static str,
    pub intent: &'static str,
    pub medication_codeable_concept: CodeableConcept,
    pub subject: Reference,
    pub authored_on: BuildTimestamp,
    pub requester: Reference,
    pub dosage_instruction: Vec<Dosage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dosage {
    pub text: String,
    pub timing: Timing,
    pub route: CodeableConcept,
    pub method: CodeableConcept,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timing {
    pub repeat: TimingRepeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingRepeat {
    pub frequency: u32,
    pub period: u32,
    pub period_unit: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarePlan {
    pub id: Token,
    pub meta: Meta,
    pub language: String,
    pub text: Narrative,
    pub status: &'static str,
    pub intent: &'static str,
    pub title: String,
    pub subject: Reference,
    pub created: BuildTimestamp,
    pub author: Reference,
    pub activity: Vec<CarePlanActivity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarePlanActivity {
    pub detail: CarePlanDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarePlanDetail {
    pub status: &'static str,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReference {
    pub id: Token,
    pub meta: Meta,
    pub language: String,
    pub text: Narrative,
    pub status: &'static str,
    pub doc_status: &'static str,
    #[serde(rename = "type")]
    pub kind: CodeableConcept,
    pub subject: Reference,
    pub date: BuildTimestamp,
    pub author: Vec<Reference>,
    pub content: Vec<DocumentContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentContent {
    pub attachment: Attachment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Binary {
    pub id: Token,
    pub meta: Meta,
    pub language: String,
    pub content_type: String,
    pub data: String,
}
