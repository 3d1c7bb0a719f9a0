//! Container assembly: identities, cross-references and entry order.

use discharge_core::{DischargeError, DischargeInput, DischargeResult, SummaryConfig};

use crate::builders::{
    build_binary, build_care_plan, build_composition, build_document_reference, build_encounter,
    build_medication_requests, build_patient, build_practitioner, has_care_plan, BuildContext,
};
use crate::identity::{default_abha_address, normalize_abha_addresses};
use crate::ids::{IdSource, RandomIds, Token};
use crate::model::{Bundle, BundleEntry, FhirResource, Identifier, Meta, Resource};
use crate::payload::encode_payload;
use crate::sections::{compose_sections, SectionLinks};
use crate::time::{now_with_offset, BuildTimestamp};
use crate::vocab::{self, profile_url};

/// Identities minted before any record is built.
#[derive(Debug, Clone)]
struct MintedIds {
    bundle: Token,
    bundle_identifier: Token,
    composition: Token,
    patient: Token,
    practitioner: Token,
    encounter: Token,
    medications: Vec<Token>,
    care_plan: Option<Token>,
    document_reference: Token,
    binary: Token,
}

impl MintedIds {
    fn mint(ids: &mut impl IdSource, medications: usize, care_plan: bool) -> Self {
        Self {
            bundle: ids.next_id(),
            bundle_identifier: ids.next_id(),
            composition: ids.next_id(),
            patient: ids.next_id(),
            practitioner: ids.next_id(),
            encounter: ids.next_id(),
            medications: (0..medications).map(|_| ids.next_id()).collect(),
            care_plan: care_plan.then(|| ids.next_id()),
            document_reference: ids.next_id(),
            binary: ids.next_id(),
        }
    }
}

/// Builds one discharge-summary document bundle per call.
pub struct BundleAssembler<'a, I: IdSource = RandomIds> {
    config: &'a SummaryConfig,
    ids: I,
}

impl<'a> BundleAssembler<'a, RandomIds> {
    pub fn new(config: &'a SummaryConfig) -> Self {
        Self::with_id_source(config, RandomIds)
    }
}

impl<'a, I: IdSource> BundleAssembler<'a, I> {
    pub fn with_id_source(config: &'a SummaryConfig, ids: I) -> Self {
        Self { config, ids }
    }

    /// Assemble using the current local time as the build timestamp.
    pub fn assemble(&mut self, input: &DischargeInput) -> DischargeResult<Bundle> {
        if input.patient.is_none() {
            return Err(DischargeError::MissingPatient);
        }
        self.assemble_at(input, now_with_offset())
    }

    /// Assemble with an explicit build timestamp shared by every record.
    pub fn assemble_at(
        &mut self,
        input: &DischargeInput,
        timestamp: BuildTimestamp,
    ) -> DischargeResult<Bundle> {
        let config = self.config;
        let patient = input.patient.as_ref().ok_or(DischargeError::MissingPatient)?;
        let clinician = config.clinician(input.clinician_id.as_deref())?;
        let payload = encode_payload(input.upload.as_ref())?;

        tracing::debug!(
            clinician = %clinician.id,
            medications = input.medications.len(),
            placeholder_payload = payload.placeholder,
            "assembling discharge summary"
        );

        let ids = MintedIds::mint(
            &mut self.ids,
            input.medications.len(),
            has_care_plan(&input.sections.care_plan),
        );
        let ctx = BuildContext::new(timestamp, &config.language);

        let abha_address = input
            .abha_address
            .clone()
            .filter(|address| !address.trim().is_empty())
            .or_else(|| {
                default_abha_address(&normalize_abha_addresses(patient))
                    .map(|option| option.value.clone())
            });

        let subject_record = build_patient(&ctx, ids.patient, Some(patient), abha_address.as_deref())
            .ok_or(DischargeError::MissingPatient)?;
        let subject = subject_record.reference();

        let author_record = build_practitioner(&ctx, ids.practitioner, clinician);
        let author = author_record.reference();

        let encounter_record = build_encounter(&ctx, ids.encounter, &subject);
        let encounter = encounter_record.reference();

        let orders = build_medication_requests(
            &ctx,
            &ids.medications,
            &input.medications,
            &subject,
            &author,
        );

        let care_plan = ids.care_plan.and_then(|id| {
            build_care_plan(&ctx, id, &input.sections.care_plan, &subject, &author)
        });

        let binary_record = build_binary(&ctx, ids.binary, &payload);
        let document_record = build_document_reference(
            &ctx,
            ids.document_reference,
            &payload,
            &binary_record.reference(),
            &subject,
            &author,
        );

        let links = SectionLinks {
            medications: orders.iter().map(FhirResource::reference).collect(),
            care_plan: care_plan.as_ref().map(FhirResource::reference),
            documents: vec![document_record.reference()],
        };
        let sections = compose_sections(&input.sections, &links, ctx.language);

        let composition = build_composition(
            &ctx,
            ids.composition,
            &patient.name,
            &subject,
            &encounter,
            &author,
            sections,
        );

        let mut resources = vec![
            Resource::Composition(composition),
            Resource::Patient(subject_record),
            Resource::Practitioner(author_record),
            Resource::Encounter(encounter_record),
        ];
        resources.extend(orders.into_iter().map(Resource::MedicationRequest));
        resources.extend(care_plan.map(Resource::CarePlan));
        resources.push(Resource::DocumentReference(document_record));
        resources.push(Resource::Binary(binary_record));

        let entry: Vec<BundleEntry> = resources.into_iter().map(BundleEntry::new).collect();

        tracing::info!(
            bundle = %ids.bundle,
            entries = entry.len(),
            "discharge summary bundle assembled"
        );

        Ok(Bundle {
            resource_type: "Bundle",
            id: ids.bundle,
            meta: Meta {
                version_id: Some("1".to_string()),
                last_updated: timestamp,
                profile: vec![profile_url(vocab::DOCUMENT_BUNDLE_PROFILE)],
            },
            identifier: Identifier {
                kind: None,
                system: vocab::BUNDLE_IDENTIFIER_SYSTEM.to_string(),
                value: ids.bundle_identifier.urn(),
            },
            kind: "document",
            timestamp,
            entry,
        })
    }
}
