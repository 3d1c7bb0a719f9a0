//! Discharge summary assembly as a FHIR R4 document `Bundle`.
//!
//! The entry points mirror each other: [`build_discharge_bundle`] takes a typed
//! [`DischargeInput`], while the `_str`/`_value` variants accept the same
//! snapshot as JSON.

pub mod builders;
pub mod bundle;
pub mod identity;
pub mod ids;
pub mod model;
pub mod narrative;
pub mod payload;
pub mod sections;
pub mod time;
pub mod vocab;

use discharge_core::{DischargeError, DischargeInput, DischargeResult, MediaType, SummaryConfig};
use serde::Deserialize;
use serde_json::Value;

pub use bundle::BundleAssembler;
pub use identity::{
    default_abha_address, normalize_abha_addresses, normalize_abha_value, normalize_identities,
    AbhaOption, ExternalIdentity,
};
pub use ids::{IdSource, RandomIds, Token};
pub use model::{Bundle, BundleEntry, Resource};
pub use payload::{encode_payload, load_upload, EncodedPayload};
pub use time::{now_with_offset, to_canonical_date, BuildTimestamp};

/// Build a discharge summary bundle from a typed input snapshot.
pub fn build_discharge_bundle(
    input: &DischargeInput,
    config: &SummaryConfig,
) -> DischargeResult<Bundle> {
    BundleAssembler::new(config).assemble(input)
}

/// Build from a JSON string holding a [`DischargeInput`].
pub fn build_discharge_bundle_str(
    input_json: &str,
    config: &SummaryConfig,
) -> DischargeResult<Bundle> {
    let input: Value =
        serde_json::from_str(input_json).map_err(|err| DischargeError::Parse(err.to_string()))?;
    build_discharge_bundle_value(&input, config)
}

/// Build from a `serde_json::Value` holding a [`DischargeInput`].
pub fn build_discharge_bundle_value(
    input: &Value,
    config: &SummaryConfig,
) -> DischargeResult<Bundle> {
    screen_upload_type(input)?;
    let input = DischargeInput::deserialize(input)
        .map_err(|err| DischargeError::Parse(err.to_string()))?;
    build_discharge_bundle(&input, config)
}

/// Reject a disallowed `upload.mediaType` as its own error rather than a parse failure.
fn screen_upload_type(input: &Value) -> DischargeResult<()> {
    if let Some(declared) = input.pointer("/upload/mediaType").and_then(Value::as_str) {
        MediaType::from_declared(declared)?;
    }
    Ok(())
}

/// Serialize a bundle to a JSON value.
pub fn bundle_to_value(bundle: &Bundle) -> DischargeResult<Value> {
    serde_json::to_value(bundle).map_err(|err| DischargeError::Serialize(err.to_string()))
}
