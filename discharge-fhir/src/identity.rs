//! ABHA address normalization for the address selector.
//!
//! Candidate records carry their addresses either as plain strings or as
//! `{address, isPrimary}` objects, nested under `attributes.abhaAddresses` or
//! (older records) flat under `abhaAddresses`. Everything is flattened to
//! [`AbhaOption`] and sorted primary-first, then by value.

use discharge_core::PatientCandidate;
use serde::Serialize;
use serde_json::Value;

const PRIMARY_SUFFIX: &str = " (primary)";

/// One raw external-identity entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalIdentity {
    Plain(String),
    Tagged { address: String, primary: bool },
    /// An object without a usable `address`, kept as its JSON text.
    ///
    /// This mirrors what existing records contain; it is not obviously a
    /// meaningful address and may be masking malformed input upstream.
    Opaque { text: String, primary: bool },
}

impl ExternalIdentity {
    /// Classify a raw JSON entry; nulls, scalars, arrays and empty values are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| Self::Plain(text.to_string()))
            }
            Value::Object(map) if !map.is_empty() => {
                let primary = map
                    .get("isPrimary")
                    .or_else(|| map.get("primary"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                match map.get("address").and_then(Value::as_str).map(str::trim) {
                    Some(address) if !address.is_empty() => Some(Self::Tagged {
                        address: address.to_string(),
                        primary,
                    }),
                    _ => {
                        tracing::warn!("ABHA entry without an address kept as opaque text");
                        Some(Self::Opaque {
                            text: value.to_string(),
                            primary,
                        })
                    }
                }
            }
            _ => None,
        }
    }

    pub fn to_option(&self) -> AbhaOption {
        match self {
            Self::Plain(text) => AbhaOption {
                value: text.clone(),
                label: text.clone(),
                primary: false,
            },
            Self::Tagged { address, primary } => AbhaOption {
                value: address.clone(),
                label: if *primary {
                    format!("{address}{PRIMARY_SUFFIX}")
                } else {
                    address.clone()
                },
                primary: *primary,
            },
            Self::Opaque { text, primary } => AbhaOption {
                value: text.clone(),
                label: text.clone(),
                primary: *primary,
            },
        }
    }
}

/// Selector-ready address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbhaOption {
    pub value: String,
    pub label: String,
    pub primary: bool,
}

/// Flatten and order identities: primary first, then by value. Stable.
pub fn normalize_identities(identities: &[ExternalIdentity]) -> Vec<AbhaOption> {
    let mut options: Vec<AbhaOption> = identities.iter().map(ExternalIdentity::to_option).collect();
    options.sort_by(|a, b| b.primary.cmp(&a.primary).then_with(|| a.value.cmp(&b.value)));
    options
}

/// Normalized addresses of a typed candidate.
pub fn normalize_abha_addresses(candidate: &PatientCandidate) -> Vec<AbhaOption> {
    normalize_entries(candidate.abha_entries())
}

/// Normalized addresses of a raw candidate record.
pub fn normalize_abha_value(record: &Value) -> Vec<AbhaOption> {
    let entries = record
        .pointer("/attributes/abhaAddresses")
        .and_then(Value::as_array)
        .or_else(|| record.get("abhaAddresses").and_then(Value::as_array));

    entries.map(|entries| normalize_entries(entries)).unwrap_or_default()
}

/// The selector's default: the first option, if any.
pub fn default_abha_address(options: &[AbhaOption]) -> Option<&AbhaOption> {
    options.first()
}

fn normalize_entries(entries: &[Value]) -> Vec<AbhaOption> {
    let identities: Vec<ExternalIdentity> = entries
        .iter()
        .filter_map(|entry| {
            let identity = ExternalIdentity::from_value(entry);
            if identity.is_none() {
                tracing::debug!(%entry, "dropping unusable ABHA entry");
            }
            identity
        })
        .collect();
    normalize_identities(&identities)
}
