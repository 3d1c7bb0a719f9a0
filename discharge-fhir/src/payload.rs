//! Binary payload encoding.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use discharge_core::{DischargeError, DischargeResult, MediaType, Upload, UploadData};

/// Media type of the built-in placeholder.
pub const PLACEHOLDER_MEDIA_TYPE: MediaType = MediaType::Pdf;
/// Base64 of a minimal PDF used when nothing is attached.
pub const PLACEHOLDER_DATA: &str = "JVBERi0xLjQKJSBkaXNjaGFyZ2Ugc3VtbWFyeSBwbGFjZWhvbGRlcgolJUVPRgo=";
pub const PLACEHOLDER_TITLE: &str = "discharge-summary.pdf";
const UNTITLED_ATTACHMENT: &str = "attachment";

/// Transport-safe payload ready for a `Binary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub media_type: MediaType,
    pub title: String,
    pub data: String,
    pub placeholder: bool,
}

pub fn placeholder_payload() -> EncodedPayload {
    EncodedPayload {
        media_type: PLACEHOLDER_MEDIA_TYPE,
        title: PLACEHOLDER_TITLE.to_string(),
        data: PLACEHOLDER_DATA.to_string(),
        placeholder: true,
    }
}

/// Encode the upload, or fall back to the placeholder when there is none.
pub fn encode_payload(upload: Option<&Upload>) -> DischargeResult<EncodedPayload> {
    let Some(upload) = upload else {
        tracing::debug!("no attachment, using placeholder payload");
        return Ok(placeholder_payload());
    };

    let data = match &upload.data {
        UploadData::Bytes(bytes) => STANDARD.encode(bytes),
        UploadData::DataUrl(encoded) => strip_transport_prefix(encoded)?.to_string(),
    };

    Ok(EncodedPayload {
        media_type: upload.media_type,
        title: upload
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNTITLED_ATTACHMENT)
            .to_string(),
        data,
        placeholder: false,
    })
}

/// Drop a `data:<type>;base64,` wrapper and check the remainder is base64.
pub fn strip_transport_prefix(encoded: &str) -> DischargeResult<&str> {
    let body = match encoded.trim().strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest.split_once(',').ok_or_else(|| {
                DischargeError::InvalidUpload("data URL is missing the ',' separator".to_string())
            })?;
            if !header.ends_with(";base64") {
                return Err(DischargeError::InvalidUpload(
                    "data URL is not base64 encoded".to_string(),
                ));
            }
            body
        }
        None => encoded.trim(),
    };

    STANDARD
        .decode(body)
        .map_err(|err| DischargeError::InvalidUpload(format!("invalid base64 content: {err}")))?;
    Ok(body)
}

/// Read an attachment from disk after checking its declared type.
///
/// The type check happens first, so a disallowed file is never read. Read
/// failures surface as [`DischargeError::UploadRead`] and are never replaced
/// by the placeholder.
pub fn load_upload(path: &Path, content_type: &str) -> DischargeResult<Upload> {
    let media_type = MediaType::from_declared(content_type)?;
    let bytes = std::fs::read(path).map_err(|source| DischargeError::UploadRead {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), size = bytes.len(), %media_type, "attachment loaded");

    Ok(Upload {
        media_type,
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        data: UploadData::Bytes(bytes),
    })
}
