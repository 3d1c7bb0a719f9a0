//! Bridge WASM <-> JavaScript cho bộ dựng tóm tắt ra viện.
//!
//! Phía JavaScript tự đọc tệp đính kèm (FileReader) và truyền data URL vào
//! `input.upload`, nên mọi hàm ở đây đều đồng bộ.

use discharge_core::{Clinician, DischargeError, MediaType, PatientCandidate, SummaryConfig};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsSummaryConfig {
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    clinicians: Option<Vec<Clinician>>,
}

impl From<JsSummaryConfig> for SummaryConfig {
    fn from(cfg: JsSummaryConfig) -> Self {
        let mut base = SummaryConfig::default();
        if let Some(language) = cfg.language {
            base.language = language;
        }
        if let Some(clinicians) = cfg.clinicians {
            base.clinicians = clinicians;
        }
        base
    }
}

/// Dựng bundle FHIR từ dữ liệu form; trả về object JSON thuần.
#[wasm_bindgen]
pub fn build_discharge_summary(
    input: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let input_value = from_value::<serde_json::Value>(input)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được dữ liệu form: {err}")))?;

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsSummaryConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            SummaryConfig::from(cfg)
        }
        None => SummaryConfig::default(),
    };

    let bundle = discharge_fhir::build_discharge_bundle_value(&input_value, &cfg)
        .map_err(|err| JsValue::from_str(&format_discharge_error(err)))?;

    to_json_value(&bundle)
}

/// Danh sách địa chỉ ABHA đã chuẩn hóa của một bệnh nhân, phần tử đầu là mặc định.
#[wasm_bindgen]
pub fn normalize_abha_addresses(candidate: JsValue) -> Result<JsValue, JsValue> {
    let candidate: PatientCandidate = from_value(candidate)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được bệnh nhân: {err}")))?;

    to_json_value(&discharge_fhir::normalize_abha_addresses(&candidate))
}

/// Kiểm tra nhanh kiểu tệp trước khi đọc (PDF hoặc JPEG).
#[wasm_bindgen]
pub fn is_supported_media_type(content_type: &str) -> bool {
    MediaType::from_declared(content_type).is_ok()
}

fn to_json_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Không serialize được kết quả: {err}")))
}

fn format_discharge_error(err: DischargeError) -> String {
    format!("Discharge summary error: {err}")
}
