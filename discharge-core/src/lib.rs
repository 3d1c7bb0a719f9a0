//! Kiểu dữ liệu đầu vào, cấu hình và lỗi chung cho bộ dựng tóm tắt ra viện.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ngôn ngữ mặc định gắn cho mọi resource.
pub const DEFAULT_LANGUAGE: &str = "en-IN";

/// Hệ thống định danh chứng chỉ hành nghề mặc định.
pub const DOCTOR_REGISTRY_SYSTEM: &str = "https://doctor.ndhm.gov.in";

/// Cấu hình bất biến được truyền vào khi dựng tài liệu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryConfig {
    /// Mã ngôn ngữ cho trường `language` và thẻ narrative.
    pub language: String,
    /// Danh sách bác sĩ cố định, người dùng chỉ được chọn.
    pub clinicians: Vec<Clinician>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            clinicians: default_roster(),
        }
    }
}

impl SummaryConfig {
    /// Chọn bác sĩ theo mã; không truyền mã thì lấy người đầu danh sách.
    pub fn clinician(&self, id: Option<&str>) -> Result<&Clinician, DischargeError> {
        match id {
            Some(id) => self
                .clinicians
                .iter()
                .find(|clinician| clinician.id == id)
                .ok_or_else(|| DischargeError::UnknownClinician(id.to_string())),
            None => self.clinicians.first().ok_or(DischargeError::EmptyRoster),
        }
    }
}

/// Danh sách bác sĩ dựng sẵn.
pub fn default_roster() -> Vec<Clinician> {
    vec![
        Clinician {
            id: "dr-arjun-mehta".to_string(),
            name: "Dr. Arjun Mehta".to_string(),
            qualification: "MBBS, MD (Internal Medicine)".to_string(),
            phone: Some("+91-9800000001".to_string()),
            email: Some("arjun.mehta@example.org".to_string()),
            registration: Registration {
                system: DOCTOR_REGISTRY_SYSTEM.to_string(),
                value: "71-4521-8876-3301".to_string(),
            },
        },
        Clinician {
            id: "dr-kavya-iyer".to_string(),
            name: "Dr. Kavya Iyer".to_string(),
            qualification: "MBBS, MS (General Surgery)".to_string(),
            phone: Some("+91-9800000002".to_string()),
            email: None,
            registration: Registration {
                system: DOCTOR_REGISTRY_SYSTEM.to_string(),
                value: "71-6610-2945-1187".to_string(),
            },
        },
        Clinician {
            id: "dr-rohan-das".to_string(),
            name: "Dr. Rohan Das".to_string(),
            qualification: "MBBS, DNB (Pediatrics)".to_string(),
            phone: None,
            email: Some("rohan.das@example.org".to_string()),
            registration: Registration {
                system: DOCTOR_REGISTRY_SYSTEM.to_string(),
                value: "71-3098-5512-4460".to_string(),
            },
        },
    ]
}

/// Bác sĩ ký tài liệu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Clinician {
    pub id: String,
    pub name: String,
    pub qualification: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub registration: Registration,
}

/// Cặp (system, value) của chứng chỉ hành nghề.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub system: String,
    pub value: String,
}

/// Bệnh nhân được chọn từ danh sách ứng viên.
///
/// Ngày sinh giữ nguyên dạng nhập `DD-MM-YYYY`; việc chuẩn hóa thuộc về bộ dựng.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatientCandidate {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "dateOfBirth", alias = "dob")]
    pub birth_date: Option<String>,
    #[serde(default, alias = "mobile")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "healthIdNumber", alias = "abhaNumber")]
    pub health_id: Option<String>,
    #[serde(default)]
    pub attributes: Option<CandidateAttributes>,
    /// Dạng phẳng cũ, chỉ dùng khi không có `attributes.abhaAddresses`.
    #[serde(default)]
    pub abha_addresses: Option<Vec<Value>>,
}

impl PatientCandidate {
    /// Các mục địa chỉ ABHA thô, ưu tiên dạng lồng trong `attributes`.
    pub fn abha_entries(&self) -> &[Value] {
        self.attributes
            .as_ref()
            .and_then(|attributes| attributes.abha_addresses.as_deref())
            .or(self.abha_addresses.as_deref())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAttributes {
    #[serde(default)]
    pub abha_addresses: Option<Vec<Value>>,
}

/// Giới tính hành chính theo bộ mã FHIR.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    /// Chuyển giá trị nhập tự do (`M`, `female`, ...) sang mã chuẩn.
    pub fn from_input(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Self::Male,
            "f" | "female" => Self::Female,
            "o" | "other" => Self::Other,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

/// Mười mục cố định của tóm tắt ra viện, theo thứ tự hiển thị.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    ChiefComplaints,
    PhysicalExamination,
    Allergies,
    MedicalHistory,
    FamilyHistory,
    Investigations,
    Procedures,
    Medications,
    CarePlan,
    DocumentReference,
}

impl SectionKind {
    pub const ALL: [SectionKind; 10] = [
        SectionKind::ChiefComplaints,
        SectionKind::PhysicalExamination,
        SectionKind::Allergies,
        SectionKind::MedicalHistory,
        SectionKind::FamilyHistory,
        SectionKind::Investigations,
        SectionKind::Procedures,
        SectionKind::Medications,
        SectionKind::CarePlan,
        SectionKind::DocumentReference,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::ChiefComplaints => "Chief complaints",
            Self::PhysicalExamination => "Physical examination",
            Self::Allergies => "Allergies",
            Self::MedicalHistory => "Medical history",
            Self::FamilyHistory => "Family history",
            Self::Investigations => "Investigations",
            Self::Procedures => "Procedures",
            Self::Medications => "Medications",
            Self::CarePlan => "Care plan",
            Self::DocumentReference => "Document reference",
        }
    }

    /// Chỉ ba mục này được phép liên kết tới resource khác.
    pub fn accepts_entries(self) -> bool {
        matches!(
            self,
            Self::Medications | Self::CarePlan | Self::DocumentReference
        )
    }
}

/// Nội dung tự do người dùng nhập cho từng mục.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionTexts {
    pub chief_complaints: String,
    pub physical_examination: String,
    pub allergies: String,
    pub medical_history: String,
    pub family_history: String,
    pub investigations: String,
    pub procedures: String,
    pub medications: String,
    pub care_plan: String,
    pub document_reference: String,
}

impl SectionTexts {
    pub fn get(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::ChiefComplaints => &self.chief_complaints,
            SectionKind::PhysicalExamination => &self.physical_examination,
            SectionKind::Allergies => &self.allergies,
            SectionKind::MedicalHistory => &self.medical_history,
            SectionKind::FamilyHistory => &self.family_history,
            SectionKind::Investigations => &self.investigations,
            SectionKind::Procedures => &self.procedures,
            SectionKind::Medications => &self.medications,
            SectionKind::CarePlan => &self.care_plan,
            SectionKind::DocumentReference => &self.document_reference,
        }
    }
}

/// Một dòng thuốc người dùng nhập.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLine {
    #[serde(default)]
    pub description: String,
}

impl MedicationLine {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Định dạng tệp đính kèm được chấp nhận.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum MediaType {
    Pdf,
    Jpeg,
}

impl MediaType {
    pub const ALLOWED: [MediaType; 2] = [MediaType::Pdf, MediaType::Jpeg];

    /// Kiểm tra kiểu khai báo với danh sách cho phép (bỏ qua tham số sau `;`).
    pub fn from_declared(content_type: &str) -> Result<Self, DischargeError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        Self::ALLOWED
            .into_iter()
            .find(|media_type| media_type.as_str() == essence)
            .ok_or_else(|| DischargeError::UnsupportedMediaType(content_type.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl TryFrom<String> for MediaType {
    type Error = DischargeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_declared(&value)
    }
}

impl From<MediaType> for String {
    fn from(media_type: MediaType) -> Self {
        media_type.as_str().to_string()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tệp người dùng tải lên, đã qua kiểm tra định dạng.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub media_type: MediaType,
    #[serde(default)]
    pub file_name: Option<String>,
    pub data: UploadData,
}

impl Upload {
    /// Tạo upload sau khi kiểm tra kiểu khai báo; sai kiểu thì từ chối ngay.
    pub fn new(
        content_type: &str,
        file_name: Option<String>,
        data: UploadData,
    ) -> Result<Self, DischargeError> {
        Ok(Self {
            media_type: MediaType::from_declared(content_type)?,
            file_name,
            data,
        })
    }
}

/// Nội dung tệp: byte thô hoặc data URL đã đọc sẵn phía trình duyệt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UploadData {
    Bytes(Vec<u8>),
    DataUrl(String),
}

/// Ảnh chụp toàn bộ dữ liệu form tại thời điểm bấm tạo.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DischargeInput {
    #[serde(default)]
    pub patient: Option<PatientCandidate>,
    #[serde(default)]
    pub clinician_id: Option<String>,
    /// Địa chỉ ABHA đã chọn; bỏ trống thì dùng lựa chọn mặc định.
    #[serde(default)]
    pub abha_address: Option<String>,
    #[serde(default)]
    pub sections: SectionTexts,
    #[serde(default)]
    pub medications: Vec<MedicationLine>,
    #[serde(default)]
    pub upload: Option<Upload>,
}

/// Lỗi chung khi dựng tóm tắt ra viện.
#[derive(Debug, thiserror::Error)]
pub enum DischargeError {
    #[error("Chưa chọn bệnh nhân, không thể tạo tóm tắt ra viện")]
    MissingPatient,
    #[error("Không tìm thấy bác sĩ với mã {0}")]
    UnknownClinician(String),
    #[error("Danh sách bác sĩ trống")]
    EmptyRoster,
    #[error("Định dạng tệp không được hỗ trợ: {0} (chỉ chấp nhận PDF hoặc JPEG)")]
    UnsupportedMediaType(String),
    #[error("Tệp đính kèm không hợp lệ: {0}")]
    InvalidUpload(String),
    #[error("Không đọc được tệp đính kèm {path:?}: {source}")]
    UploadRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Không serialize được bundle: {0}")]
    Serialize(String),
}

pub type DischargeResult<T> = Result<T, DischargeError>;
