use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use discharge_core::{Clinician, DischargeInput, PatientCandidate, SummaryConfig};
use discharge_fhir::{build_discharge_bundle, load_upload, normalize_abha_addresses};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "discharge_fhir=info,discharge_cli=info";

#[derive(Parser, Debug)]
#[command(
    name = "discharge-cli",
    about = "Tạo tóm tắt ra viện dạng bundle FHIR từ dữ liệu form JSON."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dựng bundle tài liệu từ file đầu vào.
    Build {
        /// File JSON chứa dữ liệu form (bệnh nhân, các mục, thuốc).
        #[arg(short, long)]
        input: PathBuf,
        /// Tệp đính kèm PDF hoặc JPEG.
        #[arg(short, long)]
        attachment: Option<PathBuf>,
        /// Kiểu tệp đính kèm; bỏ trống thì đoán theo phần mở rộng.
        #[arg(long)]
        attachment_type: Option<String>,
        /// File JSON thay cho danh sách bác sĩ dựng sẵn.
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(long)]
        language: Option<String>,
        /// Ghi ra file thay vì stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Liệt kê địa chỉ ABHA đã chuẩn hóa của một bệnh nhân.
    Abha {
        #[arg(short, long)]
        patient: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Build {
            input,
            attachment,
            attachment_type,
            roster,
            language,
            output,
            pretty,
        } => {
            let mut config = SummaryConfig::default();
            if let Some(path) = roster {
                config.clinicians = read_json::<Vec<Clinician>>(&path)?;
            }
            if let Some(language) = language {
                config.language = language;
            }

            let mut form: DischargeInput = read_json(&input)?;
            if let Some(path) = attachment {
                let content_type = match attachment_type {
                    Some(kind) => kind,
                    None => guess_media_type(&path)?.to_string(),
                };
                form.upload = Some(load_upload(&path, &content_type)?);
            }

            let bundle = build_discharge_bundle(&form, &config)?;
            let json = if pretty {
                serde_json::to_string_pretty(&bundle)?
            } else {
                serde_json::to_string(&bundle)?
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Không ghi được file {path:?}"))?;
                    tracing::info!(path = %path.display(), "bundle written");
                }
                None => println!("{json}"),
            }
        }
        Command::Abha { patient } => {
            let candidate: PatientCandidate = read_json(&patient)?;
            let options = normalize_abha_addresses(&candidate);
            if options.is_empty() {
                println!("Không có địa chỉ ABHA");
            }
            for option in options {
                println!("{}", option.label);
            }
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Không đọc được file {path:?}"))?;
    serde_json::from_str(&data).with_context(|| format!("File {path:?} không phải JSON hợp lệ"))
}

fn guess_media_type(path: &Path) -> anyhow::Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("pdf") => Ok("application/pdf"),
        Some("jpg" | "jpeg") => Ok("image/jpeg"),
        _ => bail!("Không đoán được kiểu tệp {path:?}, hãy dùng --attachment-type"),
    }
}
