//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{HistoryItem, Mission, Report};

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Body for POST /api/v1/evaluate. The response is the `Report` itself.
#[derive(Deserialize)]
pub struct EvaluateIn {
    pub text: String,
    pub mission: Mission,
}

/// Body for POST /api/v1/history.
#[derive(Deserialize)]
pub struct RecordIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub mission: Mission,
    pub result: Report,
    pub text: String,
}

#[derive(Serialize)]
pub struct RecordOut {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Serialize)]
pub struct HistoryOut {
    pub items: Vec<HistoryItem>,
}

#[derive(Deserialize)]
pub struct TranscribeIn {
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
    #[serde(default = "default_mime")]
    pub mime: String,
}

fn default_mime() -> String {
    "image/jpeg".into()
}

#[derive(Serialize)]
pub struct TranscribeOut {
    pub text: String,
}

#[derive(Serialize)]
pub struct ManualCategory {
    pub categoria: String,
    pub conectivos: Vec<String>,
}

#[derive(Serialize)]
pub struct ManualOut {
    pub categorias: Vec<ManualCategory>,
}

/// User-visible error payload (mission generation and transcription only;
/// evaluation and history never surface hard errors).
#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
