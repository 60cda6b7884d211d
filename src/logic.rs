//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - The dual-path evaluation strategy (remote first, local fallback)
//!   - Derived report fields that no evaluator owns (line count, date)
//!   - Handwriting transcription with boundary validation of the payload

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Local;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::analyzer::analyze_local;
use crate::config::Prompts;
use crate::domain::{Mission, Report};
use crate::error::RemoteError;
use crate::gemini::Gemini;
use crate::util::strip_data_uri;

/// Characters assumed per handwritten exam-sheet line.
const CHARS_PER_LINE: usize = 65;

/// Decoded transcription images above this size are rejected.
const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum TranscribeError {
  #[error("invalid image payload: {0}")]
  InvalidImage(String),
  #[error(transparent)]
  Remote(#[from] RemoteError),
}

/// Score an essay. Tries the remote evaluator and falls back to the local
/// analyzer on any failure; the caller always gets a complete report and
/// never an error. Derived fields are attached regardless of path.
#[instrument(level = "info", skip(gemini, prompts, text, mission), fields(mission_id = mission.id, text_len = text.len()))]
pub async fn evaluate(
  gemini: Option<&Gemini>,
  prompts: &Prompts,
  text: &str,
  mission: &Mission,
) -> Report {
  let base = match gemini {
    Some(g) => match g.analyze_text(prompts, text, mission).await {
      Ok(report) => {
        info!(target: "mission", id = mission.id, score = report.score, "Remote evaluation succeeded");
        report
      }
      Err(e) => {
        error!(target: "mission", id = mission.id, kind = e.kind(), error = %e, "Remote evaluation failed; using local analyzer");
        analyze_local(text, mission)
      }
    },
    None => analyze_local(text, mission),
  };

  Report {
    line_count: Some(estimate_line_count(text)),
    date: Some(Local::now().format("%d/%m/%Y").to_string()),
    ..base
  }
}

/// Estimate how many exam-sheet lines the essay would occupy: the larger of
/// the newline-delimited line count and a fixed characters-per-line ratio.
/// Independent of actual word-wrap.
pub fn estimate_line_count(text: &str) -> u32 {
  let newline_lines = text.split('\n').count();
  let by_length = text.chars().count().div_ceil(CHARS_PER_LINE);
  newline_lines.max(by_length) as u32
}

/// Transcribe a handwritten essay photo via the strong model. The payload is
/// decoded here so malformed client input is rejected before any remote
/// call; the clean re-encoded bytes are what we forward.
#[instrument(level = "info", skip(gemini, prompts, image_base64), fields(payload_len = image_base64.len()))]
pub async fn transcribe(
  gemini: Option<&Gemini>,
  prompts: &Prompts,
  image_base64: &str,
  mime: &str,
) -> Result<String, TranscribeError> {
  let raw: String = strip_data_uri(image_base64)
    .chars()
    .filter(|c| !c.is_whitespace())
    .collect();

  let bytes = BASE64
    .decode(raw.as_bytes())
    .map_err(|e| TranscribeError::InvalidImage(e.to_string()))?;
  if bytes.is_empty() {
    return Err(TranscribeError::InvalidImage("empty image".into()));
  }
  if bytes.len() > MAX_IMAGE_BYTES {
    return Err(TranscribeError::InvalidImage(format!(
      "image too large ({} bytes)",
      bytes.len()
    )));
  }

  let gemini = gemini.ok_or_else(|| {
    RemoteError::Unavailable("transcription requires the model API (GEMINI_API_KEY not set)".into())
  })?;

  let text = gemini.transcribe_image(prompts, &BASE64.encode(&bytes), mime).await?;
  Ok(text)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{
    ConnectiveSet, MissionOrigin, MissionStatus, Repertoire, ReportOrigin, Theme,
  };

  fn mission() -> Mission {
    Mission {
      id: 42,
      origin: MissionOrigin::Static,
      theme: Theme {
        eixo: "Tecnologia".into(),
        titulo: "O impacto da IA no mercado de trabalho".into(),
        frase: "Analise os efeitos da automação.".into(),
      },
      connectives: ConnectiveSet {
        inter: vec!["Portanto".into(), "Ademais".into()],
        intra: vec!["Visto que".into(), "Todavia".into(), "Embora".into()],
      },
      repertoire: Repertoire {
        fonte: "Zygmunt Bauman".into(),
        texto: "Vivemos tempos líquidos.".into(),
      },
      status: MissionStatus::Pending,
    }
  }

  #[tokio::test]
  async fn evaluate_without_remote_falls_back_and_attaches_derived_fields() {
    let m = mission();
    let text = "Portanto, um texto.\n\nAdemais, outro parágrafo.";
    let prompts = Prompts::default();

    let r = evaluate(None, &prompts, text, &m).await;

    assert_eq!(r.origin, ReportOrigin::Local);
    assert_eq!(r.score, 400);
    assert!(r.line_count.is_some());
    assert!(r.date.is_some());
    // dd/mm/yyyy
    let date = r.date.unwrap();
    assert_eq!(date.len(), 10);
    assert_eq!(&date[2..3], "/");
    assert_eq!(&date[5..6], "/");
  }

  #[tokio::test]
  async fn evaluate_with_unreachable_remote_falls_back_without_error() {
    std::env::set_var("GEMINI_API_KEY", "test-key");
    std::env::set_var("GEMINI_BASE_URL", "http://127.0.0.1:9");
    let gemini = Gemini::from_env().expect("client from env");

    let m = mission();
    let r = evaluate(Some(&gemini), &Prompts::default(), "Texto qualquer.", &m).await;

    assert_eq!(r.origin, ReportOrigin::Local);
    assert_eq!(r.score, 200);
    assert!(r.line_count.is_some());
    assert!(r.date.is_some());
  }

  #[test]
  fn line_count_uses_the_larger_estimate() {
    assert_eq!(estimate_line_count("a\nb\nc"), 3);
    // 130 chars on one physical line still estimate as 2 sheet lines.
    let long = "x".repeat(130);
    assert_eq!(estimate_line_count(&long), 2);
    assert_eq!(estimate_line_count(""), 1);
  }

  #[tokio::test]
  async fn transcribe_rejects_garbage_base64() {
    let prompts = Prompts::default();
    let err = transcribe(None, &prompts, "not!!valid@@base64", "image/jpeg").await;
    assert!(matches!(err, Err(TranscribeError::InvalidImage(_))));
  }

  #[tokio::test]
  async fn transcribe_without_remote_reports_unavailable() {
    let prompts = Prompts::default();
    // "QUJD" decodes to "ABC"; payload is valid, the client is missing.
    let err = transcribe(None, &prompts, "data:image/jpeg;base64,QUJD", "image/jpeg").await;
    assert!(matches!(
      err,
      Err(TranscribeError::Remote(RemoteError::Unavailable(_)))
    ));
  }
}
