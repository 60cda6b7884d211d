//! Minimal Gemini client for our use-cases.
//!
//! We only call `models/{model}:generateContent` and request either plain
//! text or a strict JSON object. Calls are instrumented and log model names,
//! latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short to
//! avoid leaking essay contents into logs.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{ConnectiveUsage, Mission, Repertoire, Report, ReportOrigin};
use crate::error::RemoteError;
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone)]
pub struct Gemini {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
}

/// Payload for a machine-generated mission, validated at the boundary.
#[derive(Debug, Deserialize)]
pub struct GeneratedMission {
  pub eixo: String,
  pub titulo: String,
  pub frase: String,
  pub repertorio: Repertoire,
}

/// Raw evaluation payload as the model returns it. `score` arrives as a
/// JSON number and is normalized into the integer scale afterwards.
#[derive(Debug, Deserialize)]
struct RemoteReport {
  score: f64,
  #[serde(rename = "usedInter")]
  used_inter: Vec<ConnectiveUsage>,
  paragraphs: f64,
  violation: Option<String>,
  feedback: String,
  checklist_c5: bool,
}

impl Gemini {
  /// Construct the client if we find GEMINI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("GEMINI_API_KEY").ok()?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let fast_model =
      std::env::var("GEMINI_FAST_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".into());
    let strong_model =
      std::env::var("GEMINI_STRONG_MODEL").unwrap_or_else(|_| "gemini-1.5-pro".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, fast_model, strong_model })
  }

  /// Single generateContent round-trip. Returns the text of the first
  /// candidate part.
  #[instrument(level = "info", skip(self, parts, config), fields(model = %model))]
  async fn generate(
    &self,
    model: &str,
    parts: Vec<Part>,
    config: Option<GenerationConfig>,
  ) -> Result<String, RemoteError> {
    let url = format!("{}/models/{}:generateContent?key={}", self.base_url, model, self.api_key);
    let req = GenerateContentRequest {
      contents: vec![ContentReq { role: "user".into(), parts }],
      generation_config: config,
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "redacao-tatica-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or_else(|| trunc_for_log(&body, 300));
      return Err(RemoteError::Status { status, message });
    }

    let body: GenerateContentResponse =
      res.json().await.map_err(|e| RemoteError::Malformed(e.to_string()))?;

    if let Some(usage) = &body.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        candidate_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Gemini usage"
      );
    }

    body
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content.parts.into_iter().next())
      .and_then(|p| p.text)
      .map(|t| t.trim().to_string())
      .filter(|t| !t.is_empty())
      .ok_or_else(|| RemoteError::Malformed("response has no candidate text".into()))
  }

  /// JSON-object generation. Generic over the target type T; a schema hint
  /// is passed so the model answers in the exact shape we parse.
  #[instrument(level = "info", skip(self, prompt, schema), fields(model = %model))]
  async fn generate_json<T: for<'a> Deserialize<'a>>(
    &self,
    model: &str,
    prompt: &str,
    schema: serde_json::Value,
  ) -> Result<T, RemoteError> {
    let text = self
      .generate(
        model,
        vec![Part::text(prompt)],
        Some(GenerationConfig {
          response_mime_type: "application/json".into(),
          response_schema: Some(schema),
        }),
      )
      .await?;

    serde_json::from_str::<T>(&text)
      .map_err(|e| RemoteError::Malformed(format!("JSON parse error: {}", e)))
  }

  // --- High-level helpers (domain-specialized) ---

  /// Ask the model for a fresh `{eixo, titulo, frase, repertorio}` tuple.
  #[instrument(level = "info", skip(self, prompts), fields(model = %self.fast_model))]
  pub async fn generate_mission(&self, prompts: &Prompts) -> Result<GeneratedMission, RemoteError> {
    let schema = json!({
      "type": "OBJECT",
      "properties": {
        "eixo": { "type": "STRING" },
        "titulo": { "type": "STRING" },
        "frase": { "type": "STRING" },
        "repertorio": {
          "type": "OBJECT",
          "properties": {
            "fonte": { "type": "STRING" },
            "texto": { "type": "STRING" }
          }
        }
      }
    });

    let start = std::time::Instant::now();
    let result = self
      .generate_json::<GeneratedMission>(&self.fast_model, &prompts.mission_prompt, schema)
      .await;
    let elapsed = start.elapsed();

    let gen = match result {
      Ok(g) => g,
      Err(e) => {
        error!(?elapsed, error = %e, "Mission generation call failed");
        return Err(e);
      }
    };

    if gen.eixo.trim().is_empty()
      || gen.titulo.trim().is_empty()
      || gen.frase.trim().is_empty()
      || gen.repertorio.fonte.trim().is_empty()
      || gen.repertorio.texto.trim().is_empty()
    {
      return Err(RemoteError::Malformed("generated mission has empty fields".into()));
    }

    info!(
      ?elapsed,
      eixo = %gen.eixo,
      titulo_preview = %gen.titulo.chars().take(40).collect::<String>(),
      "Mission successfully generated"
    );
    Ok(gen)
  }

  /// Full essay evaluation against the mission's theme and connectives.
  /// The returned report carries `origin = remote`; derived fields are left
  /// unset for the orchestrator.
  #[instrument(
    level = "info",
    skip(self, prompts, text, mission),
    fields(model = %self.strong_model, mission_id = mission.id, text_len = text.len())
  )]
  pub async fn analyze_text(
    &self,
    prompts: &Prompts,
    text: &str,
    mission: &Mission,
  ) -> Result<Report, RemoteError> {
    let schema = json!({
      "type": "OBJECT",
      "properties": {
        "score": { "type": "NUMBER" },
        "usedInter": {
          "type": "ARRAY",
          "items": {
            "type": "OBJECT",
            "properties": {
              "word": { "type": "STRING" },
              "used": { "type": "BOOLEAN" }
            }
          }
        },
        "paragraphs": { "type": "NUMBER" },
        "violation": { "type": "STRING", "nullable": true },
        "feedback": { "type": "STRING" },
        "checklist_c5": { "type": "BOOLEAN" }
      }
    });

    let prompt = fill_template(
      &prompts.eval_prompt_template,
      &[
        ("titulo", mission.theme.titulo.as_str()),
        ("inter", &mission.connectives.inter.join(", ")),
        ("intra", &mission.connectives.intra.join(", ")),
        ("texto", text),
      ],
    );

    let raw: RemoteReport = self.generate_json(&self.strong_model, &prompt, schema).await?;

    if !raw.score.is_finite() || !raw.paragraphs.is_finite() || raw.paragraphs < 0.0 {
      return Err(RemoteError::Malformed("evaluation has non-finite numbers".into()));
    }

    Ok(Report {
      score: raw.score.round().clamp(0.0, 1000.0) as u32,
      used_inter: raw.used_inter,
      paragraphs: raw.paragraphs.round() as u32,
      violation: raw.violation.filter(|v| !v.trim().is_empty()),
      feedback: raw.feedback,
      checklist_c5: raw.checklist_c5,
      line_count: None,
      date: None,
      origin: ReportOrigin::Remote,
    })
  }

  /// Transcribe a handwritten essay photo. `image_base64` must already be a
  /// clean base64 payload (no data-URI prefix).
  #[instrument(level = "info", skip(self, prompts, image_base64), fields(model = %self.strong_model, image_len = image_base64.len(), %mime))]
  pub async fn transcribe_image(
    &self,
    prompts: &Prompts,
    image_base64: &str,
    mime: &str,
  ) -> Result<String, RemoteError> {
    self
      .generate(
        &self.strong_model,
        vec![Part::inline_data(mime, image_base64), Part::text(&prompts.transcribe_prompt)],
        None,
      )
      .await
  }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
  contents: Vec<ContentReq>,
  #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
  generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct ContentReq {
  role: String,
  parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
  #[serde(skip_serializing_if = "Option::is_none")]
  text: Option<String>,
  #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
  inline_data: Option<InlineData>,
}

impl Part {
  fn text(t: &str) -> Self {
    Part { text: Some(t.to_string()), inline_data: None }
  }

  fn inline_data(mime: &str, data: &str) -> Self {
    Part {
      text: None,
      inline_data: Some(InlineData { mime_type: mime.to_string(), data: data.to_string() }),
    }
  }
}

#[derive(Serialize)]
struct InlineData {
  #[serde(rename = "mimeType")]
  mime_type: String,
  data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
  #[serde(rename = "responseMimeType")]
  response_mime_type: String,
  #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
  response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(rename = "usageMetadata", default)]
  usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
  content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
  #[serde(default)]
  text: Option<String>,
}

#[derive(Deserialize)]
struct UsageMetadata {
  #[serde(rename = "promptTokenCount", default)]
  prompt_token_count: Option<u32>,
  #[serde(rename = "candidatesTokenCount", default)]
  candidates_token_count: Option<u32>,
  #[serde(rename = "totalTokenCount", default)]
  total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn api_error_extraction_reads_the_message_field() {
    let body = r#"{"error":{"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("API key not valid"));
    assert_eq!(extract_api_error("plain text failure"), None);
  }

  #[test]
  fn remote_report_rejects_missing_score() {
    let json = r#"{"usedInter":[],"paragraphs":3,"violation":null,"feedback":"ok","checklist_c5":false}"#;
    assert!(serde_json::from_str::<RemoteReport>(json).is_err());
  }

  #[test]
  fn remote_report_accepts_contract_shape() {
    let json = r#"{"score":840,"usedInter":[{"word":"Portanto","used":true}],"paragraphs":4,"violation":null,"feedback":"Bom texto.","checklist_c5":true}"#;
    let r: RemoteReport = serde_json::from_str(json).expect("contract shape");
    assert_eq!(r.score, 840.0);
    assert!(r.checklist_c5);
  }
}
