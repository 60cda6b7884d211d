//! HTTP endpoint handlers. These are thin wrappers that forward to core
//! logic. Each handler is instrumented and logs parameters and basic result
//! info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{error, info, instrument};

use crate::logic::{self, TranscribeError};
use crate::mission;
use crate::pools;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_static_mission(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let m = mission::static_mission(&state.themes, &state.repertoires);
  info!(target: "mission", id = m.id, origin = "static", "HTTP mission served");
  Json(m)
}

/// Mission generation is the one operation with no local fallback: failures
/// surface to the caller, who decides between retrying and the static path.
#[instrument(level = "info", skip(state))]
pub async fn http_post_generated_mission(
  State(state): State<Arc<AppState>>,
) -> Result<Json<crate::domain::Mission>, (StatusCode, Json<ErrorOut>)> {
  let gemini = state.gemini.as_ref().ok_or_else(|| {
    (
      StatusCode::BAD_GATEWAY,
      Json(ErrorOut { message: "Geração de missão indisponível: serviço de IA não configurado.".into() }),
    )
  })?;

  match mission::remote_mission(gemini, &state.prompts).await {
    Ok(m) => {
      info!(target: "mission", id = m.id, origin = "generated", "HTTP mission served");
      Ok(Json(m))
    }
    Err(e) => {
      error!(target: "mission", kind = e.kind(), error = %e, "Mission generation failed");
      Err((
        StatusCode::BAD_GATEWAY,
        Json(ErrorOut { message: format!("Falha ao gerar missão: {}", e) }),
      ))
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(mission_id = body.mission.id, text_len = body.text.len()))]
pub async fn http_post_evaluate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<EvaluateIn>,
) -> impl IntoResponse {
  let report =
    logic::evaluate(state.gemini.as_ref(), &state.prompts, &body.text, &body.mission).await;
  info!(target: "mission", id = body.mission.id, score = report.score, origin = ?report.origin, "HTTP evaluate completed");
  Json(report)
}

#[instrument(level = "info", skip(state, body), fields(user_id = %body.user_id, mission_id = body.mission.id))]
pub async fn http_post_history(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RecordIn>,
) -> impl IntoResponse {
  state.history.record(&body.user_id, body.mission, body.result, body.text).await;
  Json(RecordOut { ok: true })
}

#[instrument(level = "info", skip(state), fields(user_id = %q.user_id))]
pub async fn http_get_history(
  State(state): State<Arc<AppState>>,
  Query(q): Query<HistoryQuery>,
) -> impl IntoResponse {
  let items = state.history.load(&q.user_id).await;
  info!(target: "history", count = items.len(), "HTTP history served");
  Json(HistoryOut { items })
}

#[instrument(level = "info", skip(state, body), fields(payload_len = body.image_base64.len(), mime = %body.mime))]
pub async fn http_post_transcribe(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TranscribeIn>,
) -> Result<Json<TranscribeOut>, (StatusCode, Json<ErrorOut>)> {
  match logic::transcribe(state.gemini.as_ref(), &state.prompts, &body.image_base64, &body.mime)
    .await
  {
    Ok(text) => Ok(Json(TranscribeOut { text })),
    Err(TranscribeError::InvalidImage(msg)) => Err((
      StatusCode::BAD_REQUEST,
      Json(ErrorOut { message: format!("Imagem inválida: {}", msg) }),
    )),
    Err(TranscribeError::Remote(e)) => {
      error!(target: "redacao_backend", kind = e.kind(), error = %e, "Transcription failed");
      Err((
        StatusCode::BAD_GATEWAY,
        Json(ErrorOut { message: format!("Falha na transcrição: {}", e) }),
      ))
    }
  }
}

#[instrument(level = "info")]
pub async fn http_get_manual() -> impl IntoResponse {
  let categorias = pools::MANUAL_CONECTIVOS
    .iter()
    .map(|(categoria, conectivos)| ManualCategory {
      categoria: categoria.to_string(),
      conectivos: conectivos.iter().map(|c| c.to_string()).collect(),
    })
    .collect();
  Json(ManualOut { categorias })
}
