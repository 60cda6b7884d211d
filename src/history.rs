//! History recording: dual-write to a durable local JSON cache and a
//! Supabase-style remote store, with remote-read-local-fallback on load.
//!
//! The local write is authoritative and happens before `record` returns;
//! the remote write is best-effort and only logged on failure. The two
//! stores are not reconciled.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{HistoryItem, Mission, Report};
use crate::error::RemoteError;

const DEFAULT_CACHE_PATH: &str = "./data/history.json";

/// One row of the remote `redacoes` table. Unknown columns on read are
/// ignored; `nota` and `mission_data` are the full serialized payloads.
#[derive(Debug, Serialize, Deserialize)]
struct EssayRow {
  id: String,
  user_id: String,
  titulo: String,
  conteudo: String,
  nota: Report,
  mission_data: Mission,
  created_at: DateTime<Utc>,
}

impl EssayRow {
  fn from_item(user_id: &str, item: &HistoryItem) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      user_id: user_id.to_string(),
      titulo: item.mission.theme.titulo.clone(),
      conteudo: item.text.clone(),
      nota: item.result.clone(),
      mission_data: item.mission.clone(),
      created_at: Utc::now(),
    }
  }

  fn into_item(self) -> HistoryItem {
    HistoryItem { mission: self.mission_data, result: self.nota, text: self.conteudo }
  }
}

/// REST client for the remote history table, keyed by user identity.
#[derive(Clone)]
pub struct RemoteHistory {
  client: reqwest::Client,
  base_url: String,
  api_key: String,
}

impl RemoteHistory {
  /// Construct the client if SUPABASE_URL and SUPABASE_SERVICE_KEY are both
  /// set; otherwise return None and history stays local-only.
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("SUPABASE_URL").ok()?;
    let api_key = std::env::var("SUPABASE_SERVICE_KEY").ok()?;
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .ok()?;
    Some(Self { client, base_url: base_url.trim_end_matches('/').to_string(), api_key })
  }

  #[instrument(level = "info", skip(self, row), fields(user_id = %row.user_id, row_id = %row.id))]
  async fn insert(&self, row: &EssayRow) -> Result<(), RemoteError> {
    let url = format!("{}/rest/v1/redacoes", self.base_url);
    let res = self
      .client
      .post(&url)
      .header("apikey", &self.api_key)
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .header(CONTENT_TYPE, "application/json")
      .header("Prefer", "return=minimal")
      .json(row)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let message = res.text().await.unwrap_or_default();
      return Err(RemoteError::Status { status, message });
    }
    Ok(())
  }

  #[instrument(level = "info", skip(self), fields(%user_id))]
  async fn list(&self, user_id: &str) -> Result<Vec<EssayRow>, RemoteError> {
    let url = format!("{}/rest/v1/redacoes", self.base_url);
    let filter = format!("eq.{}", user_id);
    let res = self
      .client
      .get(&url)
      .query(&[
        ("user_id", filter.as_str()),
        ("order", "created_at.desc"),
        ("select", "*"),
      ])
      .header("apikey", &self.api_key)
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let message = res.text().await.unwrap_or_default();
      return Err(RemoteError::Status { status, message });
    }

    res
      .json::<Vec<EssayRow>>()
      .await
      .map_err(|e| RemoteError::Malformed(e.to_string()))
  }
}

/// Owns all history writes. The in-memory list mirrors the cache file and
/// is newest-first by insertion order.
pub struct HistoryStore {
  items: RwLock<Vec<HistoryItem>>,
  cache_path: PathBuf,
  remote: Option<RemoteHistory>,
}

impl HistoryStore {
  pub fn new(cache_path: impl Into<PathBuf>, remote: Option<RemoteHistory>) -> Self {
    let cache_path = cache_path.into();
    let items = read_cache(&cache_path);
    if !items.is_empty() {
      info!(target: "history", count = items.len(), path = %cache_path.display(), "Loaded history cache");
    }
    Self { items: RwLock::new(items), cache_path, remote }
  }

  /// Build from env: HISTORY_CACHE_PATH (default ./data/history.json) and
  /// the optional remote store credentials.
  pub fn from_env() -> Self {
    let path = std::env::var("HISTORY_CACHE_PATH").unwrap_or_else(|_| DEFAULT_CACHE_PATH.into());
    let remote = RemoteHistory::from_env();
    if remote.is_none() {
      warn!(target: "history", "Remote history store disabled (SUPABASE_URL/SUPABASE_SERVICE_KEY not set)");
    }
    Self::new(path, remote)
  }

  /// Prepend the item, rewrite the local cache wholesale, then kick off the
  /// best-effort remote write. Never fails; remote errors are logged only.
  #[instrument(level = "info", skip(self, mission, result, text), fields(%user_id, mission_id = mission.id, score = result.score))]
  pub async fn record(&self, user_id: &str, mission: Mission, result: Report, text: String) {
    let item = HistoryItem { mission, result, text };

    {
      let mut items = self.items.write().await;
      items.insert(0, item.clone());
      write_cache(&self.cache_path, &items);
    }
    info!(target: "history", path = %self.cache_path.display(), "History item recorded locally");

    if let Some(remote) = self.remote.clone() {
      let row = EssayRow::from_item(user_id, &item);
      tokio::spawn(async move {
        if let Err(e) = remote.insert(&row).await {
          error!(target: "history", kind = e.kind(), error = %e, "Remote history write failed; local cache is authoritative");
        }
      });
    }
  }

  /// List history for a user: remote first (ordered by creation time
  /// descending), local cache on any remote failure.
  #[instrument(level = "info", skip(self), fields(%user_id))]
  pub async fn load(&self, user_id: &str) -> Vec<HistoryItem> {
    if let Some(remote) = &self.remote {
      match remote.list(user_id).await {
        Ok(rows) => {
          info!(target: "history", count = rows.len(), "History served from remote store");
          return rows.into_iter().map(EssayRow::into_item).collect();
        }
        Err(e) => {
          error!(target: "history", kind = e.kind(), error = %e, "Remote history read failed; serving local cache");
        }
      }
    }
    self.items.read().await.clone()
  }
}

fn read_cache(path: &Path) -> Vec<HistoryItem> {
  match std::fs::read_to_string(path) {
    Ok(s) => match serde_json::from_str::<Vec<HistoryItem>>(&s) {
      Ok(items) => items,
      Err(e) => {
        error!(target: "history", path = %path.display(), error = %e, "Failed to parse history cache; starting empty");
        Vec::new()
      }
    },
    Err(_) => Vec::new(),
  }
}

/// Overwrite the whole cache file. The list is small (one entry per
/// submitted essay) so wholesale rewriting stays cheap.
fn write_cache(path: &Path, items: &[HistoryItem]) {
  if let Some(parent) = path.parent() {
    if let Err(e) = std::fs::create_dir_all(parent) {
      error!(target: "history", path = %path.display(), error = %e, "Failed to create cache directory");
      return;
    }
  }
  match serde_json::to_string_pretty(items) {
    Ok(json) => {
      if let Err(e) = std::fs::write(path, json) {
        error!(target: "history", path = %path.display(), error = %e, "Failed to write history cache");
      }
    }
    Err(e) => {
      error!(target: "history", path = %path.display(), error = %e, "Failed to serialize history cache");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{
    ConnectiveSet, ConnectiveUsage, MissionOrigin, MissionStatus, Repertoire, ReportOrigin, Theme,
  };

  fn mission(id: i64) -> Mission {
    Mission {
      id,
      origin: MissionOrigin::Static,
      theme: Theme {
        eixo: "Segurança Pública".into(),
        titulo: format!("Tema {}", id),
        frase: "Discuta.".into(),
      },
      connectives: ConnectiveSet {
        inter: vec!["Portanto".into(), "Ademais".into()],
        intra: vec!["Visto que".into(), "Todavia".into(), "Embora".into()],
      },
      repertoire: Repertoire { fonte: "CF/88".into(), texto: "Art. 144.".into() },
      status: MissionStatus::Pending,
    }
  }

  fn report(score: u32) -> Report {
    Report {
      score,
      used_inter: vec![ConnectiveUsage { word: "Portanto".into(), used: true }],
      paragraphs: 4,
      violation: None,
      feedback: "ok".into(),
      checklist_c5: false,
      line_count: Some(12),
      date: Some("01/08/2026".into()),
      origin: ReportOrigin::Local,
    }
  }

  #[tokio::test]
  async fn record_without_remote_keeps_newest_first_in_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("history.json");
    let store = HistoryStore::new(&path, None);

    store.record("user-1", mission(1), report(400), "primeira".into()).await;
    store.record("user-1", mission(2), report(600), "segunda".into()).await;

    let items = store.load("user-1").await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].mission.id, 2);
    assert_eq!(items[1].mission.id, 1);

    // The cache file holds the same list, wholesale.
    let on_disk: Vec<HistoryItem> =
      serde_json::from_str(&std::fs::read_to_string(&path).expect("cache file")).expect("json");
    assert_eq!(on_disk, items);
  }

  #[tokio::test]
  async fn failing_remote_store_never_blocks_local_history() {
    std::env::set_var("SUPABASE_URL", "http://127.0.0.1:9");
    std::env::set_var("SUPABASE_SERVICE_KEY", "test-key");
    let remote = RemoteHistory::from_env().expect("remote from env");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("history.json");
    let store = HistoryStore::new(&path, Some(remote));

    // Remote insert can only fail (nothing listens on port 9); record must
    // still return cleanly with the item in the local cache.
    store.record("user-1", mission(11), report(400), "texto".into()).await;

    // Remote read fails too, so load serves the local cache.
    let items = store.load("user-1").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].mission.id, 11);
  }

  #[tokio::test]
  async fn load_falls_back_to_whatever_the_cache_last_held() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("history.json");

    {
      let store = HistoryStore::new(&path, None);
      store.record("user-1", mission(7), report(500), "texto".into()).await;
    }

    // A fresh store (still no reachable remote) reads the durable cache.
    let reopened = HistoryStore::new(&path, None);
    let items = reopened.load("user-1").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].mission.id, 7);
    assert_eq!(items[0].text, "texto");
  }

  #[tokio::test]
  async fn corrupt_cache_starts_empty_instead_of_failing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("history.json");
    std::fs::write(&path, "{ not json").expect("write");

    let store = HistoryStore::new(&path, None);
    assert!(store.load("user-1").await.is_empty());
  }

  #[test]
  fn essay_row_round_trips_through_the_wire_shape() {
    let item =
      HistoryItem { mission: mission(3), result: report(600), text: "conteúdo".into() };
    let row = EssayRow::from_item("user-9", &item);
    assert_eq!(row.titulo, "Tema 3");
    assert_eq!(row.user_id, "user-9");

    let json = serde_json::to_string(&row).expect("serialize");
    let back: EssayRow = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.into_item(), item);
  }
}
