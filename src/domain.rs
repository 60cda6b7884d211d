//! Domain models used by the backend: mission, connectives, report, and history.

use serde::{Deserialize, Serialize};

/// Where did the mission come from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissionOrigin {
  /// Drawn from the built-in theme/repertoire pools.
  Static,
  /// Theme and repertoire produced by the generative model.
  Generated,
}

/// Mission lifecycle marker. Informational only; nothing in the scoring
/// path reads it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
  Pending,
  Completed,
}

/// An essay theme: category label, title, and the prompt sentence the
/// writer must actually address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Theme {
  pub eixo: String,
  pub titulo: String,
  pub frase: String,
}

/// A quoted supporting reference (source attribution + quotation).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repertoire {
  pub fonte: String,
  pub texto: String,
}

/// Mandatory transition words for one mission.
/// Invariant: `inter` holds exactly 2 distinct words, `intra` exactly 3.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectiveSet {
  pub inter: Vec<String>,
  pub intra: Vec<String>,
}

/// One writing assignment. Immutable once handed to the UI; persisted as
/// part of a `HistoryItem` when the essay is submitted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Mission {
  /// Creation timestamp in epoch milliseconds, doubles as the unique id.
  pub id: i64,
  pub origin: MissionOrigin,
  #[serde(rename = "tema")]
  pub theme: Theme,
  #[serde(rename = "conectivos")]
  pub connectives: ConnectiveSet,
  #[serde(rename = "repertorio")]
  pub repertoire: Repertoire,
  pub status: MissionStatus,
}

/// Per-connective usage flag, computed at analysis time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectiveUsage {
  pub word: String,
  pub used: bool,
}

/// Which path produced the report?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportOrigin {
  Local,
  Remote,
}

/// The scored correction report. `line_count` and `date` are attached by
/// the orchestrator after the evaluator (remote or local) has produced the
/// base fields; the value is treated as immutable once it leaves `evaluate`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Report {
  pub score: u32,
  #[serde(rename = "usedInter")]
  pub used_inter: Vec<ConnectiveUsage>,
  pub paragraphs: u32,
  #[serde(default)]
  pub violation: Option<String>,
  pub feedback: String,
  pub checklist_c5: bool,
  #[serde(rename = "lineCount", default, skip_serializing_if = "Option::is_none")]
  pub line_count: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date: Option<String>,
  pub origin: ReportOrigin,
}

/// One completed mission with its report and the submitted text.
/// History is append-only, newest first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryItem {
  pub mission: Mission,
  pub result: Report,
  pub text: String,
}
