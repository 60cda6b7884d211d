//! Loading app configuration (prompts + optional theme/repertoire banks)
//! from TOML.
//!
//! See `AppConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Repertoire, Theme};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Extra themes appended to the built-in static pool.
  #[serde(default)]
  pub themes: Vec<Theme>,
  /// Extra repertoires appended to the built-in static pool.
  #[serde(default)]
  pub repertoires: Vec<Repertoire>,
}

/// Prompts used by the generative-model client. Defaults mirror the exam
/// style this trainer targets (PMRJ/ENEM argumentative essays); override in
/// TOML to tune tone or rigor.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  /// Mission generation. No placeholders; the model must answer strict JSON.
  pub mission_prompt: String,
  /// Essay evaluation. Placeholders: {titulo}, {inter}, {intra}, {texto}.
  pub eval_prompt_template: String,
  /// Handwriting transcription instruction sent alongside the image.
  pub transcribe_prompt: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      mission_prompt: "Gere um tema de redação inédito e de alto nível de complexidade, voltado para concursos de carreiras policiais ou ENEM. O tema deve focar obrigatoriamente em dilemas éticos, problemas sociológicos ou segurança pública tangível. Retorne APENAS um objeto JSON.".into(),
      eval_prompt_template: "Você é um corretor rigoroso de redação para concursos (PMRJ/ENEM).\nAnalise a seguinte redação com base no tema: \"{titulo}\".\n\nVerifique:\n1. Uso dos conectivos obrigatórios: {inter} (interparágrafos) e {intra} (intraparágrafos).\n2. Estrutura dissertativa (Introdução, D1, D2, Conclusão).\n3. Respeito aos Direitos Humanos (violações zeram a nota).\n4. Qualidade argumentativa.\n\nTexto do aluno:\n\"{texto}\"".into(),
      transcribe_prompt: "Transcreva este texto manuscrito exatamente como ele aparece. Se houver partes ilegíveis, marque como [ilegível]. Mantenha a pontuação e estrutura de parágrafos original.".into(),
    }
  }
}

/// Attempt to load `AppConfig` from AGENT_CONFIG_PATH. On any parsing/IO
/// error, returns None and the built-in defaults apply.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "redacao_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "redacao_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "redacao_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
