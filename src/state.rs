//! Application state: content pools, prompts, remote clients, and the
//! history store.
//!
//! This module owns the wiring only; the core operations (mission
//! generation, analysis, evaluation, history) take their inputs explicitly
//! and live in their own modules.

use tracing::{info, instrument};

use crate::config::{load_app_config_from_env, Prompts};
use crate::domain::{Repertoire, Theme};
use crate::gemini::Gemini;
use crate::history::HistoryStore;
use crate::pools;

pub struct AppState {
    /// Static mission pool: built-ins plus any config-bank extras.
    pub themes: Vec<Theme>,
    pub repertoires: Vec<Repertoire>,
    pub prompts: Prompts,
    /// Present only when GEMINI_API_KEY is set; every caller must handle None.
    pub gemini: Option<Gemini>,
    pub history: HistoryStore,
}

impl AppState {
    /// Build state from env: load config, assemble pools, init clients.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();

        let mut themes = pools::static_themes();
        let mut repertoires = pools::static_repertoires();
        let extra_themes = cfg.themes.len();
        let extra_repertoires = cfg.repertoires.len();
        themes.extend(cfg.themes);
        repertoires.extend(cfg.repertoires);

        info!(
            target: "mission",
            themes = themes.len(),
            repertoires = repertoires.len(),
            from_config = extra_themes + extra_repertoires,
            "Startup mission pool inventory"
        );

        let gemini = Gemini::from_env();
        if let Some(g) = &gemini {
            info!(target: "redacao_backend", base_url = %g.base_url, fast_model = %g.fast_model, strong_model = %g.strong_model, "Gemini enabled.");
        } else {
            info!(target: "redacao_backend", "Gemini disabled (no GEMINI_API_KEY). Evaluation runs the local analyzer.");
        }

        Self {
            themes,
            repertoires,
            prompts: cfg.prompts,
            gemini,
            history: HistoryStore::from_env(),
        }
    }
}
