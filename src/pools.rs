//! Built-in content pools: connective word lists, static themes and
//! repertoires, and the connective manual.
//!
//! These guarantee the app is useful even without external config or a
//! model API key.

use crate::domain::{Repertoire, Theme};

/// Paragraph-opening transition words. Two distinct ones are drawn per mission.
pub const CONECTIVOS_INTER: &[&str] = &[
  "Ademais",
  "Outrossim",
  "Além disso",
  "Portanto",
  "Logo",
  "Dessa forma",
  "Nesse contexto",
  "Diante disso",
  "Sob essa ótica",
];

/// Mid-paragraph transition words. Three distinct ones are drawn per mission.
pub const CONECTIVOS_INTRA: &[&str] = &[
  "Visto que",
  "Já que",
  "Uma vez que",
  "Por conseguinte",
  "Consequentemente",
  "Todavia",
  "Contudo",
  "Entretanto",
  "Embora",
];

/// Themes served when the generative model is unavailable or not requested.
pub fn static_themes() -> Vec<Theme> {
  vec![
    Theme {
      eixo: "Segurança Pública".into(),
      titulo: "O desafio da segurança pública no Brasil".into(),
      frase: "Com base na realidade brasileira, discuta os principais desafios para garantir a segurança da população e proponha medidas para enfrentá-los.".into(),
    },
    Theme {
      eixo: "Tecnologia".into(),
      titulo: "O impacto da IA no mercado de trabalho".into(),
      frase: "Analise os efeitos da automação e inteligência artificial nas relações trabalhistas contemporâneas.".into(),
    },
  ]
}

/// Supporting quotations paired with static themes.
pub fn static_repertoires() -> Vec<Repertoire> {
  vec![
    Repertoire {
      fonte: "CF/88".into(),
      texto: "Art. 144: A segurança pública é dever do Estado e direito e responsabilidade de todos.".into(),
    },
    Repertoire {
      fonte: "Zygmunt Bauman".into(),
      texto: "Vivemos tempos líquidos, onde nada é feito para durar.".into(),
    },
  ]
}

/// Reference table of connectives by rhetorical function, served to the UI
/// as study material. Order is presentation order.
pub const MANUAL_CONECTIVOS: &[(&str, &[&str])] = &[
  ("Prioridade", &["Em primeiro lugar", "Primordialmente", "Sobretudo"]),
  ("Adição", &["Ademais", "Além disso", "Outrossim"]),
  ("Oposição", &["Todavia", "Contudo", "Entretanto", "No entanto"]),
  ("Conclusão", &["Portanto", "Logo", "Dessa forma", "Assim"]),
  ("Causa", &["Visto que", "Já que", "Porquanto"]),
  ("Consequência", &["Consequentemente", "De modo que", "Por conseguinte"]),
];
