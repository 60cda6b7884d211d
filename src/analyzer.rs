//! Deterministic offline essay analysis.
//!
//! This is the fallback evaluator: pure, reproducible, and intentionally
//! shallow. It checks literal connective usage and paragraph structure,
//! nothing semantic.

use crate::domain::{ConnectiveUsage, Mission, Report, ReportOrigin};

/// Fixed feedback for offline corrections.
pub const OFFLINE_FEEDBACK: &str =
  "Correção offline básica realizada. Conecte-se para feedback detalhado da IA.";

/// Base participation score for any submitted text.
const BASE_SCORE: u32 = 200;
/// Awarded when the essay reaches the full dissertative structure.
const STRUCTURE_BONUS: u32 = 200;
/// Awarded per mandatory inter-paragraph connective found in the text.
const CONNECTIVE_BONUS: u32 = 100;
/// Paragraph count required for the structure bonus.
const STRUCTURE_PARAGRAPHS: u32 = 4;
/// ENEM-style score ceiling.
const MAX_SCORE: u32 = 1000;

/// Count paragraphs: blank lines (empty or whitespace-only) separate
/// paragraphs, and empty segments are discarded.
pub fn count_paragraphs(text: &str) -> u32 {
  let mut n = 0u32;
  let mut in_paragraph = false;
  for line in text.lines() {
    if line.trim().is_empty() {
      in_paragraph = false;
    } else if !in_paragraph {
      n += 1;
      in_paragraph = true;
    }
  }
  n
}

/// Score an essay against its mission without any remote help.
///
/// Connective matching is a case-insensitive substring check; a match
/// inside a longer word also counts. The score starts at the base
/// participation value, gains the structure bonus at four paragraphs,
/// gains per-connective bonuses, and is clamped to the ceiling.
pub fn analyze_local(text: &str, mission: &Mission) -> Report {
  let lower = text.to_lowercase();

  let used_inter: Vec<ConnectiveUsage> = mission
    .connectives
    .inter
    .iter()
    .map(|w| ConnectiveUsage {
      word: w.clone(),
      used: lower.contains(&w.to_lowercase()),
    })
    .collect();

  let paragraphs = count_paragraphs(text);

  let mut score = BASE_SCORE;
  if paragraphs >= STRUCTURE_PARAGRAPHS {
    score += STRUCTURE_BONUS;
  }
  score += CONNECTIVE_BONUS * used_inter.iter().filter(|u| u.used).count() as u32;
  if score > MAX_SCORE {
    score = MAX_SCORE;
  }

  Report {
    score,
    used_inter,
    paragraphs,
    violation: None,
    feedback: OFFLINE_FEEDBACK.into(),
    checklist_c5: false,
    line_count: None,
    date: None,
    origin: ReportOrigin::Local,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ConnectiveSet, MissionOrigin, MissionStatus, Repertoire, Theme};

  fn mission_with(inter: &[&str]) -> Mission {
    Mission {
      id: 1,
      origin: MissionOrigin::Static,
      theme: Theme {
        eixo: "Segurança Pública".into(),
        titulo: "O desafio da segurança pública no Brasil".into(),
        frase: "Discuta os desafios.".into(),
      },
      connectives: ConnectiveSet {
        inter: inter.iter().map(|s| s.to_string()).collect(),
        intra: vec!["Visto que".into(), "Todavia".into(), "Embora".into()],
      },
      repertoire: Repertoire { fonte: "CF/88".into(), texto: "Art. 144.".into() },
      status: MissionStatus::Pending,
    }
  }

  #[test]
  fn one_paragraph_no_connectives_scores_base_only() {
    let m = mission_with(&["Portanto", "Ademais"]);
    let r = analyze_local("Um parágrafo simples sem nada obrigatório.", &m);

    assert_eq!(r.score, 200);
    assert_eq!(r.paragraphs, 1);
    assert_eq!(r.used_inter.len(), 2);
    assert!(r.used_inter.iter().all(|u| !u.used));
    assert_eq!(r.origin, ReportOrigin::Local);
    assert!(r.violation.is_none());
    assert!(!r.checklist_c5);
  }

  #[test]
  fn four_paragraphs_with_both_connectives_scores_600() {
    let m = mission_with(&["Portanto", "Ademais"]);
    let text = "Introdução sobre o tema.\n\nportanto o primeiro argumento.\n\nademais o segundo argumento.\n\nConclusão final.";
    let r = analyze_local(text, &m);

    assert_eq!(r.paragraphs, 4);
    assert!(r.used_inter.iter().all(|u| u.used));
    assert_eq!(r.score, 600);
  }

  #[test]
  fn matching_is_case_insensitive_and_substring_based() {
    let m = mission_with(&["Logo", "Portanto"]);
    // "logotipo" contains "logo" as a substring; that counts by design.
    let r = analyze_local("O logotipo da empresa.", &m);
    assert!(r.used_inter[0].used);
    assert!(!r.used_inter[1].used);
    assert_eq!(r.score, 300);
  }

  #[test]
  fn blank_lines_with_whitespace_still_separate_paragraphs() {
    assert_eq!(count_paragraphs("a\n\nb"), 2);
    assert_eq!(count_paragraphs("a\n  \nb"), 2);
    assert_eq!(count_paragraphs("a\nb"), 1);
    assert_eq!(count_paragraphs("a\n\n\n\nb"), 2);
    assert_eq!(count_paragraphs(""), 0);
    assert_eq!(count_paragraphs("  \n \n"), 0);
  }

  #[test]
  fn analysis_is_deterministic() {
    let m = mission_with(&["Portanto", "Ademais"]);
    let text = "Primeiro.\n\nPortanto, segundo.\n\nTerceiro.";
    assert_eq!(analyze_local(text, &m), analyze_local(text, &m));
  }

  #[test]
  fn score_never_decreases_with_more_matches_or_structure() {
    let m = mission_with(&["Portanto", "Ademais"]);
    let flat = analyze_local("Só um parágrafo.", &m);
    let one_conn = analyze_local("Portanto, um parágrafo.", &m);
    let two_conn = analyze_local("Portanto e ademais, um parágrafo.", &m);
    let structured = analyze_local("Portanto e ademais.\n\nDois.\n\nTrês.\n\nQuatro.", &m);

    assert!(one_conn.score >= flat.score);
    assert!(two_conn.score >= one_conn.score);
    assert!(structured.score >= two_conn.score);
    assert!(structured.score <= 1000);
    assert!(flat.score >= 200);
  }
}
