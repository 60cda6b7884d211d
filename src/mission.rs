//! Mission generation: static pool draws and remote generation, plus the
//! connective selection shared by both paths.

use chrono::Utc;
use rand::seq::SliceRandom;
use tracing::{info, instrument};

use crate::config::Prompts;
use crate::domain::{ConnectiveSet, Mission, MissionOrigin, MissionStatus, Repertoire, Theme};
use crate::error::RemoteError;
use crate::gemini::Gemini;
use crate::pools::{CONECTIVOS_INTER, CONECTIVOS_INTRA};

/// Draw a fresh connective set: 2 distinct inter-paragraph words and 3
/// distinct intra-paragraph words, in draw order.
///
/// Duplicate draws are rejected and retried. The pools are 9 items each;
/// swap this for sampling without replacement if they ever grow large.
pub fn random_connectives() -> ConnectiveSet {
  let mut rng = rand::thread_rng();

  let inter1 = *CONECTIVOS_INTER.choose(&mut rng).unwrap_or(&CONECTIVOS_INTER[0]);
  let mut inter2 = *CONECTIVOS_INTER.choose(&mut rng).unwrap_or(&CONECTIVOS_INTER[0]);
  while inter2 == inter1 {
    inter2 = *CONECTIVOS_INTER.choose(&mut rng).unwrap_or(&CONECTIVOS_INTER[0]);
  }

  let mut intra: Vec<String> = Vec::with_capacity(3);
  while intra.len() < 3 {
    let w = *CONECTIVOS_INTRA.choose(&mut rng).unwrap_or(&CONECTIVOS_INTRA[0]);
    if !intra.iter().any(|x| x == w) {
      intra.push(w.to_string());
    }
  }

  ConnectiveSet {
    inter: vec![inter1.to_string(), inter2.to_string()],
    intra,
  }
}

/// Assemble a mission from its parts: fresh id (epoch millis), fresh
/// connectives, pending status.
fn assemble(theme: Theme, repertoire: Repertoire, origin: MissionOrigin) -> Mission {
  Mission {
    id: Utc::now().timestamp_millis(),
    origin,
    theme,
    connectives: random_connectives(),
    repertoire,
    status: MissionStatus::Pending,
  }
}

/// Select a theme and repertoire uniformly at random from the configured
/// pools. Never fails; the built-in pools are always present.
#[instrument(level = "info", skip_all)]
pub fn static_mission(themes: &[Theme], repertoires: &[Repertoire]) -> Mission {
  let mut rng = rand::thread_rng();
  let theme = themes
    .choose(&mut rng)
    .cloned()
    .unwrap_or_else(|| crate::pools::static_themes()[0].clone());
  let repertoire = repertoires
    .choose(&mut rng)
    .cloned()
    .unwrap_or_else(|| crate::pools::static_repertoires()[0].clone());

  let m = assemble(theme, repertoire, MissionOrigin::Static);
  info!(target: "mission", id = m.id, eixo = %m.theme.eixo, "Static mission drawn");
  m
}

/// Request a machine-generated theme + repertoire and combine it with
/// locally drawn connectives. Remote connective generation is deliberately
/// not used; the local draw is cheaper and already meets the invariants.
///
/// No retry here; the caller owns fallback policy.
#[instrument(level = "info", skip_all)]
pub async fn remote_mission(gemini: &Gemini, prompts: &Prompts) -> Result<Mission, RemoteError> {
  let gen = gemini.generate_mission(prompts).await?;

  let m = assemble(
    Theme { eixo: gen.eixo, titulo: gen.titulo, frase: gen.frase },
    gen.repertorio,
    MissionOrigin::Generated,
  );
  info!(target: "mission", id = m.id, eixo = %m.theme.eixo, "Generated mission assembled");
  Ok(m)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pools;

  #[test]
  fn connective_set_has_expected_shape() {
    for _ in 0..200 {
      let set = random_connectives();
      assert_eq!(set.inter.len(), 2);
      assert_eq!(set.intra.len(), 3);
      assert_ne!(set.inter[0], set.inter[1]);
      for i in 0..set.intra.len() {
        for j in (i + 1)..set.intra.len() {
          assert_ne!(set.intra[i], set.intra[j]);
        }
      }
    }
  }

  #[test]
  fn connectives_come_from_the_pools() {
    let set = random_connectives();
    for w in &set.inter {
      assert!(CONECTIVOS_INTER.contains(&w.as_str()));
    }
    for w in &set.intra {
      assert!(CONECTIVOS_INTRA.contains(&w.as_str()));
    }
  }

  #[test]
  fn static_mission_draws_from_pools() {
    let themes = pools::static_themes();
    let repertoires = pools::static_repertoires();
    let m = static_mission(&themes, &repertoires);

    assert_eq!(m.origin, MissionOrigin::Static);
    assert_eq!(m.status, MissionStatus::Pending);
    assert!(m.id > 0);
    assert!(themes.contains(&m.theme));
    assert!(repertoires.contains(&m.repertoire));
  }
}
