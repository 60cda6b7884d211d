//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let cut = s
      .char_indices()
      .take_while(|(i, _)| *i < max)
      .last()
      .map(|(i, c)| i + c.len_utf8())
      .unwrap_or(0);
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

/// Strip an optional `data:<mime>;base64,` prefix from a browser-produced
/// data URI, returning only the base64 payload.
pub fn strip_data_uri(s: &str) -> &str {
  match s.find("base64,") {
    Some(idx) => &s[idx + "base64,".len()..],
    None => s,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_replaces_all_occurrences() {
    let out = fill_template("{a} e {b} e {a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x e y e x");
  }

  #[test]
  fn data_uri_prefix_is_stripped() {
    assert_eq!(strip_data_uri("data:image/jpeg;base64,QUJD"), "QUJD");
    assert_eq!(strip_data_uri("QUJD"), "QUJD");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let s = "redação longa demais";
    let t = trunc_for_log(s, 8);
    assert!(t.starts_with("redaç"));
    assert!(t.contains("bytes total"));
  }
}
