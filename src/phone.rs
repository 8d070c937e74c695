//! Phone label cleanup and canonicalization.
//!
//! The feed exposes phone numbers through accessibility labels such as
//! "Phone: +1 661-335-6060" or "Telepon: +62 812-3456-789". This module is a
//! pure text pipeline so the behavior stays testable without a live session.

use std::str::FromStr;

use phonenumber::{Mode, country};
use tracing::warn;

/// Normalizes raw phone labels into dialable numbers.
///
/// Numbers without a leading `+` are parsed against the configured fallback
/// region; valid numbers come back in E.164, anything unparseable keeps its
/// original separators.
#[derive(Debug, Clone, Copy)]
pub struct PhoneNormalizer {
    region: Option<country::Id>,
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self {
            region: Some(country::Id::US),
        }
    }
}

impl PhoneNormalizer {
    pub fn new(region: Option<&str>) -> Self {
        let region = region.and_then(|code| match country::Id::from_str(code) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!("unknown phone region '{code}', canonicalizing only +prefixed numbers");
                None
            }
        });
        Self { region }
    }

    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        let stripped = strip_label(trimmed);
        match extract_candidate(stripped) {
            Some(candidate) => self
                .canonicalize(candidate)
                .unwrap_or_else(|| candidate.to_string()),
            // Nothing phone-shaped left; collapse whitespace and hand back
            // whatever remains.
            None => stripped.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }

    fn canonicalize(&self, candidate: &str) -> Option<String> {
        let region = if candidate.starts_with('+') {
            None
        } else {
            self.region
        };
        let parsed = phonenumber::parse(region, candidate).ok()?;
        phonenumber::is_valid(&parsed)
            .then(|| parsed.format().mode(Mode::E164).to_string())
    }
}

/// Drop a leading label such as "Phone:", "Tel -", "Call" or a bare word
/// run. The leading run can only hold letters and whitespace, so a real
/// number (digits or `+`) is never stripped.
fn strip_label(raw: &str) -> &str {
    let label_end = raw
        .char_indices()
        .find(|(_, c)| !(c.is_alphabetic() || c.is_whitespace()))
        .map_or(raw.len(), |(i, _)| i);
    if label_end == 0 {
        return raw;
    }
    let mut rest = &raw[label_end..];
    if let Some(tail) = rest.strip_prefix([':', '-']) {
        rest = tail;
    }
    rest.trim_start()
}

/// First maximal phone-shaped substring: starts at a digit or `+` and runs
/// over digits, whitespace, `-`, `(`, `)`, `.`, `/` and `+`.
fn extract_candidate(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit() || c == '+')?;
    let tail = &text[start..];
    let mut end = 0;
    for (i, c) in tail.char_indices() {
        if c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '(' | ')' | '.' | '/') {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    // A lone digit or `+` is not a number.
    if end <= 1 {
        return None;
    }
    Some(tail[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn digits(value: &str) -> String {
        value.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    #[test]
    fn canonicalizes_labeled_us_number() {
        let normalizer = PhoneNormalizer::default();
        let out = normalizer.normalize("Phone: +1 661-335-6060");
        assert_eq!(out, "+16613356060");
        assert_eq!(digits(&out), "16613356060");
    }

    #[test]
    fn label_only_input_is_empty() {
        assert_eq!(PhoneNormalizer::default().normalize("Phone:"), "");
    }

    #[test]
    fn call_prefix_keeps_exact_digits() {
        let out = PhoneNormalizer::default().normalize("Call: (555) 123-4567");
        assert_eq!(digits(&out), "5551234567");
    }

    #[test]
    fn text_without_digits_is_empty() {
        assert_eq!(PhoneNormalizer::default().normalize("ask at the counter"), "");
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(PhoneNormalizer::default().normalize("   "), "");
    }

    #[test]
    fn only_first_number_is_extracted() {
        let out = PhoneNormalizer::default().normalize("Phone: 555-0100, 555-0199");
        assert_eq!(out, "555-0100");
    }

    #[test]
    fn plus_number_parses_without_region() {
        let normalizer = PhoneNormalizer::new(None);
        assert_eq!(normalizer.normalize("+1 661-335-6060"), "+16613356060");
    }

    #[test]
    fn unknown_region_falls_back_to_extraction() {
        let normalizer = PhoneNormalizer::new(Some("not-a-region"));
        assert_eq!(normalizer.normalize("661-335-6060"), "661-335-6060");
    }

    #[test]
    fn indonesian_label_is_stripped() {
        let out = PhoneNormalizer::default().normalize("Telepon: 0812-3456-789");
        assert_eq!(digits(&out), "08123456789");
    }

    #[test]
    fn idempotent_over_sampled_inputs() {
        let normalizer = PhoneNormalizer::default();
        for input in [
            "Phone: +1 661-335-6060",
            "Call: (555) 123-4567",
            "Phone:",
            "no number here",
            "P: +1 (555) 123-4567",
            "0812-3456-789",
        ] {
            let once = normalizer.normalize(input);
            assert_eq!(normalizer.normalize(&once), once, "input: {input}");
        }
    }
}
