//! Species name heuristics: display-name derivation and hybrid detection.

use regex::Regex;
use std::sync::LazyLock;

/// Patterns identifying hybrid species names, e.g.
/// "Mallard x American Black Duck", "Some Bird (hybrid)", "hybrid gull".
static HYBRID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\s+x\s+").unwrap(),
        Regex::new(r"(?i)\(hybrid\)").unwrap(),
        Regex::new(r"(?i)^hybrid\s+").unwrap(),
    ]
});

static TRAILING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+$").unwrap());

/// Best-effort human-readable name derived from a species code.
///
/// Strips trailing digits and title-cases the remainder, e.g.
/// `"mallar3"` -> `"Mallar"`. Returns `None` when the code is too short to
/// carry a usable name part.
pub fn derive_common_name(species_code: &str) -> Option<String> {
    if species_code.len() <= 3 {
        return None;
    }

    let name_part = TRAILING_DIGITS.replace(species_code, "");
    if name_part.len() < 3 {
        return None;
    }

    let mut chars = name_part.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().collect::<String>() + chars.as_str())
}

/// True when either name matches a hybrid pattern.
///
/// Hybrids rarely have dedicated entries in the image sources, so the
/// worker skips the external lookup for them entirely.
pub fn is_hybrid_species(com_name: &str, sci_name: &str) -> bool {
    HYBRID_PATTERNS
        .iter()
        .any(|p| p.is_match(com_name) || p.is_match(sci_name))
}
