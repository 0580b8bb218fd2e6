//! Display-name to URL-safe slug normalization.
use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Normalize a display name into a `[a-z0-9-]` token: lowercase, drop
/// disallowed characters, collapse whitespace and hyphen runs to single
/// hyphens, trim hyphens at the ends. Pure and idempotent.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = DISALLOWED.replace_all(lowered.trim(), "");
    let hyphenated = WHITESPACE.replace_all(&stripped, "-");
    let collapsed = HYPHEN_RUN.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_collapses_spaces() {
        assert_eq!(slugify("O'Brien's Pub & Grill!"), "obriens-pub-grill");
        assert_eq!(slugify("  Lots   Of   Spaces  "), "lots-of-spaces");
        assert_eq!(slugify("Già Caffè"), "gi-caff");
    }

    #[test]
    fn collapses_hyphen_runs_and_trims() {
        assert_eq!(slugify("--already -- hyphenated--"), "already-hyphenated");
        assert_eq!(slugify("a - b"), "a-b");
    }

    #[test]
    fn degenerate_inputs_slug_to_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn idempotent_and_well_formed() {
        for name in ["Joe's Diner", "ACME Corp.", "x", "A&B  C--D", "日本語 Cafe"] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once);
            if !once.is_empty() {
                assert!(once
                    .split('-')
                    .all(|seg| !seg.is_empty()
                        && seg.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())));
            }
        }
    }
}
