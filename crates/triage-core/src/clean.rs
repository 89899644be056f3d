//! Merchant name cleaning
//!
//! Turns a raw bank-statement description into a display candidate by
//! stripping reference numbers, payment-processor prefixes, domain suffixes
//! and user-configured noise ("anti-rules").
//!
//! Cleaning is idempotent: `clean(clean(x)) == clean(x)`. The steps are
//! applied repeatedly until the output stops changing, which guarantees the
//! property even when one step exposes work for an earlier one.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::config::LEGACY_NOISE_PREFIXES;
use crate::error::Result;

/// Leading "<digits><separator>" reference numbers, however many are stacked
static LEADING_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+[\s\-/:#.]+)+").expect("valid regex"));

/// Trailing "<separator><digits>" reference numbers, however many are stacked
static TRAILING_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[\s\-/:#.]+\d+)+$").expect("valid regex"));

/// Standalone run of 4+ digits, with the whitespace around it
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\b\d{4,}\b\s*").expect("valid regex"));

/// One or more stacked domain suffixes
static DOMAIN_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\.(?:co\.uk|com|dk|net|org))+$").expect("valid regex")
});

/// Compile a noise filter as a case-insensitive literal
pub fn compile_noise_filter(filter: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("(?i){}", regex::escape(filter)))?)
}

/// Name cleaner with pre-compiled noise filters
#[derive(Debug, Clone)]
pub struct NameCleaner {
    noise_filters: Vec<Regex>,
    legacy_prefixes: Vec<String>,
}

impl Default for NameCleaner {
    fn default() -> Self {
        Self::new(&[] as &[String])
    }
}

impl NameCleaner {
    /// Create a cleaner with the built-in legacy prefixes
    ///
    /// Filters that are blank or fail to compile are skipped with a warning.
    pub fn new<S: AsRef<str>>(noise_filters: &[S]) -> Self {
        let prefixes: Vec<String> = LEGACY_NOISE_PREFIXES
            .iter()
            .map(|p| p.to_string())
            .collect();
        Self::with_prefixes(noise_filters, &prefixes)
    }

    /// Create a cleaner with an explicit legacy prefix list
    pub fn with_prefixes<S: AsRef<str>>(noise_filters: &[S], legacy_prefixes: &[String]) -> Self {
        let noise_filters = noise_filters
            .iter()
            .map(AsRef::as_ref)
            .filter(|f| !f.trim().is_empty())
            .filter_map(|filter| match compile_noise_filter(filter) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Skipping noise filter '{}': {}", filter, e);
                    None
                }
            })
            .collect();

        Self {
            noise_filters,
            legacy_prefixes: legacy_prefixes
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Number of noise filters that compiled
    pub fn filter_count(&self) -> usize {
        self.noise_filters.len()
    }

    /// Clean a raw merchant/source string (may return an empty string)
    pub fn clean(&self, raw: &str) -> String {
        // A pass never lengthens the string, and a pass that keeps the
        // length only rewrites whitespace, which the next pass leaves alone
        let mut current = raw.to_string();
        loop {
            let next = self.clean_pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn clean_pass(&self, raw: &str) -> String {
        // 1. Merchant code separators
        let mut end = raw.len();
        if let Some(pos) = raw.find('*') {
            end = end.min(pos);
        }
        if let Some(pos) = raw.find("  ") {
            end = end.min(pos);
        }
        let mut s = raw[..end].to_string();

        // 2. User noise filters
        for re in &self.noise_filters {
            s = re.replace_all(&s, "").into_owned();
        }

        // 3. Payment-processor prefixes
        let trimmed = s.trim_start();
        s = match self
            .legacy_prefixes
            .iter()
            .find_map(|prefix| strip_prefix_ignore_case(trimmed, prefix))
        {
            Some(rest) => rest.to_string(),
            None => trimmed.to_string(),
        };

        // 4. Reference numbers at either end
        s = LEADING_REFERENCE.replace(s.trim(), "").into_owned();
        s = TRAILING_REFERENCE.replace(s.trim(), "").into_owned();

        // 5. Reference numbers mid-string
        s = DIGIT_RUN.replace_all(&s, " ").into_owned();

        // 6. Domain suffix
        s = DOMAIN_SUFFIX.replace(s.trim(), "").into_owned();

        // 7. Whitespace
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Clean a raw merchant/source string with the given noise filters
pub fn clean<S: AsRef<str>>(raw: &str, noise_filters: &[S]) -> String {
    NameCleaner::new(noise_filters).clean(raw)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_plain(raw: &str) -> String {
        clean(raw, &[] as &[&str])
    }

    #[test]
    fn test_truncates_at_star_and_double_space() {
        assert_eq!(clean_plain("NETFLIX*12345 REF"), "NETFLIX");
        assert_eq!(clean_plain("SPOTIFY  STOCKHOLM SE"), "SPOTIFY");
    }

    #[test]
    fn test_noise_filters_are_literal_and_case_insensitive() {
        assert_eq!(clean("Netto (F) Aarhus", &["(f)"]), "Netto Aarhus");
        // A regex metacharacter in a filter is matched literally
        assert_eq!(clean("COOP.+ SUPER", &[".+"]), "COOP SUPER");
        assert_eq!(clean("COOP SUPER", &[".+"]), "COOP SUPER");
    }

    #[test]
    fn test_blank_filters_are_skipped() {
        let cleaner = NameCleaner::new(&["", "   ", "MOBILEPAY"]);
        assert_eq!(cleaner.filter_count(), 1);
    }

    #[test]
    fn test_legacy_prefixes() {
        assert_eq!(clean_plain("MobilePay Lunchbox"), "Lunchbox");
        assert_eq!(clean_plain("VISA/DANKORT Irma"), "Irma");
    }

    #[test]
    fn test_reference_numbers() {
        assert_eq!(clean_plain("12345 - NETTO"), "NETTO");
        assert_eq!(clean_plain("NETTO - 998877"), "NETTO");
        assert_eq!(clean_plain("SHELL 88776655 AARHUS"), "SHELL AARHUS");
        assert_eq!(clean_plain("7 ELEVEN"), "ELEVEN");
        // Short numbers mid-string and digits inside words stay
        assert_eq!(clean_plain("XKQJ9384"), "XKQJ9384");
        assert_eq!(clean_plain("CAFE 42 CORNER"), "CAFE 42 CORNER");
    }

    #[test]
    fn test_domain_suffix() {
        assert_eq!(clean_plain("NETFLIX.COM 8887050800"), "NETFLIX");
        assert_eq!(clean_plain("zalando.dk"), "zalando");
        assert_eq!(clean_plain("Deliveroo.co.uk"), "Deliveroo");
        assert_eq!(clean_plain("github.io"), "github.io");
    }

    #[test]
    fn test_pure_noise_yields_empty() {
        assert_eq!(clean_plain("   "), "");
        assert_eq!(clean_plain("*12345"), "");
        assert_eq!(clean_plain("88887777"), "");
        assert_eq!(clean("MOBILEPAY", &["mobilepay"]), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "NETFLIX.COM 8887050800",
            "FOO 1234 BAR 5678",
            "12 - 34 - SHOP",
            "A NOISE B",
            "PAYPAL *SPOTIFY",
            "shop.com.com",
            "  leading and trailing  ",
            "Ærø Købmand 4455",
            "MOBILEPAY MOBILEPAY KIOSK",
            "",
        ]
        .map(String::from)
        .into_iter()
        .chain([
            format!("SHOP {}", (1..=20).map(|n| n.to_string()).collect::<Vec<_>>().join(" ")),
            format!("shop{}", ".com".repeat(20)),
            format!("{}SHOP", "1 - ".repeat(20)),
        ])
        .collect::<Vec<_>>();
        let cleaner = NameCleaner::new(&["noise"]);
        for input in &inputs {
            let once = cleaner.clean(input);
            let twice = cleaner.clean(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_stacked_references_and_suffixes() {
        let refs: Vec<String> = (1..=20).map(|n| n.to_string()).collect();
        let numbered = format!("SHOP {}", refs.join(" "));
        assert_eq!(clean_plain(&numbered), "SHOP");
        assert_eq!(clean_plain(&format!("shop{}", ".com".repeat(20))), "shop");
        assert_eq!(clean_plain("shop.co.uk.com"), "shop");
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        assert_eq!(clean_plain("Café Ørsted"), "Café Ørsted");
        assert_eq!(clean_plain("ÆØÅ"), "ÆØÅ");
    }
}
