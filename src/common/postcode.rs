// src/common/postcode.rs

use regex::Regex;
use std::sync::LazyLock;

// Outward code (area + district) followed by the inward code (sector + unit),
// with or without the separating space. Matches e.g. "LS1 4DT", "sw19 2aa".
static POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Z]{1,2}[0-9][A-Z0-9]?)\s*([0-9][A-Z]{2})\b")
        .expect("postcode regex is valid")
});

/// Extracts the first UK postcode found in a free-text address, normalised
/// to upper case with a single separating space. Returns `None` when the
/// address contains nothing postcode-shaped.
pub fn extract_postcode(address: &str) -> Option<String> {
    POSTCODE_RE.captures(address).map(|caps| {
        format!(
            "{} {}",
            caps[1].to_uppercase(),
            caps[2].to_uppercase()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_postcode_from_full_address() {
        let address = "14 Harrogate Road, Leeds, LS7 3PD";
        assert_eq!(extract_postcode(address), Some("LS7 3PD".to_string()));
    }

    #[test]
    fn normalises_case_and_spacing() {
        assert_eq!(extract_postcode("flat 2, sw19 2aa"), Some("SW19 2AA".to_string()));
        assert_eq!(extract_postcode("Unit 5 YO318JF"), Some("YO31 8JF".to_string()));
    }

    #[test]
    fn handles_short_and_long_outward_codes() {
        assert_eq!(extract_postcode("1 High St, M1 1AE"), Some("M1 1AE".to_string()));
        assert_eq!(extract_postcode("The Mews, EC1A 1BB"), Some("EC1A 1BB".to_string()));
    }

    #[test]
    fn returns_none_without_a_postcode() {
        assert_eq!(extract_postcode("22 Acacia Avenue, Huddersfield"), None);
        assert_eq!(extract_postcode(""), None);
    }
}
