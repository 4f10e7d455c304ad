//! Country name → ISO 3166-1 alpha-2 mapping for provider queries.

const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("united states", "us"),
    ("united states of america", "us"),
    ("usa", "us"),
    ("canada", "ca"),
    ("netherlands", "nl"),
    ("united arab emirates", "ae"),
    ("uae", "ae"),
    ("united kingdom", "gb"),
    ("uk", "gb"),
    ("great britain", "gb"),
    ("england", "gb"),
    ("germany", "de"),
    ("france", "fr"),
    ("india", "in"),
    ("singapore", "sg"),
    ("australia", "au"),
];

/// Lowercase two-letter code, or `None` when the country is blank or unknown.
/// Any two-letter alphabetic input is assumed to already be a code.
pub fn country_code(country: Option<&str>) -> Option<String> {
    let cleaned = country?.trim().to_lowercase();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.chars().count() == 2 && cleaned.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(cleaned);
    }
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == cleaned)
        .map(|(_, code)| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_aliases_map_to_us() {
        for input in ["United States", "USA", "us", "  united states of america "] {
            assert_eq!(country_code(Some(input)).as_deref(), Some("us"), "{input}");
        }
    }

    #[test]
    fn test_two_letter_codes_pass_through() {
        assert_eq!(country_code(Some("DE")).as_deref(), Some("de"));
        assert_eq!(country_code(Some("mx")).as_deref(), Some("mx"));
    }

    #[test]
    fn test_unknown_country_yields_none() {
        assert_eq!(country_code(Some("Atlantis")), None);
        assert_eq!(country_code(Some("u5")), None);
    }

    #[test]
    fn test_blank_or_missing_yields_none() {
        assert_eq!(country_code(None), None);
        assert_eq!(country_code(Some("   ")), None);
    }
}
