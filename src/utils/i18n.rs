use tracing::warn;

/// Locale used when the configured one has no translations
pub const FALLBACK_LOCALE: &str = "en";

/// Switch display labels to `locale`, falling back to English
pub fn set_locale(locale: &str) {
    let available = rust_i18n::available_locales!();
    if available.iter().any(|l| *l == locale) {
        rust_i18n::set_locale(locale);
    } else {
        warn!(
            "Locale '{}' is not available ({}), using {}",
            locale,
            available.join(", "),
            FALLBACK_LOCALE
        );
        rust_i18n::set_locale(FALLBACK_LOCALE);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_bundled_locales() {
        let available = rust_i18n::available_locales!();
        assert!(available.contains(&"en"));
        assert!(available.contains(&"fi"));
    }
}
