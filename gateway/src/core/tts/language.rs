//! Locale code to synthesis-service language name lookup.

use phf::phf_map;

/// Language used for any locale the service does not know.
pub const DEFAULT_LANGUAGE: &str = "English";

static LANGUAGES: phf::Map<&'static str, &'static str> = phf_map! {
    "as" => "Assamese",
    "bn" => "Bengali",
    "bo" => "Bodo",
    "dog" => "Dogri",
    "en" => "English",
    "gu" => "Gujarati",
    "hi" => "Hindi",
    "kn" => "Kannada",
    "ks" => "Kashmiri",
    "kk" => "Konkani",
    "mai" => "Maithili",
    "ml" => "Malayalam",
    "mni" => "Manipuri",
    "mr" => "Marathi",
    "ne" => "Nepali",
    "or" => "Odia",
    "pa" => "Punjabi",
    "sa" => "Sanskrit",
    "san" => "Santali",
    "sd" => "Sindhi",
    "ta" => "Tamil",
    "te" => "Telugu",
    "ur" => "Urdu",
};

/// Resolve a locale code (`kn`, `KN`, `kn-IN`, `hi_IN`) to the language name
/// the synthesis service expects. Unknown codes resolve to English.
pub fn resolve_language(code: &str) -> &'static str {
    let normalized = code.trim().to_ascii_lowercase();
    if let Some(name) = LANGUAGES.get(normalized.as_str()) {
        return name;
    }

    normalized
        .split(['-', '_'])
        .next()
        .and_then(|base| LANGUAGES.get(base))
        .copied()
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Whether the code (or its base code) is in the table.
pub fn is_supported(code: &str) -> bool {
    let normalized = code.trim().to_ascii_lowercase();
    LANGUAGES.contains_key(normalized.as_str())
        || normalized
            .split(['-', '_'])
            .next()
            .is_some_and(|base| LANGUAGES.contains_key(base))
}

/// All supported codes, sorted.
pub fn supported_codes() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = LANGUAGES.keys().copied().collect();
    codes.sort_unstable();
    codes
}
