use isolang::Language;

/// Language utilities for target language handling
///
/// The user names the target language as an ISO 639-1 or 639-2 code, a
/// region tag such as `es-ES`, or an English name. Prompts need the English
/// name; the XLIFF `target-language` attribute needs a code.
/// Normalized target language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLanguage {
    /// English name used in prompts
    pub name: String,
    /// Code written to the file
    pub code: String,
}

/// Map an ISO 639-2/B code to its 639-2/T form
fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    let part2t = match code {
        "fre" => "fra", // French
        "ger" => "deu", // German
        "dut" => "nld", // Dutch
        "gre" => "ell", // Greek
        "chi" => "zho", // Chinese
        "cze" => "ces", // Czech
        "ice" => "isl", // Icelandic
        "alb" => "sqi", // Albanian
        "arm" => "hye", // Armenian
        "baq" => "eus", // Basque
        "bur" => "mya", // Burmese
        "per" => "fas", // Persian
        "geo" => "kat", // Georgian
        "may" => "msa", // Malay
        "mac" => "mkd", // Macedonian
        "rum" => "ron", // Romanian
        "slo" => "slk", // Slovak
        "wel" => "cym", // Welsh
        _ => return None,
    };
    Some(part2t)
}

/// Find the language for a code, a region tag, or an English name
pub fn lookup_language(input: &str) -> Option<Language> {
    let trimmed = input.trim();
    let primary = trimmed
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let by_code = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary)
            .or_else(|| part2b_to_part2t(&primary).and_then(Language::from_639_3)),
        _ => None,
    };

    by_code.or_else(|| Language::from_name(&capitalize(trimmed)))
}

/// Code written to the file: 639-1 where one exists, otherwise 639-3
pub fn language_code(language: Language) -> String {
    language
        .to_639_1()
        .unwrap_or_else(|| language.to_639_3())
        .to_string()
}

/// Normalize user input into a prompt name and a file code.
///
/// Unknown input keeps the input as the code and capitalizes its first
/// letter for the name.
pub fn normalize_language(input: &str) -> TargetLanguage {
    match lookup_language(input) {
        Some(language) => TargetLanguage {
            name: language.to_name().to_string(),
            code: language_code(language),
        },
        None => TargetLanguage {
            name: capitalize(input.trim()),
            code: input.trim().to_string(),
        },
    }
}

/// Uppercase the first character, lowercase nothing else
fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
