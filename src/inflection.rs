//! English inflection helpers used for route segments, definition names and tags.

/// Words that have no distinct plural form.
const UNCOUNTABLE: &[&str] = &[
    "data",
    "deer",
    "equipment",
    "feedback",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

/// Irregular singular -> plural pairs (lowercase).
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("man", "men"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("tooth", "teeth"),
    ("wife", "wives"),
    ("woman", "women"),
];

/// Returns the plural form of `word`, keeping the casing of the input.
///
/// ```
/// use blueprint_swagger::inflection::pluralize;
///
/// assert_eq!(pluralize("Pet"), "Pets");
/// assert_eq!(pluralize("bus"), "buses");
/// assert_eq!(pluralize("Category"), "Categories");
/// ```
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return match_case(word, plural);
    }

    if is_plural(&lower) {
        return word.to_string();
    }

    let upper = word.chars().all(|c| !c.is_lowercase());
    let suffix = if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        "es"
    } else if lower.ends_with('y') && !ends_with_vowel_y(&lower) {
        let stem = &word[..word.len() - 1];
        return format!("{}{}", stem, if upper { "IES" } else { "ies" });
    } else {
        "s"
    };

    if upper {
        format!("{}{}", word, suffix.to_uppercase())
    } else {
        format!("{}{}", word, suffix)
    }
}

/// Uppercases the first character of `word`.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Already-plural forms: irregular plurals, `-ies`, sibilant `-es`, and a trailing `s`
/// that is not part of `-ss`, `-us` or `-is`.
fn is_plural(lower: &str) -> bool {
    if IRREGULAR.iter().any(|(_, plural)| *plural == lower) {
        return true;
    }
    if ["ies", "ses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|end| lower.ends_with(end))
    {
        return true;
    }
    lower.ends_with('s') && !["ss", "us", "is"].iter().any(|end| lower.ends_with(end))
}

fn ends_with_vowel_y(lower: &str) -> bool {
    let mut rev = lower.chars().rev();
    rev.next();
    matches!(rev.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

/// Applies the casing of `original` to `replacement`.
fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().all(|c| !c.is_lowercase()) {
        replacement.to_uppercase()
    } else if original.chars().next().is_some_and(char::is_uppercase) {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(pluralize("pet"), "pets");
        assert_eq!(pluralize("Owner"), "Owners");
        assert_eq!(pluralize("user"), "users");
    }

    #[test]
    fn test_sibilant_endings() {
        assert_eq!(pluralize("bus"), "buses");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("wish"), "wishes");
    }

    #[test]
    fn test_y_endings() {
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("toy"), "toys");
    }

    #[test]
    fn test_irregular_and_uncountable() {
        assert_eq!(pluralize("Person"), "People");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("sheep"), "sheep");
        assert_eq!(pluralize("Data"), "Data");
    }

    #[test]
    fn test_upper_case_is_preserved() {
        assert_eq!(pluralize("API"), "APIS");
        assert_eq!(pluralize("CITY"), "CITIES");
        assert_eq!(pluralize("MOUSE"), "MICE");
    }

    #[test]
    fn test_distinct_words_can_share_a_plural() {
        assert_eq!(pluralize("Bus"), "Buses");
        assert_eq!(pluralize("Buse"), "Buses");
    }

    #[test]
    fn test_plural_input_is_unchanged() {
        assert_eq!(pluralize("pets"), "pets");
        assert_eq!(pluralize("Buses"), "Buses");
        assert_eq!(pluralize("categories"), "categories");
        assert_eq!(pluralize("People"), "People");
        assert_eq!(pluralize("boxes"), "boxes");
        assert_eq!(pluralize(&pluralize("Owner")), "Owners");
    }

    #[test]
    fn test_singular_s_endings_still_pluralize() {
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("class"), "classes");
    }

    #[test]
    fn test_empty_word() {
        assert_eq!(pluralize(""), "");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("pet"), "Pet");
        assert_eq!(capitalize("Pet"), "Pet");
        assert_eq!(capitalize("petOwner"), "PetOwner");
    }
}
