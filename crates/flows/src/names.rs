//! Display-name canonicalization for country names found in source rows.

/// Official or long-form names mapped to the form shown in every view.
const CANONICAL_NAMES: &[(&str, &str)] = &[
    ("United States of America", "United States"),
    ("Korea, Republic of", "South Korea"),
    ("Republic of Korea", "South Korea"),
    ("Korea, Democratic People's Republic of", "North Korea"),
    ("Democratic People's Republic of Korea", "North Korea"),
    ("Venezuela, Bolivarian Republic of", "Venezuela"),
    ("Venezuela (Bolivarian Republic of)", "Venezuela"),
    ("Bolivia (Plurinational State of)", "Bolivia"),
    ("Russian Federation", "Russia"),
    ("Iran (Islamic Republic of)", "Iran"),
    ("Viet Nam", "Vietnam"),
    ("Syrian Arab Republic", "Syria"),
    ("United Kingdom of Great Britain and Northern Ireland", "United Kingdom"),
];

/// Strips footnote markers and whitespace, then applies the alias table.
pub fn canonical_country_name(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| *c != '*').collect();
    let cleaned = cleaned.trim();
    CANONICAL_NAMES
        .iter()
        .find(|(alias, _)| *alias == cleaned)
        .map_or_else(|| cleaned.to_string(), |(_, canonical)| (*canonical).to_string())
}
