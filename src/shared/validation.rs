use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating category and subcategory slugs
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "pain-relief", "vitamins", "baby-care-0-6m"
    /// - Invalid: "-pain", "pain-", "pain--relief", "Pain", "pain_relief"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Derive a slug from a display name ("Cold & Flu" -> "cold-flu")
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
