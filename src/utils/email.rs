/// Trimmed, lower-cased form used as the record key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Case-insensitive suffix match against the institutional student domain,
/// e.g. `@my.unt.edu`. Staff addresses (`@unt.edu`) do not qualify.
pub fn is_student_email(email: &str, suffix: &str) -> bool {
    let normalized = normalize_email(email);
    let suffix = suffix.trim().to_lowercase();
    normalized.len() > suffix.len() && normalized.ends_with(&suffix)
}
