//! Label and message text.

/// Turns a field name into a display label: `date_of_birth` reads
/// `Date of birth`, and a trailing `_id` is dropped (`user_id` reads `User`).
///
/// ```
/// use nestform_core::utils::text::humanize;
///
/// assert_eq!(humanize("second_name"), "Second name");
/// assert_eq!(humanize("user_id"), "User");
/// ```
pub fn humanize(field: &str) -> String {
    let base = match field.strip_suffix("_id") {
        Some(stem) if !stem.is_empty() => stem,
        _ => field,
    };
    let mut label = String::with_capacity(base.len());
    for (idx, ch) in base.chars().enumerate() {
        match ch {
            '_' => label.push(' '),
            ch if idx == 0 => label.extend(ch.to_uppercase()),
            ch => label.push(ch),
        }
    }
    label
}

/// Fills `{name}` placeholders of a message template. Placeholders without
/// a value stay as they are.
///
/// ```
/// use nestform_core::utils::text::interpolate;
///
/// assert_eq!(interpolate("must be >= {n}", &[("n", "18")]), "must be >= 18");
/// ```
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut message = template.to_string();
    for (name, value) in params {
        message = message.replace(&format!("{{{name}}}"), value);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("name"), "Name");
        assert_eq!(humanize("date_of_birth"), "Date of birth");
        assert_eq!(humanize("éclair"), "Éclair");
        assert_eq!(humanize("id"), "Id");
        assert_eq!(humanize("_id"), " id");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_interpolate_leaves_unknown_placeholders() {
        assert_eq!(
            interpolate("{a} and {b} and {c}", &[("a", "1"), ("b", "2")]),
            "1 and 2 and {c}"
        );
    }
}
