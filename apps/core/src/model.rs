#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub value: String,
    pub description: Option<String>,
}

impl Entry {
    pub fn new(value: &str, description: &str) -> Self {
        Self::from_owned(value.to_string(), Some(description.to_string()))
    }

    pub fn bare(value: &str) -> Self {
        Self::from_owned(value.to_string(), None)
    }

    pub fn from_owned(value: String, description: Option<String>) -> Self {
        Self { value, description }
    }
}

pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.chars()
        .flat_map(char::to_lowercase)
        .eq(right.chars().flat_map(char::to_lowercase))
}

/// Returns the part of `text` after `prefix`, comparing case-insensitively.
pub fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut end = 0;
    for expected in prefix.chars() {
        let actual = text[end..].chars().next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        end += actual.len_utf8();
    }
    Some(&text[end..])
}

/// Splits a command on its first space into `(prefix, remainder)`.
pub fn split_command(command: &str) -> (&str, Option<&str>) {
    match command.split_once(' ') {
        Some((head, rest)) => (head, Some(rest)),
        None => (command, None),
    }
}

#[cfg(test)]
mod tests {
    use super::{eq_ignore_case, split_command, strip_prefix_ignore_case};

    #[test]
    fn strips_prefix_regardless_of_case() {
        assert_eq!(strip_prefix_ignore_case("WEB youtube", "web "), Some("youtube"));
        assert_eq!(strip_prefix_ignore_case("web", "web "), None);
        assert_eq!(strip_prefix_ignore_case("wex yo", "web "), None);
        assert_eq!(strip_prefix_ignore_case("Ärger los", "är"), Some("ger los"));
    }

    #[test]
    fn splits_on_first_space_only() {
        assert_eq!(split_command("search rust books"), ("search", Some("rust books")));
        assert_eq!(split_command("run"), ("run", None));
        assert_eq!(split_command("run "), ("run", Some("")));
    }

    #[test]
    fn case_insensitive_equality_handles_unicode() {
        assert!(eq_ignore_case("YouTube", "youtube"));
        assert!(eq_ignore_case("ÉCLAIR", "éclair"));
        assert!(!eq_ignore_case("you", "youtube"));
    }
}
