use thiserror::Error;

/// Upper bound for message titles and contents, in characters.
pub const MAX_FIELD_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title and content are required")]
    EmptyField,

    #[error("title and content must be at most {max} characters")]
    TooLong { max: usize },

    #[error("search query is empty")]
    EmptyQuery,
}

/// A title/content pair that passed validation. The message store expects
/// every write to go through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInput {
    pub title: String,
    pub content: String,
}

impl MessageInput {
    /// Trims both fields, then requires 1..=MAX_FIELD_CHARS characters each.
    pub fn parse(title: &str, content: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        let content = content.trim();

        if title.is_empty() || content.is_empty() {
            return Err(ValidationError::EmptyField);
        }
        if title.chars().count() > MAX_FIELD_CHARS || content.chars().count() > MAX_FIELD_CHARS {
            return Err(ValidationError::TooLong { max: MAX_FIELD_CHARS });
        }

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
        })
    }
}

/// Trimmed, non-empty search term.
pub fn search_term(raw: Option<&str>) -> Result<&str, ValidationError> {
    match raw.map(str::trim) {
        Some(term) if !term.is_empty() => Ok(term),
        _ => Err(ValidationError::EmptyQuery),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_trimmed_input() {
        let input = MessageInput::parse("  hello ", "world\n").unwrap();
        assert_eq!(input.title, "hello");
        assert_eq!(input.content, "world");
    }

    #[test]
    fn rejects_empty_and_blank_fields() {
        assert_eq!(MessageInput::parse("", "x"), Err(ValidationError::EmptyField));
        assert_eq!(MessageInput::parse("x", "   "), Err(ValidationError::EmptyField));
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 20 multi-byte characters fit, 21 do not
        let twenty = "あ".repeat(20);
        let twenty_one = "あ".repeat(21);
        assert!(MessageInput::parse(&twenty, "テスト内容").is_ok());
        assert_eq!(
            MessageInput::parse(&twenty_one, "x"),
            Err(ValidationError::TooLong { max: MAX_FIELD_CHARS })
        );
        assert_eq!(
            MessageInput::parse("x", &"a".repeat(21)),
            Err(ValidationError::TooLong { max: MAX_FIELD_CHARS })
        );
    }

    #[test]
    fn search_term_requires_text() {
        assert_eq!(search_term(Some("  ABC ")), Ok("ABC"));
        assert_eq!(search_term(Some("   ")), Err(ValidationError::EmptyQuery));
        assert_eq!(search_term(None), Err(ValidationError::EmptyQuery));
    }
}
