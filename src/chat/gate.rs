use super::ChatError;

/// Normalize raw widget input before it becomes a `user` message.
///
/// Returns the trimmed text, or `InvalidMessage` when nothing is left.
pub fn accept_input(raw: &str) -> Result<&str, ChatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ChatError::InvalidMessage);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(accept_input("  こんにちは \n").unwrap(), "こんにちは");
    }

    #[test]
    fn keeps_inner_whitespace() {
        assert_eq!(accept_input(" a  b ").unwrap(), "a  b");
    }

    #[test]
    fn rejects_blank_input() {
        for raw in ["", " ", "\n\t", "\u{3000}"] {
            assert_eq!(accept_input(raw), Err(ChatError::InvalidMessage), "{raw:?}");
        }
    }
}
