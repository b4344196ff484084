//! Splitting of an input line into argument tokens.
//!
//! Tokens are separated by runs of the space character. There is no quoting,
//! escaping or variable expansion: every other byte, `|` included, is part of a
//! token.

use log::debug;

/// Maximum number of arguments a single program invocation can receive.
pub const MAX_ARGS: usize = 10;

const DELIMITER: char = ' ';

/// Split `line` into owned, non-empty tokens.
///
/// Leading, trailing and repeated spaces never produce empty tokens, so a blank
/// line yields an empty vector. Tokens past [`MAX_ARGS`] are dropped.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    let mut tokens = line.split(DELIMITER).filter(|token| !token.is_empty());
    let argv: Vec<String> = tokens.by_ref().take(MAX_ARGS).map(str::to_owned).collect();

    let dropped = tokens.count();
    if dropped > 0 {
        debug!("argument list truncated to {MAX_ARGS}, {dropped} token(s) dropped");
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrounding_and_repeated_spaces_are_skipped() {
        assert_eq!(split_into_tokens("  ls   -la "), vec!["ls", "-la"]);
    }

    #[test]
    fn test_blank_lines_have_no_tokens() {
        assert!(split_into_tokens("").is_empty());
        assert!(split_into_tokens("     ").is_empty());
    }

    #[test]
    fn test_pipe_is_not_a_delimiter() {
        assert_eq!(split_into_tokens("a|b"), vec!["a|b"]);
    }

    #[test]
    fn test_tabs_stay_inside_tokens() {
        assert_eq!(split_into_tokens("echo\ta b"), vec!["echo\ta", "b"]);
    }

    #[test]
    fn test_too_many_arguments_are_truncated() {
        let line = (0..15).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let tokens = split_into_tokens(&line);

        assert_eq!(tokens.len(), MAX_ARGS);
        assert_eq!(tokens.first().map(String::as_str), Some("0"));
        assert_eq!(tokens.last().map(String::as_str), Some("9"));
    }
}
