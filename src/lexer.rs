//! Lexical normalizer for mlogx
//!
//! Turns raw source lines into cleaned statement text and argument lists. Every scan here is
//! quote aware: comment markers and `;` inside a double-quoted string are plain text.
//! Argument splitting uses the `logos` token set in [`crate::token`].

use crate::token::ArgToken;
use logos::Logos;
use thiserror::Error;

/// Lexer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexerError {
    #[error("Unterminated string literal")]
    UnterminatedString,
}

/// Remove `//`, `#` and `/* ... */` comments from a line.
///
/// `/* ... */` spans are excised (only within this line), `//` and `#` truncate the rest of the
/// line. An unterminated `/*` also truncates.
pub fn remove_comments(line: &str) -> String {
    let bytes = line.as_bytes();
    let mut output = String::with_capacity(line.len());
    let mut in_string = false;
    let mut i = 0;
    let mut copied_from = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'"' && (i == 0 || bytes[i - 1] != b'\\') {
            in_string = !in_string;
            i += 1;
            continue;
        }
        if in_string {
            i += 1;
            continue;
        }
        if c == b'#' || bytes[i..].starts_with(b"//") {
            output.push_str(&line[copied_from..i]);
            return output;
        }
        if bytes[i..].starts_with(b"/*") {
            output.push_str(&line[copied_from..i]);
            match line[i + 2..].find("*/") {
                Some(end) => {
                    i += 2 + end + 2;
                    copied_from = i;
                    continue;
                }
                None => return output,
            }
        }
        i += 1;
    }
    output.push_str(&line[copied_from..]);
    output
}

/// Strip comments and surrounding whitespace
pub fn clean_line(line: &str) -> String {
    remove_comments(line).trim().to_string()
}

/// Split a statement into arguments on whitespace outside of double-quoted strings.
///
/// A quoted span stays a single argument with its quotes.
pub fn split_line_into_arguments(line: &str) -> Result<Vec<String>, LexerError> {
    let mut args: Vec<String> = Vec::new();
    let mut lexer = ArgToken::lexer(line);
    let mut last_end = None;

    while let Some(token) = lexer.next() {
        if token.is_err() {
            return Err(LexerError::UnterminatedString);
        }
        let span = lexer.span();
        let text = &line[span.clone()];
        match args.last_mut() {
            Some(last) if last_end == Some(span.start) => last.push_str(text),
            _ => args.push(text.to_string()),
        }
        last_end = Some(span.end);
    }

    Ok(args)
}

/// Split a line into statements on `;` outside of double-quoted strings.
///
/// Empty statements are dropped and each statement is trimmed.
pub fn split_line_on_semicolons(line: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut in_string = false;
    let mut start = 0;
    let mut previous = None;

    for (i, c) in line.char_indices() {
        match c {
            '"' if previous != Some('\\') => in_string = !in_string,
            ';' if !in_string => {
                statements.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        previous = Some(c);
    }
    statements.push(&line[start..]);

    statements
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The label defined by a line of the form `name:`, if any
pub fn get_jump_label(line: &str) -> Option<&str> {
    let label = line.strip_suffix(':')?;
    if label.is_empty() || label.contains(|c: char| c.is_whitespace() || c == '"' || c == ':') {
        return None;
    }
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_single_line_comments() {
        assert_eq!(remove_comments("amogus sussy //comment"), "amogus sussy ");
        assert_eq!(remove_comments("amogus sussy #comment"), "amogus sussy ");
        assert_eq!(remove_comments("//comment"), "");
        assert_eq!(remove_comments("amogus sussy#//#comment"), "amogus sussy");
    }

    #[test]
    fn test_remove_block_comments() {
        assert_eq!(remove_comments("amogus /*COMMENT*/sus"), "amogus sus");
        assert_eq!(remove_comments("amogus /*com*/sus/*ent*/ "), "amogus sus ");
        assert_eq!(remove_comments("amogus /*never closed"), "amogus ");
    }

    #[test]
    fn test_comments_inside_strings() {
        assert_eq!(remove_comments(r#"print "[#blue]amogus[]""#), r#"print "[#blue]amogus[]""#);
        assert_eq!(remove_comments(r#"print "amo//gus""#), r#"print "amo//gus""#);
        assert_eq!(remove_comments(r#"print "am/*og*/us""#), r#"print "am/*og*/us""#);
        assert_eq!(remove_comments(r#"print /*"a#m*/ogus """#), r#"print ogus """#);
    }

    #[test]
    fn test_clean_line() {
        assert_eq!(clean_line("set x 5"), "set x 5");
        assert_eq!(clean_line(" \tset x 5\t "), "set x 5");
        assert_eq!(clean_line("amogus /*com*/sus/*ent*/ "), "amogus sus");
        assert_eq!(clean_line("   \t say amogus /*#\"a*/nd\"\"#     \t\t  "), "say amogus nd\"\"");
    }

    #[test]
    fn test_clean_line_is_idempotent() {
        let lines = [
            "  set x 5 // five",
            "print \"a # b\" # c",
            "a /* b */ c /* d",
            "\t\"unterminated # string",
            "",
        ];
        for line in lines {
            let once = clean_line(line);
            assert_eq!(clean_line(&once), once, "{:?}", line);
        }
    }

    #[test]
    fn test_split_line_into_arguments() {
        assert_eq!(split_line_into_arguments("a b cd e").unwrap(), vec!["a", "b", "cd", "e"]);
        assert_eq!(
            split_line_into_arguments(r#"print "amogus sussy" and "a eea ""#).unwrap(),
            vec!["print", "\"amogus sussy\"", "and", "\"a eea \""]
        );
        assert_eq!(split_line_into_arguments(r#"print "a b" c"#).unwrap(), vec!["print", "\"a b\"", "c"]);
        assert_eq!(split_line_into_arguments(r#"a"b c"d"#).unwrap(), vec![r#"a"b c"d"#]);
    }

    #[test]
    fn test_split_unterminated_string() {
        assert_eq!(
            split_line_into_arguments(r#"print "amogus sussy" and "a eea '"#),
            Err(LexerError::UnterminatedString)
        );
    }

    #[test]
    fn test_split_join_is_stable() {
        let line = r#"ulocate building core true "out X" outY found building"#;
        let args = split_line_into_arguments(line).unwrap();
        assert_eq!(split_line_into_arguments(&args.join(" ")).unwrap(), args);
    }

    #[test]
    fn test_split_line_on_semicolons() {
        assert_eq!(split_line_on_semicolons("set z 98"), vec!["set z 98"]);
        assert_eq!(split_line_on_semicolons("set x 5; set y 6;"), vec!["set x 5", "set y 6"]);
        assert_eq!(split_line_on_semicolons(r#"print "a;b"; end"#), vec![r#"print "a;b""#, "end"]);
    }

    #[test]
    fn test_get_jump_label() {
        assert_eq!(get_jump_label("label:"), Some("label"));
        assert_eq!(get_jump_label("jump label greaterThan x 5"), None);
        assert_eq!(get_jump_label(":"), None);
        assert_eq!(get_jump_label("set x:"), None);
    }
}
