//! Token definitions for mlogx
//!
//! mlogx statements are whitespace-delimited argument lists, so there are two small token sets:
//! [`ArgToken`] splits a statement into arguments, and [`Shape`] classifies a single argument by
//! its structural form (the regular-expression half of argument type validation).

use logos::Logos;
use std::fmt;

/// Pieces of a statement produced while splitting it into arguments.
///
/// Adjacent pieces with no whitespace between them belong to the same argument, so
/// `a"b c"d` is a single argument.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum ArgToken {
    /// A double-quoted span, quotes included: "hello world"
    #[regex(r#""([^"\\]|\\.)*""#)]
    Quoted,

    /// Anything else up to whitespace or a quote
    #[regex(r#"[^ \t\r\n\f"]+"#)]
    Bare,
}

/// The structural shape of a single argument
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// String literal: "text"
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    /// Number literal: 5, -50.2, 1e3, 0x1F, 0b101, %ff0000 (packed color)
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xX][0-9a-fA-F]+")]
    #[regex(r"0[bB][01]+")]
    #[regex(r"%[0-9a-fA-F]{6}([0-9a-fA-F]{2})?")]
    Number,

    /// Built-in engine value: @unit, @thisx, @copper
    #[regex(r#"@[^ \t\r\n\f"]+"#)]
    EngineConst,

    /// Compile-time type hint: :number
    #[regex(r":[a-zA-Z][a-zA-Z0-9]*")]
    Ctype,

    /// Anything that can name a variable or label
    #[regex(r#"[^ \t\r\n\f"@:%0-9\-][^ \t\r\n\f"]*"#)]
    Identifier,
}

impl Shape {
    /// Classify a whole argument. Returns `None` unless the entire text is exactly one shape.
    pub fn of(text: &str) -> Option<Shape> {
        let mut lexer = Shape::lexer(text);
        let shape = lexer.next()?.ok()?;
        if lexer.span().end != text.len() || lexer.next().is_some() {
            return None;
        }
        Some(shape)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Shape::String => "string literal",
            Shape::Number => "number literal",
            Shape::EngineConst => "engine constant",
            Shape::Ctype => "type hint",
            Shape::Identifier => "identifier",
        };
        write!(f, "{}", s)
    }
}
