//! Lexer for attribute-literal fragments using logos
//!
//! Attribute blocks are the one part of a line with real token structure
//! (quoted spans, escapes, nested punctuation). Lines themselves are
//! classified by [`super::grammar`] with plain string matching.

use logos::Logos;

/// Byte range in fragment text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum AttrToken {
    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoted,

    #[regex(r#"'([^'\\]|\\.)*'"#)]
    SingleQuoted,

    /// Any run of characters that carries no token structure of its own.
    /// Bare values with embedded colons (URLs, times) come out as several
    /// tokens and are reassembled from spans by the attribute parser.
    #[regex(r#"[^,:{}"'\s]+"#)]
    Bare,
}

/// Lex a fragment into tokens with spans, dropping unlexable characters
/// (the attribute grammar is lenient; there is no lexer error path).
pub fn lex(input: &str) -> impl Iterator<Item = (AttrToken, Span)> + '_ {
    AttrToken::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
