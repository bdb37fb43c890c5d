//! Lexer for serialized certificate documents using logos
//!
//! The lexer only distinguishes the pieces substitution cares about:
//! `{{...}}` shapes, CSS `url(...)` references and quoted attribute values.
//! Everything else is plain text, split at the few characters that can start
//! one of those pieces.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'s> {
    /// `{{...}}`; carries the text between the braces
    #[regex(r"\{\{[^{}]*\}\}", |lex| {
        let s = lex.slice();
        &s[2..s.len() - 2]
    })]
    Braced(&'s str),

    /// `url(...)`, with or without quotes; carries the whole slice
    #[regex(r#"url\(\s*['"]?[^'"()\s]*['"]?\s*\)"#, |lex| lex.slice())]
    Url(&'s str),

    /// `="..."` or `='...'` without markup, braces or parens inside
    #[regex(r#"=["'][^"'<>(){}]*["']"#, |lex| lex.slice())]
    AttrValue(&'s str),

    #[regex(r"[^{u=]+", |lex| lex.slice())]
    Text(&'s str),

    // Single characters that did not start a longer token
    #[token("{", |lex| lex.slice())]
    #[token("u", |lex| lex.slice())]
    #[token("=", |lex| lex.slice())]
    Char(&'s str),
}

impl<'s> Token<'s> {
    /// The exact source text of the token
    pub fn source_text(&self) -> String {
        match self {
            Token::Braced(inner) => format!("{{{{{}}}}}", inner),
            Token::Url(s) | Token::AttrValue(s) | Token::Text(s) | Token::Char(s) => s.to_string(),
        }
    }
}

/// Tokenize a document, yielding each token with its byte span.
///
/// Bytes the lexer cannot classify come back as `None` and are treated as
/// plain text by the caller.
pub fn tokenize(source: &str) -> impl Iterator<Item = (Option<Token<'_>>, std::ops::Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .map(|(tok, span)| (tok.ok(), span))
}
