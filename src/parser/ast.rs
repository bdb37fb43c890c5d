//! Parsed form of a serialized certificate document
//!
//! A document is read once into an ordered list of runs: literal text,
//! recognized placeholders and background references. Substitution walks the
//! runs and emits replacement text without ever rescanning its own output, so
//! a substituted value can never be mistaken for another token.

use std::collections::BTreeSet;

use crate::error::{DocumentDiagnostic, Span};
use crate::layout::DynamicField;
use crate::renderer::CONTAINER_CLASS;
use crate::template::AssetPath;

/// How a background reference is spelled in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefForm {
    /// `url(...)`, optionally quoted
    CssUrl { quote: Option<char> },
    /// `="..."` attribute value
    Attribute { quote: char },
}

/// A reference to the background asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundRef {
    pub form: RefForm,
    /// The referenced path or URL, without quotes
    pub reference: String,
    /// Exact original text
    pub original: String,
    pub span: Span,
}

impl BackgroundRef {
    /// Spell this reference again, pointing at `target`
    pub fn emit(&self, target: &str) -> String {
        match self.form {
            RefForm::CssUrl { quote: Some(q) } => format!("url({q}{target}{q})"),
            RefForm::CssUrl { quote: None } => format!("url({target})"),
            RefForm::Attribute { quote } => format!("={quote}{target}{quote}"),
        }
    }
}

/// One piece of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Run {
    Literal(String),
    Placeholder { field: DynamicField, span: Span },
    Background(BackgroundRef),
}

/// A parsed document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateDocument {
    runs: Vec<Run>,
    diagnostics: Vec<DocumentDiagnostic>,
}

impl TemplateDocument {
    pub(crate) fn from_parts(runs: Vec<Run>, diagnostics: Vec<DocumentDiagnostic>) -> Self {
        Self { runs, diagnostics }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Problems found while parsing; none of them stop rendering
    pub fn diagnostics(&self) -> &[DocumentDiagnostic] {
        &self.diagnostics
    }

    /// Every placeholder occurrence, in document order
    pub fn placeholders(&self) -> impl Iterator<Item = DynamicField> + '_ {
        self.runs.iter().filter_map(|run| match run {
            Run::Placeholder { field, .. } => Some(*field),
            _ => None,
        })
    }

    /// Distinct fields the document needs
    pub fn fields(&self) -> BTreeSet<DynamicField> {
        self.placeholders().collect()
    }

    pub fn background_refs(&self) -> impl Iterator<Item = &BackgroundRef> + '_ {
        self.runs.iter().filter_map(|run| match run {
            Run::Background(bg) => Some(bg),
            _ => None,
        })
    }

    /// Literal text with placeholders and references removed
    pub fn literal_text(&self) -> String {
        self.runs
            .iter()
            .filter_map(|run| match run {
                Run::Literal(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// True when the document has at least one absolutely positioned block
    /// or the certificate container
    pub fn has_positioned_content(&self) -> bool {
        self.runs.iter().any(|run| match run {
            Run::Literal(text) => {
                let compact: String = text
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_ascii_lowercase();
                compact.contains("position:absolute") || compact.contains(CONTAINER_CLASS)
            }
            _ => false,
        })
    }

    /// Re-emit the document exactly as it was read
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            match run {
                Run::Literal(text) => out.push_str(text),
                Run::Placeholder { field, .. } => out.push_str(&field.placeholder()),
                Run::Background(bg) => out.push_str(&bg.original),
            }
        }
        out
    }
}

/// Read a CSS `url(...)` slice into a background reference, if it is one
pub(crate) fn css_url_ref(slice: &str, span: Span) -> Option<BackgroundRef> {
    let inner = slice.strip_prefix("url(")?.strip_suffix(')')?.trim();
    let (quote, reference) = unquote(inner);
    if !AssetPath::is_background_reference(reference) {
        return None;
    }
    Some(BackgroundRef {
        form: RefForm::CssUrl { quote },
        reference: reference.to_string(),
        original: slice.to_string(),
        span,
    })
}

/// Read an `="..."` slice into a background reference, if it is one
pub(crate) fn attribute_ref(slice: &str, span: Span) -> Option<BackgroundRef> {
    let inner = slice.strip_prefix('=')?;
    let (quote, reference) = unquote(inner);
    let quote = quote?;
    if !AssetPath::is_background_reference(reference) {
        return None;
    }
    Some(BackgroundRef {
        form: RefForm::Attribute { quote },
        reference: reference.to_string(),
        original: slice.to_string(),
        span,
    })
}

fn unquote(s: &str) -> (Option<char>, &str) {
    let mut chars = s.chars();
    match chars.next() {
        Some(q @ ('\'' | '"')) => {
            let body = &s[1..];
            let body = body.strip_suffix(q).unwrap_or(body);
            (Some(q), body)
        }
        _ => (None, s),
    }
}
