//! Token substitution over parsed documents

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::EditorError;
use crate::layout::DynamicField;
use crate::parser::{parse, Run, TemplateDocument};

use super::InlineImage;

/// Values for the dynamic fields of one recipient
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: BTreeMap<DynamicField, String>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stand-in values for the editor's live preview
    pub fn sample() -> Self {
        Self::new()
            .with(DynamicField::UniqueId, "CERT-2024-001")
            .with(DynamicField::EventName, "Sample Event")
            .with(DynamicField::UserName, "John Doe")
    }

    pub fn with(mut self, field: DynamicField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: DynamicField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: DynamicField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn remove(&mut self, field: DynamicField) -> Option<String> {
        self.values.remove(&field)
    }

    pub fn contains(&self, field: DynamicField) -> bool {
        self.values.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DynamicField, &str)> + '_ {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Parse one `Field=value` assignment and add it
    pub fn insert_assignment(&mut self, assignment: &str) -> Result<(), EditorError> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            EditorError::malformed(format!("expected Field=value, got '{}'", assignment))
        })?;
        let field = DynamicField::from_str(name.trim())
            .map_err(|e| EditorError::malformed(e.to_string()))?;
        self.set(field, value);
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(DynamicField, S)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (DynamicField, S)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (field, value) in iter {
            values.set(field, value);
        }
        values
    }
}

/// Emit a document with placeholders filled and background references
/// pointed at `background`.
///
/// Placeholders for fields missing from `values` are emitted unchanged.
/// Background references are left alone when `background` is `None`.
pub fn render_document(
    document: &TemplateDocument,
    values: &FieldValues,
    background: Option<&str>,
) -> String {
    let mut out = String::new();
    for run in document.runs() {
        match run {
            Run::Literal(text) => out.push_str(text),
            Run::Placeholder { field, .. } => match values.get(*field) {
                Some(value) => out.push_str(&escape_html(value)),
                None => out.push_str(&field.placeholder()),
            },
            Run::Background(bg) => match background {
                Some(target) => out.push_str(&bg.emit(target)),
                None => out.push_str(&bg.original),
            },
        }
    }
    out
}

/// Fill every recognized placeholder in `source`
pub fn substitute(source: &str, values: &FieldValues) -> String {
    render_document(&parse(source), values, None)
}

/// Point every background reference in `source` at an inlined image
pub fn rewrite_background(source: &str, image: &InlineImage) -> String {
    render_document(&parse(source), &FieldValues::new(), Some(&image.to_data_uri()))
}

/// Escape text for use in element content or a quoted attribute
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ImageType;

    #[test]
    fn test_substitution_is_global() {
        let values = FieldValues::new().with(DynamicField::UserName, "Jane");
        assert_eq!(
            substitute("{{.UserName}} and {{.UserName}}", &values),
            "Jane and Jane"
        );
    }

    #[test]
    fn test_missing_field_is_left_intact() {
        let values = FieldValues::new().with(DynamicField::UserName, "Jane");
        assert_eq!(
            substitute("{{.UserName}} @ {{.EventName}}", &values),
            "Jane @ {{.EventName}}"
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let values = FieldValues::new().with(DynamicField::EventName, "R&D <Summit>");
        assert_eq!(
            substitute("<b>{{.EventName}}</b>", &values),
            "<b>R&amp;D &lt;Summit&gt;</b>"
        );
    }

    #[test]
    fn test_value_that_looks_like_a_token_is_not_substituted_again() {
        let values = FieldValues::new()
            .with(DynamicField::UserName, "{{.EventName}}")
            .with(DynamicField::EventName, "Gala");
        assert_eq!(
            substitute("{{.UserName}}|{{.EventName}}", &values),
            "{{.EventName}}|Gala"
        );
    }

    #[test]
    fn test_unknown_tokens_are_literal() {
        let values = FieldValues::sample();
        assert_eq!(substitute("{{.Email}} {{.userName}}", &values), "{{.Email}} {{.userName}}");
    }

    #[test]
    fn test_rewrite_every_background_reference() {
        let image = InlineImage::new(ImageType::Png, vec![1, 2, 3]);
        let uri = image.to_data_uri();
        let source = "a{background-image:url('templates/2/bg.png')} <img src=\"bg.png\"> url(bg.png)";
        let out = rewrite_background(source, &image);
        assert_eq!(
            out,
            format!(
                "a{{background-image:url('{uri}')}} <img src=\"{uri}\"> url({uri})"
            )
        );
    }

    #[test]
    fn test_assignment_parsing() {
        let mut values = FieldValues::new();
        values.insert_assignment("UserName=Jane Doe").unwrap();
        assert_eq!(values.get(DynamicField::UserName), Some("Jane Doe"));
        assert!(values.insert_assignment("Nickname=J").is_err());
        assert!(values.insert_assignment("UserName").is_err());
    }
}
