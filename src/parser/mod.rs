//! Reader for serialized certificate documents

pub mod ast;
pub mod lexer;

pub use ast::*;

use crate::error::{DocumentDiagnostic, Span};
use crate::layout::DynamicField;

use lexer::{tokenize, Token};

/// Read a document into runs.
///
/// Parsing never fails. Anything that is not a recognized placeholder or a
/// background reference stays literal text; suspicious `{{...}}` shapes are
/// reported as diagnostics.
pub fn parse(source: &str) -> TemplateDocument {
    let mut builder = RunBuilder::default();

    for (token, span) in tokenize(source) {
        let text = &source[span.clone()];
        match token {
            Some(Token::Braced(inner)) => builder.braced(inner, text, span),
            Some(Token::Url(slice)) => match css_url_ref(slice, span) {
                Some(bg) => builder.push(Run::Background(bg)),
                None => builder.literal(text),
            },
            Some(Token::AttrValue(slice)) => match attribute_ref(slice, span) {
                Some(bg) => builder.push(Run::Background(bg)),
                None => builder.literal(text),
            },
            Some(Token::Text(_)) | Some(Token::Char(_)) | None => builder.literal(text),
        }
    }

    builder.finish()
}

#[derive(Default)]
struct RunBuilder {
    runs: Vec<Run>,
    pending: String,
    diagnostics: Vec<DocumentDiagnostic>,
}

impl RunBuilder {
    fn literal(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    fn push(&mut self, run: Run) {
        self.flush();
        self.runs.push(run);
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.runs
                .push(Run::Literal(std::mem::take(&mut self.pending)));
        }
    }

    fn braced(&mut self, inner: &str, text: &str, span: Span) {
        if let Some(field) = inner.strip_prefix('.').and_then(DynamicField::from_token_name) {
            self.push(Run::Placeholder { field, span });
            return;
        }

        let trimmed = inner.trim();
        if let Some(name) = trimmed.strip_prefix('.') {
            let diagnostic = match DynamicField::from_token_name(name.trim()) {
                Some(field) => DocumentDiagnostic::new(
                    span,
                    format!("placeholder '{}' is not written exactly", text),
                )
                .with_help(format!("write {} to have it substituted", field.placeholder())),
                None => DocumentDiagnostic::new(
                    span,
                    format!("unknown placeholder '{}'", name.trim()),
                )
                .with_help(known_fields_help()),
            };
            self.diagnostics.push(diagnostic);
        }
        self.literal(text);
    }

    fn finish(mut self) -> TemplateDocument {
        self.flush();
        TemplateDocument::from_parts(self.runs, self.diagnostics)
    }
}

fn known_fields_help() -> String {
    let names: Vec<&str> = DynamicField::ALL.iter().map(|f| f.token_name()).collect();
    format!("known fields: {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_placeholder_runs() {
        let doc = parse("<div>{{.UserName}} of {{.EventName}}</div>");
        assert_eq!(
            doc.runs(),
            &[
                Run::Literal("<div>".to_string()),
                Run::Placeholder {
                    field: DynamicField::UserName,
                    span: 5..18,
                },
                Run::Literal(" of ".to_string()),
                Run::Placeholder {
                    field: DynamicField::EventName,
                    span: 22..36,
                },
                Run::Literal("</div>".to_string()),
            ]
        );
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_literals_are_merged() {
        let doc = parse("user=1 {x} url");
        assert_eq!(doc.runs(), &[Run::Literal("user=1 {x} url".to_string())]);
    }

    #[test]
    fn test_unknown_placeholder_is_literal_with_diagnostic() {
        let doc = parse("Hi {{.Nickname}}");
        assert_eq!(doc.placeholders().count(), 0);
        assert_eq!(doc.to_source(), "Hi {{.Nickname}}");
        assert_eq!(doc.diagnostics().len(), 1);
        assert!(doc.diagnostics()[0].message.contains("Nickname"));
    }

    #[test]
    fn test_spaced_placeholder_is_not_recognized() {
        let doc = parse("{{ .UserName }}");
        assert_eq!(doc.placeholders().count(), 0);
        let help = doc.diagnostics()[0].help.clone().unwrap();
        assert!(help.contains("{{.UserName}}"));
    }

    #[test]
    fn test_foreign_template_syntax_is_silent() {
        let doc = parse("{{ if x }}{{end}}");
        assert_eq!(doc.placeholders().count(), 0);
        assert!(doc.diagnostics().is_empty());
    }

    #[test]
    fn test_background_references() {
        let source = r#"<div style="background-image:url('templates/4/bg.png')"><img src="bg.png"></div>"#;
        let doc = parse(source);
        assert_eq!(doc.background_refs().count(), 2);
        assert_eq!(doc.to_source(), source);
    }

    #[test]
    fn test_other_urls_stay_literal() {
        let doc = parse("src: url('fonts/a.woff');");
        assert_eq!(doc.background_refs().count(), 0);
        assert_eq!(doc.runs().len(), 1);
    }

    #[test]
    fn test_positioned_content_detection() {
        assert!(parse("<div style=\"position: absolute\">x</div>").has_positioned_content());
        assert!(parse("<div class=\"certificate-container\"></div>").has_positioned_content());
        assert!(!parse("<html><body>hello</body></html>").has_positioned_content());
    }

    #[test]
    fn test_serialized_container_counts_as_positioned() {
        use crate::layout::{AspectRatio, TemplateSettings};
        use crate::renderer::{serialize, DocumentConfig};

        let html = serialize(
            &TemplateSettings::new(AspectRatio::Standard),
            &[],
            &DocumentConfig::default(),
        );
        assert!(parse(&html).has_positioned_content());
        assert!(crate::preview::shim::inject(&html)
            .contains(&format!("document.querySelector('.{}')", crate::renderer::CONTAINER_CLASS)));
    }
}
