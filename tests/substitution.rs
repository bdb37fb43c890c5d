//! Tests for filling stored documents with recipient values

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use cert_template::layout::DynamicField;
use cert_template::template::{escape_html, rewrite_background, ImageType, InlineImage};
use cert_template::{parse, substitute, FieldValues};

const DOCUMENT: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>{{.EventName}}</title>
    <style>
    .certificate-container{position:relative;width:800px;height:600px;background-image:url('templates/4/bg.png');}
    </style>
  </head>
  <body>
  <div class="certificate-container">
    <div style="position:absolute;left:80px;top:60px;">{{.UserName}}</div>
    <div style="position:absolute;left:80px;top:160px;">{{.EventName}}</div>
    <div style="position:absolute;left:80px;top:260px;">No. {{.UniqueID}}</div>
  </div>
  </body>
</html>
"#;

#[test]
fn test_every_occurrence_is_replaced() {
    let values = FieldValues::new()
        .with(DynamicField::UserName, "Jane Doe")
        .with(DynamicField::EventName, "Rust Summit")
        .with(DynamicField::UniqueId, "CERT-7");
    let filled = substitute(DOCUMENT, &values);

    assert_eq!(filled.matches("Rust Summit").count(), 2);
    assert!(filled.contains(">Jane Doe</div>"));
    assert!(filled.contains(">No. CERT-7</div>"));
    assert!(!filled.contains("{{."));
}

#[test]
fn test_missing_values_keep_their_tokens() {
    let values = FieldValues::new().with(DynamicField::UserName, "Jane Doe");
    let filled = substitute(DOCUMENT, &values);

    assert!(filled.contains(">Jane Doe</div>"));
    assert_eq!(filled.matches("{{.EventName}}").count(), 2);
    assert!(filled.contains("{{.UniqueID}}"));
}

#[test]
fn test_no_values_is_identity() {
    assert_eq!(substitute(DOCUMENT, &FieldValues::new()), DOCUMENT);
}

#[test]
fn test_substituted_values_are_not_rescanned() {
    let values = FieldValues::new()
        .with(DynamicField::UserName, "{{.EventName}}")
        .with(DynamicField::EventName, "Rust Summit");
    let filled = substitute(DOCUMENT, &values);

    assert!(filled.contains(">{{.EventName}}</div>"));
    assert_eq!(filled.matches("Rust Summit").count(), 2);
}

#[test]
fn test_values_are_escaped() {
    let values = FieldValues::new().with(DynamicField::UserName, "<b>Tom & \"Jerry\"</b>");
    let filled = substitute(DOCUMENT, &values);
    assert!(filled.contains(">&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;</div>"));
}

#[test]
fn test_unknown_and_malformed_tokens_are_reported_and_kept() {
    let source = "<p>{{.Nickname}} {{ .UserName }} {{.UserName}}</p>";
    let doc = parse(source);

    let filled = substitute(source, &FieldValues::new().with(DynamicField::UserName, "Ann"));
    assert_eq!(filled, "<p>{{.Nickname}} {{ .UserName }} Ann</p>");

    assert_eq!(doc.diagnostics().len(), 2);
    assert!(doc.diagnostics()[0].message.contains("Nickname"));
    let help = doc.diagnostics()[1].help.as_deref().unwrap_or_default();
    assert!(help.contains("{{.UserName}}"));
}

#[test]
fn test_field_names_are_case_sensitive() {
    let source = "{{.username}}";
    assert_eq!(substitute(source, &FieldValues::sample()), source);
}

#[test]
fn test_background_is_inlined_everywhere() {
    let image = InlineImage::new(ImageType::Png, vec![0x89, b'P', b'N', b'G']);
    let source = format!(
        "{}<img src=\"https://cdn.example.org/templates/4/bg.png\">",
        DOCUMENT
    );
    let rewritten = rewrite_background(&source, &image);
    let uri = image.to_data_uri();

    assert!(rewritten.contains(&format!("background-image:url('{}')", uri)));
    assert!(rewritten.contains(&format!("<img src=\"{}\">", uri)));
    assert!(!rewritten.contains("bg.png"));
    // placeholders are untouched by background rewriting
    assert!(rewritten.contains("{{.UserName}}"));
}

#[test]
fn test_assignments() {
    let mut values = FieldValues::new();
    values.insert_assignment("UserName=Jane = Doe").unwrap();
    assert_eq!(values.get(DynamicField::UserName), Some("Jane = Doe"));
    assert!(values.insert_assignment("Nickname=x").is_err());
    assert!(values.insert_assignment("UserName").is_err());
}

proptest! {
    #[test]
    fn filled_documents_contain_the_escaped_value(name in "[A-Za-z0-9 .,'&<>-]{0,40}") {
        let values = FieldValues::new().with(DynamicField::UserName, name.clone());
        let filled = substitute(DOCUMENT, &values);
        let expected = format!(">{}</div>", escape_html(&name));
        prop_assert!(filled.contains(&expected));
        prop_assert!(!filled.contains("{{.UserName}}"));
    }

    #[test]
    fn parsing_preserves_arbitrary_text(text in "[ -~\n]{0,200}") {
        prop_assert_eq!(parse(&text).to_source(), text);
    }
}
