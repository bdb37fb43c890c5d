//! Regression tests for serialized template documents
//!
//! Documents are stored and later filled by other systems, so their exact
//! shape matters: placeholders must survive untouched, geometry must stay in
//! canonical units and equal inputs must give byte-identical output.

use pretty_assertions::assert_eq;

use cert_template::layout::{
    AspectRatio, DynamicField, ElementKind, ElementPatch, ElementStore, LayoutConfig,
    TemplateSettings,
};
use cert_template::template::{rewrite_background, ImageType, InlineImage};
use cert_template::{
    parse, serialize, serialize_layout, substitute, DocumentConfig, EditPermission, FieldValues,
    TemplateLayout,
};

fn store_with_user_name() -> ElementStore {
    let mut store = ElementStore::new(AspectRatio::Standard.canvas(), LayoutConfig::default());
    store
        .add_element(
            &EditPermission::granted(),
            ElementKind::DynamicField,
            Some(DynamicField::UserName),
        )
        .expect("element should be added");
    store
}

#[test]
fn test_user_name_block_is_positioned_and_filled() {
    let store = store_with_user_name();
    let settings = TemplateSettings::new(AspectRatio::Standard);
    let html = serialize(&settings, store.elements(), &DocumentConfig::default());

    assert!(html.contains("left:80px;top:60px;width:640px;height:50px"));
    assert!(html.contains(">{{.UserName}}</div>"));

    let values = FieldValues::new().with(DynamicField::UserName, "Jane Doe");
    let filled = substitute(&html, &values);
    assert!(filled.contains(">Jane Doe</div>"));
    assert!(!filled.contains("{{.UserName}}"));
}

#[test]
fn test_compact_document() {
    let store = store_with_user_name();
    let html = serialize(
        &TemplateSettings::new(AspectRatio::Standard),
        store.elements(),
        &DocumentConfig::new().with_pretty_print(false),
    );

    let expected = concat!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Certificate Template</title>",
        "<style>body{margin:0;padding:0;}",
        ".certificate-container{position:relative;width:800px;height:600px;",
        "background-color:#ffffff;background-size:cover;background-position:center;",
        "background-repeat:no-repeat;overflow:hidden;}</style></head>",
        "<body><div class=\"certificate-container\">",
        "<div class=\"certificate-element\" data-element=\"element-1\" style=\"",
        "position:absolute;left:80px;top:60px;width:640px;height:50px;",
        "font-size:24px;font-family:'Arial';font-weight:normal;color:#000000;text-align:center;",
        "transform:rotate(0deg);display:flex;align-items:center;justify-content:center;",
        "word-wrap:break-word;box-sizing:border-box;\">{{.UserName}}</div>",
        "</div></body></html>",
    );
    assert_eq!(html, expected);
}

#[test]
fn test_serialization_is_deterministic() {
    let mut store = store_with_user_name();
    store
        .add_element(&EditPermission::granted(), ElementKind::StaticText, None)
        .unwrap();
    let settings = TemplateSettings::new(AspectRatio::Widescreen).with_background_color("#fdf6e3");

    let first = serialize(&settings, store.elements(), &DocumentConfig::default());
    let second = serialize(&settings, store.elements(), &DocumentConfig::default());
    assert_eq!(first, second);
}

#[test]
fn test_parse_reproduces_document() {
    let store = store_with_user_name();
    let html = serialize(
        &TemplateSettings::new(AspectRatio::Standard),
        store.elements(),
        &DocumentConfig::default(),
    );
    let doc = parse(&html);

    assert_eq!(doc.to_source(), html);
    assert!(doc.diagnostics().is_empty());
    assert!(doc.has_positioned_content());
    assert_eq!(
        doc.fields().into_iter().collect::<Vec<_>>(),
        vec![DynamicField::UserName]
    );
}

#[test]
fn test_layout_and_store_agree() {
    let mut store = store_with_user_name();
    let id = store
        .add_element(&EditPermission::granted(), ElementKind::StaticText, None)
        .unwrap();
    store
        .update_element(
            &EditPermission::granted(),
            id,
            &ElementPatch::new()
                .with_text("Certificate of Attendance")
                .with_position(100, 420)
                .with_rotation(-8.0),
        )
        .unwrap();
    let settings = TemplateSettings::new(AspectRatio::Standard);

    let direct = serialize(&settings, store.elements(), &DocumentConfig::default());

    // through the editable TOML form and back
    let toml = TemplateLayout::from_parts(&settings, store.elements())
        .to_toml()
        .unwrap();
    let layout = TemplateLayout::from_toml(&toml).unwrap();
    let via_layout = serialize_layout(&layout, &DocumentConfig::default()).unwrap();

    assert_eq!(direct, via_layout);
    assert!(direct.contains("transform:rotate(-8deg)"));
    assert!(direct.contains(">Certificate of Attendance</div>"));
}

#[test]
fn test_static_text_is_never_substituted() {
    let mut store = ElementStore::new(AspectRatio::Standard.canvas(), LayoutConfig::default());
    let id = store
        .add_element(&EditPermission::granted(), ElementKind::StaticText, None)
        .unwrap();
    store
        .update_element(
            &EditPermission::granted(),
            id,
            &ElementPatch::new().with_text("Dear {{.UserName}}"),
        )
        .unwrap();

    let html = serialize(
        &TemplateSettings::default(),
        store.elements(),
        &DocumentConfig::default(),
    );
    let filled = substitute(&html, &FieldValues::sample());

    assert!(filled.contains("Dear &#123;&#123;.UserName}}"));
    assert!(!filled.contains("John Doe"));
}

#[test]
fn test_static_text_never_forms_a_background_reference() {
    let mut store = ElementStore::new(AspectRatio::Standard.canvas(), LayoutConfig::default());
    let id = store
        .add_element(&EditPermission::granted(), ElementKind::StaticText, None)
        .unwrap();
    store
        .update_element(
            &EditPermission::granted(),
            id,
            &ElementPatch::new().with_text("Design file: url(bg.png)"),
        )
        .unwrap();

    let html = serialize(
        &TemplateSettings::default(),
        store.elements(),
        &DocumentConfig::default(),
    );
    assert!(html.contains(">Design file: url&#40;bg.png&#41;</div>"));
    assert_eq!(parse(&html).background_refs().count(), 0);

    let image = InlineImage::new(ImageType::Png, vec![0x89, b'P', b'N', b'G']);
    assert_eq!(rewrite_background(&html, &image), html);
}

#[test]
fn test_every_field_is_emitted() {
    let mut store = ElementStore::new(AspectRatio::Widescreen.canvas(), LayoutConfig::default());
    for field in DynamicField::ALL {
        store
            .add_element(&EditPermission::granted(), ElementKind::DynamicField, Some(field))
            .unwrap();
    }
    let html = serialize(
        &TemplateSettings::new(AspectRatio::Widescreen),
        store.elements(),
        &DocumentConfig::default(),
    );

    for field in DynamicField::ALL {
        assert!(html.contains(&field.placeholder()), "missing {}", field);
    }
    assert_eq!(parse(&html).fields().len(), 3);
}
