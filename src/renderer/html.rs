//! Document generation from template settings and elements

use crate::layout::{ElementContent, TemplateElement, TemplateSettings};
use crate::template::escape_html;

use super::{DocumentConfig, CONTAINER_CLASS};

/// Build a certificate document incrementally
pub struct HtmlBuilder {
    config: DocumentConfig,
    container_rules: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl HtmlBuilder {
    /// Create a new document builder
    pub fn new(config: DocumentConfig) -> Self {
        Self {
            config,
            container_rules: vec![],
            elements: vec![],
            indent: 2,
        }
    }

    fn indent_str(&self, depth: usize) -> String {
        if self.config.pretty_print {
            "  ".repeat(depth)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Declare the canvas and its background layer
    pub fn set_canvas(&mut self, settings: &TemplateSettings) {
        let canvas = settings.canvas();
        let mut rules = vec![
            "position:relative".to_string(),
            format!("width:{}px", canvas.width),
            format!("height:{}px", canvas.height),
            format!("background-color:{}", css_color(&settings.background_color)),
        ];
        if let Some(image) = &settings.background_image {
            rules.push(format!("background-image:url('{}')", image.reference()));
        }
        rules.extend(
            [
                "background-size:cover",
                "background-position:center",
                "background-repeat:no-repeat",
                "overflow:hidden",
            ]
            .map(String::from),
        );
        self.container_rules = rules;
    }

    /// Add one absolutely positioned block at its canonical geometry
    pub fn add_element(&mut self, element: &TemplateElement) {
        let body = match &element.content {
            ElementContent::StaticText(text) => escape_static_text(text),
            ElementContent::DynamicField(field) => field.placeholder(),
        };
        self.elements.push(format!(
            r#"{}<div class="{}" data-element="{}" style="{}">{}</div>"#,
            self.indent_str(self.indent),
            self.config.element_class,
            element.id,
            element_style(element),
            body
        ));
    }

    /// Produce the final document
    pub fn build(self) -> String {
        let nl = self.newline();
        let i1 = self.indent_str(1);
        let i2 = self.indent_str(2);
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>");
        out.push_str(nl);
        out.push_str("<html>");
        out.push_str(nl);
        out.push_str(&format!("{i1}<head>{nl}"));
        out.push_str(&format!("{i2}<meta charset=\"utf-8\">{nl}"));
        out.push_str(&format!(
            "{i2}<title>{}</title>{nl}",
            escape_static_text(&self.config.title)
        ));
        out.push_str(&format!("{i2}<style>{nl}"));
        out.push_str(&format!("{i2}body{{margin:0;padding:0;}}{nl}"));
        out.push_str(&format!(
            "{i2}.{}{{{};}}{nl}",
            CONTAINER_CLASS,
            self.container_rules.join(";")
        ));
        out.push_str(&format!("{i2}</style>{nl}"));
        out.push_str(&format!("{i1}</head>{nl}"));
        out.push_str(&format!("{i1}<body>{nl}"));
        out.push_str(&format!(
            "{i1}<div class=\"{}\">{nl}",
            CONTAINER_CLASS
        ));
        for element in &self.elements {
            out.push_str(element);
            out.push_str(nl);
        }
        out.push_str(&format!("{i1}</div>{nl}"));
        out.push_str(&format!("{i1}</body>{nl}"));
        out.push_str("</html>");
        out.push_str(nl);
        out
    }
}

/// Serialize a template into a standalone document.
///
/// Geometry is written in canonical units; display scale never reaches this
/// function. Equal inputs always give byte-identical output.
pub fn serialize(
    settings: &TemplateSettings,
    elements: &[TemplateElement],
    config: &DocumentConfig,
) -> String {
    let mut builder = HtmlBuilder::new(config.clone());
    builder.set_canvas(settings);
    for element in elements {
        builder.add_element(element);
    }
    builder.build()
}

/// Inline style of a positioned block
pub fn element_style(element: &TemplateElement) -> String {
    let rect = element.rect;
    let style = &element.style;
    // -0 would print as "-0"
    let rotation = if element.rotation == 0.0 {
        0.0
    } else {
        element.rotation
    };
    format!(
        "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;\
         font-size:{}px;font-family:'{}';font-weight:{};color:{};text-align:{};\
         transform:rotate({}deg);display:flex;align-items:center;justify-content:{};\
         word-wrap:break-word;box-sizing:border-box;",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        style.font_size,
        css_value(&style.font_family),
        css_value(&style.font_weight),
        css_color(&style.color),
        style.text_align.as_css(),
        rotation,
        style.text_align.justify_content(),
    )
}

/// Escape static text so it can never form a placeholder token or an
/// asset reference
fn escape_static_text(text: &str) -> String {
    escape_html(text)
        .replace('{', "&#123;")
        .replace('(', "&#40;")
        .replace(')', "&#41;")
}

const COLOR_FUNCTIONS: [&str; 4] = ["rgb", "rgba", "hsl", "hsla"];

/// Like [`css_value`], but keeps the parentheses of a color function
fn css_color(value: &str) -> String {
    let value = value.trim();
    let function = value
        .strip_suffix(')')
        .and_then(|v| v.split_once('('))
        .filter(|(name, args)| {
            COLOR_FUNCTIONS.contains(&name.trim().to_ascii_lowercase().as_str())
                && !args.contains('(')
        });
    match function {
        Some((name, args)) => format!("{}({})", css_value(name), css_value(args)),
        None => css_value(value),
    }
}

/// Drop characters that could end a declaration or the attribute
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '"' | '\'' | '\\' | '(' | ')'))
        .collect::<String>()
        .trim()
        .to_string()
}
