//! Style and script injected into a document before it is embedded
//!
//! The shim wraps the body in a full-size wrapper, scales the certificate
//! container uniformly from its top-left corner to fit the wrapper, and posts
//! the container's intrinsic size to the host. Every piece is guarded by a
//! marker so injecting twice changes nothing.

use crate::renderer::CONTAINER_CLASS;

/// Marker id of the injected style element
pub const STYLE_MARKER: &str = "__CERT_PREVIEW_SCALE__";

/// Marker id of the injected script element
pub const SCRIPT_MARKER: &str = "__CERT_PREVIEW_SCALE_SCRIPT__";

/// Class of the wrapper placed around the body content
pub const WRAPPER_CLASS: &str = "certificate-preview-wrapper";

const STYLE: &str = "<style id=\"__CERT_PREVIEW_SCALE__\">\n\
html,body{height:100%;margin:0;padding:0;overflow:hidden;}\n\
.{wrapper}{position:relative;width:100vw;height:100vh;overflow:hidden;background:transparent;}\n\
.{container}{transform-origin:top left;}\n\
</style>";

const SCRIPT: &str = "<script id=\"__CERT_PREVIEW_SCALE_SCRIPT__\">\n\
(function(){\n\
function fitCertificate(){\n\
  var cert = document.querySelector('.{container}');\n\
  var wrap = document.querySelector('.{wrapper}');\n\
  if(!cert || !wrap){ return; }\n\
  var w = cert.offsetWidth, h = cert.offsetHeight;\n\
  if(w > 0 && h > 0){\n\
    var s = Math.min(wrap.clientWidth / w, wrap.clientHeight / h);\n\
    cert.style.transform = 'scale(' + s + ')';\n\
    if(window.parent){\n\
      window.parent.postMessage(JSON.stringify({kind:'content-size',payload:{width:w,height:h}}), '*');\n\
    }\n\
  }\n\
}\n\
window.addEventListener('resize', fitCertificate);\n\
window.addEventListener('DOMContentLoaded', fitCertificate);\n\
setTimeout(fitCertificate, 100);\n\
})();\n\
</script>";

fn with_classes(template: &str) -> String {
    template
        .replace("{container}", CONTAINER_CLASS)
        .replace("{wrapper}", WRAPPER_CLASS)
}

/// Add the preview style, wrapper and script to `html`
pub fn inject(html: &str) -> String {
    let mut out = html.to_string();

    if !out.contains(STYLE_MARKER) {
        let style = with_classes(STYLE);
        out = match find_tag(&out, "<head") {
            Some((_, end)) => splice(&out, end, &style),
            None => format!("{}{}", style, out),
        };
    }

    let wrapper_open = format!("<div class=\"{}\">", WRAPPER_CLASS);
    if !out.contains(&wrapper_open) {
        let open = format!("\n{}", wrapper_open);
        out = match find_tag(&out, "<body") {
            Some((_, end)) => splice(&out, end, &open),
            None => format!("{}{}", open, out),
        };
        out = match find_ci(&out, "</body>") {
            Some(start) => splice(&out, start, "</div>"),
            None => format!("{}</div>", out),
        };
    }

    if !out.contains(SCRIPT_MARKER) {
        let script = with_classes(SCRIPT);
        out = match find_ci(&out, "</body>") {
            Some(start) => splice(&out, start, &script),
            None => format!("{}{}", out, script),
        };
    }

    out
}

fn splice(s: &str, at: usize, insert: &str) -> String {
    let mut out = String::with_capacity(s.len() + insert.len());
    out.push_str(&s[..at]);
    out.push_str(insert);
    out.push_str(&s[at..]);
    out
}

/// Byte offset of `needle`, ignoring ASCII case
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

/// Span of an opening tag such as `<body class="x">`, ignoring ASCII case.
/// Returns the start of the tag and the offset just past its `>`.
fn find_tag(haystack: &str, open: &str) -> Option<(usize, usize)> {
    let lower = haystack.to_ascii_lowercase();
    let mut from = 0;
    while let Some(pos) = lower[from..].find(open) {
        let start = from + pos;
        let after = start + open.len();
        match lower[after..].chars().next() {
            Some(c) if c == '>' || c.is_ascii_whitespace() => {
                let close = lower[after..].find('>')?;
                return Some((start, after + close + 1));
            }
            _ => from = after,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<html><head><title>t</title></head><body class=\"x\"><div class=\"certificate-container\"></div></body></html>";

    #[test]
    fn test_inject_all_parts() {
        let out = inject(DOC);
        assert!(out.starts_with("<html><head><style id=\"__CERT_PREVIEW_SCALE__\">"));
        assert!(out.contains("<body class=\"x\">\n<div class=\"certificate-preview-wrapper\"><div class=\"certificate-container\">"));
        assert!(out.ends_with("</script></body></html>"));
        assert!(out.contains("</div></div><script"));
        assert!(out.contains("kind:'content-size'"));
    }

    #[test]
    fn test_shim_targets_the_serialized_container() {
        let out = inject(DOC);
        assert!(!out.contains("{container}"));
        assert!(!out.contains("{wrapper}"));
        assert!(out.contains(&format!(".{}{{transform-origin:top left;}}", CONTAINER_CLASS)));
        assert!(out.contains(&format!("document.querySelector('.{}')", CONTAINER_CLASS)));
        assert!(out.contains(&format!("document.querySelector('.{}')", WRAPPER_CLASS)));
    }

    #[test]
    fn test_inject_is_idempotent() {
        let once = inject(DOC);
        assert_eq!(inject(&once), once);
    }

    #[test]
    fn test_head_prefix_is_not_header() {
        let out = inject("<header></header><BODY>x</BODY>");
        assert!(out.starts_with("<style id="));
        assert!(out.contains("<BODY>\n<div class=\"certificate-preview-wrapper\">x</div><script"));
    }

    #[test]
    fn test_fragment_without_tags() {
        let out = inject("<div>x</div>");
        assert!(out.contains(STYLE_MARKER));
        assert!(out.contains(WRAPPER_CLASS));
        assert!(out.ends_with("</script>"));
    }
}
