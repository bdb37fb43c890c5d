//! Lint checks for authored layouts.
//!
//! Nothing here blocks a save. Warnings point at mechanical problems an
//! operator usually wants to fix: blocks that paint outside the canvas, static
//! text with nothing to show, and text blocks stacked on top of each other.

use std::fmt;

use super::transform::{painted_bounds, Bounds};
use super::types::{CanvasSize, ElementContent, ElementId, TemplateElement};

/// Rounding slack for rotated corners, in canonical pixels
const TOLERANCE: f64 = 0.5;

/// A lint warning about a layout defect
#[derive(Debug, Clone, PartialEq)]
pub struct LintWarning {
    pub category: LintCategory,
    pub element: ElementId,
    pub message: String,
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Bounds,
    Text,
    Overlap,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Bounds => write!(f, "bounds"),
            LintCategory::Text => write!(f, "text"),
            LintCategory::Overlap => write!(f, "overlap"),
        }
    }
}

/// Run all lint checks over the elements of a canvas
pub fn check(canvas: CanvasSize, elements: &[TemplateElement]) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_bounds(canvas, elements, &mut warnings);
    check_text(elements, &mut warnings);
    check_overlaps(elements, &mut warnings);
    warnings
}

fn check_bounds(canvas: CanvasSize, elements: &[TemplateElement], warnings: &mut Vec<LintWarning>) {
    let area = Bounds::from(canvas.bounds());
    let slack = Bounds::new(
        area.x - TOLERANCE,
        area.y - TOLERANCE,
        area.width + 2.0 * TOLERANCE,
        area.height + 2.0 * TOLERANCE,
    );
    for element in elements {
        let painted = painted_bounds(element.rect, element.rotation);
        if !slack.contains_bounds(&painted) {
            warnings.push(LintWarning {
                category: LintCategory::Bounds,
                element: element.id,
                message: format!(
                    "{} paints outside the {}x{} canvas (covers {:.0},{:.0} to {:.0},{:.0})",
                    element.id,
                    canvas.width,
                    canvas.height,
                    painted.x,
                    painted.y,
                    painted.right(),
                    painted.bottom()
                ),
            });
        }
    }
}

fn check_text(elements: &[TemplateElement], warnings: &mut Vec<LintWarning>) {
    for element in elements {
        if let ElementContent::StaticText(text) = &element.content {
            if text.trim().is_empty() {
                warnings.push(LintWarning {
                    category: LintCategory::Text,
                    element: element.id,
                    message: format!("{} is static text with no visible content", element.id),
                });
            }
        }
    }
}

fn check_overlaps(elements: &[TemplateElement], warnings: &mut Vec<LintWarning>) {
    for (i, a) in elements.iter().enumerate() {
        let a_bounds = painted_bounds(a.rect, a.rotation);
        for b in &elements[i + 1..] {
            let b_bounds = painted_bounds(b.rect, b.rotation);
            if intersects(&a_bounds, &b_bounds) {
                warnings.push(LintWarning {
                    category: LintCategory::Overlap,
                    element: b.id,
                    message: format!("{} overlaps {}", b.id, a.id),
                });
            }
        }
    }
}

fn intersects(a: &Bounds, b: &Bounds) -> bool {
    a.x + TOLERANCE < b.right()
        && b.x + TOLERANCE < a.right()
        && a.y + TOLERANCE < b.bottom()
        && b.y + TOLERANCE < a.bottom()
}
