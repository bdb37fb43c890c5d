//! Area painted by rotated element boxes
//!
//! Serialized elements carry `transform: rotate(Ndeg)` with the default CSS
//! transform origin, the center of the element's box. Angles are clockwise
//! positive with the Y axis pointing down. A rotated block paints the
//! axis-aligned box around its four rotated corners; that box keeps the
//! original center and has half-extents
//!
//! ```text
//! hw' = |hw * cos θ| + |hh * sin θ|
//! hh' = |hw * sin θ| + |hh * cos θ|
//! ```

use super::types::CanonicalRect;

/// Axis-aligned bounds with fractional coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounds of the given size centered on `(cx, cy)`
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this box
    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl From<CanonicalRect> for Bounds {
    fn from(rect: CanonicalRect) -> Self {
        Bounds::new(
            rect.x as f64,
            rect.y as f64,
            rect.width as f64,
            rect.height as f64,
        )
    }
}

/// Area covered by an element box after its rotation is applied
pub fn painted_bounds(rect: CanonicalRect, rotation: f64) -> Bounds {
    let bounds = Bounds::from(rect);
    if rotation % 180.0 == 0.0 {
        return bounds;
    }

    let (sin, cos) = rotation.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let width = bounds.width * cos + bounds.height * sin;
    let height = bounds.width * sin + bounds.height * cos;
    Bounds::centered(
        bounds.x + bounds.width / 2.0,
        bounds.y + bounds.height / 2.0,
        width,
        height,
    )
}
