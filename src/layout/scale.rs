//! Mapping between canonical template units and on-screen pixels
//!
//! Element geometry is authored and stored in canonical units. The editor
//! displays the canvas at `scale`, computed from the host container:
//!
//! ```text
//! scale = min(container_w * f / canvas_w, container_h * f / canvas_h, 1)
//! ```
//!
//! Screen geometry is derived for display only. Drag and resize interactions
//! convert their final on-screen result back into whole canonical pixels
//! before anything is written to the element store.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::error::LayoutError;
use super::types::{CanonicalRect, CanvasSize, ElementId, ElementPatch};

/// Configuration for scale computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleConfig {
    /// Fraction of the container the canvas may fill
    pub fill_fraction: f64,
    /// Scale used before the container has been measured
    pub fallback_scale: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            fill_fraction: 0.8,
            fallback_scale: 0.5,
        }
    }
}

impl ScaleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill fraction
    pub fn with_fill_fraction(mut self, fraction: f64) -> Self {
        self.fill_fraction = fraction;
        self
    }

    /// Set the scale used while the container is unmeasured
    pub fn with_fallback_scale(mut self, scale: f64) -> Self {
        self.fallback_scale = scale;
        self
    }
}

/// Measured size of the host container, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A container with no usable area counts as unmeasured
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl fmt::Display for ContainerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ContainerSize {
    type Err = LayoutError;

    /// Parse `WIDTHxHEIGHT`, e.g. `400x300`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(|c| c == 'x' || c == 'X')
            .ok_or_else(|| LayoutError::invalid_container(s, "expected WIDTHxHEIGHT"))?;
        let width = w
            .trim()
            .parse::<f64>()
            .map_err(|e| LayoutError::invalid_container(s, e.to_string()))?;
        let height = h
            .trim()
            .parse::<f64>()
            .map_err(|e| LayoutError::invalid_container(s, e.to_string()))?;
        Ok(Self::new(width, height))
    }
}

/// A rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Compute the display scale for a canvas inside a container.
///
/// Never upscales, never returns zero. An unmeasured container yields the
/// configured fallback.
pub fn compute_scale(
    canvas: CanvasSize,
    container: Option<ContainerSize>,
    config: &ScaleConfig,
) -> f64 {
    let fallback = clamp_scale(config.fallback_scale);
    let container = match container {
        Some(c) if c.is_measured() => c,
        _ => return fallback,
    };
    if canvas.width == 0 || canvas.height == 0 {
        return fallback;
    }

    let width_scale = container.width * config.fill_fraction / canvas.width as f64;
    let height_scale = container.height * config.fill_fraction / canvas.height as f64;
    let scale = width_scale.min(height_scale).min(1.0);

    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        fallback
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale.min(1.0)
    } else {
        ScaleConfig::default().fallback_scale
    }
}

/// Owns the current display scale for one editing session
#[derive(Debug, Clone)]
pub struct ScaleManager {
    config: ScaleConfig,
    canvas: CanvasSize,
    container: Option<ContainerSize>,
    scale: f64,
}

impl ScaleManager {
    /// Create a manager for a canvas whose container is not yet measured
    pub fn new(canvas: CanvasSize, config: ScaleConfig) -> Self {
        let scale = compute_scale(canvas, None, &config);
        Self {
            config,
            canvas,
            container: None,
            scale,
        }
    }

    /// Current display scale, always in (0, 1]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn container(&self) -> Option<ContainerSize> {
        self.container
    }

    /// Record a new container measurement and recompute the scale
    pub fn resize(&mut self, container: ContainerSize) -> f64 {
        self.container = Some(container);
        self.recompute()
    }

    /// Switch canvas (aspect ratio change) and recompute the scale
    pub fn set_canvas(&mut self, canvas: CanvasSize) -> f64 {
        self.canvas = canvas;
        self.recompute()
    }

    fn recompute(&mut self) -> f64 {
        self.scale = compute_scale(self.canvas, self.container, &self.config);
        debug!(
            scale = self.scale,
            canvas_width = self.canvas.width,
            canvas_height = self.canvas.height,
            "recomputed display scale"
        );
        self.scale
    }

    /// Canvas size on screen
    pub fn screen_canvas(&self) -> (f64, f64) {
        (
            self.canvas.width as f64 * self.scale,
            self.canvas.height as f64 * self.scale,
        )
    }

    /// Canonical geometry multiplied by the current scale
    pub fn to_screen(&self, rect: CanonicalRect) -> ScreenRect {
        ScreenRect::new(
            rect.x as f64 * self.scale,
            rect.y as f64 * self.scale,
            rect.width as f64 * self.scale,
            rect.height as f64 * self.scale,
        )
    }

    /// Scale a canonical length (e.g. a font size) for display
    pub fn to_screen_length(&self, length: f64) -> f64 {
        length * self.scale
    }

    /// Convert screen geometry back to whole canonical pixels
    pub fn to_canonical(&self, rect: ScreenRect) -> CanonicalRect {
        CanonicalRect::new(
            self.to_canonical_coord(rect.x),
            self.to_canonical_coord(rect.y),
            self.to_canonical_length(rect.width),
            self.to_canonical_length(rect.height),
        )
    }

    fn to_canonical_coord(&self, value: f64) -> i32 {
        let v = (value / self.scale).round();
        v.clamp(i32::MIN as f64, i32::MAX as f64) as i32
    }

    fn to_canonical_length(&self, value: f64) -> u32 {
        let v = (value / self.scale).round();
        v.clamp(1.0, u32::MAX as f64) as u32
    }

    /// Begin a drag or resize of an element currently at `rect`
    pub fn begin_interaction(&self, element: ElementId, rect: CanonicalRect) -> DragInteraction {
        DragInteraction {
            element,
            origin: rect,
            current: self.to_screen(rect),
        }
    }
}

/// An in-progress drag or resize.
///
/// Intermediate movement only updates the screen-space preview. The element
/// store sees a single canonical patch, produced by [`DragInteraction::finish`].
#[derive(Debug, Clone)]
pub struct DragInteraction {
    element: ElementId,
    origin: CanonicalRect,
    current: ScreenRect,
}

impl DragInteraction {
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Where the element is drawn right now
    pub fn preview(&self) -> ScreenRect {
        self.current
    }

    /// Move by a pointer delta in screen pixels
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.current.x += dx;
        self.current.y += dy;
    }

    /// Set the on-screen size of the box; the top-left corner may move too
    /// when resizing from a left or top handle
    pub fn resize_to(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.current = ScreenRect::new(x, y, width, height);
    }

    /// End the interaction, producing the canonical update to apply.
    ///
    /// Only the fields that actually changed are set.
    pub fn finish(self, scale: &ScaleManager) -> ElementPatch {
        let rect = scale.to_canonical(self.current);
        let mut patch = ElementPatch::new();
        if rect.x != self.origin.x || rect.y != self.origin.y {
            patch = patch.with_position(rect.x, rect.y);
        }
        if rect.width != self.origin.width || rect.height != self.origin.height {
            patch = patch.with_size(rect.width, rect.height);
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::AspectRatio;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_scale_for_small_container() {
        let scale = compute_scale(
            AspectRatio::Widescreen.canvas(),
            Some(ContainerSize::new(400.0, 300.0)),
            &ScaleConfig::default(),
        );
        assert!(approx_eq(scale, 400.0 * 0.8 / 1920.0));
    }

    #[test]
    fn test_scale_never_upscales() {
        let scale = compute_scale(
            AspectRatio::Standard.canvas(),
            Some(ContainerSize::new(5000.0, 5000.0)),
            &ScaleConfig::default(),
        );
        assert_eq!(scale, 1.0);
    }

    #[test]
    fn test_unmeasured_container_uses_fallback() {
        let config = ScaleConfig::default();
        let canvas = AspectRatio::Standard.canvas();
        assert_eq!(compute_scale(canvas, None, &config), 0.5);
        assert_eq!(
            compute_scale(canvas, Some(ContainerSize::new(0.0, 0.0)), &config),
            0.5
        );
        assert_eq!(
            compute_scale(canvas, Some(ContainerSize::new(f64::NAN, 10.0)), &config),
            0.5
        );
    }

    #[test]
    fn test_manager_recomputes_on_canvas_change() {
        let mut manager = ScaleManager::new(AspectRatio::Standard.canvas(), ScaleConfig::default());
        manager.resize(ContainerSize::new(800.0, 600.0));
        assert!(approx_eq(manager.scale(), 0.8));

        manager.set_canvas(AspectRatio::Widescreen.canvas());
        assert!(approx_eq(manager.scale(), 600.0 * 0.8 / 1080.0));
    }

    #[test]
    fn test_screen_geometry_is_canonical_times_scale() {
        let mut manager = ScaleManager::new(AspectRatio::Standard.canvas(), ScaleConfig::default());
        manager.resize(ContainerSize::new(500.0, 375.0));
        let screen = manager.to_screen(CanonicalRect::new(80, 60, 640, 50));
        assert!(approx_eq(screen.x, 40.0));
        assert!(approx_eq(screen.y, 30.0));
        assert!(approx_eq(screen.width, 320.0));
        assert!(approx_eq(screen.height, 25.0));
    }

    #[test]
    fn test_drag_converts_back_to_whole_canonical_pixels() {
        let manager = ScaleManager::new(AspectRatio::Standard.canvas(), ScaleConfig::default());
        let mut drag = manager.begin_interaction(ElementId(1), CanonicalRect::new(80, 60, 640, 50));

        drag.move_by(10.3, -4.9);
        drag.move_by(0.2, 0.0);
        let patch = drag.finish(&manager);

        // 50.5 / 0.5 = 101 -> 80 + 21; 25.1 / 0.5 = 50.2 -> 50
        assert_eq!(patch.x, Some(101));
        assert_eq!(patch.y, Some(50));
        assert_eq!(patch.width, None);
        assert_eq!(patch.height, None);
    }

    #[test]
    fn test_untouched_interaction_yields_empty_patch() {
        let manager = ScaleManager::new(AspectRatio::Widescreen.canvas(), ScaleConfig::default());
        let drag = manager.begin_interaction(ElementId(3), CanonicalRect::new(192, 108, 1536, 50));
        assert!(drag.finish(&manager).is_empty());
    }

    #[test]
    fn test_parse_container_size() {
        let size: ContainerSize = "400x300".parse().unwrap();
        assert_eq!(size, ContainerSize::new(400.0, 300.0));
        assert!("400".parse::<ContainerSize>().is_err());
        assert!("wide x tall".parse::<ContainerSize>().is_err());
    }
}
