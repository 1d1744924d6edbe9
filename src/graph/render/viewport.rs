use eframe::egui::{Pos2, Rect, Vec2, pos2, vec2};

const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 6.0;

/// Maps world coordinates (origin at the focus) onto a screen rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub rect: Rect,
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Rect::from_min_size(Pos2::ZERO, vec2(1200.0, 800.0)))
    }
}

impl Viewport {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    pub fn center(&self) -> Pos2 {
        self.rect.center()
    }

    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        self.center() + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen - self.center() - self.pan) / self.zoom
    }

    pub fn scale_radius(&self, radius: f32) -> f32 {
        (radius * self.zoom.powf(0.40)).clamp(2.5, 46.0)
    }

    /// Zooms by a scroll delta while keeping the world point under `pointer`
    /// fixed on screen.
    pub fn zoom_at(&mut self, pointer: Pos2, scroll: f32) {
        if scroll.abs() <= f32::EPSILON || !scroll.is_finite() {
            return;
        }
        let anchor = self.screen_to_world(pointer);
        let factor = (1.0 + scroll * 0.0018).clamp(0.85, 1.15);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - self.center() - anchor * self.zoom;
    }

    pub fn circle_visible(&self, center: Pos2, radius: f32) -> bool {
        self.rect.expand(radius).contains(center)
    }

    /// Bounding-box test; may keep a few segments that miss the corners.
    pub fn segment_visible(&self, from: Pos2, to: Pos2, padding: f32) -> bool {
        let min = pos2(from.x.min(to.x), from.y.min(to.y));
        let max = pos2(from.x.max(to.x), from.y.max(to.y));
        Rect::from_min_max(min, max)
            .expand(padding)
            .intersects(self.rect)
    }

    /// Surface size in world units at the current zoom.
    pub fn world_size(&self) -> Vec2 {
        self.rect.size() / self.zoom
    }
}
