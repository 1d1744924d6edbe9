use std::f32::consts::TAU;

use eframe::egui::{Align2, Color32, Stroke, vec2};

use crate::graph::ViewState;
use crate::graph::model::GraphModel;
use crate::util::short_label;

use super::{RenderFrame, RenderPass, Surface};

const PULSE_HZ: f32 = 0.6;
const CORE: Color32 = Color32::from_rgb(245, 206, 93);
const RING: Color32 = Color32::from_rgb(103, 196, 255);

/// The focus glyph: a pulsing ring around a solid core, labelled with what
/// currently drives the focus.
pub struct FocusPass {
    active: bool,
    phase: f32,
    caption: String,
}

impl Default for FocusPass {
    fn default() -> Self {
        Self {
            active: true,
            phase: 0.0,
            caption: "focus".to_owned(),
        }
    }
}

impl FocusPass {
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Ring scale in `[0.9, 1.3]`.
    pub fn pulse(&self) -> f32 {
        1.1 + 0.2 * (self.phase * TAU).sin()
    }
}

impl RenderPass for FocusPass {
    fn name(&self) -> &'static str {
        "focus"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn apply(&mut self, _model: &GraphModel, view: &ViewState) {
        self.caption = if let Some(query) = &view.search_query {
            format!("\u{201c}{}\u{201d}", short_label(query, 24))
        } else if !view.active_lenses.is_empty() {
            let lenses = view.active_lenses.iter().cloned().collect::<Vec<_>>();
            short_label(&lenses.join(" + "), 32)
        } else if !view.selections.is_empty() {
            format!("{} selected", view.selections.len())
        } else {
            "focus".to_owned()
        };
    }

    fn step(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.phase = (self.phase + dt * PULSE_HZ).fract();
        }
    }

    fn render(&self, frame: &RenderFrame<'_>, surface: &mut dyn Surface) {
        let focus = frame.model.focus();
        let center = frame.viewport.world_to_screen(focus.position);
        let radius = frame.viewport.scale_radius(focus.radius);

        surface.circle_filled(center, radius * 0.55, CORE);
        surface.circle_stroke(center, radius * self.pulse(), Stroke::new(2.0, RING));
        surface.text(
            center + vec2(0.0, radius * 1.4 + 6.0),
            Align2::CENTER_TOP,
            &self.caption,
            13.0,
            Color32::from_gray(238),
        );
    }
}
