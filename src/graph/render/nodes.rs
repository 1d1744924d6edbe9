use eframe::egui::{Align2, Color32, Stroke, vec2};

use crate::util::short_label;

use super::{RenderFrame, RenderPass, Surface, blend_color, category_color, dim_color};

const HOVER: Color32 = Color32::from_rgb(255, 164, 101);
const SEARCH_HIT: Color32 = Color32::from_rgb(103, 196, 255);
const SELECTED: Color32 = Color32::from_rgb(245, 206, 93);
const OUTLINE: Color32 = Color32::from_rgba_premultiplied(15, 15, 15, 190);
const LABEL: Color32 = Color32::from_gray(238);
const LABEL_CHARS: usize = 24;

// Labels of unemphasized nodes fade as the view zooms out, never below this.
const MIN_LABEL_FADE: f32 = 0.35;

fn label_fade(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return 1.0;
    }
    ((zoom - 0.25) / 0.9).clamp(MIN_LABEL_FADE, 1.0)
}

/// Record nodes colored by category. While a filter is active, anything it
/// does not emphasize is dimmed.
pub struct NodesPass {
    active: bool,
}

impl Default for NodesPass {
    fn default() -> Self {
        Self { active: true }
    }
}

impl RenderPass for NodesPass {
    fn name(&self) -> &'static str {
        "nodes"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn render(&self, frame: &RenderFrame<'_>, surface: &mut dyn Surface) {
        let viewport = frame.viewport;
        let filtering = frame.view.filtering();

        for (index, node) in frame.model.nodes().iter().enumerate() {
            if node.is_focus {
                continue;
            }
            let position = viewport.world_to_screen(node.position);
            let radius = viewport.scale_radius(node.radius);
            if !viewport.circle_visible(position, radius) {
                continue;
            }

            let category = frame.model.profile(index).and_then(|profile| {
                profile
                    .category
                    .as_deref()
                    .or_else(|| profile.tags.iter().next().map(String::as_str))
            });
            let base = category_color(category);
            let hovered = frame.hovered == Some(index);
            let selected = frame.view.is_selected(&node.id);
            let search_hit = frame.view.is_search_match(&node.id);
            let emphasized = frame.emphasized(index);

            let color = if hovered {
                HOVER
            } else if selected {
                blend_color(base, SELECTED, 0.7)
            } else if search_hit {
                blend_color(base, SEARCH_HIT, 0.68)
            } else if filtering && !emphasized {
                dim_color(base, 0.38)
            } else {
                base
            };

            surface.circle_filled(position, radius, color);
            if selected {
                surface.circle_stroke(position, radius + 4.0, Stroke::new(1.8, SELECTED));
            }
            let outline = if emphasized { 1.6 } else { 1.0 };
            surface.circle_stroke(position, radius, Stroke::new(outline, OUTLINE));

            let label_color = if hovered || emphasized {
                LABEL
            } else {
                LABEL.gamma_multiply(label_fade(viewport.zoom))
            };
            surface.text(
                position + vec2(radius + 5.0, 0.0),
                Align2::LEFT_CENTER,
                &short_label(&node.label, LABEL_CHARS),
                12.0,
                label_color,
            );
        }
    }
}
