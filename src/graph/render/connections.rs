use eframe::egui::{Color32, Stroke};

use super::{RenderFrame, RenderPass, Surface, blend_color, dim_color};

const EDGE_COLOR: Color32 = Color32::from_rgb(120, 128, 138);
const FOCUS_EDGE_COLOR: Color32 = Color32::from_rgb(103, 196, 255);

/// Record-to-record and focus edges, width and opacity scaled by weight.
pub struct ConnectionsPass {
    active: bool,
}

impl Default for ConnectionsPass {
    fn default() -> Self {
        Self { active: true }
    }
}

fn edge_stroke(weight: f32, zoom: f32, color: Color32) -> Stroke {
    let width = ((0.5 + 3.2 * weight) * zoom.sqrt()).clamp(0.35, 5.0);
    let alpha = (30.0 + 210.0 * weight).clamp(0.0, 255.0) as u8;
    let color = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha);
    Stroke::new(width, color)
}

impl RenderPass for ConnectionsPass {
    fn name(&self) -> &'static str {
        "connections"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn render(&self, frame: &RenderFrame<'_>, surface: &mut dyn Surface) {
        let nodes = frame.model.nodes();
        let viewport = frame.viewport;
        let filtering = frame.view.filtering();
        let threshold = frame.scoring.draw_threshold;

        let focus_edges = frame.model.focus_edges().iter().map(|edge| (edge, true));
        let record_edges = frame.model.edges().iter().map(|edge| (edge, false));
        for (edge, to_focus) in focus_edges.chain(record_edges) {
            if edge.weight < threshold {
                continue;
            }
            let (Some(from), Some(to)) = (nodes.get(edge.from), nodes.get(edge.to)) else {
                continue;
            };
            let start = viewport.world_to_screen(from.position);
            let end = viewport.world_to_screen(to.position);
            if !viewport.segment_visible(start, end, 2.5) {
                continue;
            }

            let highlighted = frame.emphasized(edge.from) || frame.emphasized(edge.to);
            let base = if to_focus && highlighted {
                blend_color(EDGE_COLOR, FOCUS_EDGE_COLOR, 0.8)
            } else {
                EDGE_COLOR
            };
            let mut stroke = edge_stroke(edge.weight, viewport.zoom, base);
            if filtering && !highlighted {
                stroke.color = dim_color(stroke.color, 0.4);
            }
            surface.line(start, end, stroke);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog::{Catalog, Record};
    use crate::config::{LensConfig, ScoringWeights};
    use crate::graph::model::GraphModel;
    use crate::graph::render::{RecordingSurface, Viewport};
    use crate::graph::{Scorer, ViewState};

    fn model(scoring: &ScoringWeights) -> GraphModel {
        let records = [
            ("porcini", json!({"uses": ["edible", "choice"], "family": "Boletaceae"})),
            ("bay-bolete", json!({"uses": ["edible", "choice"], "family": "Boletaceae"})),
            ("death-cap", json!({"uses": ["deadly"], "family": "Amanitaceae"})),
        ]
        .into_iter()
        .map(|(id, value)| Record::new(id, value.as_object().cloned().unwrap_or_default()))
        .collect();
        let mut model = GraphModel::new(Catalog::new(records), &LensConfig::default());
        model.recompute_weights(&ViewState::default(), &Scorer::new(scoring.clone()));
        model
    }

    fn lines_drawn(model: &GraphModel, scoring: &ScoringWeights) -> usize {
        let view = ViewState::default();
        let viewport = Viewport::default();
        let frame = RenderFrame {
            model,
            view: &view,
            viewport: &viewport,
            scoring,
            hovered: None,
        };
        let mut surface = RecordingSurface::default();
        ConnectionsPass::default().render(&frame, &mut surface);
        surface.commands().len()
    }

    #[test]
    fn connections_below_draw_threshold_are_skipped() {
        let scoring = ScoringWeights::default();
        let model = model(&scoring);
        assert_eq!(model.edges().len(), 1);
        assert_eq!(lines_drawn(&model, &scoring), 4);

        let only_strong = ScoringWeights {
            draw_threshold: 0.3,
            ..scoring.clone()
        };
        assert_eq!(lines_drawn(&model, &only_strong), 1);

        let nothing = ScoringWeights {
            draw_threshold: 0.9,
            ..scoring
        };
        assert_eq!(lines_drawn(&model, &nothing), 0);
    }

    #[test]
    fn zero_focus_weight_draws_no_focus_edges() {
        let scoring = ScoringWeights {
            focus_baseline: 0.0,
            ..ScoringWeights::default()
        };
        let model = model(&scoring);
        assert!(model.focus_edges().iter().all(|edge| edge.weight == 0.0));
        assert_eq!(lines_drawn(&model, &scoring), 1);
    }

    #[test]
    fn heavier_edges_are_wider_and_more_opaque() {
        let light = edge_stroke(0.1, 1.0, EDGE_COLOR);
        let heavy = edge_stroke(0.9, 1.0, EDGE_COLOR);
        assert!(heavy.width > light.width);
        assert!(heavy.color.a() > light.color.a());
    }
}
