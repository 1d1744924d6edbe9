//! Pluggable drawing passes over a [`Surface`].
//!
//! Passes run in increasing [`RenderPass::priority`]; turning one off removes
//! its output and nothing else.

mod color;
mod connections;
mod focus;
mod nodes;
mod recording;
mod viewport;

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Stroke};

use crate::config::ScoringWeights;

use super::ViewState;
use super::model::GraphModel;

pub use color::{blend_color, category_color, dim_color};
pub use connections::ConnectionsPass;
pub use focus::FocusPass;
pub use nodes::NodesPass;
pub use recording::{DrawCommand, RecordingSurface};
pub use viewport::Viewport;

/// Minimal drawing backend the passes target.
pub trait Surface {
    /// Called before each pass draws; recorders use it to tag output.
    fn begin_pass(&mut self, _name: &'static str) {}

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke);

    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32);

    fn circle_stroke(&mut self, center: Pos2, radius: f32, stroke: Stroke);

    fn text(&mut self, position: Pos2, anchor: Align2, text: &str, size: f32, color: Color32);
}

impl Surface for Painter {
    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.line_segment([from, to], stroke);
    }

    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32) {
        Painter::circle_filled(self, center, radius, color);
    }

    fn circle_stroke(&mut self, center: Pos2, radius: f32, stroke: Stroke) {
        Painter::circle_stroke(self, center, radius, stroke);
    }

    fn text(&mut self, position: Pos2, anchor: Align2, text: &str, size: f32, color: Color32) {
        Painter::text(self, position, anchor, text, FontId::proportional(size), color);
    }
}

/// Everything a pass may read while drawing one frame.
pub struct RenderFrame<'a> {
    pub model: &'a GraphModel,
    pub view: &'a ViewState,
    pub viewport: &'a Viewport,
    pub scoring: &'a ScoringWeights,
    pub hovered: Option<usize>,
}

impl RenderFrame<'_> {
    /// Search hit, selection, or a record carrying an active lens.
    pub fn emphasized(&self, node_index: usize) -> bool {
        let Some(node) = self.model.nodes().get(node_index) else {
            return false;
        };
        if node.is_focus {
            return false;
        }
        if self.view.is_search_match(&node.id) || self.view.is_selected(&node.id) {
            return true;
        }
        self.model.profile(node_index).is_some_and(|profile| {
            self.view
                .active_lenses
                .iter()
                .any(|lens| profile.lens_categories.contains(lens))
        })
    }
}

pub trait RenderPass {
    fn name(&self) -> &'static str;

    /// Lower priorities draw first, underneath later passes.
    fn priority(&self) -> i32;

    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// Reacts to the current model and view before drawing.
    fn apply(&mut self, _model: &GraphModel, _view: &ViewState) {}

    /// Advances pass-local animation.
    fn step(&mut self, _dt: f32) {}

    fn render(&self, frame: &RenderFrame<'_>, surface: &mut dyn Surface);
}

/// Ordered set of passes owned by one engine.
#[derive(Default)]
pub struct PassRegistry {
    passes: Vec<Box<dyn RenderPass>>,
}

impl PassRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Connections, focus and nodes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ConnectionsPass::default()));
        registry.register(Box::new(FocusPass::default()));
        registry.register(Box::new(NodesPass::default()));
        registry
    }

    /// Passes with equal priority keep registration order.
    pub fn register(&mut self, pass: Box<dyn RenderPass>) {
        let position = self
            .passes
            .partition_point(|existing| existing.priority() <= pass.priority());
        self.passes.insert(position, pass);
    }

    /// Returns false when no pass has that name.
    pub fn set_active(&mut self, name: &str, active: bool) -> bool {
        match self.passes.iter_mut().find(|pass| pass.name() == name) {
            Some(pass) => {
                pass.set_active(active);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, name: &str) -> Option<bool> {
        self.passes
            .iter()
            .find(|pass| pass.name() == name)
            .map(|pass| pass.is_active())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn run(&mut self, frame: &RenderFrame<'_>, dt: f32, surface: &mut dyn Surface) {
        for pass in self.passes.iter_mut().filter(|pass| pass.is_active()) {
            pass.apply(frame.model, frame.view);
            pass.step(dt);
            surface.begin_pass(pass.name());
            pass.render(frame, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Rect, vec2};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};

    use super::*;
    use crate::catalog::{Catalog, Record};
    use crate::config::LensConfig;
    use crate::graph::Scorer;

    struct Marker {
        name: &'static str,
        priority: i32,
        active: bool,
    }

    impl RenderPass for Marker {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn set_active(&mut self, active: bool) {
            self.active = active;
        }

        fn render(&self, _frame: &RenderFrame<'_>, surface: &mut dyn Surface) {
            surface.circle_filled(Pos2::ZERO, 1.0, Color32::WHITE);
        }
    }

    fn marker(name: &'static str, priority: i32) -> Box<dyn RenderPass> {
        Box::new(Marker {
            name,
            priority,
            active: true,
        })
    }

    fn record(id: &str, value: Value) -> Record {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Record::new(id, fields)
    }

    fn sample_model() -> GraphModel {
        let catalog = Catalog::new(vec![
            record("porcini", json!({"uses": ["edible"], "family": "Boletaceae"})),
            record("bay-bolete", json!({"uses": ["edible"], "family": "Boletaceae"})),
            record("death-cap", json!({"uses": ["deadly"]})),
        ]);
        let mut model = GraphModel::new(catalog, &LensConfig::default());
        model.recompute_weights(&ViewState::default(), &Scorer::default());
        model
    }

    fn render(registry: &mut PassRegistry, model: &GraphModel, view: &ViewState) -> RecordingSurface {
        let viewport = Viewport::new(Rect::from_min_size(Pos2::ZERO, vec2(1200.0, 800.0)));
        let scoring = ScoringWeights::default();
        let frame = RenderFrame {
            model,
            view,
            viewport: &viewport,
            scoring: &scoring,
            hovered: None,
        };
        let mut surface = RecordingSurface::default();
        registry.run(&frame, 1.0 / 60.0, &mut surface);
        surface
    }

    #[test]
    fn passes_run_in_priority_order() {
        let mut registry = PassRegistry::empty();
        registry.register(marker("late", 30));
        registry.register(marker("early", 10));
        registry.register(marker("middle", 20));
        registry.register(marker("middle-2", 20));

        assert_eq!(registry.names(), vec!["early", "middle", "middle-2", "late"]);

        let surface = render(&mut registry, &sample_model(), &ViewState::default());
        let order = surface
            .commands()
            .iter()
            .map(DrawCommand::pass)
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["early", "middle", "middle-2", "late"]);
    }

    #[test]
    fn disabling_a_pass_removes_only_its_output() {
        let model = sample_model();
        let view = ViewState::default();
        let mut registry = PassRegistry::with_defaults();
        let full = render(&mut registry, &model, &view);

        assert!(registry.set_active("connections", false));
        assert_eq!(registry.is_active("connections"), Some(false));
        let partial = render(&mut registry, &model, &view);

        assert!(full.count_for("connections") > 0);
        assert_eq!(partial.count_for("connections"), 0);
        assert_eq!(partial.count_for("nodes"), full.count_for("nodes"));
        assert_eq!(partial.count_for("focus"), full.count_for("focus"));
        assert!(!registry.set_active("missing", true));
    }

    #[test]
    fn emphasis_follows_search_selection_and_lenses() {
        let model = sample_model();
        let mut view = ViewState::default();
        view.toggle_lens("deadly");
        view.complete_search("porc", vec!["porcini".to_owned()]);
        let viewport = Viewport::default();
        let scoring = ScoringWeights::default();
        let frame = RenderFrame {
            model: &model,
            view: &view,
            viewport: &viewport,
            scoring: &scoring,
            hovered: None,
        };

        assert!(frame.emphasized(model.index_of("porcini").unwrap_or_default()));
        assert!(frame.emphasized(model.index_of("death-cap").unwrap_or_default()));
        assert!(!frame.emphasized(model.index_of("bay-bolete").unwrap_or_default()));
        assert!(!frame.emphasized(0));
    }
}
