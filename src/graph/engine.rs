use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::catalog::Catalog;
use crate::config::{LensConfig, PhysicsConfig};
use crate::error::LensWarning;

use super::model::GraphModel;
use super::physics;
use super::render::{PassRegistry, RenderFrame, Surface, Viewport};
use super::score::Scorer;
use super::view_state::{CommandSender, ViewCommand, ViewState};

pub const WARNING_BUFFER_LIMIT: usize = 256;

const WEIGHT_CHANGE_KICK: f32 = 0.6;

/// What one [`GraphEngine::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The engine was stopped and did nothing.
    pub skipped: bool,
    pub commands: usize,
    pub weights_recomputed: bool,
    /// Some node is still settling; callers should keep ticking.
    pub moving: bool,
}

/// Owns the model, the view state and the pass registry, and advances them
/// one frame at a time. Producers talk to it only through [`CommandSender`].
pub struct GraphEngine {
    config: LensConfig,
    model: GraphModel,
    view: ViewState,
    scorer: Scorer,
    passes: PassRegistry,
    sender: CommandSender,
    receiver: Receiver<ViewCommand>,
    running: bool,
    ticks: u64,
    hovered: Option<usize>,
    warnings: VecDeque<LensWarning>,
}

impl GraphEngine {
    pub fn new(catalog: Catalog, config: LensConfig, passes: PassRegistry) -> Self {
        let (sender, receiver) = mpsc::channel();
        let model = GraphModel::new(catalog, &config);
        let mut engine = Self {
            scorer: Scorer::new(config.scoring.clone()),
            config,
            model,
            view: ViewState::default(),
            passes,
            sender,
            receiver,
            running: true,
            ticks: 0,
            hovered: None,
            warnings: VecDeque::new(),
        };
        engine.check_empty();
        engine
    }

    pub fn sender(&self) -> CommandSender {
        self.sender.clone()
    }

    /// Queues a command for the next tick.
    pub fn push(&self, command: ViewCommand) {
        let _ = self.sender.send(command);
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stopped engines ignore ticks; queued commands wait for [`Self::start`].
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn passes(&self) -> &PassRegistry {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut PassRegistry {
        &mut self.passes
    }

    pub fn set_physics(&mut self, physics: PhysicsConfig) {
        self.config.physics = physics;
    }

    pub fn set_hovered(&mut self, node_index: Option<usize>) {
        self.hovered = node_index.filter(|&index| index < self.model.node_count());
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Drains buffered diagnostics, oldest first.
    pub fn take_warnings(&mut self) -> Vec<LensWarning> {
        self.warnings.drain(..).collect()
    }

    /// Applies queued commands, refreshes weights when they went stale,
    /// advances the simulation by `dt` seconds and runs every active pass.
    pub fn tick(&mut self, dt: f32, viewport: &Viewport, surface: &mut dyn Surface) -> TickReport {
        if !self.running {
            return TickReport {
                skipped: true,
                ..TickReport::default()
            };
        }

        let mut report = TickReport {
            commands: self.drain_commands(),
            ..TickReport::default()
        };

        if self.model.weights_dirty() {
            self.model.recompute_weights(&self.view, &self.scorer);
            self.model.perturb(WEIGHT_CHANGE_KICK);
            report.weights_recomputed = true;
        }

        let step = physics::step(&mut self.model, dt, self.ticks, &self.config.physics);
        report.moving = step.moving;
        for node in step.unstable {
            self.push_warning(LensWarning::NumericInstability { node });
        }

        let frame = RenderFrame {
            model: &self.model,
            view: &self.view,
            viewport,
            scoring: &self.config.scoring,
            hovered: self.hovered,
        };
        self.passes.run(&frame, dt, surface);

        self.ticks = self.ticks.wrapping_add(1);
        report
    }

    fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(command) => {
                    self.apply(command);
                    applied += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return applied,
            }
        }
    }

    fn apply(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::ToggleLens(lens) => {
                let active = self.view.toggle_lens(&lens);
                tracing::debug!(lens = %lens, active, "lens toggled");
                self.model.mark_dirty();
            }
            ViewCommand::SearchCompleted { query, matched_ids } => {
                tracing::debug!(query = %query, matches = matched_ids.len(), "search completed");
                self.view.complete_search(&query, matched_ids);
                self.model.mark_dirty();
            }
            ViewCommand::ClearSearch => {
                self.view.clear_search();
                self.model.mark_dirty();
            }
            ViewCommand::Select(id) => {
                if self.model.index_of(&id).is_some() {
                    self.view.toggle_selection(&id);
                    self.model.mark_dirty();
                }
            }
            ViewCommand::ClearSelection => {
                self.view.selections.clear();
                self.model.mark_dirty();
            }
            ViewCommand::ReplaceCatalog(catalog) => {
                self.model.replace_catalog(catalog, &self.config);
                self.view
                    .selections
                    .retain(|id| self.model.index_of(id).is_some());
                self.hovered = None;
                self.check_empty();
            }
            ViewCommand::DragNode { id, position } => {
                self.model.drag(&id, position);
            }
            ViewCommand::ReleaseNode(id) => {
                self.model.release(&id);
            }
            ViewCommand::Resize(size) => {
                self.model.set_surface_size(size);
            }
        }
    }

    fn check_empty(&mut self) {
        if self.model.record_count() == 0 {
            tracing::warn!("catalog is empty; only the focus node will be drawn");
            self.push_warning(LensWarning::EmptyGraph);
        }
    }

    fn push_warning(&mut self, warning: LensWarning) {
        if self.warnings.len() == WARNING_BUFFER_LIMIT {
            self.warnings.pop_front();
        }
        self.warnings.push_back(warning);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::catalog::Record;
    use crate::graph::RecordingSurface;

    fn record(id: &str, uses: &[&str]) -> Record {
        let fields = json!({"name": id, "uses": uses})
            .as_object()
            .cloned()
            .unwrap_or_default();
        Record::new(id, fields)
    }

    fn engine() -> GraphEngine {
        let catalog = Catalog::new(vec![
            record("porcini", &["edible", "choice"]),
            record("bay-bolete", &["edible", "choice"]),
            record("death-cap", &["deadly"]),
        ]);
        GraphEngine::new(catalog, LensConfig::default(), PassRegistry::with_defaults())
    }

    fn tick(engine: &mut GraphEngine) -> (TickReport, RecordingSurface) {
        let mut surface = RecordingSurface::default();
        let report = engine.tick(1.0 / 60.0, &Viewport::default(), &mut surface);
        (report, surface)
    }

    #[test]
    fn empty_catalog_renders_focus_and_warns() {
        let mut engine = GraphEngine::new(
            Catalog::empty(),
            LensConfig::default(),
            PassRegistry::with_defaults(),
        );
        let (report, surface) = tick(&mut engine);

        assert!(!report.skipped);
        assert_eq!(engine.model().node_count(), 1);
        assert!(engine.model().edges().is_empty());
        assert!(surface.count_for("focus") > 0);
        assert_eq!(surface.count_for("connections"), 0);
        assert_eq!(surface.count_for("nodes"), 0);
        assert_eq!(engine.take_warnings(), vec![LensWarning::EmptyGraph]);
        assert!(engine.take_warnings().is_empty());
    }

    #[test]
    fn commands_apply_on_the_next_tick() {
        let mut engine = engine();
        tick(&mut engine);

        let sender = engine.sender();
        sender
            .send(ViewCommand::ToggleLens("Edible".to_owned()))
            .expect("engine alive");
        sender
            .send(ViewCommand::Select("death-cap".to_owned()))
            .expect("engine alive");
        assert!(engine.view().active_lenses.is_empty());

        let (report, _) = tick(&mut engine);
        assert_eq!(report.commands, 2);
        assert!(report.weights_recomputed);
        assert!(engine.view().lens_active("edible"));
        assert!(engine.view().is_selected("death-cap"));

        let (report, _) = tick(&mut engine);
        assert_eq!(report.commands, 0);
        assert!(!report.weights_recomputed);
    }

    #[test]
    fn lens_toggle_raises_focus_weight_of_matching_records() {
        let mut engine = engine();
        tick(&mut engine);
        let porcini = engine.model().index_of("porcini").unwrap_or_default();
        let before = engine.model().focus_weight(porcini);

        engine.push(ViewCommand::ToggleLens("edible".to_owned()));
        tick(&mut engine);

        assert!(engine.model().focus_weight(porcini) > before);
    }

    #[test]
    fn stopped_engine_ignores_ticks_and_keeps_commands() {
        let mut engine = engine();
        engine.stop();
        engine.push(ViewCommand::ToggleLens("edible".to_owned()));

        let (report, surface) = tick(&mut engine);
        assert!(report.skipped);
        assert!(surface.commands().is_empty());
        assert_eq!(engine.ticks(), 0);

        engine.start();
        let (report, _) = tick(&mut engine);
        assert_eq!(report.commands, 1);
        assert!(engine.view().lens_active("edible"));
    }

    #[test]
    fn replacing_catalog_rebuilds_and_drops_stale_selections() {
        let mut engine = engine();
        engine.push(ViewCommand::Select("porcini".to_owned()));
        engine.push(ViewCommand::Select("death-cap".to_owned()));
        tick(&mut engine);

        engine.push(ViewCommand::ReplaceCatalog(Catalog::new(vec![record(
            "porcini",
            &["edible"],
        )])));
        let (report, _) = tick(&mut engine);

        assert!(report.weights_recomputed);
        assert_eq!(engine.model().node_count(), 2);
        assert_eq!(
            engine.view().selections.iter().collect::<Vec<_>>(),
            vec!["porcini"]
        );
    }

    #[test]
    fn selecting_unknown_ids_is_ignored() {
        let mut engine = engine();
        engine.push(ViewCommand::Select("missing".to_owned()));
        tick(&mut engine);
        assert!(engine.view().selections.is_empty());
    }

    #[test]
    fn dragged_node_follows_the_pointer() {
        let mut engine = engine();
        engine.push(ViewCommand::DragNode {
            id: "porcini".to_owned(),
            position: vec2(40.0, -30.0),
        });
        tick(&mut engine);
        let porcini = engine.model().index_of("porcini").unwrap_or_default();
        assert_eq!(engine.model().nodes()[porcini].position, vec2(40.0, -30.0));

        engine.push(ViewCommand::ReleaseNode("porcini".to_owned()));
        tick(&mut engine);
        assert!(!engine.model().nodes()[porcini].pinned);
    }

    #[test]
    fn warning_buffer_is_bounded() {
        let mut engine = engine();
        for _ in 0..(WARNING_BUFFER_LIMIT + 10) {
            engine.push_warning(LensWarning::EmptyGraph);
        }
        assert_eq!(engine.take_warnings().len(), WARNING_BUFFER_LIMIT);
    }

    #[test]
    fn search_history_survives_clearing() {
        let mut engine = engine();
        engine.push(ViewCommand::SearchCompleted {
            query: "bolete".to_owned(),
            matched_ids: vec!["bay-bolete".to_owned()],
        });
        engine.push(ViewCommand::ClearSearch);
        tick(&mut engine);

        assert!(!engine.view().search_active());
        assert_eq!(engine.view().search_history.front().map(String::as_str), Some("bolete"));
    }
}
