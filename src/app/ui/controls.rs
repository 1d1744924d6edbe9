use eframe::egui::{self, Context, RichText, Ui};
use taxon_lens::ViewCommand;

use super::super::ViewModel;
use super::super::search::search_catalog;

fn physics_slider(ui: &mut Ui, value: &mut f32, range: std::ops::RangeInclusive<f32>, text: &str, hint: &str) -> bool {
    ui.add(
        egui::Slider::new(value, range)
            .text(text)
            .clamping(egui::SliderClamping::Always),
    )
    .on_hover_text(hint)
    .changed()
}

impl ViewModel {
    pub(in crate::app) fn flush_search(&mut self, ctx: &Context) {
        let Some(edited_at) = self.search_edited_at else {
            return;
        };

        let now = ctx.input(|input| input.time);
        let waited = now - edited_at;
        if waited < Self::SEARCH_DEBOUNCE_SECS {
            ctx.request_repaint_after(std::time::Duration::from_secs_f64(
                Self::SEARCH_DEBOUNCE_SECS - waited,
            ));
            return;
        }

        self.search_edited_at = None;
        self.submit_search();
    }

    fn submit_search(&mut self) {
        let query = self.search.trim().to_owned();
        if query.is_empty() {
            self.send(ViewCommand::ClearSearch);
            return;
        }

        let matched_ids = search_catalog(
            self.engine.model().catalog(),
            &self.engine.config().schema,
            &query,
        );
        tracing::debug!(query = %query, matches = matched_ids.len(), "search submitted");
        self.send(ViewCommand::SearchCompleted { query, matched_ids });
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Lens Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (name or id)")
            .on_hover_text("Fuzzy-match records; hits are pulled toward the focus.");
        let search_response = ui.text_edit_singleline(&mut self.search);
        if search_response.changed() {
            self.search_edited_at = Some(ui.input(|input| input.time));
        }
        if search_response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter)) {
            self.search_edited_at = None;
            self.submit_search();
        }

        let view = self.engine.view();
        if let Some(matches) = &view.search_matches {
            ui.small(format!("{} match(es)", matches.len()));
        }
        if !view.search_history.is_empty() {
            let mut recalled = None;
            ui.collapsing("Recent searches", |ui| {
                for query in &view.search_history {
                    if ui.link(query.as_str()).clicked() {
                        recalled = Some(query.clone());
                    }
                }
            });
            if let Some(query) = recalled {
                self.search = query;
                self.search_edited_at = None;
                self.submit_search();
            }
        }

        ui.separator();
        ui.label(RichText::new("Lenses").strong());
        let lenses = self.engine.model().available_lenses(self.lens_limit);
        if lenses.is_empty() {
            ui.label("No tag-like fields found in this catalog.");
        }
        let mut toggled = Vec::new();
        ui.horizontal_wrapped(|ui| {
            for (lens, count) in &lenses {
                let active = self.engine.view().lens_active(lens);
                if ui
                    .selectable_label(active, format!("{lens} ({count})"))
                    .clicked()
                {
                    toggled.push(lens.clone());
                }
            }
        });
        for lens in toggled {
            self.send(ViewCommand::ToggleLens(lens));
        }
        ui.add(
            egui::Slider::new(&mut self.lens_limit, 4..=96)
                .text("Lenses shown")
                .clamping(egui::SliderClamping::Always),
        );

        ui.horizontal(|ui| {
            let selections = self.engine.view().selections.len();
            ui.label(format!("Selected: {selections}"));
            if ui
                .add_enabled(selections > 0, egui::Button::new("Clear selection"))
                .clicked()
            {
                self.detail_id = None;
                self.send(ViewCommand::ClearSelection);
            }
        });

        ui.separator();
        ui.label(RichText::new("Render passes").strong());
        let names = self.engine.passes().names();
        for name in names {
            let mut active = self.engine.passes().is_active(name).unwrap_or(false);
            if ui.checkbox(&mut active, name).changed() {
                self.engine.passes_mut().set_active(name, active);
            }
        }

        let mut running = self.engine.is_running();
        if ui
            .checkbox(&mut running, "Run engine")
            .on_hover_text("A stopped engine ignores frames; queued commands wait.")
            .changed()
        {
            if running {
                self.engine.start();
            } else {
                self.engine.stop();
            }
        }

        ui.collapsing("Physics tuning", |ui| {
            let physics = &mut self.physics;
            let mut changed = false;
            changed |= physics_slider(ui, &mut physics.intensity, 0.2..=2.5, "Intensity", "Overall strength of every force.");
            changed |= physics_slider(ui, &mut physics.repulsion_scale, 0.25..=2.6, "Repulsion", "How strongly nodes push each other away.");
            changed |= physics_slider(ui, &mut physics.spring_scale, 0.2..=2.2, "Springs", "How strongly weighted edges pull.");
            changed |= physics_slider(ui, &mut physics.collision_scale, 0.2..=2.0, "Collision", "Push applied to overlapping nodes.");
            changed |= physics_slider(ui, &mut physics.velocity_damping, 0.78..=0.97, "Damping", "Velocity kept each frame.");
            changed |= physics_slider(ui, &mut physics.drift, 0.0..=1.0, "Idle drift", "Small motion that keeps a settled graph alive.");
            changed |= physics_slider(ui, &mut physics.preferred_edge_length, 40.0..=400.0, "Edge length", "Rest length of the strongest edges.");
            if changed {
                self.engine.set_physics(self.physics);
            }
        });

        if !self.warnings.is_empty() {
            ui.separator();
            ui.collapsing(format!("Warnings ({})", self.warnings.len()), |ui| {
                for warning in self.warnings.iter().rev() {
                    ui.small(warning.to_string());
                }
            });
        }
    }
}
