use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Ui, vec2};
use taxon_lens::ViewCommand;

use super::ViewModel;

fn draw_background(painter: &Painter, rect: Rect, pan: egui::Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

impl ViewModel {
    fn hovered_node(&self, pointer: Option<Pos2>) -> Option<usize> {
        let pointer = pointer?;
        self.engine
            .model()
            .nodes()
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let screen = self.viewport.world_to_screen(node.position);
                let distance = screen.distance(pointer);
                (distance <= self.viewport.scale_radius(node.radius)).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    fn node_id(&self, index: usize) -> Option<String> {
        self.engine.model().nodes().get(index).map(|node| node.id.clone())
    }

    fn handle_zoom_and_pan(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            let pointer = ui
                .input(|input| input.pointer.hover_pos())
                .unwrap_or_else(|| rect.center());
            self.viewport.zoom_at(pointer, scroll);
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.viewport.pan += response.drag_delta();
        }
    }

    fn handle_node_drag(&mut self, response: &egui::Response) {
        let pointer = response.interact_pointer_pos();

        if response.drag_started_by(egui::PointerButton::Primary) {
            self.dragging = self.hovered.and_then(|index| self.node_id(index));
        }

        if let Some(id) = self.dragging.clone() {
            if response.dragged_by(egui::PointerButton::Primary)
                && let Some(pointer) = pointer
            {
                self.send(ViewCommand::DragNode {
                    id,
                    position: self.viewport.screen_to_world(pointer),
                });
            } else if response.drag_stopped() {
                self.send(ViewCommand::ReleaseNode(id));
                self.dragging = None;
            }
        }
    }

    fn handle_click(&mut self, response: &egui::Response) {
        if !response.clicked_by(egui::PointerButton::Primary) {
            return;
        }

        match self.hovered.and_then(|index| self.node_id(index)) {
            Some(id) if id != taxon_lens::graph::FOCUS_NODE_ID => {
                self.detail_id = Some(id.clone());
                self.send(ViewCommand::Select(id));
            }
            Some(_) => {}
            None => {
                self.detail_id = None;
                self.send(ViewCommand::ClearSelection);
            }
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let mut painter = ui.painter_at(rect);

        self.viewport.rect = rect;
        self.handle_zoom_and_pan(ui, rect, &response);
        draw_background(&painter, rect, self.viewport.pan, self.viewport.zoom);

        let world_size = self.viewport.world_size();
        if self.last_world_size != Some(world_size) {
            self.last_world_size = Some(world_size);
            self.send(ViewCommand::Resize(world_size));
        }

        let pointer = ui.input(|input| input.pointer.hover_pos());
        self.hovered = if self.dragging.is_some() {
            self.hovered
        } else {
            self.hovered_node(pointer.filter(|pointer| rect.contains(*pointer)))
        };
        if self.hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        self.handle_node_drag(&response);
        self.handle_click(&response);
        self.engine.set_hovered(self.hovered);

        let dt = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let report = self.engine.tick(dt, &self.viewport, &mut painter);
        self.collect_warnings();

        if report.skipped {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Engine stopped",
                FontId::proportional(16.0),
                Color32::from_gray(200),
            );
        } else {
            ui.ctx().request_repaint();
        }

        if let Some(index) = self.hovered
            && let Some(record) = self.engine.model().record(index)
        {
            let schema = &self.engine.config().schema;
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}", record.label(schema), record.id()),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
