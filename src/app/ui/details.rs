use eframe::egui::{self, RichText, Ui};
use serde_json::Value;
use taxon_lens::catalog::scalar_text;
use taxon_lens::fields::radar_axes;
use taxon_lens::util::short_label;
use taxon_lens::{FieldDirective, RepresentationKind, Resolver, ViewCommand};

use super::super::ViewModel;

const PREVIEW_CHARS: usize = 80;
const SIMILAR_ROWS: usize = 8;

fn value_preview(directive: &FieldDirective) -> String {
    let value = &directive.value;
    if let Some(text) = scalar_text(value) {
        return short_label(&text, PREVIEW_CHARS);
    }

    match directive.kind {
        RepresentationKind::RadarProfile => radar_axes(value)
            .iter()
            .map(|(axis, score)| format!("{axis} {score}"))
            .collect::<Vec<_>>()
            .join(", "),
        _ => match value {
            Value::Array(items) => {
                let parts = items.iter().filter_map(scalar_text).collect::<Vec<_>>();
                if parts.len() == items.len() {
                    short_label(&parts.join(", "), PREVIEW_CHARS)
                } else {
                    format!("{} item(s)", items.len())
                }
            }
            Value::Object(map) => format!("{} field(s)", map.len()),
            _ => String::new(),
        },
    }
}

impl ViewModel {
    fn similar_records(&self, id: &str) -> Vec<(String, String, f32)> {
        let model = self.engine.model();
        let view = self.engine.view();
        let scorer = self.engine.scorer();
        let schema = &self.engine.config().schema;

        let mut similar = model
            .catalog()
            .iter()
            .filter(|record| record.id() != id)
            .map(|record| {
                let weight = model.weight(id, record.id(), view, scorer);
                (record.id().to_owned(), record.label(schema), weight)
            })
            .filter(|(_, _, weight)| *weight > 0.0)
            .collect::<Vec<_>>();
        similar.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        similar.truncate(SIMILAR_ROWS);
        similar
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Record Details");
        ui.add_space(6.0);

        let Some(detail_id) = self.detail_id.clone() else {
            ui.label("Click a node to inspect its fields.");
            return;
        };

        let Some(record) = self.engine.model().catalog().find(&detail_id) else {
            ui.label("The selected record is no longer in the catalog.");
            return;
        };

        let config = self.engine.config();
        let resolver = Resolver::new(config.resolver.clone());
        let flattened = resolver.flatten(record, &config.flatten);

        ui.label(RichText::new(record.label(&config.schema)).strong());
        ui.small(record.id());
        ui.add_space(6.0);

        egui::Grid::new("directives")
            .num_columns(3)
            .striped(true)
            .show(ui, |ui| {
                ui.label(RichText::new("Field").strong());
                ui.label(RichText::new("Shown as").strong());
                ui.label(RichText::new("Value").strong());
                ui.end_row();

                for directive in &flattened.directives {
                    ui.label(directive.path.as_str())
                        .on_hover_text(format!("priority {}", directive.priority));
                    ui.label(directive.kind.label());
                    ui.label(value_preview(directive));
                    ui.end_row();
                }
            });

        if !flattened.warnings.is_empty() {
            ui.add_space(6.0);
            for warning in &flattened.warnings {
                ui.small(RichText::new(warning.to_string()).italics());
            }
        }

        ui.separator();
        ui.label(RichText::new("Most similar").strong());
        let similar = self.similar_records(&detail_id);
        if similar.is_empty() {
            ui.label("Nothing shares tags, lenses, taxonomy or regions with this record.");
        }
        let mut jump_to = None;
        for (id, label, weight) in &similar {
            if ui
                .link(format!("{label}  ({weight:.2})"))
                .on_hover_text(id.as_str())
                .clicked()
            {
                jump_to = Some(id.clone());
            }
        }
        if let Some(id) = jump_to {
            self.detail_id = Some(id.clone());
            self.send(ViewCommand::Select(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn directive(kind: RepresentationKind, value: Value) -> FieldDirective {
        FieldDirective {
            path: "field".to_owned(),
            kind,
            value,
            priority: 0,
        }
    }

    #[test]
    fn previews_scalars_lists_and_groups() {
        assert_eq!(value_preview(&directive(RepresentationKind::ShortLabel, json!("Boletaceae"))), "Boletaceae");
        assert_eq!(
            value_preview(&directive(RepresentationKind::TagSet, json!(["edible", "choice"]))),
            "edible, choice"
        );
        assert_eq!(
            value_preview(&directive(RepresentationKind::NestedGroup, json!({"a": 1, "b": 2}))),
            "2 field(s)"
        );
    }
}
