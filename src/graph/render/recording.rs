use eframe::egui::{Align2, Color32, Pos2, Stroke};

use super::Surface;

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Line {
        pass: &'static str,
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
    },
    Circle {
        pass: &'static str,
        center: Pos2,
        radius: f32,
        color: Color32,
        filled: bool,
    },
    Text {
        pass: &'static str,
        position: Pos2,
        text: String,
        color: Color32,
    },
}

impl DrawCommand {
    pub fn pass(&self) -> &'static str {
        match self {
            Self::Line { pass, .. } | Self::Circle { pass, .. } | Self::Text { pass, .. } => pass,
        }
    }
}

/// Headless surface that keeps every draw call, tagged with the pass that
/// issued it.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    current_pass: &'static str,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn count_for(&self, pass: &str) -> usize {
        self.commands
            .iter()
            .filter(|command| command.pass() == pass)
            .count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn begin_pass(&mut self, name: &'static str) {
        self.current_pass = name;
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.commands.push(DrawCommand::Line {
            pass: self.current_pass,
            from,
            to,
            width: stroke.width,
            color: stroke.color,
        });
    }

    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.commands.push(DrawCommand::Circle {
            pass: self.current_pass,
            center,
            radius,
            color,
            filled: true,
        });
    }

    fn circle_stroke(&mut self, center: Pos2, radius: f32, stroke: Stroke) {
        self.commands.push(DrawCommand::Circle {
            pass: self.current_pass,
            center,
            radius,
            color: stroke.color,
            filled: false,
        });
    }

    fn text(&mut self, position: Pos2, _anchor: Align2, text: &str, _size: f32, color: Color32) {
        self.commands.push(DrawCommand::Text {
            pass: self.current_pass,
            position,
            text: text.to_owned(),
            color,
        });
    }
}
