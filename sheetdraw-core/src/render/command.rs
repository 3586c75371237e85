//! Backend-agnostic draw commands in device units

use crate::style::{Alignment, BorderSpec};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in device units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl DeviceRect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// One paint operation. Sinks must paint in emission order.
///
/// Text is always vertically centred in its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawCommand {
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color_hex: String,
    },
    Text {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        alignment: Alignment,
        font_name: String,
        font_size_pt: f64,
        content: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: BorderSpec,
    },
}

impl DrawCommand {
    pub fn fill(rect: DeviceRect, color_hex: &str) -> Self {
        DrawCommand::FillRect {
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            color_hex: color_hex.to_string(),
        }
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64, stroke: &BorderSpec) -> Self {
        DrawCommand::Line {
            x1,
            y1,
            x2,
            y2,
            stroke: stroke.clone(),
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            DrawCommand::FillRect { .. } => CommandKind::FillRect,
            DrawCommand::Text { .. } => CommandKind::Text,
            DrawCommand::Line { .. } => CommandKind::Line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    FillRect,
    Text,
    Line,
}

/// Count commands by kind: (fills, texts, lines)
pub fn count_by_kind(commands: &[DrawCommand]) -> (usize, usize, usize) {
    commands
        .iter()
        .fold((0, 0, 0), |(fills, texts, lines), command| match command.kind() {
            CommandKind::FillRect => (fills + 1, texts, lines),
            CommandKind::Text => (fills, texts + 1, lines),
            CommandKind::Line => (fills, texts, lines + 1),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_by_kind() {
        let rect = DeviceRect {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 5.0,
        };
        let commands = vec![
            DrawCommand::fill(rect, "#ffffff"),
            DrawCommand::line(0.0, 0.0, 0.0, 5.0, &BorderSpec::none()),
            DrawCommand::line(rect.right(), 0.0, rect.right(), rect.bottom(), &BorderSpec::none()),
        ];
        assert_eq!(count_by_kind(&commands), (1, 0, 2));
        assert_eq!(commands[2], DrawCommand::line(10.0, 0.0, 10.0, 5.0, &BorderSpec::none()));
    }
}
