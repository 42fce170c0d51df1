use std::path::Path;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// All colors used by the client, grouped by purpose. Overlay entries carry
/// a (light-square, dark-square) variant pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    // board
    pub light_square: Color,
    pub dark_square: Color,
    pub white_piece: Color,
    pub black_piece: Color,
    pub board_border: Color,
    pub board_label: Color,

    // overlays
    pub overlay_origin: (Color, Color),
    pub overlay_dest: (Color, Color),
    pub overlay_last_move: (Color, Color),
    pub overlay_check: (Color, Color),
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            light_square: Color::Rgb(240, 217, 181),
            dark_square: Color::Rgb(181, 136, 99),
            white_piece: Color::White,
            black_piece: Color::Black,
            board_border: Color::Cyan,
            board_label: Color::Yellow,

            overlay_origin: (Color::LightYellow, Color::Yellow),
            overlay_dest: (Color::LightBlue, Color::Blue),
            overlay_last_move: (Color::LightGreen, Color::Green),
            overlay_check: (Color::LightRed, Color::Red),
        }
    }
}

impl Theme {
    /// Load a theme from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The overlay color for a marker class on a light or dark square.
    pub fn overlay(&self, class: &str, light: bool) -> Option<Color> {
        let pair = match class {
            "orig" => self.overlay_origin,
            "dest" => self.overlay_dest,
            "last-move" => self.overlay_last_move,
            "check" => self.overlay_check,
            _ => return None,
        };
        Some(if light { pair.0 } else { pair.1 })
    }
}
