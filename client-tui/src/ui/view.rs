//! Paints the scene tree into the terminal buffer: base grid, marker tints,
//! piece glyphs at fractional cell positions, and coordinate labels.

use board::{Board, NodeId, NodeKind, Scene};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use super::theme::Theme;

const MARKER_CLASSES: [&str; 4] = ["orig", "dest", "last-move", "check"];

/// Geometry of the drawn board grid.
#[derive(Debug, Clone, Copy)]
pub struct BoardLayout {
    pub rect: Rect,
    pub square_width: u16,
    pub square_height: u16,
}

/// Board grid placement inside an already-bordered content area: three
/// columns of rank labels on the left, one row of file labels below.
pub fn board_layout(area: Rect) -> Option<BoardLayout> {
    let square_width = area.width.saturating_sub(3) / 8;
    let square_height = area.height.saturating_sub(1) / 8;
    if square_width < 2 || square_height < 1 {
        return None;
    }
    let square_width = square_width.min(10);
    let square_height = square_height.min(5);
    Some(BoardLayout {
        rect: Rect {
            x: area.x + 3,
            y: area.y,
            width: square_width * 8,
            height: square_height * 8,
        },
        square_width,
        square_height,
    })
}

/// Same layout computed from the full frame area (outer border included);
/// the run loop uses this to report pointer bounds.
pub fn screen_layout(area: Rect) -> Option<BoardLayout> {
    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    board_layout(inner)
}

pub struct BoardView<'a> {
    pub scene: &'a Scene,
    pub board: &'a Board,
    pub theme: &'a Theme,
}

impl Widget for BoardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" groundtty ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.board_border));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(layout) = board_layout(inner) else {
            buf.set_string(
                inner.x,
                inner.y,
                "window too small",
                Style::default().fg(Color::Red),
            );
            return;
        };

        for row in 0..8u16 {
            for col in 0..8u16 {
                let light = (row + col) % 2 == 0;
                let bg = if light {
                    self.theme.light_square
                } else {
                    self.theme.dark_square
                };
                self.fill_square(buf, &layout, col, row, bg, inner);
            }
        }

        // scene children carry stacking order: marker tints under and over
        // the base grid, then glyphs on top
        let children = self.scene.children(self.board.board_node());
        for &child in &children {
            if self.scene.kind(child) == Some(NodeKind::Marker) {
                self.draw_marker(child, &layout, buf, inner);
            }
        }
        for &child in &children {
            if self.scene.kind(child) == Some(NodeKind::Piece) {
                self.draw_piece(child, &layout, buf, inner);
            }
        }

        self.draw_labels(&layout, buf, inner);
    }
}

impl BoardView<'_> {
    fn fill_square(
        &self,
        buf: &mut Buffer,
        layout: &BoardLayout,
        col: u16,
        row: u16,
        bg: Color,
        bounds: Rect,
    ) {
        let x = layout.rect.x + col * layout.square_width;
        let y = layout.rect.y + row * layout.square_height;
        for dy in 0..layout.square_height {
            for dx in 0..layout.square_width {
                let px = x + dx;
                let py = y + dy;
                if px < bounds.right() && py < bounds.bottom() {
                    buf[(px, py)].set_bg(bg);
                }
            }
        }
    }

    fn draw_marker(&self, node: NodeId, layout: &BoardLayout, buf: &mut Buffer, bounds: Rect) {
        let t = self.scene.transform(node);
        let col = (t.x / 100.0).round();
        let row = (t.y / 100.0).round();
        if !(0.0..8.0).contains(&col) || !(0.0..8.0).contains(&row) {
            return;
        }
        let (col, row) = (col as u16, row as u16);
        let light = (col + row) % 2 == 0;
        let Some(color) = MARKER_CLASSES
            .iter()
            .find(|class| self.scene.has_class(node, class))
            .and_then(|class| self.theme.overlay(class, light))
        else {
            return;
        };
        self.fill_square(buf, layout, col, row, color, bounds);
    }

    fn draw_piece(&self, node: NodeId, layout: &BoardLayout, buf: &mut Buffer, bounds: Rect) {
        let t = self.scene.transform(node);
        let px = layout.rect.x as f64 + t.x / 100.0 * layout.square_width as f64;
        let py = layout.rect.y as f64 + t.y / 100.0 * layout.square_height as f64;
        let cx = (px + layout.square_width as f64 / 2.0).floor();
        let cy = (py + layout.square_height as f64 / 2.0).floor();
        if cx < bounds.x as f64 || cy < bounds.y as f64 {
            return;
        }
        let (cx, cy) = (cx as u16, cy as u16);
        if cx >= bounds.right() || cy >= bounds.bottom() {
            return;
        }

        let white = self.scene.has_class(node, "white");
        let mut style = Style::default()
            .fg(if white {
                self.theme.white_piece
            } else {
                self.theme.black_piece
            })
            .add_modifier(Modifier::BOLD);
        // terminal approximations of the animated feedback: shrunk or ghosted
        // pieces dim, tilted ones italicize
        if self.scene.has_class(node, "ghost") || t.scale < 0.95 {
            style = style.add_modifier(Modifier::DIM);
        }
        if t.deg.abs() > 8.0 {
            style = style.add_modifier(Modifier::ITALIC);
        }

        buf[(cx, cy)].set_symbol(piece_glyph(self.scene, node)).set_style(style);
    }

    fn draw_labels(&self, layout: &BoardLayout, buf: &mut Buffer, bounds: Rect) {
        let style = Style::default().fg(self.theme.board_label);

        let files = self.scene.children(self.board.files_node());
        let label_y = layout.rect.y + layout.square_height * 8;
        for (index, &node) in files.iter().enumerate() {
            let x = layout.rect.x + index as u16 * layout.square_width + layout.square_width / 2;
            if x < bounds.right() && label_y < bounds.bottom() {
                if let Some(text) = self.scene.text(node) {
                    buf.set_string(x, label_y, text, style);
                }
            }
        }

        let ranks = self.scene.children(self.board.ranks_node());
        for (index, &node) in ranks.iter().enumerate() {
            let y = layout.rect.y + index as u16 * layout.square_height + layout.square_height / 2;
            let x = layout.rect.x.saturating_sub(2);
            if y < bounds.bottom() {
                if let Some(text) = self.scene.text(node) {
                    buf.set_string(x, y, text, style);
                }
            }
        }
    }
}

fn piece_glyph(scene: &Scene, node: NodeId) -> &'static str {
    // filled glyph set for both sides; foreground color carries the side
    const ROLES: [(&str, &str); 6] = [
        ("king", "\u{265A}"),
        ("queen", "\u{265B}"),
        ("rook", "\u{265C}"),
        ("bishop", "\u{265D}"),
        ("knight", "\u{265E}"),
        ("pawn", "\u{265F}"),
    ];
    ROLES
        .iter()
        .find(|(class, _)| scene.has_class(node, class))
        .map(|(_, glyph)| *glyph)
        .unwrap_or("?")
}
