//! Raw terminal events into engine calls: mouse drives the drag engine,
//! Escape cancels, `f` flips the board.

use crossterm::event::{Event, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::App;

pub enum AppAction {
    Continue,
    Quit,
}

pub fn handle_event(app: &App, event: &Event) -> AppAction {
    match event {
        Event::Key(key) => match key.code {
            KeyCode::Char('q') => AppAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => AppAction::Quit,
            KeyCode::Esc => {
                app.ctx.drag.cancel();
                AppAction::Continue
            }
            KeyCode::Char('f') => {
                app.flip();
                AppAction::Continue
            }
            _ => AppAction::Continue,
        },
        Event::Mouse(mouse) => {
            handle_mouse(app, mouse);
            AppAction::Continue
        }
        _ => AppAction::Continue,
    }
}

fn handle_mouse(app: &App, mouse: &MouseEvent) {
    // center of the hovered cell, in screen-cell units
    let x = mouse.column as f64 + 0.5;
    let y = mouse.row as f64 + 0.5;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.board.pointer_down(x, y),
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            app.ctx.drag.pointer_moved(x, y);
        }
        MouseEventKind::Up(MouseButton::Left) => app.ctx.drag.pointer_up(x, y),
        _ => {}
    }
}
