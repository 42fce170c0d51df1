use std::cell::RefCell;

use crate::signal::Signal;

/// Normalized drag lifecycle, delivered through the consumer's action signal.
#[derive(Clone, Debug, PartialEq)]
pub enum DragAction {
    Start { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Drop { x: f64, y: f64 },
    Cancel,
}

/// Translates raw pointer events into the drag lifecycle for exactly one
/// consumer at a time.
///
/// Constructed once at application start; the host feeds it page-level
/// pointer and key events. Starting a new drag silently supersedes the
/// previous raw wiring; the previous logical session is the consumer's to
/// clean up (its `Start` handler guards re-entrancy).
pub struct DragEngine {
    active: RefCell<Option<Signal<DragAction>>>,
}

impl DragEngine {
    pub fn new() -> Self {
        Self {
            active: RefCell::new(None),
        }
    }

    /// Make `target` the active drag consumer and emit `Start` at the
    /// pointer position.
    pub fn begin_drag(&self, target: &Signal<DragAction>, x: f64, y: f64) {
        tracing::debug!(x, y, "drag begin");
        *self.active.borrow_mut() = Some(target.clone());
        target.set(DragAction::Start { x, y });
    }

    pub fn pointer_moved(&self, x: f64, y: f64) {
        let target = self.active.borrow().clone();
        if let Some(target) = target {
            target.set(DragAction::Move { x, y });
        }
    }

    /// Pointer released: emit `Drop` and detach.
    pub fn pointer_up(&self, x: f64, y: f64) {
        let target = self.active.borrow_mut().take();
        if let Some(target) = target {
            tracing::debug!(x, y, "drag drop");
            target.set(DragAction::Drop { x, y });
        }
    }

    /// Escape pressed: emit `Cancel` and detach.
    pub fn cancel(&self) {
        let target = self.active.borrow_mut().take();
        if let Some(target) = target {
            tracing::debug!("drag cancelled");
            target.set(DragAction::Cancel);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.borrow().is_some()
    }
}

impl Default for DragEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(target: &Signal<DragAction>) -> Rc<RefCell<Vec<DragAction>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_in = Rc::clone(&log);
        target.subscribe(move |action: &DragAction, _| log_in.borrow_mut().push(action.clone()));
        log
    }

    #[test]
    fn lifecycle_start_move_drop() {
        let engine = DragEngine::new();
        let target = Signal::new();
        let log = record(&target);

        engine.begin_drag(&target, 1.0, 2.0);
        engine.pointer_moved(3.0, 4.0);
        engine.pointer_up(5.0, 6.0);

        assert_eq!(
            *log.borrow(),
            vec![
                DragAction::Start { x: 1.0, y: 2.0 },
                DragAction::Move { x: 3.0, y: 4.0 },
                DragAction::Drop { x: 5.0, y: 6.0 },
            ]
        );
        assert!(!engine.is_dragging());
    }

    #[test]
    fn events_without_active_drag_are_ignored() {
        let engine = DragEngine::new();
        engine.pointer_moved(1.0, 1.0);
        engine.pointer_up(1.0, 1.0);
        engine.cancel();
        assert!(!engine.is_dragging());
    }

    #[test]
    fn new_drag_supersedes_previous_target() {
        let engine = DragEngine::new();
        let first = Signal::new();
        let second = Signal::new();
        let first_log = record(&first);
        let second_log = record(&second);

        engine.begin_drag(&first, 0.0, 0.0);
        engine.begin_drag(&second, 1.0, 1.0);
        engine.pointer_moved(2.0, 2.0);

        // Only the superseding target hears the move.
        assert_eq!(first_log.borrow().len(), 1);
        assert_eq!(
            second_log.borrow().last(),
            Some(&DragAction::Move { x: 2.0, y: 2.0 })
        );
    }

    #[test]
    fn escape_emits_cancel_and_detaches() {
        let engine = DragEngine::new();
        let target = Signal::new();
        let log = record(&target);

        engine.begin_drag(&target, 0.0, 0.0);
        engine.cancel();
        engine.pointer_moved(9.0, 9.0);

        assert_eq!(log.borrow().last(), Some(&DragAction::Cancel));
        assert_eq!(log.borrow().len(), 2);
    }
}
