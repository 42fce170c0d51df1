//! Application wiring: the position-notation signal, its pure mappings into
//! the board's inputs, and the move-commit collaborator that applies
//! committed drags through the rules engine.

use std::rc::Rc;

use anyhow::Context;
use board::{Board, BoardCtx, BoardSignals, Scene};
use chess::{rules, PieceColor, Square};
use reactive::{AnimationEngine, DragEngine, Signal};

pub struct App {
    pub ctx: BoardCtx,
    pub board: Board,
    pub signals: BoardSignals,
    /// The full position notation, opaque to the renderer. Updating it
    /// re-derives placement, turn, destinations, and check.
    pub position: Signal<String>,
}

impl App {
    pub fn new(start_fen: &str, orientation: PieceColor) -> anyhow::Result<Self> {
        let ctx = BoardCtx {
            scene: Scene::new_handle(),
            anim: Rc::new(AnimationEngine::new()),
            drag: Rc::new(DragEngine::new()),
        };
        let signals = BoardSignals::new();
        signals.orientation.set(orientation);
        let board = Board::new(ctx.clone(), signals.clone());

        let position = Signal::with(start_fen.to_string());

        // position notation -> pure mappings into the board's inputs
        position.subscribe({
            let signals = signals.clone();
            move |fen: &String, _| {
                if let Err(error) = publish_position(fen, &signals) {
                    tracing::error!(%error, "position update rejected");
                }
            }
        });
        publish_position(start_fen, &signals)
            .with_context(|| format!("invalid start position '{start_fen}'"))?;

        // the move-commit collaborator: validate-free application (the board
        // only commits destinations the rules engine listed)
        signals.moved.subscribe({
            let position = position.clone();
            move |&(from, to): &(Square, Square), _| {
                let Some(fen) = position.get() else {
                    return;
                };
                match rules::apply_move(&fen, from, to) {
                    Ok(next) => {
                        tracing::info!(%from, %to, "move committed");
                        position.set(next);
                    }
                    Err(error) => {
                        tracing::warn!(%error, %from, %to, "move rejected by rules engine");
                    }
                }
            }
        });

        Ok(Self {
            ctx,
            board,
            signals,
            position,
        })
    }

    /// Flip the viewing side.
    pub fn flip(&self) {
        self.signals.orientation.update(|current| {
            current.copied().unwrap_or(PieceColor::White).opposite()
        });
    }
}

/// Derive the board's input signals from a position notation. Parse failures
/// surface from the rules engine and leave the previous state in place.
fn publish_position(fen: &str, signals: &BoardSignals) -> anyhow::Result<()> {
    let placement = chess::fen::placement(fen)?;
    let turn = rules::side_to_move(fen)?;
    let dests = rules::legal_destinations(fen)?;
    let check = rules::in_check(fen)?;

    signals.turn.set(turn);
    signals.dests.set(dests);
    signals.check.set(check);
    signals.pieces.set(placement);
    Ok(())
}
