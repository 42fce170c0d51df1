//! Reactive primitives for the board renderer: observable value cells,
//! a frame-driven animation engine, and the pointer drag lifecycle.
//!
//! Everything here is single-threaded by construction (`Rc`/`RefCell`);
//! the host event loop is the only scheduler.

pub mod animation;
pub mod drag;
pub mod easing;
pub mod signal;

pub use animation::{AnimationEngine, AnimationJob};
pub use drag::{DragAction, DragEngine};
pub use easing::{ease_out_quad, lerp, linear};
pub use signal::{Signal, SubscriptionId};
