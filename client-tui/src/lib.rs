//! Terminal host for the animated board: wires the rules facade to the
//! board's signals, feeds pointer and key events into the engines, and
//! paints the scene tree with ratatui.

pub mod app;
pub mod config;
pub mod ui;
