pub mod app;
pub mod board;
pub mod column;
pub mod input;
pub mod modal;
pub mod overlay;
pub mod render;
pub mod state;
pub mod theme;
pub mod undo;

pub use app::{RunOptions, run};
