//! Interaction controller.
//!
//! This module owns the view state machine (paused/playing), the
//! autoplay timer and the interactive command session.

pub mod command;
pub mod machine;
pub mod session;
pub mod state;

pub use machine::Controller;
pub use session::{run_session, spawn_stdin_reader};
pub use state::ViewState;
