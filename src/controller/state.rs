//! View state owned by the controller.

use crate::models::SizeField;
use std::fmt;
use tokio::task::JoinHandle;

/// Autoplay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Paused,
    Playing,
}

impl PlayState {
    /// Label of the play control.
    pub fn label(&self) -> &'static str {
        match self {
            PlayState::Paused => "▶ Play",
            PlayState::Playing => "⏸ Pause",
        }
    }
}

impl fmt::Display for PlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayState::Paused => write!(f, "paused"),
            PlayState::Playing => write!(f, "playing"),
        }
    }
}

/// A running autoplay task.
///
/// Ticks are stamped with `generation` so that ticks already queued
/// when the task was aborted can be told apart from live ones.
#[derive(Debug)]
pub struct PlaybackTimer {
    pub generation: u64,
    handle: JoinHandle<()>,
}

impl PlaybackTimer {
    pub fn new(generation: u64, handle: JoinHandle<()>) -> Self {
        Self { generation, handle }
    }

    /// Stop the task. Consumes the timer so it cannot be stopped twice.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

/// Current year, bounds, play state, size encoding and timer.
#[derive(Debug)]
pub struct ViewState {
    pub year: i32,
    pub min_year: i32,
    pub max_year: i32,
    pub play: PlayState,
    pub size: SizeField,
    pub timer: Option<PlaybackTimer>,
}

impl ViewState {
    pub fn new(min_year: i32, max_year: i32, size: SizeField) -> Self {
        Self {
            year: min_year,
            min_year,
            max_year,
            play: PlayState::Paused,
            size,
            timer: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.play == PlayState::Playing
    }

    /// Year after the current one, wrapping to the minimum past the maximum.
    pub fn next_year(&self) -> i32 {
        if self.year >= self.max_year {
            self.min_year
        } else {
            self.year + 1
        }
    }

    /// Clamp a requested year to the slider bounds.
    pub fn clamp_year(&self, year: i32) -> i32 {
        year.clamp(self.min_year, self.max_year)
    }

    /// Whether a tick with `generation` comes from the live timer.
    pub fn accepts_tick(&self, generation: u64) -> bool {
        self.is_playing()
            && self
                .timer
                .as_ref()
                .is_some_and(|t| t.generation == generation)
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "year {} [{}..{}] | {} | size: {}",
            self.year, self.min_year, self.max_year, self.play, self.size
        )
    }
}
