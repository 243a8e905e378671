//! Interaction controller.
//!
//! Owns the store, the renderer and the view state, and turns events
//! (commands and timer ticks) into state transitions and re-renders.

use super::command::{Command, HELP};
use super::state::{PlayState, PlaybackTimer, ViewState};
use crate::models::{SizeField, Store};
use crate::render::{Patch, Renderer, Tooltip};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Something for the controller to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Command(Command),
    /// Autoplay tick from the timer with the given generation.
    Tick { generation: u64 },
}

/// What handling an event produced.
#[derive(Debug, Default)]
pub struct Outcome {
    /// The chart was re-rendered.
    pub patch: Option<Patch>,
    /// Text for the user.
    pub message: Option<String>,
    pub quit: bool,
}

impl Outcome {
    fn rendered(patch: Patch) -> Self {
        Self {
            patch: Some(patch),
            ..Self::default()
        }
    }

    fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Self::default()
        }
    }

    fn with_message(mut self, text: impl Into<String>) -> Self {
        self.message = Some(text.into());
        self
    }
}

pub struct Controller {
    store: Store,
    renderer: Renderer,
    state: ViewState,
    tooltip: Option<Tooltip>,
    events: UnboundedSender<Event>,
    interval: Duration,
    generation: u64,
}

impl Controller {
    pub fn new(
        store: Store,
        renderer: Renderer,
        state: ViewState,
        events: UnboundedSender<Event>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            renderer,
            state,
            tooltip: None,
            events,
            interval,
            generation: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Render the current year with the current size encoding.
    pub fn render(&mut self) -> Patch {
        self.renderer
            .render(&self.store, self.state.year, self.state.size, Instant::now())
    }

    /// Process one event to completion.
    pub fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Tick { generation } => self.tick(generation),
            Event::Command(command) => self.command(command),
        }
    }

    fn command(&mut self, command: Command) -> Outcome {
        match command {
            Command::Play => {
                if !self.state.is_playing() {
                    self.play();
                }
                Outcome::message(self.state.play.label())
            }
            Command::Pause => {
                self.pause();
                Outcome::message(self.state.play.label())
            }
            Command::Toggle => {
                if self.state.is_playing() {
                    self.pause();
                } else {
                    self.play();
                }
                Outcome::message(self.state.play.label())
            }
            Command::Year(year) => self.scrub(year),
            Command::Next => self.scrub(self.state.year.saturating_add(1)),
            Command::Prev => self.scrub(self.state.year.saturating_sub(1)),
            Command::Size(field) => self.select_size(field),
            Command::Click(key) => self.click(&key),
            Command::Hover { key, x, y } => self.hover(&key, x, y),
            Command::Leave => {
                self.tooltip = None;
                Outcome::default()
            }
            Command::Status => Outcome::message(self.state.to_string()),
            Command::Help => Outcome::message(HELP),
            Command::Quit => {
                self.pause();
                Outcome {
                    quit: true,
                    ..Outcome::default()
                }
            }
        }
    }

    /// Enter `Playing`: start a recurring timer feeding ticks into the queue.
    fn play(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let period = self.interval;
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                interval.tick().await;
                if events.send(Event::Tick { generation }).is_err() {
                    break;
                }
            }
        });

        self.state.timer = Some(PlaybackTimer::new(generation, handle));
        self.state.play = PlayState::Playing;
        info!("Playback started at {}", self.state.year);
    }

    /// Enter `Paused`, stopping the timer if one is running.
    fn pause(&mut self) {
        if let Some(timer) = self.state.timer.take() {
            timer.cancel();
            info!("Playback paused at {}", self.state.year);
        }
        self.state.play = PlayState::Paused;
    }

    fn tick(&mut self, generation: u64) -> Outcome {
        if !self.state.accepts_tick(generation) {
            debug!("Ignoring stale tick {}", generation);
            return Outcome::default();
        }

        self.state.year = self.state.next_year();
        Outcome::rendered(self.render())
    }

    /// Slider input. A manual scrub always stops autoplay.
    fn scrub(&mut self, year: i32) -> Outcome {
        if self.state.is_playing() {
            self.pause();
        }
        self.state.year = self.state.clamp_year(year);
        Outcome::rendered(self.render())
    }

    fn select_size(&mut self, field: SizeField) -> Outcome {
        self.state.size = field;
        Outcome::rendered(self.render()).with_message(format!("size: {}", field))
    }

    /// Clicking a mark interrupts autoplay.
    fn click(&mut self, key: &str) -> Outcome {
        if self.renderer.scene().get(key).is_none() {
            return Outcome::message(format!("no mark for {}", key));
        }
        if self.state.is_playing() {
            self.pause();
            return Outcome::message(self.state.play.label());
        }
        Outcome::default()
    }

    fn hover(&mut self, key: &str, x: f64, y: f64) -> Outcome {
        let Some(mark) = self.renderer.scene().get(key) else {
            return Outcome::message(format!("no mark for {}", key));
        };

        let chart = self.renderer.chart();
        let tooltip = Tooltip::show(&mark.datum, (x, y), chart.width, chart.height);
        let text = tooltip.text();
        self.tooltip = Some(tooltip);
        Outcome::message(text)
    }

    /// Stop any running timer.
    pub fn shutdown(&mut self) {
        self.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compute_domains, rollup_by_region};
    use crate::config::ChartConfig;
    use crate::models::YearRecord;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn store() -> Store {
        let mut records = Vec::new();
        for (i, year) in (2010..=2012).enumerate() {
            let i = i as f64;
            records.push(YearRecord::new(
                year,
                "06".into(),
                "California".into(),
                60000.0 + i * 1000.0,
                15.0 + i,
            ));
            records.push(YearRecord::new(
                year,
                "36".into(),
                "New York".into(),
                55000.0 + i * 1000.0,
                14.0 + i,
            ));
        }
        rollup_by_region(&records)
    }

    fn controller(interval: Duration) -> (Controller, UnboundedReceiver<Event>) {
        let store = store();
        let chart = ChartConfig::default();
        let domains = compute_domains(&store, chart.inner_width(), chart.inner_height());
        let renderer = Renderer::new(chart, domains);
        let (tx, rx) = unbounded_channel();
        let state = ViewState::new(2010, 2012, SizeField::None);

        let mut controller = Controller::new(store, renderer, state, tx, interval);
        controller.render();
        (controller, rx)
    }

    fn cmd(c: Command) -> Event {
        Event::Command(c)
    }

    #[tokio::test]
    async fn test_toggle_starts_and_stops_timer() {
        let (mut c, _rx) = controller(Duration::from_secs(60));

        let out = c.handle(cmd(Command::Toggle));
        assert_eq!(out.message.as_deref(), Some("⏸ Pause"));
        assert!(c.state().is_playing());
        assert!(c.state().timer.is_some());

        let out = c.handle(cmd(Command::Toggle));
        assert_eq!(out.message.as_deref(), Some("▶ Play"));
        assert!(!c.state().is_playing());
        assert!(c.state().timer.is_none());
    }

    #[tokio::test]
    async fn test_timer_sends_ticks() {
        let (mut c, mut rx) = controller(Duration::from_millis(10));
        c.handle(cmd(Command::Play));

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, Event::Tick { generation: 1 });

        let out = c.handle(event);
        assert!(out.patch.is_some());
        assert_eq!(c.state().year, 2011);
        c.shutdown();
    }

    #[tokio::test]
    async fn test_ticks_advance_and_wrap() {
        let (mut c, _rx) = controller(Duration::from_secs(60));
        c.handle(cmd(Command::Play));
        let generation = c.state().timer.as_ref().unwrap().generation;

        c.handle(Event::Tick { generation });
        assert_eq!(c.state().year, 2011);
        c.handle(Event::Tick { generation });
        assert_eq!(c.state().year, 2012);
        c.handle(Event::Tick { generation });
        assert_eq!(c.state().year, 2010);
        assert_eq!(c.renderer().year(), Some(2010));
    }

    #[tokio::test]
    async fn test_click_pauses_and_halts_advancement() {
        let (mut c, _rx) = controller(Duration::from_secs(60));
        c.handle(cmd(Command::Play));
        let generation = c.state().timer.as_ref().unwrap().generation;
        c.handle(Event::Tick { generation });
        assert_eq!(c.state().year, 2011);

        let out = c.handle(cmd(Command::Click("06".to_string())));
        assert_eq!(out.message.as_deref(), Some("▶ Play"));
        assert_eq!(c.state().play, PlayState::Paused);
        assert!(c.state().timer.is_none());

        // A tick queued before the click has no effect
        let out = c.handle(Event::Tick { generation });
        assert!(out.patch.is_none());
        assert_eq!(c.state().year, 2011);
    }

    #[tokio::test]
    async fn test_restart_ignores_ticks_from_previous_timer() {
        let (mut c, _rx) = controller(Duration::from_secs(60));
        c.handle(cmd(Command::Play));
        let old = c.state().timer.as_ref().unwrap().generation;
        c.handle(cmd(Command::Pause));
        c.handle(cmd(Command::Play));

        c.handle(Event::Tick { generation: old });
        assert_eq!(c.state().year, 2010);

        let current = c.state().timer.as_ref().unwrap().generation;
        assert_ne!(old, current);
        c.handle(Event::Tick { generation: current });
        assert_eq!(c.state().year, 2011);
        c.shutdown();
    }

    #[tokio::test]
    async fn test_play_twice_keeps_single_timer() {
        let (mut c, _rx) = controller(Duration::from_secs(60));
        c.handle(cmd(Command::Play));
        let first = c.state().timer.as_ref().unwrap().generation;
        c.handle(cmd(Command::Play));
        assert_eq!(c.state().timer.as_ref().unwrap().generation, first);
        c.shutdown();
    }

    #[tokio::test]
    async fn test_scrub_while_paused_renders_without_state_change() {
        let (mut c, _rx) = controller(Duration::from_secs(60));

        let out = c.handle(cmd(Command::Year(2012)));
        assert!(out.patch.is_some());
        assert_eq!(c.state().year, 2012);
        assert_eq!(c.renderer().year(), Some(2012));
        assert_eq!(c.state().play, PlayState::Paused);

        c.handle(cmd(Command::Year(1999)));
        assert_eq!(c.state().year, 2010);
    }

    #[tokio::test]
    async fn test_scrub_while_playing_pauses() {
        let (mut c, _rx) = controller(Duration::from_secs(60));
        c.handle(cmd(Command::Play));

        c.handle(cmd(Command::Year(2012)));

        assert_eq!(c.state().play, PlayState::Paused);
        assert!(c.state().timer.is_none());
        assert_eq!(c.state().year, 2012);
    }

    #[tokio::test]
    async fn test_size_change_keeps_play_state() {
        let (mut c, _rx) = controller(Duration::from_secs(60));
        c.handle(cmd(Command::Play));

        let out = c.handle(cmd(Command::Size(SizeField::Poverty)));

        assert!(out.patch.is_some());
        assert!(c.state().is_playing());
        assert_eq!(c.state().size, SizeField::Poverty);
        let radii: Vec<_> = c
            .renderer()
            .scene()
            .marks()
            .iter()
            .map(|m| m.target.r)
            .collect();
        assert_eq!(radii, vec![10.0, 3.0]);
        c.shutdown();
    }

    #[tokio::test]
    async fn test_hover_and_leave() {
        let (mut c, _rx) = controller(Duration::from_secs(60));

        let out = c.handle(cmd(Command::Hover {
            key: "36".to_string(),
            x: 2000.0,
            y: 100.0,
        }));
        assert!(out.message.unwrap().starts_with("New York · 2010"));
        let tooltip = c.tooltip().unwrap();
        assert_eq!((tooltip.x, tooltip.y), (1028.0, 100.0));

        c.handle(cmd(Command::Leave));
        assert!(c.tooltip().is_none());

        let out = c.handle(cmd(Command::Hover {
            key: "99".to_string(),
            x: 0.0,
            y: 0.0,
        }));
        assert_eq!(out.message.as_deref(), Some("no mark for 99"));
        assert!(c.tooltip().is_none());
    }

    #[tokio::test]
    async fn test_quit_stops_playback() {
        let (mut c, _rx) = controller(Duration::from_secs(60));
        c.handle(cmd(Command::Play));

        let out = c.handle(cmd(Command::Quit));

        assert!(out.quit);
        assert!(c.state().timer.is_none());
    }
}
