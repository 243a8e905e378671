//! Keyed mark reconciliation with interpolated transitions.
//!
//! Each render hands the scene the desired marks for one year. Marks are
//! matched to the previous render by key: new keys are inserted at their
//! final position, known keys animate from wherever they currently are,
//! and missing keys are removed.

use crate::models::VisibleRecord;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Geometric attributes of a circle mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkAttrs {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

impl MarkAttrs {
    fn lerp(&self, to: &MarkAttrs, t: f64) -> MarkAttrs {
        MarkAttrs {
            cx: self.cx + (to.cx - self.cx) * t,
            cy: self.cy + (to.cy - self.cy) * t,
            r: self.r + (to.r - self.r) * t,
        }
    }
}

/// Symmetric cubic easing.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// An in-flight interpolation toward a mark's target.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: MarkAttrs,
    pub started: Instant,
    pub duration: Duration,
}

impl Transition {
    /// Eased progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        ease_cubic_in_out(elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }
}

/// Desired state of one mark for the current render.
#[derive(Debug, Clone)]
pub struct MarkSpec {
    pub key: String,
    pub datum: VisibleRecord,
    pub attrs: MarkAttrs,
    pub fill: String,
}

/// A rendered mark.
#[derive(Debug, Clone)]
pub struct Mark {
    pub key: String,
    pub datum: VisibleRecord,
    pub target: MarkAttrs,
    pub fill: String,
    pub transition: Option<Transition>,
}

impl Mark {
    /// Displayed attributes at `now`.
    pub fn attrs_at(&self, now: Instant) -> MarkAttrs {
        match &self.transition {
            Some(tr) => tr.from.lerp(&self.target, tr.progress(now)),
            None => self.target,
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.transition
            .as_ref()
            .is_some_and(|tr| now.saturating_duration_since(tr.started) < tr.duration)
    }
}

/// Keys touched by one reconciliation. The three lists are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.updated.is_empty() && self.exited.is_empty()
    }
}

/// The layer of circle marks.
#[derive(Debug, Clone)]
pub struct Scene {
    marks: Vec<Mark>,
    duration: Duration,
}

impl Scene {
    pub fn new(duration: Duration) -> Self {
        Self {
            marks: Vec::new(),
            duration,
        }
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn get(&self, key: &str) -> Option<&Mark> {
        self.marks.iter().find(|m| m.key == key)
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.marks.iter().any(|m| m.is_animating(now))
    }

    /// Diff `specs` against the current marks and apply the result.
    pub fn reconcile(&mut self, specs: Vec<MarkSpec>, now: Instant) -> Patch {
        let mut previous: HashMap<String, Mark> = self
            .marks
            .drain(..)
            .map(|m| (m.key.clone(), m))
            .collect();

        let mut patch = Patch::default();
        let mut marks = Vec::with_capacity(specs.len());

        for spec in specs {
            let transition = match previous.remove(&spec.key) {
                Some(old) => {
                    patch.updated.push(spec.key.clone());
                    Some(Transition {
                        from: old.attrs_at(now),
                        started: now,
                        duration: self.duration,
                    })
                }
                None => {
                    patch.entered.push(spec.key.clone());
                    None
                }
            };

            marks.push(Mark {
                key: spec.key,
                datum: spec.datum,
                target: spec.attrs,
                fill: spec.fill,
                transition,
            });
        }

        patch.exited = previous.into_keys().collect();
        patch.exited.sort();

        self.marks = marks;
        patch
    }
}
