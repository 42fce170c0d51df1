use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::easing::{ease_out_quad, lerp};
use crate::signal::Signal;

/// One in-flight interpolation between two 2-channel scalar values.
///
/// The engine owns the job for its duration: each frame it recomputes
/// `progress` from the clock and pushes the updated job back through its
/// signal, so the subscriber can read interpolated values and apply them.
#[derive(Clone)]
pub struct AnimationJob {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub start_ms: f64,
    pub end_ms: f64,
    pub progress: f64,
    pub on_end: Option<Rc<dyn Fn()>>,
}

impl AnimationJob {
    pub fn new(start: (f64, f64), end: (f64, f64), start_ms: f64, duration_ms: f64) -> Self {
        Self {
            start,
            end,
            start_ms,
            end_ms: start_ms + duration_ms,
            progress: 0.0,
            on_end: None,
        }
    }

    pub fn with_on_end(mut self, on_end: Rc<dyn Fn()>) -> Self {
        self.on_end = Some(on_end);
        self
    }

    /// Current interpolated value, eased out-quadratic per channel.
    pub fn sample(&self) -> (f64, f64) {
        let eased = ease_out_quad(self.progress);
        (
            lerp(self.start.0, self.end.0, eased),
            lerp(self.start.1, self.end.1, eased),
        )
    }
}

// Completion callbacks carry no state worth comparing; two jobs are the same
// job when everything the engine interpolates over matches.
impl PartialEq for AnimationJob {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.start_ms == other.start_ms
            && self.end_ms == other.end_ms
            && self.progress == other.progress
    }
}

impl fmt::Debug for AnimationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationJob")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("start_ms", &self.start_ms)
            .field("end_ms", &self.end_ms)
            .field("progress", &self.progress)
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Frame-driven scheduler advancing every active job once per tick.
///
/// Constructed once at application start and passed by handle to every
/// component that animates. The host owns the frame loop: it calls
/// `tick(now_ms)` while `is_idle()` is false and may stop ticking entirely
/// when no jobs remain.
pub struct AnimationEngine {
    jobs: RefCell<Vec<Signal<AnimationJob>>>,
    now_ms: Cell<f64>,
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self {
            jobs: RefCell::new(Vec::new()),
            now_ms: Cell::new(0.0),
        }
    }

    /// Register a job signal as active. Adding the same signal twice keeps a
    /// single registration.
    pub fn add(&self, job: &Signal<AnimationJob>) {
        let mut jobs = self.jobs.borrow_mut();
        if !jobs.iter().any(|active| active.ptr_eq(job)) {
            jobs.push(job.clone());
        }
    }

    /// Deregister a job signal. Unknown signals are ignored.
    pub fn remove(&self, job: &Signal<AnimationJob>) {
        self.jobs.borrow_mut().retain(|active| !active.ptr_eq(job));
    }

    pub fn is_idle(&self) -> bool {
        self.jobs.borrow().is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.jobs.borrow().len()
    }

    /// The engine clock: the timestamp of the most recent tick. Jobs stamp
    /// their `start_ms` from this so tests can drive time explicitly.
    pub fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    /// Advance every active job to `now_ms`. Jobs reaching progress 1.0 fire
    /// their completion callback once and leave the active set.
    pub fn tick(&self, now_ms: f64) {
        self.now_ms.set(now_ms);

        let active: Vec<Signal<AnimationJob>> = self.jobs.borrow().clone();
        for signal in active {
            let Some(job) = signal.get() else {
                self.remove(&signal);
                continue;
            };

            let span = job.end_ms - job.start_ms;
            let progress = if span <= 0.0 {
                1.0
            } else {
                ((now_ms - job.start_ms) / span).clamp(0.0, 1.0)
            };
            let done = progress >= 1.0;
            let on_end = job.on_end.clone();

            signal.set(AnimationJob { progress, ..job });

            if done {
                if let Some(on_end) = on_end {
                    on_end();
                }
                self.remove(&signal);
            }
        }
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}
