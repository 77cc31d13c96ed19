//! Execution strategies bound into actions.
//!
//! The set of strategies is closed: every action runs one of the [`ActionStrategy`] variants and
//! is driven through the [`Strategy`] capability interface (`start` -> `update`* -> `stop`).
//! What a strategy does to the world is up to the host, via an optional completion hook.

use core::fmt;

use crate::{Predicate, TickContext};

/// One-shot world mutation applied when a strategy completes.
pub type WorldHook<W> = Box<dyn FnMut(&mut W)>;

pub trait Strategy<W> {
    /// Reset per-run state. Called once before the first `update` of every execution.
    fn start(&mut self, ctx: &TickContext, world: &mut W);

    fn update(&mut self, ctx: &TickContext, world: &mut W);

    fn stop(&mut self, _world: &mut W) {}

    fn is_complete(&self) -> bool;

    fn can_perform(&self, _world: &W) -> bool {
        true
    }
}

/// Completes on the first update.
pub struct InstantStrategy<W> {
    on_complete: Option<WorldHook<W>>,
    complete: bool,
}

impl<W> InstantStrategy<W> {
    pub fn new() -> Self {
        Self {
            on_complete: None,
            complete: false,
        }
    }

    pub fn with_on_complete(mut self, hook: impl FnMut(&mut W) + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }
}

impl<W> Default for InstantStrategy<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Strategy<W> for InstantStrategy<W> {
    fn start(&mut self, _ctx: &TickContext, _world: &mut W) {
        self.complete = false;
    }

    fn update(&mut self, _ctx: &TickContext, world: &mut W) {
        if self.complete {
            return;
        }
        self.complete = true;
        if let Some(hook) = self.on_complete.as_mut() {
            hook(world);
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Completes once the accumulated tick time reaches `duration` seconds.
pub struct TimedStrategy<W> {
    duration: f32,
    elapsed: f32,
    on_complete: Option<WorldHook<W>>,
    complete: bool,
}

impl<W> TimedStrategy<W> {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
            on_complete: None,
            complete: false,
        }
    }

    pub fn with_on_complete(mut self, hook: impl FnMut(&mut W) + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl<W> Strategy<W> for TimedStrategy<W> {
    fn start(&mut self, _ctx: &TickContext, _world: &mut W) {
        self.elapsed = 0.0;
        self.complete = false;
    }

    fn update(&mut self, ctx: &TickContext, world: &mut W) {
        if self.complete {
            return;
        }
        self.elapsed += ctx.dt_seconds.max(0.0);
        if self.elapsed >= self.duration {
            self.complete = true;
            if let Some(hook) = self.on_complete.as_mut() {
                hook(world);
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Completes when `done` holds; the host drives the world towards it.
pub struct UntilStrategy<W> {
    done: Predicate<W>,
    can_perform: Option<Predicate<W>>,
    complete: bool,
}

impl<W> UntilStrategy<W> {
    pub fn new(done: impl Fn(&W) -> bool + 'static) -> Self {
        Self {
            done: Box::new(done),
            can_perform: None,
            complete: false,
        }
    }

    pub fn with_can_perform(mut self, can_perform: impl Fn(&W) -> bool + 'static) -> Self {
        self.can_perform = Some(Box::new(can_perform));
        self
    }
}

impl<W> Strategy<W> for UntilStrategy<W> {
    fn start(&mut self, _ctx: &TickContext, _world: &mut W) {
        self.complete = false;
    }

    fn update(&mut self, _ctx: &TickContext, world: &mut W) {
        if !self.complete {
            self.complete = (self.done)(&*world);
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn can_perform(&self, world: &W) -> bool {
        self.can_perform
            .as_ref()
            .map_or(true, |can_perform| can_perform(world))
    }
}

pub enum ActionStrategy<W> {
    Instant(InstantStrategy<W>),
    Timed(TimedStrategy<W>),
    Until(UntilStrategy<W>),
}

impl<W> ActionStrategy<W> {
    pub fn instant() -> Self {
        ActionStrategy::Instant(InstantStrategy::new())
    }

    pub fn timed(duration: f32) -> Self {
        ActionStrategy::Timed(TimedStrategy::new(duration))
    }

    pub fn until(done: impl Fn(&W) -> bool + 'static) -> Self {
        ActionStrategy::Until(UntilStrategy::new(done))
    }
}

impl<W> Default for ActionStrategy<W> {
    fn default() -> Self {
        Self::instant()
    }
}

impl<W> From<InstantStrategy<W>> for ActionStrategy<W> {
    fn from(value: InstantStrategy<W>) -> Self {
        ActionStrategy::Instant(value)
    }
}

impl<W> From<TimedStrategy<W>> for ActionStrategy<W> {
    fn from(value: TimedStrategy<W>) -> Self {
        ActionStrategy::Timed(value)
    }
}

impl<W> From<UntilStrategy<W>> for ActionStrategy<W> {
    fn from(value: UntilStrategy<W>) -> Self {
        ActionStrategy::Until(value)
    }
}

impl<W> Strategy<W> for ActionStrategy<W> {
    fn start(&mut self, ctx: &TickContext, world: &mut W) {
        match self {
            ActionStrategy::Instant(s) => s.start(ctx, world),
            ActionStrategy::Timed(s) => s.start(ctx, world),
            ActionStrategy::Until(s) => s.start(ctx, world),
        }
    }

    fn update(&mut self, ctx: &TickContext, world: &mut W) {
        match self {
            ActionStrategy::Instant(s) => s.update(ctx, world),
            ActionStrategy::Timed(s) => s.update(ctx, world),
            ActionStrategy::Until(s) => s.update(ctx, world),
        }
    }

    fn stop(&mut self, world: &mut W) {
        match self {
            ActionStrategy::Instant(s) => s.stop(world),
            ActionStrategy::Timed(s) => s.stop(world),
            ActionStrategy::Until(s) => s.stop(world),
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            ActionStrategy::Instant(s) => s.is_complete(),
            ActionStrategy::Timed(s) => s.is_complete(),
            ActionStrategy::Until(s) => s.is_complete(),
        }
    }

    fn can_perform(&self, world: &W) -> bool {
        match self {
            ActionStrategy::Instant(s) => s.can_perform(world),
            ActionStrategy::Timed(s) => s.can_perform(world),
            ActionStrategy::Until(s) => s.can_perform(world),
        }
    }
}

impl<W> fmt::Debug for ActionStrategy<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStrategy::Instant(s) => f
                .debug_struct("Instant")
                .field("complete", &s.complete)
                .finish(),
            ActionStrategy::Timed(s) => f
                .debug_struct("Timed")
                .field("duration", &s.duration)
                .field("elapsed", &s.elapsed)
                .field("complete", &s.complete)
                .finish(),
            ActionStrategy::Until(s) => f
                .debug_struct("Until")
                .field("complete", &s.complete)
                .finish(),
        }
    }
}
