//! Countdown engine: samples the wall clock on a repeating timer and reports
//! the signed distance to the active target.
//!
//! The engine owns the timer handle. Dropping the handle cancels the timer, so
//! every path that replaces or clears it (a new target, a new refresh period,
//! deactivation, dropping the engine) leaves at most one live timer behind.
//!
//! There is no drift correction: each tick reads the clock afresh, so timer
//! jitter only delays a sample, it never accumulates.

use gloo_timers::callback::Interval;
use log::debug;
use std::rc::Rc;

use crate::{delta_ms, Granularity};

/// Source of "now" in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Schedules a repeating callback. Dropping the returned handle cancels it.
pub trait TickScheduler {
    type Handle;

    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Self::Handle;
}

/// Browser `setInterval` via gloo.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalScheduler;

impl TickScheduler for IntervalScheduler {
    type Handle = Interval;

    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Interval {
        Interval::new(period_ms, tick)
    }
}

/// One clock reading for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Target the reading was taken against.
    pub target_ms: i64,
    /// `target - now` at sampling time.
    pub delta_ms: i64,
}

impl Sample {
    fn take(target_ms: i64, clock: &impl Clock) -> Self {
        Self {
            target_ms,
            delta_ms: delta_ms(target_ms, clock.now_ms()),
        }
    }

    /// The delta, but only if this sample belongs to `target_ms`.
    pub fn delta_for(self, target_ms: Option<i64>) -> Option<i64> {
        (target_ms == Some(self.target_ms)).then_some(self.delta_ms)
    }
}

/// Receives a sample on every tick and `None` when the engine goes idle.
pub type SampleSink = Rc<dyn Fn(Option<Sample>)>;

pub struct CountdownEngine<S: TickScheduler, C: Clock> {
    scheduler: S,
    clock: Rc<C>,
    sink: SampleSink,
    granularity: Granularity,
    target_ms: Option<i64>,
    ticker: Option<S::Handle>,
}

impl<S, C> CountdownEngine<S, C>
where
    S: TickScheduler,
    C: Clock + 'static,
{
    pub fn new(
        scheduler: S,
        clock: C,
        granularity: Granularity,
        sink: impl Fn(Option<Sample>) + 'static,
    ) -> Self {
        Self {
            scheduler,
            clock: Rc::new(clock),
            sink: Rc::new(sink),
            granularity,
            target_ms: None,
            ticker: None,
        }
    }

    /// Start counting toward `target_ms`, replacing any previous target.
    ///
    /// One sample is emitted immediately so the display never shows a value
    /// from the previous target.
    pub fn activate(&mut self, target_ms: i64) {
        self.ticker = None;
        self.target_ms = Some(target_ms);
        (self.sink)(Some(Sample::take(target_ms, &*self.clock)));
        self.schedule(target_ms);
    }

    /// Change the refresh rate. The target is kept; only the timer restarts.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        let old_period = self.granularity.refresh_ms();
        self.granularity = granularity;

        let Some(target) = self.target_ms else {
            return;
        };
        if old_period != granularity.refresh_ms() || self.ticker.is_none() {
            self.ticker = None;
            self.schedule(target);
        }
    }

    /// Stop ticking and clear the last reading. No timer stays scheduled
    /// while idle.
    pub fn deactivate(&mut self) {
        if self.ticker.take().is_some() {
            debug!("Countdown timer cancelled");
        }
        if self.target_ms.take().is_some() {
            (self.sink)(None);
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn target_ms(&self) -> Option<i64> {
        self.target_ms
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn period_ms(&self) -> u32 {
        self.granularity.refresh_ms()
    }

    fn schedule(&mut self, target_ms: i64) {
        let period = self.period_ms();
        let clock = Rc::clone(&self.clock);
        let sink = Rc::clone(&self.sink);
        debug!("Countdown timer scheduled every {} ms", period);
        self.ticker = Some(self.scheduler.every(
            period,
            Box::new(move || sink(Some(Sample::take(target_ms, &*clock)))),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct Slot {
        period_ms: u32,
        tick: Box<dyn FnMut()>,
        cancelled: Rc<Cell<bool>>,
    }

    /// Records every scheduled timer; ticks only when told to.
    #[derive(Clone, Default)]
    struct ManualScheduler {
        slots: Rc<RefCell<Vec<Slot>>>,
    }

    struct ManualHandle(Rc<Cell<bool>>);

    impl Drop for ManualHandle {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    impl TickScheduler for ManualScheduler {
        type Handle = ManualHandle;

        fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> ManualHandle {
            let cancelled = Rc::new(Cell::new(false));
            self.slots.borrow_mut().push(Slot {
                period_ms,
                tick,
                cancelled: Rc::clone(&cancelled),
            });
            ManualHandle(cancelled)
        }
    }

    impl ManualScheduler {
        fn live_periods(&self) -> Vec<u32> {
            self.slots
                .borrow()
                .iter()
                .filter(|s| !s.cancelled.get())
                .map(|s| s.period_ms)
                .collect()
        }

        fn fire(&self) {
            for slot in self.slots.borrow_mut().iter_mut() {
                if !slot.cancelled.get() {
                    (slot.tick)();
                }
            }
        }

        fn scheduled_count(&self) -> usize {
            self.slots.borrow().len()
        }
    }

    #[derive(Clone, Default)]
    struct FixedClock(Rc<Cell<i64>>);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0.get()
        }
    }

    type Harness = (
        CountdownEngine<ManualScheduler, FixedClock>,
        ManualScheduler,
        FixedClock,
        Rc<RefCell<Vec<Option<Sample>>>>,
    );

    fn harness(level: u8) -> Harness {
        let scheduler = ManualScheduler::default();
        let clock = FixedClock::default();
        let samples = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&samples);
        let engine = CountdownEngine::new(
            scheduler.clone(),
            clock.clone(),
            Granularity::new(level).unwrap(),
            move |sample| sink.borrow_mut().push(sample),
        );
        (engine, scheduler, clock, samples)
    }

    fn deltas(samples: &RefCell<Vec<Option<Sample>>>) -> Vec<Option<i64>> {
        samples.borrow().iter().map(|s| s.map(|s| s.delta_ms)).collect()
    }

    #[test]
    fn test_idle_engine_schedules_nothing() {
        let (engine, scheduler, _, samples) = harness(3);
        assert!(!engine.is_running());
        assert_eq!(scheduler.scheduled_count(), 0);
        assert!(samples.borrow().is_empty());
    }

    #[test]
    fn test_activate_emits_immediately_then_on_each_tick() {
        let (mut engine, scheduler, clock, samples) = harness(3);
        clock.0.set(1_000);
        engine.activate(61_000);
        assert_eq!(deltas(&samples), vec![Some(60_000)]);
        assert_eq!(scheduler.live_periods(), vec![250]);

        clock.0.set(62_000);
        scheduler.fire();
        assert_eq!(deltas(&samples), vec![Some(60_000), Some(-1_000)]);
    }

    #[test]
    fn test_granularity_change_reschedules_and_keeps_target() {
        let (mut engine, scheduler, clock, samples) = harness(1);
        engine.activate(10_000);
        assert_eq!(scheduler.live_periods(), vec![1000]);

        engine.set_granularity(Granularity::new(4).unwrap());
        assert_eq!(scheduler.live_periods(), vec![125]);
        assert_eq!(engine.target_ms(), Some(10_000));
        assert_eq!(engine.period_ms(), 125);

        clock.0.set(4_000);
        scheduler.fire();
        assert_eq!(deltas(&samples).last(), Some(&Some(6_000)));
    }

    #[test]
    fn test_granularity_change_with_same_period_keeps_timer() {
        let (mut engine, scheduler, _, _) = harness(0);
        engine.activate(10_000);
        engine.set_granularity(Granularity::new(2).unwrap());
        assert_eq!(scheduler.scheduled_count(), 1);
        assert_eq!(scheduler.live_periods(), vec![1000]);
    }

    #[test]
    fn test_granularity_change_while_idle_only_records_level() {
        let (mut engine, scheduler, _, _) = harness(0);
        engine.set_granularity(Granularity::MAX);
        assert!(!engine.is_running());
        assert_eq!(scheduler.scheduled_count(), 0);

        engine.activate(0);
        assert_eq!(scheduler.live_periods(), vec![125]);
    }

    #[test]
    fn test_reactivation_cancels_previous_timer() {
        let (mut engine, scheduler, _, _) = harness(3);
        engine.activate(1);
        engine.activate(2);
        assert_eq!(scheduler.scheduled_count(), 2);
        assert_eq!(scheduler.live_periods().len(), 1);
        assert_eq!(engine.target_ms(), Some(2));
    }

    #[test]
    fn test_deactivate_cancels_timer() {
        let (mut engine, scheduler, _, samples) = harness(3);
        engine.activate(5_000);
        engine.deactivate();
        assert!(!engine.is_running());
        assert_eq!(engine.target_ms(), None);
        assert!(scheduler.live_periods().is_empty());

        scheduler.fire();
        assert_eq!(deltas(&samples), vec![Some(5_000), None]);
    }

    #[test]
    fn test_deactivate_while_idle_emits_nothing() {
        let (mut engine, _, _, samples) = harness(3);
        engine.deactivate();
        assert!(samples.borrow().is_empty());
    }

    #[test]
    fn test_reading_from_previous_target_is_not_reused() {
        let (mut engine, _, clock, samples) = harness(3);
        clock.0.set(1_000);
        engine.activate(5_000);
        engine.deactivate();
        engine.activate(9_000);

        let recorded = samples.borrow().clone();
        let first = recorded[0].unwrap();
        assert_eq!(first.delta_for(Some(5_000)), Some(4_000));
        assert_eq!(first.delta_for(Some(9_000)), None);
        assert_eq!(first.delta_for(None), None);
        assert_eq!(recorded[1], None);
        assert_eq!(recorded[2].unwrap().delta_for(Some(9_000)), Some(8_000));
    }

    #[test]
    fn test_dropping_engine_cancels_timer() {
        let (mut engine, scheduler, _, _) = harness(3);
        engine.activate(5_000);
        drop(engine);
        assert!(scheduler.live_periods().is_empty());
    }
}
