use day_counter::engine::{CountdownEngine, IntervalScheduler, Sample, SystemClock};
use day_counter::Granularity;
use yew::prelude::*;

/// Live `target - now` for the active counter, refreshed at the rate the
/// granularity asks for. Returns `None` while no counter is active.
///
/// The engine lives as long as the calling component; unmounting it drops the
/// engine and with it the running interval.
#[hook]
pub fn use_countdown(target_ms: Option<i64>, granularity: Granularity) -> Option<i64> {
    let sample = use_state_eq(|| None::<Sample>);

    let engine = {
        let sample = sample.clone();
        use_mut_ref(move || {
            CountdownEngine::new(IntervalScheduler, SystemClock, granularity, move |s| {
                sample.set(s)
            })
        })
    };

    {
        let engine = engine.clone();
        use_effect_with(target_ms, move |target| {
            match *target {
                Some(target) => engine.borrow_mut().activate(target),
                None => engine.borrow_mut().deactivate(),
            }
            || ()
        });
    }

    {
        let engine = engine.clone();
        use_effect_with(granularity, move |granularity| {
            engine.borrow_mut().set_granularity(*granularity);
            || ()
        });
    }

    {
        use_effect_with((), move |_| move || engine.borrow_mut().deactivate());
    }

    // A sample taken for a previous target is never shown under a new one.
    (*sample).and_then(|s| s.delta_for(target_ms))
}
