use std::cell::Cell;
use std::rc::Rc;

use jiff::civil::Date;

use crate::date_math;
use crate::error::{ConfigError, Result, SimError};
use crate::events::{
    self, EventBus, EventKind, EventSink, FromPayload, Handler, Payload, SubscriptionId, keys,
};
use crate::model::Ledger;

/// Context record handed to every handler.
///
/// Holds everything a strategy can touch: the ledger, the bus (to post and
/// subscribe), and the current position on the timeline.
#[derive(Debug)]
pub struct SimContext {
    pub ledger: Ledger,
    pub events: EventBus<SimContext>,
    /// Index of the current day, starting at 0
    pub n_day: i32,
    /// Calendar date of `n_day`
    pub day_date: Date,
    pub start_date: Date,
    pub n_days: i32,
}

impl EventSink for SimContext {
    fn bus(&mut self) -> &mut EventBus<Self> {
        &mut self.events
    }
}

impl SimContext {
    /// A context positioned on day 0 with an empty ledger and bus
    pub fn new(n_days: i32, start_date: Date) -> Self {
        Self {
            ledger: Ledger::new(),
            events: EventBus::new(),
            n_day: 0,
            day_date: start_date,
            start_date,
            n_days,
        }
    }

    /// Post an event to every subscriber, synchronously.
    pub fn post(&mut self, kind: EventKind, payload: &Payload) -> Result<()> {
        events::post(self, &kind, payload)
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: Handler<SimContext>) -> SubscriptionId {
        self.events.subscribe(kind, handler)
    }

    /// Subscribe `inner` to `kind` for a single run on `date`.
    ///
    /// The subscription removes itself after it fires, so one-off handlers do
    /// not pile up on frequently posted events.
    pub fn subscribe_on_date(&mut self, kind: EventKind, date: Date, inner: Handler<SimContext>) {
        let slot: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let own_id = slot.clone();
        let listened = kind.clone();
        let expiring: Handler<SimContext> = Rc::new(move |ctx: &mut SimContext, payload: &Payload| {
            if ctx.day_date != date {
                return Ok(());
            }
            let Some(id) = own_id.take() else {
                return Ok(());
            };
            ctx.events.unsubscribe(&listened, id);
            inner(ctx, payload)
        });
        slot.set(Some(self.events.subscribe(kind, expiring)));
    }

    /// Calendar date of an arbitrary day index of this run
    pub fn date_of(&self, n_day: i32) -> Date {
        date_math::day_date(self.start_date, n_day)
    }
}

/// Day-stepped scheduler.
///
/// `run` posts `simulation_started`, then `day_started` and `day_ended` for
/// each day in order, then `simulation_ended`. Everything else happens in
/// subscribed handlers.
#[derive(Debug)]
pub struct Simulation {
    ctx: SimContext,
}

impl Simulation {
    pub fn new(n_days: i32, start_date: Date) -> Result<Self> {
        if n_days <= 0 {
            return Err(ConfigError::NonPositiveHorizon(n_days).into());
        }
        date_math::checked_day_date(start_date, n_days - 1)
            .map_err(|_| ConfigError::HorizonOutOfRange { start_date, n_days })?;
        Ok(Self {
            ctx: SimContext::new(n_days, start_date),
        })
    }

    /// Limit on nested event dispatch before a chain counts as a cycle
    pub fn with_max_dispatch_depth(mut self, depth: usize) -> Result<Self> {
        if depth == 0 {
            return Err(ConfigError::ZeroDispatchDepth.into());
        }
        self.ctx.events.set_max_depth(depth);
        Ok(self)
    }

    pub fn n_days(&self) -> i32 {
        self.ctx.n_days
    }

    pub fn start_date(&self) -> Date {
        self.ctx.start_date
    }

    /// Last simulated calendar date
    pub fn end_date(&self) -> Date {
        self.ctx.date_of(self.ctx.n_days - 1)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ctx.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ctx.ledger
    }

    pub fn events(&self) -> &EventBus<SimContext> {
        &self.ctx.events
    }

    /// Subscribe a prepared handler, such as one built by a strategy factory.
    pub fn subscribe(&mut self, kind: EventKind, handler: Handler<SimContext>) {
        self.ctx.subscribe(kind, handler);
    }

    /// Subscribe a closure that receives the raw payload.
    pub fn subscribe_raw<F>(&mut self, kind: EventKind, f: F)
    where
        F: Fn(&mut SimContext, &Payload) -> Result<()> + 'static,
    {
        self.ctx.subscribe(kind, Rc::new(f));
    }

    /// Subscribe a closure that receives typed arguments extracted from the payload.
    pub fn subscribe_applied<A, F>(&mut self, kind: EventKind, f: F)
    where
        A: FromPayload + 'static,
        F: Fn(&mut SimContext, A) -> Result<()> + 'static,
    {
        self.ctx.subscribe(kind, events::applied(f));
    }

    /// Run every day of the horizon and return the final ledger.
    ///
    /// Any handler error aborts the run; the error names the day and the
    /// innermost event being dispatched.
    pub fn run(mut self) -> Result<Ledger> {
        let n_days = self.ctx.n_days;
        let start_date = self.ctx.start_date;
        tracing::info!(n_days, %start_date, "simulation started");

        let started = Payload::new()
            .with(keys::N_DAYS, n_days)
            .with(keys::START_DATE, start_date);
        self.lifecycle(EventKind::SimulationStarted, &started)?;

        let day_payload = Payload::new();
        for day in 0..n_days {
            self.ctx.n_day = day;
            self.ctx.day_date = self.ctx.date_of(day);
            tracing::trace!(n_day = day, day_date = %self.ctx.day_date, "day");

            self.lifecycle(EventKind::DayStarted, &day_payload)?;
            self.lifecycle(EventKind::DayEnded, &day_payload)?;
        }

        self.lifecycle(EventKind::SimulationEnded, &day_payload)?;
        tracing::info!(
            n_days,
            net_worth = self.ctx.ledger.net_worth(self.ctx.n_day),
            "simulation finished"
        );

        Ok(self.ctx.ledger)
    }

    fn lifecycle(&mut self, kind: EventKind, payload: &Payload) -> Result<()> {
        events::post(&mut self.ctx, &kind, payload).map_err(|source| {
            let event = self.ctx.events.take_failed_event().unwrap_or(kind);
            tracing::error!(n_day = self.ctx.n_day, %event, error = %source, "simulation aborted");
            SimError::Aborted {
                n_day: self.ctx.n_day,
                event,
                source: Box::new(source),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::LookupError;
    use jiff::civil::date;

    #[test]
    fn test_rejects_non_positive_horizon() {
        assert!(matches!(
            Simulation::new(0, date(2025, 1, 1)),
            Err(SimError::Config(ConfigError::NonPositiveHorizon(0)))
        ));
    }

    #[test]
    fn test_rejects_horizon_past_the_calendar() {
        let start = date(2025, 1, 1);
        assert!(matches!(
            Simulation::new(3_000_000, start),
            Err(SimError::Config(ConfigError::HorizonOutOfRange { n_days: 3_000_000, .. }))
        ));

        let last = date(9999, 12, 31);
        assert_eq!(Simulation::new(1, last).unwrap().end_date(), last);
        assert!(Simulation::new(2, last).is_err());
    }

    #[test]
    fn test_date_subscription_fires_once_and_expires() {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let sink = fired.clone();
        let mut ctx = SimContext::new(5, date(2025, 1, 1));
        ctx.subscribe_on_date(
            EventKind::DayStarted,
            date(2025, 1, 3),
            Rc::new(move |ctx: &mut SimContext, _: &Payload| {
                sink.borrow_mut().push(ctx.n_day);
                Ok(())
            }),
        );
        assert_eq!(ctx.events.subscriber_count(&EventKind::DayStarted), 1);

        for day in 0..5 {
            ctx.n_day = day;
            ctx.day_date = ctx.date_of(day);
            ctx.post(EventKind::DayStarted, &Payload::new()).unwrap();
        }
        assert_eq!(*fired.borrow(), vec![2]);
        assert_eq!(ctx.events.subscriber_count(&EventKind::DayStarted), 0);
    }

    #[test]
    fn test_lifecycle_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sim = Simulation::new(2, date(2025, 1, 30)).unwrap();

        for kind in [
            EventKind::SimulationStarted,
            EventKind::DayStarted,
            EventKind::DayEnded,
            EventKind::SimulationEnded,
        ] {
            let log = log.clone();
            let name = kind.to_string();
            sim.subscribe_raw(kind, move |ctx, _| {
                log.borrow_mut().push(format!("{name}:{}:{}", ctx.n_day, ctx.day_date));
                Ok(())
            });
        }

        sim.run().unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "simulation_started:0:2025-01-30",
                "day_started:0:2025-01-30",
                "day_ended:0:2025-01-30",
                "day_started:1:2025-01-31",
                "day_ended:1:2025-01-31",
                "simulation_ended:1:2025-01-31",
            ]
        );
    }

    #[test]
    fn test_started_payload_carries_configuration() {
        let mut sim = Simulation::new(5, date(2024, 6, 1)).unwrap();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();
        sim.subscribe_raw(EventKind::SimulationStarted, move |_, payload| {
            *sink.borrow_mut() = Some((payload.int(keys::N_DAYS)?, payload.date(keys::START_DATE)?));
            Ok(())
        });
        sim.run().unwrap();
        assert_eq!(*seen.borrow(), Some((5, date(2024, 6, 1))));
    }

    #[test]
    fn test_error_aborts_with_day_and_event() {
        let mut sim = Simulation::new(10, date(2025, 1, 1)).unwrap();
        sim.subscribe_raw(EventKind::DayStarted, |ctx, _| {
            if ctx.n_day == 3 {
                ctx.post(EventKind::from("audit"), &Payload::new())?;
            }
            Ok(())
        });
        sim.subscribe_raw(EventKind::from("audit"), |ctx, _| {
            ctx.ledger.item_at(crate::model::CASH, 0).map(|_| ()).map_err(Into::into)
        });

        let err = sim.run().unwrap_err();
        match &err {
            SimError::Aborted { n_day, event, .. } => {
                assert_eq!(*n_day, 3);
                assert_eq!(*event, EventKind::from("audit"));
            }
            other => panic!("expected abort, got {other:?}"),
        }
        assert!(matches!(
            err.root_cause(),
            SimError::Lookup(LookupError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn test_end_date() {
        let sim = Simulation::new(365, date(2025, 1, 1)).unwrap();
        assert_eq!(sim.end_date(), date(2025, 12, 31));
    }
}
