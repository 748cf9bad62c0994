//! Tests for event dispatch inside a running simulation

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use jiff::civil::date;

use crate::error::SimError;
use crate::events::{EventKind, Payload};
use crate::model::CASH;
use crate::simulation::Simulation;
use crate::strategies::cash::{change_cash, seed_cash};
use crate::strategies::guards::on_day;
use crate::strategies::handler;

#[test]
fn test_handler_subscribed_mid_day_fires_next_day() {
    let fired_on = Rc::new(RefCell::new(Vec::new()));
    let sink = fired_on.clone();
    let late = handler(move |ctx, _| {
        sink.borrow_mut().push(ctx.n_day);
        Ok(())
    });

    let mut sim = Simulation::new(4, date(2025, 1, 1)).unwrap();
    sim.subscribe(
        EventKind::DayStarted,
        on_day(
            1,
            handler(move |ctx, _| {
                ctx.subscribe(EventKind::DayStarted, late.clone());
                Ok(())
            }),
        ),
    );
    sim.run().unwrap();

    assert_eq!(*fired_on.borrow(), vec![2, 3]);
}

#[test]
fn test_custom_events_chain_between_strategies() {
    let payday = EventKind::from("payday");
    let mut sim = Simulation::new(31, date(2025, 1, 1)).unwrap();
    sim.subscribe(EventKind::SimulationStarted, seed_cash(0));

    let announce = payday.clone();
    sim.subscribe_raw(EventKind::DayStarted, move |ctx, _| {
        if ctx.day_date.day() == 25 {
            ctx.post(announce.clone(), &Payload::new().with("amount", 3_000i64))?;
        }
        Ok(())
    });
    sim.subscribe_raw(payday, |ctx, payload| {
        let amount = payload.int("amount")?;
        change_cash(ctx, amount, 0).map(|_| ())
    });

    let ledger = sim.run().unwrap();
    assert_eq!(ledger.total_quantity(CASH), 3_000);
}

#[test]
fn test_ping_pong_cycle_aborts_run() {
    let ping = EventKind::from("ping");
    let pong = EventKind::from("pong");
    let hops = Rc::new(Cell::new(0));

    let mut sim = Simulation::new(5, date(2025, 1, 1))
        .unwrap()
        .with_max_dispatch_depth(16)
        .unwrap();

    let start = ping.clone();
    sim.subscribe_raw(EventKind::DayStarted, move |ctx, _| {
        if ctx.n_day == 2 {
            ctx.post(start.clone(), &Payload::new())?;
        }
        Ok(())
    });
    let (to_pong, counter) = (pong.clone(), hops.clone());
    sim.subscribe_raw(ping.clone(), move |ctx, payload| {
        counter.set(counter.get() + 1);
        ctx.post(to_pong.clone(), payload)
    });
    let to_ping = ping.clone();
    sim.subscribe_raw(pong, move |ctx, payload| ctx.post(to_ping.clone(), payload));

    let err = sim.run().unwrap_err();
    let SimError::Aborted { n_day, .. } = &err else {
        panic!("expected abort, got {err:?}");
    };
    assert_eq!(*n_day, 2);
    assert!(matches!(err.root_cause(), SimError::DispatchOverflow { depth: 16, .. }));
    // day_started itself takes one level
    assert_eq!(hops.get(), 8);
}
