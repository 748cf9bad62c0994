use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::EventKind;
use super::payload::{FromPayload, Payload};
use crate::error::{Result, SimError};

/// Nested dispatch depth allowed before a posting chain is treated as a cycle
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A subscriber callback. `C` is the context record handed to every handler.
pub type Handler<C> = Rc<dyn Fn(&mut C, &Payload) -> Result<()>>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A context that owns the bus its handlers are dispatched from.
///
/// Handlers receive the whole context mutably, so they can post further
/// events and subscribe new handlers while a dispatch is in progress.
pub trait EventSink: Sized {
    fn bus(&mut self) -> &mut EventBus<Self>;
}

/// Synchronous publish/subscribe dispatcher.
///
/// Subscriber lists are built per instance; two buses never share state.
pub struct EventBus<C> {
    subscribers: FxHashMap<EventKind, Vec<(SubscriptionId, Handler<C>)>>,
    next_id: u64,
    depth: usize,
    max_depth: usize,
    failed_event: Option<EventKind>,
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            subscribers: FxHashMap::default(),
            next_id: 0,
            depth: 0,
            max_depth,
            failed_event: None,
        }
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Append `handler` to the subscribers of `kind`. Duplicates are kept.
    pub fn subscribe(&mut self, kind: EventKind, handler: Handler<C>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.entry(kind).or_default().push((id, handler));
        id
    }

    /// Remove one subscription. Returns `false` if it was already gone.
    ///
    /// A dispatch already in progress still runs its snapshot, including the
    /// removed handler.
    pub fn unsubscribe(&mut self, kind: &EventKind, id: SubscriptionId) -> bool {
        let Some(handlers) = self.subscribers.get_mut(kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    pub fn subscriber_count(&self, kind: &EventKind) -> usize {
        self.subscribers.get(kind).map_or(0, Vec::len)
    }

    /// Current nesting level of dispatches (0 when idle)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Innermost event whose dispatch failed since the last call.
    pub fn take_failed_event(&mut self) -> Option<EventKind> {
        self.failed_event.take()
    }

    fn snapshot(&self, kind: &EventKind) -> Option<Vec<Handler<C>>> {
        self.subscribers
            .get(kind)
            .filter(|handlers| !handlers.is_empty())
            .map(|handlers| handlers.iter().map(|(_, handler)| handler.clone()).collect())
    }
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(&str, usize)> = self
            .subscribers
            .iter()
            .map(|(kind, handlers)| (kind.as_str(), handlers.len()))
            .collect();
        counts.sort_unstable();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .field("depth", &self.depth)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Deliver `payload` to every subscriber of `kind`, in subscription order.
///
/// The subscriber list is snapshotted first: handlers subscribed during this
/// dispatch fire from the next post of `kind` on. Handlers may post other
/// events, which are dispatched immediately as nested calls. The first handler
/// error stops the dispatch and is returned.
pub fn post<C: EventSink>(ctx: &mut C, kind: &EventKind, payload: &Payload) -> Result<()> {
    let Some(handlers) = ctx.bus().snapshot(kind) else {
        return Ok(());
    };

    let result = dispatch(ctx, kind, payload, &handlers);
    if result.is_err() {
        let bus = ctx.bus();
        if bus.failed_event.is_none() {
            bus.failed_event = Some(kind.clone());
        }
    }
    result
}

fn dispatch<C: EventSink>(
    ctx: &mut C,
    kind: &EventKind,
    payload: &Payload,
    handlers: &[Handler<C>],
) -> Result<()> {
    let bus = ctx.bus();
    if bus.depth >= bus.max_depth {
        return Err(SimError::DispatchOverflow {
            event: kind.clone(),
            depth: bus.max_depth,
        });
    }
    bus.depth += 1;

    let result = handlers.iter().try_for_each(|handler| handler(ctx, payload));

    ctx.bus().depth -= 1;
    result
}

/// Adapt a handler that takes typed arguments into a bus handler.
///
/// The arguments are extracted from the payload on every call; a missing
/// field is a lookup error.
pub fn applied<C, A, F>(f: F) -> Handler<C>
where
    C: 'static,
    A: FromPayload + 'static,
    F: Fn(&mut C, A) -> Result<()> + 'static,
{
    Rc::new(move |ctx: &mut C, payload: &Payload| f(ctx, A::from_payload(payload)?))
}
