//! Strategy factories
//!
//! Each factory closes over its configuration and returns a [`Handler`] to be
//! subscribed to one or more events. Construction validates the configuration,
//! so a bad strategy fails before the run starts.

pub mod bonds;
pub mod cash;
pub mod debt;
pub mod guards;
pub mod purchase;
pub mod recorder;

use std::rc::Rc;

use crate::error::Result;
use crate::events::{self, Payload};
use crate::simulation::SimContext;

/// Handler over the simulation context
pub type Handler = events::Handler<SimContext>;

/// Box a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut SimContext, &Payload) -> Result<()> + 'static,
{
    Rc::new(f)
}

/// Handler that posts `kind` with a fixed payload whenever it runs.
pub fn delayed_post(kind: events::EventKind, payload: Payload) -> Handler {
    handler(move |ctx, _| ctx.post(kind.clone(), &payload))
}
