use thiserror::Error;

use crate::events::EventKind;
use crate::model::ItemId;

/// Invalid strategy or simulation construction. Raised before the run starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("simulation horizon must be positive, got {0} days")]
    NonPositiveHorizon(i32),
    #[error("a {n_days}-day run from {start_date} ends past the last supported calendar date")]
    HorizonOutOfRange {
        start_date: jiff::civil::Date,
        n_days: i32,
    },
    #[error("date range guard needs at least one bound")]
    EmptyDateRange,
    #[error("day of month must be within 1..=31, got {0}")]
    InvalidDayOfMonth(i8),
    #[error("bond template is missing `{0}`")]
    MissingBondField(&'static str),
    #[error("bond duration must be longer than zero")]
    ZeroBondDuration,
    #[error("compounding periods per year must be positive")]
    InvalidCompounding,
    #[error("bond face price must be positive, got {0}")]
    InvalidFacePrice(i64),
    #[error("income schedule has no tiers")]
    EmptyIncomeSchedule,
    #[error(
        "income tiers must be listed newest first: {listed_after} follows {listed_before} but is not older"
    )]
    IncomeTiersNotDescending {
        listed_before: jiff::civil::Date,
        listed_after: jiff::civil::Date,
    },
    #[error("dispatch depth limit must be positive")]
    ZeroDispatchDepth,
}

/// A reference into the ledger or a payload that does not resolve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("ledger category `{0}` not found")]
    CategoryNotFound(String),
    #[error("ledger category `{category}` has {len} items, index {index} is out of range")]
    IndexOutOfRange {
        category: String,
        index: usize,
        len: usize,
    },
    #[error("item {id:?} not found in ledger category `{category}`")]
    ItemNotFound { category: String, id: ItemId },
    #[error("payload field `{0}` is missing")]
    MissingField(String),
    #[error("payload field `{field}` is not {expected}")]
    FieldType {
        field: String,
        expected: &'static str,
    },
}

/// Any failure that stops a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("date calculation error: {0}")]
    Date(#[from] jiff::Error),
    #[error("event `{event}` re-posted beyond the dispatch depth limit of {depth}")]
    DispatchOverflow { event: EventKind, depth: usize },
    #[error("simulation aborted on day {n_day} while dispatching `{event}`: {source}")]
    Aborted {
        n_day: i32,
        event: EventKind,
        #[source]
        source: Box<SimError>,
    },
}

impl SimError {
    /// The innermost error, unwrapping any abort diagnostics.
    pub fn root_cause(&self) -> &SimError {
        match self {
            SimError::Aborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Crate result type. Strategy factories narrow the error to [`ConfigError`].
pub type Result<T, E = SimError> = std::result::Result<T, E>;
