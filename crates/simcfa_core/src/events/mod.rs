//! Event system - named events and a synchronous subscriber bus
//!
//! Strategies never call each other directly. They post events on the bus and
//! subscribe to the events they care about; the lifecycle events are posted
//! by the scheduler.

mod bus;
mod payload;

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub use bus::{DEFAULT_MAX_DEPTH, EventBus, EventSink, Handler, SubscriptionId, applied, post};
pub use payload::{
    BondMaturity, CashChange, CashNegative, FromPayload, ItemEvent, Payload, Value, keys,
};

/// Name of an event type.
///
/// The named variants are the contract between the scheduler and the
/// strategies. `Custom` lets any component define private event types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    SimulationStarted,
    DayStarted,
    DayEnded,
    SimulationEnded,
    CashStateChange,
    CashStateNegative,
    LedgerItemAcquired,
    LedgerItemSold,
    BondBuyBack,
    DebtAcquired,
    Custom(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::SimulationStarted => "simulation_started",
            EventKind::DayStarted => "day_started",
            EventKind::DayEnded => "day_ended",
            EventKind::SimulationEnded => "simulation_ended",
            EventKind::CashStateChange => "cash_state_change",
            EventKind::CashStateNegative => "cash_state_negative",
            EventKind::LedgerItemAcquired => "ledger_item_acquired",
            EventKind::LedgerItemSold => "ledger_item_sold",
            EventKind::BondBuyBack => "bond_buy_back",
            EventKind::DebtAcquired => "debt_acquired",
            EventKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "simulation_started" => EventKind::SimulationStarted,
            "day_started" => EventKind::DayStarted,
            "day_ended" => EventKind::DayEnded,
            "simulation_ended" => EventKind::SimulationEnded,
            "cash_state_change" => EventKind::CashStateChange,
            "cash_state_negative" => EventKind::CashStateNegative,
            "ledger_item_acquired" => EventKind::LedgerItemAcquired,
            "ledger_item_sold" => EventKind::LedgerItemSold,
            "bond_buy_back" => EventKind::BondBuyBack,
            "debt_acquired" => EventKind::DebtAcquired,
            other => EventKind::Custom(other.to_string()),
        })
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}
