//! Ledger items and their valuation
//!
//! Every item carries mutable [`LedgerItemProperties`] (how many, since when)
//! and an immutable [`ItemKind`] that decides how the item is valued on a
//! given simulation day.

use serde::{Deserialize, Serialize};

use super::ids::ItemId;
use crate::valuation::{DAYS_PER_YEAR, MONTHS_PER_YEAR, growth_over_days, to_minor_units};

/// Default bond face price: 100.00 in minor units.
pub const DEFAULT_FACE_PRICE: i64 = 100_00;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    #[default]
    Asset,
    Liability,
}

/// Mutable state of a ledger item.
///
/// `quantity` is minor currency units for cash and debt, and a unit count for
/// bonds and property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerItemProperties {
    pub quantity: i64,
    /// Simulation day the item entered the ledger
    pub acquired_on: i32,
    pub item_type: ItemType,
}

impl LedgerItemProperties {
    pub fn asset(quantity: i64, acquired_on: i32) -> Self {
        Self {
            quantity,
            acquired_on,
            item_type: ItemType::Asset,
        }
    }

    pub fn liability(quantity: i64, acquired_on: i32) -> Self {
        Self {
            quantity,
            acquired_on,
            item_type: ItemType::Liability,
        }
    }

    /// Days between acquisition and `n_day`
    fn held_days(&self, n_day: i32) -> i32 {
        n_day - self.acquired_on
    }
}

/// Term of a bond in whole years and months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondDuration {
    #[serde(default)]
    pub years: i32,
    #[serde(default)]
    pub months: i32,
}

impl BondDuration {
    pub fn years(years: i32) -> Self {
        Self { years, months: 0 }
    }

    pub fn months(months: i32) -> Self {
        Self { years: 0, months }
    }

    pub fn is_zero(&self) -> bool {
        self.years * MONTHS_PER_YEAR + self.months <= 0
    }

    /// Calendar span used to schedule the maturity date
    pub fn span(&self) -> jiff::Span {
        jiff::Span::new()
            .years(i64::from(self.years))
            .months(i64::from(self.months))
    }

    /// Valuation length of the term: `(years + months/12) * 365`
    pub fn valuation_days(&self) -> f64 {
        let years = f64::from(self.years) + f64::from(self.months) / f64::from(MONTHS_PER_YEAR);
        years * f64::from(DAYS_PER_YEAR)
    }
}

/// Fixed-income instrument terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub rate_percent: f64,
    pub duration: BondDuration,
    /// Price of rolling the bond over into a new one, per unit
    pub rebuy_cost: i64,
    /// Deducted per unit when sold before maturity
    pub pre_maturity_penalty: i64,
    pub face_price: i64,
    pub compounding_periods_per_year: u32,
}

impl Bond {
    pub fn max_duration_days(&self) -> f64 {
        self.duration.valuation_days()
    }

    /// Value of `quantity` bonds if sold on `n_day`.
    ///
    /// Growth stops at maturity and the early-sale penalty only applies while
    /// the bond is held for less than its full term.
    pub fn value_on(&self, properties: &LedgerItemProperties, n_day: i32) -> i64 {
        let max_days = self.max_duration_days();
        let held = f64::from(properties.held_days(n_day));
        let (elapsed, penalty) = if held >= max_days {
            (max_days, 0)
        } else {
            (held, self.pre_maturity_penalty)
        };

        let growth = growth_over_days(self.rate_percent, elapsed, self.compounding_periods_per_year);
        let unit_value = self.face_price as f64 * growth - penalty as f64;
        to_minor_units(unit_value * properties.quantity as f64)
    }
}

/// Interest-bearing liability. Quantity is the outstanding principal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub rate_percent: f64,
}

impl Debt {
    pub fn value_on(&self, properties: &LedgerItemProperties, n_day: i32) -> i64 {
        let held = f64::from(properties.held_days(n_day));
        let owed = properties.quantity as f64 * growth_over_days(self.rate_percent, held, 1);
        -to_minor_units(owed)
    }
}

/// Non-depreciating physical asset such as a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Purchase price per unit
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Cash,
    Bond(Bond),
    Debt(Debt),
    Property(Property),
}

/// A valued position held in a ledger category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerItem {
    /// Assigned by the ledger on insertion
    pub id: ItemId,
    pub properties: LedgerItemProperties,
    pub kind: ItemKind,
}

impl LedgerItem {
    /// Placeholder handle of an item that has not been added to a ledger yet
    pub const UNASSIGNED: ItemId = ItemId(u32::MAX);

    pub fn new(properties: LedgerItemProperties, kind: ItemKind) -> Self {
        Self {
            id: Self::UNASSIGNED,
            properties,
            kind,
        }
    }

    pub fn cash(quantity: i64, acquired_on: i32) -> Self {
        Self::new(LedgerItemProperties::asset(quantity, acquired_on), ItemKind::Cash)
    }

    pub fn bond(quantity: i64, acquired_on: i32, terms: Bond) -> Self {
        Self::new(
            LedgerItemProperties::asset(quantity, acquired_on),
            ItemKind::Bond(terms),
        )
    }

    pub fn debt(principal: i64, acquired_on: i32, rate_percent: f64) -> Self {
        Self::new(
            LedgerItemProperties::liability(principal, acquired_on),
            ItemKind::Debt(Debt { rate_percent }),
        )
    }

    pub fn property(quantity: i64, acquired_on: i32, price: i64) -> Self {
        Self::new(
            LedgerItemProperties::asset(quantity, acquired_on),
            ItemKind::Property(Property { price }),
        )
    }

    pub fn quantity(&self) -> i64 {
        self.properties.quantity
    }

    /// What the item would fetch if it were sold on `n_day`.
    pub fn value(&self, n_day: i32) -> i64 {
        match &self.kind {
            ItemKind::Cash => self.properties.quantity,
            ItemKind::Bond(bond) => bond.value_on(&self.properties, n_day),
            ItemKind::Debt(debt) => debt.value_on(&self.properties, n_day),
            ItemKind::Property(property) => property.price * self.properties.quantity,
        }
    }

    pub fn as_bond(&self) -> Option<&Bond> {
        match &self.kind {
            ItemKind::Bond(bond) => Some(bond),
            _ => None,
        }
    }
}
