//! Serializable strategy descriptions
//!
//! Each [`StrategyConfig`] variant maps onto one strategy factory and the event
//! its handler is subscribed to.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::events::EventKind;
use crate::strategies::Handler;
use crate::strategies::bonds::{BondTemplate, bond_purchase_on, monthly_bond_purchase};
use crate::strategies::cash::{DEFAULT_DAY_OF_MONTH, IncomeTier, monthly_cash_move, tiered_income};
use crate::strategies::debt::{DEFAULT_DEBT_RATE_PERCENT, debt_acquisition, debt_payback, ignore_debt};
use crate::strategies::purchase::{Purchase, financed_purchase};

fn default_day_of_month() -> i8 {
    DEFAULT_DAY_OF_MONTH
}

fn default_debt_rate() -> f64 {
    DEFAULT_DEBT_RATE_PERCENT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Fixed monthly income (positive) or expense (negative)
    MonthlyCashMove {
        amount: i64,
        #[serde(default = "default_day_of_month")]
        day_of_month: i8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_date: Option<Date>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_date: Option<Date>,
    },
    /// Monthly income that steps up or down on given dates. Tiers may be listed in any order.
    TieredIncome {
        tiers: Vec<IncomeTier>,
        #[serde(default = "default_day_of_month")]
        day_of_month: i8,
    },
    BondPurchase {
        quantity: i64,
        bond: BondSpec,
        schedule: BondSchedule,
    },
    /// Overdrafts become loans at `rate_percent`
    DebtFinancing {
        #[serde(default = "default_debt_rate")]
        rate_percent: f64,
    },
    /// Overdrafts become interest-free loans
    IgnoreDebt,
    DebtPayback {
        monthly_budget: i64,
        #[serde(default = "default_day_of_month")]
        day_of_month: i8,
    },
    /// One unit of property bought on `date`; any shortfall is borrowed
    Purchase {
        category: String,
        price: i64,
        date: Date,
        #[serde(default = "default_debt_rate")]
        rate_percent: f64,
    },
}

impl StrategyConfig {
    /// Build the handler and name the event it listens to.
    pub fn subscription(&self) -> Result<(EventKind, Handler), ConfigError> {
        let subscription = match self {
            StrategyConfig::MonthlyCashMove {
                amount,
                day_of_month,
                start_date,
                end_date,
            } => (
                EventKind::DayStarted,
                monthly_cash_move(*amount, *day_of_month, *start_date, *end_date)?,
            ),
            StrategyConfig::TieredIncome {
                tiers,
                day_of_month,
            } => {
                let mut newest_first = tiers.clone();
                newest_first.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
                (
                    EventKind::DayStarted,
                    tiered_income(newest_first, *day_of_month)?,
                )
            }
            StrategyConfig::BondPurchase {
                quantity,
                bond,
                schedule,
            } => {
                let template = bond.template();
                let handler = match schedule {
                    BondSchedule::OnDate { date } => bond_purchase_on(*date, *quantity, &template)?,
                    BondSchedule::Monthly {
                        day_of_month,
                        until,
                    } => monthly_bond_purchase(*quantity, &template, *day_of_month, *until)?,
                };
                (EventKind::DayStarted, handler)
            }
            StrategyConfig::DebtFinancing { rate_percent } => {
                (EventKind::CashStateNegative, debt_acquisition(*rate_percent))
            }
            StrategyConfig::IgnoreDebt => (EventKind::CashStateNegative, ignore_debt()),
            StrategyConfig::DebtPayback {
                monthly_budget,
                day_of_month,
            } => (
                EventKind::DayStarted,
                debt_payback(*monthly_budget, *day_of_month)?,
            ),
            StrategyConfig::Purchase {
                category,
                price,
                date,
                rate_percent,
            } => {
                let purchase = Purchase::new(category.clone(), *price, *date).rate_percent(*rate_percent);
                (EventKind::DayStarted, financed_purchase(purchase))
            }
        };
        Ok(subscription)
    }

    pub fn is_bond_purchase(&self) -> bool {
        matches!(self, StrategyConfig::BondPurchase { .. })
    }

    /// Dates on which this strategy must act for it to have any effect
    pub fn fixed_dates(&self) -> Vec<Date> {
        match self {
            StrategyConfig::BondPurchase {
                schedule: BondSchedule::OnDate { date },
                ..
            } => vec![*date],
            StrategyConfig::Purchase { date, .. } => vec![*date],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondPreset {
    OneYear,
    ThreeYear,
}

impl BondPreset {
    pub fn template(self) -> BondTemplate {
        match self {
            BondPreset::OneYear => BondTemplate::one_year(),
            BondPreset::ThreeYear => BondTemplate::three_year(),
        }
    }
}

/// A preset, explicit terms, or a preset with some terms replaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BondSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<BondPreset>,
    #[serde(default)]
    pub terms: BondTemplate,
}

impl BondSpec {
    pub fn preset(preset: BondPreset) -> Self {
        Self {
            preset: Some(preset),
            terms: BondTemplate::default(),
        }
    }

    pub fn template(&self) -> BondTemplate {
        match self.preset {
            Some(preset) => preset.template().merged(&self.terms),
            None => self.terms.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BondSchedule {
    OnDate {
        date: Date,
    },
    Monthly {
        #[serde(default = "default_day_of_month")]
        day_of_month: i8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        until: Option<Date>,
    },
}
