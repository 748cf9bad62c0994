//! Scenario configuration
//!
//! [`SimulationConfig`] is the serializable description of a run: horizon,
//! starting cash and the strategies to wire up. [`SimulationConfig::build`]
//! validates all of it before anything is simulated.
//!
//! ```ignore
//! let config: SimulationConfig = serde_json::from_str(&text)?;
//! let mut sim = config.build()?;
//! let recorder = StateRecorder::new();
//! sim.subscribe(EventKind::DayEnded, recorder.handler());
//! let ledger = sim.run()?;
//! ```

use jiff::civil::{Date, date};
use serde::{Deserialize, Serialize};

pub mod strategy;

pub use strategy::{BondPreset, BondSchedule, BondSpec, StrategyConfig};

use crate::date_math;
use crate::error::Result;
use crate::events::{DEFAULT_MAX_DEPTH, EventKind};
use crate::model::HOUSE;
use crate::simulation::Simulation;
use crate::strategies::bonds::bond_buy_back;
use crate::strategies::cash::{DEFAULT_DAY_OF_MONTH, IncomeTier, seed_cash};
use crate::strategies::debt::DEFAULT_DEBT_RATE_PERCENT;
use crate::valuation::DAYS_PER_YEAR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub n_days: i32,
    pub start_date: Date,
}

fn default_max_dispatch_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Everything needed to build a [`Simulation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub simulation_parameters: SimulationParameters,
    /// Opening balance of the cash account, in minor units
    #[serde(default)]
    pub initial_cash: i64,
    #[serde(default = "default_max_dispatch_depth")]
    pub max_dispatch_depth: usize,
    #[serde(default)]
    pub strategies: Vec<StrategyConfig>,
}

impl SimulationConfig {
    pub fn new(n_days: i32, start_date: Date) -> Self {
        Self {
            simulation_parameters: SimulationParameters { n_days, start_date },
            initial_cash: 0,
            max_dispatch_depth: DEFAULT_MAX_DEPTH,
            strategies: Vec::new(),
        }
    }

    #[must_use]
    pub fn initial_cash(mut self, quantity: i64) -> Self {
        self.initial_cash = quantity;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Validate the configuration and wire every strategy into a new simulation.
    ///
    /// The cash account is opened on `simulation_started`. When any strategy
    /// buys bonds, a single buy-back handler is subscribed as well.
    pub fn build(&self) -> Result<Simulation> {
        let SimulationParameters { n_days, start_date } = self.simulation_parameters;
        let mut sim = Simulation::new(n_days, start_date)?.with_max_dispatch_depth(self.max_dispatch_depth)?;
        sim.subscribe(EventKind::SimulationStarted, seed_cash(self.initial_cash));

        for strategy in &self.strategies {
            let (kind, handler) = strategy.subscription()?;
            for date in strategy.fixed_dates() {
                let n_day = date_math::day_index(start_date, date);
                if !(0..n_days).contains(&n_day) {
                    tracing::warn!(%date, ?strategy, "strategy date is outside the simulated horizon");
                }
            }
            sim.subscribe(kind, handler);
        }

        if self.strategies.iter().any(StrategyConfig::is_bond_purchase) {
            sim.subscribe(EventKind::BondBuyBack, bond_buy_back());
        }

        tracing::debug!(
            n_days,
            %start_date,
            strategies = self.strategies.len(),
            "simulation configured"
        );
        Ok(sim)
    }

    /// Twenty-year household scenario: stepped salary, living costs, a bond
    /// ladder rung, a house bought partly on credit and a monthly debt budget.
    pub fn example() -> Self {
        let tiers = [
            (date(2024, 2, 1), 4_125_00),
            (date(2024, 7, 1), 5_500_00),
            (date(2024, 10, 1), 4_125_00),
            (date(2025, 1, 1), 5_500_00),
            (date(2026, 1, 1), 8_000_00),
            (date(2027, 1, 1), 10_000_00),
        ];

        SimulationConfig::new(20 * DAYS_PER_YEAR, date(2023, 6, 1))
            .initial_cash(200_000_00)
            .strategy(StrategyConfig::TieredIncome {
                tiers: tiers.into_iter().rev().map(IncomeTier::from).collect(),
                day_of_month: DEFAULT_DAY_OF_MONTH,
            })
            .strategy(StrategyConfig::MonthlyCashMove {
                amount: -800_00,
                day_of_month: DEFAULT_DAY_OF_MONTH,
                start_date: Some(date(2024, 1, 1)),
                end_date: None,
            })
            .strategy(StrategyConfig::Purchase {
                category: HOUSE.to_string(),
                price: 1_000_000_00,
                date: date(2026, 11, 1),
                rate_percent: DEFAULT_DEBT_RATE_PERCENT,
            })
            .strategy(StrategyConfig::BondPurchase {
                quantity: 1766,
                bond: BondSpec::preset(BondPreset::ThreeYear),
                schedule: BondSchedule::OnDate {
                    date: date(2023, 10, 26),
                },
            })
            .strategy(StrategyConfig::DebtPayback {
                monthly_budget: 3_000_00,
                day_of_month: DEFAULT_DAY_OF_MONTH,
            })
            .strategy(StrategyConfig::DebtFinancing {
                rate_percent: DEFAULT_DEBT_RATE_PERCENT,
            })
    }
}
