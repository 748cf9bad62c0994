//! One-off purchases of physical assets, financed with debt when cash runs short

use jiff::civil::Date;

use super::cash::change_cash;
use super::debt::DEFAULT_DEBT_RATE_PERCENT;
use super::guards::on_date;
use super::{Handler, handler};
use crate::error::Result;
use crate::events::{EventKind, Payload, keys};
use crate::model::{CASH, DEBT, LedgerItem};
use crate::simulation::SimContext;

/// A dated purchase of one unit of property.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub category: String,
    /// Price in minor units
    pub price: i64,
    pub date: Date,
    /// Rate of the loan taken for any shortfall
    pub rate_percent: f64,
}

impl Purchase {
    pub fn new(category: impl Into<String>, price: i64, date: Date) -> Self {
        Self {
            category: category.into(),
            price,
            date,
            rate_percent: DEFAULT_DEBT_RATE_PERCENT,
        }
    }

    #[must_use]
    pub fn rate_percent(mut self, rate_percent: f64) -> Self {
        self.rate_percent = rate_percent;
        self
    }
}

/// Buy the property on its date, borrowing whatever cash does not cover.
///
/// When cash falls short the cash item is brought to exactly zero and the
/// loan covers the rest of the price, plus any overdraft already on the
/// account.
pub fn financed_purchase(purchase: Purchase) -> Handler {
    let date = purchase.date;
    on_date(date, handler(move |ctx, _| buy(ctx, &purchase)))
}

fn buy(ctx: &mut SimContext, purchase: &Purchase) -> Result<()> {
    let cash = ctx.ledger.item_at(CASH, 0)?.quantity();

    if cash >= purchase.price {
        change_cash(ctx, -purchase.price, 0)?;
    } else {
        let shortfall = purchase.price - cash;
        if cash != 0 {
            change_cash(ctx, -cash, 0)?;
        }
        let loan = ctx.ledger.push(
            DEBT,
            LedgerItem::debt(shortfall, ctx.n_day, purchase.rate_percent),
        );
        tracing::debug!(n_day = ctx.n_day, ?loan, shortfall, "purchase financed with debt");
        ctx.post(
            EventKind::DebtAcquired,
            &Payload::new()
                .with(keys::ITEM, loan)
                .with(keys::CATEGORY, DEBT)
                .with(keys::DEBIT_LEVEL, -shortfall),
        )?;
    }

    let item = ctx.ledger.push(
        &purchase.category,
        LedgerItem::property(1, ctx.n_day, purchase.price),
    );
    tracing::debug!(n_day = ctx.n_day, category = %purchase.category, price = purchase.price, "property bought");
    ctx.post(
        EventKind::LedgerItemAcquired,
        &Payload::new()
            .with(keys::ITEM, item)
            .with(keys::CATEGORY, purchase.category.as_str()),
    )
}
