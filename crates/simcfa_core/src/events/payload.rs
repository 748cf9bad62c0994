//! Event payloads
//!
//! Common context (day, date, ledger, bus) travels in the handler's context
//! record. The payload only carries event-specific fields, so producers can add
//! fields without breaking consumers that ignore them.

use std::collections::BTreeMap;

use jiff::civil::Date;

use crate::error::{LookupError, Result};
use crate::model::ItemId;

/// Well-known payload field names
pub mod keys {
    pub const INDEX: &str = "index";
    pub const BY_HOW_MUCH: &str = "by_how_much";
    pub const NEW_STATE: &str = "new_state";
    pub const DEBIT_LEVEL: &str = "debit_level";
    pub const ITEM: &str = "item";
    pub const CATEGORY: &str = "category";
    pub const N_DAYS: &str = "n_days";
    pub const START_DATE: &str = "start_date";
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Index(usize),
    Date(Date),
    Item(ItemId),
    Rate(f64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Index(v)
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Value::Date(v)
    }
}

impl From<ItemId> for Value {
    fn from(v: ItemId) -> Self {
        Value::Item(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Rate(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Open mapping of named values attached to a posted event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    fields: BTreeMap<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Add every field of `other`; fields already present are overwritten.
    pub fn merge(&mut self, other: &Payload) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, key: &str) -> Result<&Value> {
        self.fields
            .get(key)
            .ok_or_else(|| LookupError::MissingField(key.to_string()).into())
    }

    pub fn int(&self, key: &str) -> Result<i64> {
        match self.require(key)? {
            Value::Int(v) => Ok(*v),
            _ => Err(type_error(key, "an integer")),
        }
    }

    pub fn index(&self, key: &str) -> Result<usize> {
        match self.require(key)? {
            Value::Index(v) => Ok(*v),
            _ => Err(type_error(key, "an index")),
        }
    }

    pub fn date(&self, key: &str) -> Result<Date> {
        match self.require(key)? {
            Value::Date(v) => Ok(*v),
            _ => Err(type_error(key, "a date")),
        }
    }

    pub fn item(&self, key: &str) -> Result<ItemId> {
        match self.require(key)? {
            Value::Item(v) => Ok(*v),
            _ => Err(type_error(key, "an item handle")),
        }
    }

    pub fn text(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            Value::Text(v) => Ok(v),
            _ => Err(type_error(key, "text")),
        }
    }
}

fn type_error(key: &str, expected: &'static str) -> crate::error::SimError {
    LookupError::FieldType {
        field: key.to_string(),
        expected,
    }
    .into()
}

/// Typed view of the payload fields a handler needs.
///
/// This is the "named arguments" calling convention: a handler declares the
/// fields it uses as a struct and ignores everything else.
pub trait FromPayload: Sized {
    fn from_payload(payload: &Payload) -> Result<Self>;
}

impl FromPayload for () {
    fn from_payload(_: &Payload) -> Result<Self> {
        Ok(())
    }
}

impl FromPayload for Payload {
    fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(payload.clone())
    }
}

/// Fields of `cash_state_change`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashChange {
    pub index: usize,
    pub by_how_much: i64,
    pub new_state: i64,
}

impl FromPayload for CashChange {
    fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            index: payload.index(keys::INDEX)?,
            by_how_much: payload.int(keys::BY_HOW_MUCH)?,
            new_state: payload.int(keys::NEW_STATE)?,
        })
    }
}

/// Fields of `cash_state_negative`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashNegative {
    pub index: usize,
    pub debit_level: i64,
}

impl FromPayload for CashNegative {
    fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            index: payload.index(keys::INDEX)?,
            debit_level: payload.int(keys::DEBIT_LEVEL)?,
        })
    }
}

/// Fields of `bond_buy_back`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondMaturity {
    pub item: ItemId,
}

impl FromPayload for BondMaturity {
    fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            item: payload.item(keys::ITEM)?,
        })
    }
}

/// Fields of `ledger_item_acquired`, `ledger_item_sold` and `debt_acquired`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEvent {
    pub item: ItemId,
    pub category: String,
}

impl FromPayload for ItemEvent {
    fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            item: payload.item(keys::ITEM)?,
            category: payload.text(keys::CATEGORY)?.to_string(),
        })
    }
}
