//! The ledger: categorized, ordered financial positions
//!
//! Categories are created on first insertion and keep insertion order, as do
//! the items inside a category. Cloning a ledger is a deep copy.

use serde::{Deserialize, Serialize};

use super::ids::ItemId;
use super::item::LedgerItem;
use crate::error::LookupError;

pub const CASH: &str = "cash";
pub const BONDS: &str = "bonds";
pub const DEBT: &str = "debt";
pub const HOUSE: &str = "house";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub items: Vec<LedgerItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    categories: Vec<Category>,
    next_item_id: u32,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the end of `category`, creating the category if needed.
    ///
    /// Returns the handle assigned to the item.
    pub fn push(&mut self, category: &str, mut item: LedgerItem) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        item.id = id;
        self.category_entry(category).items.push(item);
        id
    }

    /// Remove the item with handle `id` from `category`.
    pub fn remove(&mut self, category: &str, id: ItemId) -> Result<LedgerItem, LookupError> {
        let items = self.items_mut(category)?;
        let position = items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| LookupError::ItemNotFound {
                category: category.to_string(),
                id,
            })?;
        Ok(items.remove(position))
    }

    /// Items of a category, or `None` if it was never created
    pub fn category(&self, category: &str) -> Option<&[LedgerItem]> {
        self.categories
            .iter()
            .find(|c| c.key == category)
            .map(|c| c.items.as_slice())
    }

    /// Items of a category; an absent category reads as empty.
    pub fn items(&self, category: &str) -> &[LedgerItem] {
        self.category(category).unwrap_or_default()
    }

    pub fn items_mut(&mut self, category: &str) -> Result<&mut Vec<LedgerItem>, LookupError> {
        self.categories
            .iter_mut()
            .find(|c| c.key == category)
            .map(|c| &mut c.items)
            .ok_or_else(|| LookupError::CategoryNotFound(category.to_string()))
    }

    pub fn item_at(&self, category: &str, index: usize) -> Result<&LedgerItem, LookupError> {
        let items = self
            .category(category)
            .ok_or_else(|| LookupError::CategoryNotFound(category.to_string()))?;
        let len = items.len();
        items.get(index).ok_or_else(|| LookupError::IndexOutOfRange {
            category: category.to_string(),
            index,
            len,
        })
    }

    pub fn item_at_mut(
        &mut self,
        category: &str,
        index: usize,
    ) -> Result<&mut LedgerItem, LookupError> {
        let items = self.items_mut(category)?;
        let len = items.len();
        items
            .get_mut(index)
            .ok_or_else(|| LookupError::IndexOutOfRange {
                category: category.to_string(),
                index,
                len,
            })
    }

    pub fn find(&self, category: &str, id: ItemId) -> Option<&LedgerItem> {
        self.items(category).iter().find(|item| item.id == id)
    }

    pub fn find_mut(&mut self, category: &str, id: ItemId) -> Result<&mut LedgerItem, LookupError> {
        self.items_mut(category)?
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| LookupError::ItemNotFound {
                category: category.to_string(),
                id,
            })
    }

    /// Categories in insertion order
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.items.is_empty())
    }

    /// Sum of item quantities in a category
    pub fn total_quantity(&self, category: &str) -> i64 {
        self.items(category).iter().map(LedgerItem::quantity).sum()
    }

    /// Sum of item values in a category on `n_day`
    pub fn category_value(&self, category: &str, n_day: i32) -> i64 {
        self.items(category).iter().map(|item| item.value(n_day)).sum()
    }

    /// Value of everything in the ledger on `n_day`; liabilities count negative.
    pub fn net_worth(&self, n_day: i32) -> i64 {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .map(|item| item.value(n_day))
            .sum()
    }

    fn category_entry(&mut self, category: &str) -> &mut Category {
        let position = match self.categories.iter().position(|c| c.key == category) {
            Some(position) => position,
            None => {
                self.categories.push(Category {
                    key: category.to_string(),
                    items: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        &mut self.categories[position]
    }
}
