mod ids;
mod item;
mod ledger;

pub use ids::ItemId;
pub use item::{
    Bond, BondDuration, DEFAULT_FACE_PRICE, Debt, ItemKind, ItemType, LedgerItem,
    LedgerItemProperties, Property,
};
pub use ledger::{BONDS, CASH, Category, DEBT, HOUSE, Ledger};
