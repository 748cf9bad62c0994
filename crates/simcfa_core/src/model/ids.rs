//! Unique identifiers for ledger entities

use serde::{Deserialize, Serialize};

/// Unique handle of a ledger item within one ledger.
///
/// Items are removed by handle, so two bonds with identical terms bought on the
/// same day stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);
