//! Record Module
//!
//! One product entry in the inventory.
//!
//! Records carry no validation of their own. Whoever builds one (normally
//! the console driver) is responsible for a non-empty id and a
//! non-negative price.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Records keyed by id, iterated in ascending id order
pub type RecordMap = BTreeMap<String, Record>;

/// A single product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key, unique within a store and never changed after creation
    pub id: String,

    /// Free text display name
    pub name: String,

    /// Units in stock
    pub quantity: u64,

    /// Unit price
    pub price: f64,
}

impl Record {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u64, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            price,
        }
    }
}

// "P1 | Bolt | 10 | 0.50"
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {:.2}",
            self.id, self.name, self.quantity, self.price
        )
    }
}
