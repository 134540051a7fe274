use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registry view of a portfolio: its identity and display name.
///
/// Transactions belong to a portfolio by `portfolio_id`; holdings and the
/// monthly series are derived on demand and never stored on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: Uuid,
    pub name: String,
}

impl Portfolio {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
