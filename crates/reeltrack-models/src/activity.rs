use serde::{Deserialize, Serialize};

/// Number of titles marked completed in one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityDataPoint {
    /// `YYYY-MM`
    pub month: String,
    pub count: u32,
}
