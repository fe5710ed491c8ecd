pub mod activity;
pub mod filter;
pub mod history;
pub mod list;
pub mod title;

pub use activity::ActivityDataPoint;
pub use filter::{FilterConfig, SortMode};
pub use history::HistoryEntry;
pub use list::ListKind;
pub use title::Title;
