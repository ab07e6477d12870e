//! Dashboard aggregation
//!
//! Pure functions over lists already fetched from the datastore:
//!
//! - **Spending** - totals, per-category breakdown and daily trend
//! - **Budgets** - current-month consumption per budget
//! - **Policies** - next premium and what is due within 30 days

pub mod budgets;
pub mod policies;
pub mod spending;

pub use budgets::budget_statuses;
pub use policies::{policy_insights, DUE_SOON_DAYS};
pub use spending::compute_insights;

/// Group key for a transaction with no category
pub const UNCATEGORIZED: &str = "Other";

/// Group key for a transaction with no date
pub const UNDATED: &str = "Unknown";
