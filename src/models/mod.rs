pub mod alert;
pub mod usage_stat;
pub mod user;

pub use alert::{Alert, Direction};
pub use usage_stat::UsageStat;
pub use user::{CurrentUser, User};
