//! Common types used across the workspace.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{DEFAULT_BALANCE_TOLERANCE, MONEY_SCALE, round_money, within_tolerance};
pub use pagination::{PageMeta, PageRequest, PageResponse};
