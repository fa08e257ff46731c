//! Domain types for rate and date calculations.
//!
//! - [`Date`]: Calendar date for financial calculations
//! - [`Period`]: Tenor such as `3M` or `10Y`
//! - [`Frequency`]: Payment or compounding frequency
//! - [`Compounding`]: Interest compounding convention
//! - [`InterestRate`]: A rate bundled with its conventions
//! - [`imm`]: IMM futures dates

mod date;
mod frequency;
pub mod imm;
mod interest_rate;
mod period;

pub use date::Date;
pub use frequency::{Compounding, Frequency};
pub use interest_rate::InterestRate;
pub use period::{Period, TimeUnit};
