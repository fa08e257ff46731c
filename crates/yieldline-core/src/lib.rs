//! # Yieldline Core
//!
//! Foundational types for the yieldline term-structure toolkit.
//!
//! - **Types**: [`Date`], [`Period`], [`Frequency`], [`Compounding`] and
//!   [`InterestRate`], the rate/convention algebra used by every curve
//! - **Day Count Conventions**: year-fraction calculations as `f64`
//! - **Business Day Calendars**: holiday calendars, date adjustment and
//!   period arithmetic
//! - **IMM dates**: quarterly futures settlement dates
//!
//! ## Example
//!
//! ```rust
//! use yieldline_core::prelude::*;
//!
//! let rate = InterestRate::new(
//!     0.05,
//!     DayCountConvention::Act360.to_day_counter(),
//!     Compounding::Compounded,
//!     Frequency::SemiAnnual,
//! )
//! .unwrap();
//!
//! let df = rate.discount_factor(2.0).unwrap();
//! assert!(df < 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::similar_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]

pub mod calendars;
pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calendars::{BusinessDayConvention, Calendar, Target, WeekendCalendar};
    pub use crate::daycounts::{DayCount, DayCountConvention, DayCounter};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{Compounding, Date, Frequency, InterestRate, Period, TimeUnit};
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use types::{Compounding, Date, Frequency, InterestRate, Period, TimeUnit};
