//! Interest rate indexes.

mod ibor;

pub use ibor::IborIndex;
