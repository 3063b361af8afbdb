//! Unpacking map archives into an asset root.
//!
//! Every archive is planned ([`ImportPlan`]) before anything is extracted so
//! the number of maps is known upfront. Each map is then extracted and
//! loaded in turn; one bad map doesn't stop the rest.

pub mod error;
mod plan;
mod stream;
mod unit;

pub(crate) use self::plan::ImportUnit;
pub use self::plan::ImportPlan;
pub use self::stream::{ImportEvent, import};
pub(crate) use self::unit::install;
