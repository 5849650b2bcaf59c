//! Care resolution: maps a classifier label to a specialist, an explanation
//! and a list of nearby hospitals.
//!
//! Tables are immutable and injected into [`CareResolver`]; the hospital list
//! comes from the ordered lookup chain in [`crate::lookup`].

pub mod label;
pub mod maplink;
pub mod resolver;
pub mod tables;

pub use label::*;
pub use maplink::*;
pub use resolver::*;
pub use tables::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CareError {
    #[error("Unknown classifier label: '{0}'")]
    InvalidLabel(String),

    #[error("Care table has no usable entry for {0}")]
    IncompleteTable(Label),
}
