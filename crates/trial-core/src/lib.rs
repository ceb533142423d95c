#![deny(unsafe_code)]

pub mod assemble;
pub mod dedupe;

pub use assemble::{assemble_trial, has_results};
pub use dedupe::dedupe_arms;
