//! # qamatch
//!
//! Matches a mentee's new question against the questions their mentor has
//! already answered, returning the closest ones by embedding similarity.
//!
//! ```text
//! submission → translate → store → answered history → embed → rank
//! ```

pub mod app;
pub mod cli;
pub mod config;
mod eid;
/// Question/answer documents and their CSV store.
pub mod qa;
/// Top-K cosine ranking. `ranking::rank` is the standalone entry point.
pub mod ranking;
pub mod semantic;
pub mod storage;
#[cfg(test)]
mod tests;
pub mod translate;
pub mod web;
