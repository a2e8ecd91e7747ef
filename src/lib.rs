//! Reconciles a plotting library's country catalogue with a World Bank style
//! GDP table and resolves per-country log10 GDP for a year.
//!
//! ```text
//!  config ──► data::loader ──► data::reconcile ──► data::resolve ──► render
//!                                   ▲
//!                           data::translate
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod render;
