//! mdexam-core: exam parsing, attempt tracking, scoring and result history.
//!
//! Exams are plain markdown-like text. [`parser`] turns the text into an
//! [`model::Exam`], [`shuffle`] arranges it for display, [`session`] tracks one
//! attempt, [`scoring`] grades it and [`history`] keeps every scored attempt
//! with a frozen snapshot of what was asked.

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod import;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod session;
pub mod shuffle;
pub mod statistics;
pub mod store;
pub mod timer;
