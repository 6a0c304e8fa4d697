//! Roadworks: resource allocation for road repair jobs.
//!
//! Assessments describe what a repair needs; the pool holds the crews,
//! machines and materials on hand. [`allocate`] matches the two in
//! locality priority order, [`sweep`] hands resources back once a job is
//! completed, and [`storage`] commits each pass atomically.

pub mod allocate;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod model;
pub mod pool;
pub mod report;
pub mod storage;
pub mod sweep;
