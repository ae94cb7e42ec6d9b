//! Search and paginate a university course schedule.
//!
//! The [`schedule`] module holds the domain: course records, the rendering
//! of compact time codes, search filters and the cursor pagination
//! protocol. [`db`] reads the course store, [`catalog`] executes page
//! requests against it, [`server`] exposes them over HTTP and [`client`]
//! drives pagination from the UI side.

pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod schedule;
pub mod server;
pub mod types;
