//! Terminal companion for the nursery admin dashboard.
//!
//! The core is [`calendar::partition_month`], which splits a month into
//! Monday-first weeks. The other modules cover the dashboard's client-side
//! concerns: toast de-duplication, list query state and form validation.
pub mod app;
pub mod calendar;
pub mod config;
pub mod listing;
pub mod notify;
pub mod ui;
pub mod validation;
