//! Expense Tracker - personal expense tracking from the terminal
//!
//! This library provides the core functionality behind the `expenses`
//! binary: recording expenses, filtering them, computing a dashboard and
//! exporting the collection in several formats.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (expenses, categories, money, months)
//! - `storage`: JSON file storage layer
//! - `services`: Expense store, filtering, import and sample data
//! - `reports`: Category breakdown and dashboard
//! - `export`: CSV, JSON, YAML and PDF exports
//! - `cloud`: Simulated cloud export, sharing and scheduling
//! - `display`, `cli`, `logging`: the terminal front end
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_tracker::services::ExpenseService;
//! use expense_tracker::storage::MemoryPersistence;
//!
//! let persistence = MemoryPersistence::new();
//! let mut expenses = ExpenseService::load(&persistence);
//! ```

pub mod cli;
pub mod cloud;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{ExpenseError, ExpenseResult};
