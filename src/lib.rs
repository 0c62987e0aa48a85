//! Content database maintenance toolkit and content API.
//!
//! This library audits and repairs the multilingual `content_items` /
//! `content_translations` tables, migrates legacy dropdown rows into JSONB
//! `dropdown_configs`, and serves the `/api/content` and `/api/dropdowns`
//! endpoints the frontend reads.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Pure domain logic.
//! - `integrations`: Clients for external services.
//! - `audit`: Audit report rows and statistics.
//! - `config`: Configuration management.
//! - `content_client`: Client for a running content API.
//! - `content_store`: All SQL against the content tables.
//! - `db`: Database connection and pool management.
//! - `dedupe`: Duplicate cleanup planning.
//! - `dropdown_api`: Response shapes of the content API.
//! - `dropdown_builder`: Legacy rows to dropdown configs.
//! - `errors`: Error handling types.
//! - `field_name`: Field name extraction from content keys.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `sql_migrations`: Runner for `.sql` content migrations.
//! - `transfer`: CSV/JSON export and translation import.
//! - `verification`: Database versus API comparison.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and binaries
pub mod audit;
pub mod config;
pub mod content_client;
pub mod content_store;
pub mod db;
pub mod dedupe;
pub mod dropdown_api;
pub mod dropdown_builder;
pub mod errors;
pub mod field_name;
pub mod handlers;
pub mod models;
pub mod sql_migrations;
pub mod transfer;
pub mod verification;
