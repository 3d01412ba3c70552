// Dosebook - Patient medication records
// Copyright (c) 2025 Dosebook Contributors
// Licensed under the MIT License

//! # Dosebook - patient medication records
//!
//! Dosebook is the headless core of a medication screen: a grid of a patient's
//! drug records backed by a remote table, a detail form for the selected row,
//! a toolbar, and a modal for adding many rows at once.
//!
//! ## Overview
//!
//! This library provides:
//! - **Loading** a patient's records from a PostgREST/Supabase table
//! - **Editing** them through a draft form with explicit state transitions
//! - **Inserting** single rows and batches, reconciling the grid with what the
//!   backend returns
//! - **Discarding** responses that arrive after the patient changed
//!
//! ## Architecture
//!
//! Dosebook follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`screen`] - The screen controller, row cache, form and state machine
//! - [`adapters`] - The remote store (PostgREST and in-memory)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dosebook::adapters::store::create_store;
//! use dosebook::config::load_config;
//! use dosebook::domain::PatientKey;
//! use dosebook::screen::{DrugsScreen, ToolbarAction};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("dosebook.toml")?;
//!     let store = create_store(&config)?;
//!     let mut screen = DrugsScreen::new(store, &config.screen);
//!
//!     screen.load_patient(Some(PatientKey::new("P1")?)).await;
//!     screen.dispatch(ToolbarAction::Add).await;
//!     screen.edit_form(|form| form.set_name("Insulin"));
//!     screen.dispatch(ToolbarAction::Save).await;
//!
//!     println!("{} rows", screen.rows().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library calls return [`domain::Result`], carrying a [`domain::DosebookError`].
//! Remote failures inside the screen never escape as errors; they become
//! notifications, as a user would see them.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod screen;
