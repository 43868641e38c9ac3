//! UI Module
//!
//! This module exports the terminal interface of the catalog admin client:
//!
//! - `app`: Application state, routing and the event loop
//! - `list`: Per-kind list view controller (fetch, search, select, delete)
//! - `editor`: The add/edit overlay and its dependent selectors
//! - `login`: Login and registration form state
//! - `notice`: Timestamped status-bar messages
//! - `views`: Rendering functions for all screens

mod app;
mod editor;
mod list;
mod login;
mod notice;
mod views;

pub use app::{run_app, App, Backend};
