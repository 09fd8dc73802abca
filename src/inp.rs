//! Main module for inp library functionality

pub mod coercion;
pub mod config;
pub mod document;
pub mod error;
pub mod formats;
pub mod lexing;
pub mod record;
pub mod registry;
pub mod schema;
pub mod section;
pub mod sections;
pub mod settings;
pub mod testing;
