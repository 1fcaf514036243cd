//! HR Seed - synthetic employee data for a retrieval-backed HR assistant
//!
//! Generates fictional employee records with a language model, renders each one
//! into a deterministic text summary, embeds the summary and stores it next to
//! the record in a vector-searchable document collection.

pub mod cli;
pub mod config;
pub mod employee;
pub mod generator;
pub mod pipeline;
pub mod services;
