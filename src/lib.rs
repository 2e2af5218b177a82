//! MarketMind Analytics API Library
//!
//! Core functionality for the MarketMind marketing-analytics backend:
//! lead scoring, the sales-agent tool dispatcher, sales forecasting,
//! content generation via external LLM providers, and the HTTP handlers
//! that tie them together.
//!
//! # Modules
//!
//! - `agent`: Tool dispatch for the sales-agent endpoint.
//! - `cache`: Cache key fingerprints.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `forecast`: Sales forecasting.
//! - `handlers`: HTTP request handlers and shared state.
//! - `llm`: External LLM provider clients (Grok, Doodle).
//! - `models`: Wire data models.
//! - `scoring`: Lead-scoring inference.
//! - `tools`: Agent tool implementations.

pub mod agent;
pub mod cache;
pub mod config;
pub mod errors;
pub mod forecast;
pub mod handlers;
pub mod llm;
pub mod models;
pub mod scoring;
pub mod tools;
