//! Kaizen Voice - voice-note capture backend for shop-floor improvement ideas
//!
//! Recordings are transcribed, classified into a lean waste category with a
//! suggestion level, stored, and then reviewed through a small status
//! lifecycle (pending_review → approved/rejected → implemented).
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line management interface
//!
//! # Architecture
//! - `domain`: suggestion, lean category and status types
//! - `ai`: transcription and classification clients
//! - `storage`: SeaORM storage backend
//! - `services`: processing pipeline and review operations
//! - `api`: HTTP services and middleware
//! - `interfaces`: user interfaces (CLI)
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging setup

pub mod ai;
pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
