//! fabric-cli - A command-line client for Hyperledger Fabric networks
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Configuration
//! - [`profile`] - Connection profile loading and lookup
//! - [`resolver`] - Default selection of channel, peer, orderer and organization
//! - [`config`] - Client settings (`fabric-cli.toml`)
//!
//! ## Network Access
//! - [`sdk`] - Capability traits of the network SDK and the tools backend
//! - [`session`] - Per-invocation session holding the SDK and the selection
//!
//! ## Commands
//! - [`commands`] - `setup`, `register`, `enroll`/`reenroll`, `execute`/`query`
//! - [`cli`] - Argument parsing and dispatch
//!
//! ## Utilities
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Configuration
// ============================================================================
pub mod config;
pub mod profile;
pub mod resolver;

// ============================================================================
// Network Access
// ============================================================================
pub mod sdk;
pub mod session;

// ============================================================================
// Commands
// ============================================================================
pub mod cli;
pub mod commands;

// ============================================================================
// Utilities
// ============================================================================
pub mod error;
