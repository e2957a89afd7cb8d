#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! x402 actions for LLM agents.
//!
//! [`X402ActionProvider`] exposes seven tools: service discovery, a plain
//! request that surfaces 402 challenges, a paid retry, a one-step paid
//! request, and registration and listing of services and facilitators.
//!
//! # Modules
//!
//! - [`action`] - The provider trait agent frameworks call into
//! - [`config`] - TOML agent configuration for the command line
//! - [`provider`] - The x402 actions
//! - [`render`] - JSON result payloads
//! - [`schemas`] - Action arguments and their JSON schemas
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation and the `x402-agent` binary

pub mod action;
pub mod config;
pub mod provider;
pub mod render;
pub mod schemas;

pub use action::{ActionDefinition, ActionProvider, ProviderError};
pub use config::AgentConfig;
pub use provider::X402ActionProvider;
