//! reaper-mcp
//!
//! Exposes REAPER's scripting surface to Claude and other AI assistants via
//! the Model Context Protocol (MCP). Implements MCP over stdio using JSON-RPC 2.0.

pub mod client;
pub mod error;
pub mod handler;
pub mod params;
pub mod protocol;
pub mod server;
pub mod setup;
pub mod tools;

pub use client::{CommandClient, ReaperClient};
pub use handler::ToolFacade;
pub use server::McpServer;
pub use setup::ReaperSetup;
