//! Clients for externally hosted research agents.

pub mod fiscal;

pub use fiscal::{AgentAnswer, AgentError, AgentSource, FiscalAgentClient};
