//! Scripted chest menus: a directive pipeline with suspendable chains, tick
//! scheduled title batching and a per-open slot router.

pub mod actions;
pub mod config;
pub mod engine;
pub mod host;
pub mod menu;
pub mod recording;
pub mod scheduler;
pub mod session;

pub use config::EngineConfig;
pub use engine::MenuEngine;
pub use host::{ActionOutcome, ActorId, Host};
