// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod dwell;
pub mod game;
pub mod geom;
pub mod history;
pub mod landmarks;
pub mod menu;
pub mod runtime;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod targets;
pub mod trail;

/// Fixed interval of the frame loop, in milliseconds (~60 Hz).
pub const TICK_RATE_MS: u64 = 16;
