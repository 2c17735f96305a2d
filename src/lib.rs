//! trendlens — agent-command interpretation and chart-mutation pipeline.
//!
//! Takes assistant text and/or structured intents produced by a
//! conversational agent, resolves them into typed chart commands
//! (indicator toggles, preset bundles, price-level annotations), applies
//! each exactly once in a deterministic order, and reports a
//! human-readable outcome per command. Resolution is deterministic
//! keyword/alias matching against a fixed registry — there is no model in
//! the loop.

pub mod chart;
pub mod error;
pub mod events;
pub mod indicators;
pub mod intent;
pub mod parser;
pub mod pipeline;
pub mod presets;
pub mod stream;
#[cfg(feature = "tauri-app")]
pub mod ui_bridge;

pub use chart::{ChartSurface, LevelKind, NoopChart, PriceLineId};
pub use error::AppError;
pub use indicators::IndicatorId;
pub use intent::{ChartCommand, ChartCommandBatch, CommandOutcome, UiAction};
pub use pipeline::{ChartPipeline, DispatchFn, DrawingRecord};
pub use stream::{CommandFeed, CommandStreamAdapter};
