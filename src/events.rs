//! Single source of truth for event and action names shared between Rust
//! and the TypeScript frontend.

/// Provider event carrying a command batch from the chat/streaming agent.
pub const CHART_COMMANDS: &str = "chartCommands";

/// Frontend event the Tauri bridge emits one `UiAction` on.
pub const CHART_ACTION: &str = "chart:action";

/// Action type names of the dispatch contract (the UI store's reducer keys).
pub const ACTION_TOGGLE_INDICATOR: &str = "TOGGLE_INDICATOR";
pub const ACTION_SET_OSCILLATOR_PANE: &str = "SET_OSCILLATOR_PANE";
pub const ACTION_RESET_TO_DEFAULTS: &str = "RESET_TO_DEFAULTS";
