//! Wire types shared with the agent and the frontend: resolved command
//! intents, UI store actions, per-command outcomes, and the provider's
//! batch payload.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::chart::LevelKind;
use crate::indicators::IndicatorId;

// ── Command intents ─────────────────────────────────────────────

/// A resolved chart mutation. Produced by the parser or supplied directly
/// as a structured command by the upstream agent; never mutated once
/// created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
#[serde(rename_all_fields = "camelCase")]
#[ts(export)]
pub enum ChartCommand {
    ToggleIndicator {
        indicator_id: IndicatorId,
        enabled: bool,
    },
    ApplyPreset {
        preset_name: String,
    },
    HighlightLevel {
        price: f64,
        level_type: LevelKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    ClearDrawings,
}

impl ChartCommand {
    /// Short description for logs.
    pub fn description(&self) -> String {
        match self {
            ChartCommand::ToggleIndicator {
                indicator_id,
                enabled,
            } => {
                let verb = if *enabled { "enable" } else { "disable" };
                format!("{verb} {indicator_id}")
            }
            ChartCommand::ApplyPreset { preset_name } => format!("apply preset {preset_name}"),
            ChartCommand::HighlightLevel {
                price, level_type, ..
            } => format!("highlight {level_type} at {price}"),
            ChartCommand::ClearDrawings => "clear drawings".to_string(),
        }
    }
}

// ── Dispatch contract ───────────────────────────────────────────

/// Action object dispatched to the hosting app's UI state store. The
/// serialized form is the store's reducer contract:
/// `{"type": "TOGGLE_INDICATOR", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
#[ts(export)]
pub enum UiAction {
    ToggleIndicator {
        /// Indicator group key in the store, e.g. `movingAverages`.
        indicator: String,
        sub_indicator: String,
    },
    SetOscillatorPane {
        show: bool,
        #[serde(rename = "type")]
        pane_type: String,
    },
    ResetToDefaults,
}

// ── Outcomes ────────────────────────────────────────────────────

/// Result of applying (or failing to resolve) one command. Ephemeral:
/// returned to the caller for display or logging, not retained.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommandOutcome {
    /// `None` when resolution itself failed and no intent exists (unknown
    /// preset name, unknown legacy alias, uninitialized pipeline).
    pub intent: Option<ChartCommand>,
    pub message: String,
    pub success: bool,
}

impl CommandOutcome {
    pub fn ok(intent: ChartCommand, message: impl Into<String>) -> Self {
        Self {
            intent: Some(intent),
            message: message.into(),
            success: true,
        }
    }

    pub fn failed(intent: Option<ChartCommand>, message: impl Into<String>) -> Self {
        Self {
            intent,
            message: message.into(),
            success: false,
        }
    }
}

// ── Provider payload ────────────────────────────────────────────

/// Payload of one `chartCommands` provider event. All fields may be
/// empty/absent; an all-empty batch is a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChartCommandBatch {
    #[serde(default)]
    pub legacy: Vec<String>,
    #[serde(default)]
    pub structured: Vec<ChartCommand>,
    #[serde(default)]
    pub response_text: String,
}

impl ChartCommandBatch {
    pub fn is_empty(&self) -> bool {
        self.legacy.is_empty() && self.structured.is_empty() && self.response_text.is_empty()
    }
}
