//! The chart mutation pipeline: applies resolved commands against the
//! configured chart surface and UI dispatch callback, tracks price-level
//! drawings, and orchestrates parsing for text and batch entry points.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use ts_rs::TS;

use crate::chart::{ChartSurface, LevelKind, PriceLineId};
use crate::error::AppError;
use crate::indicators::{self, def, IndicatorId};
use crate::intent::{ChartCommand, CommandOutcome, UiAction};
use crate::parser::{self, LegacyResolution};
use crate::presets;

/// Callback that delivers one action to the hosting app's UI state store.
pub type DispatchFn = Arc<dyn Fn(UiAction) -> Result<(), String> + Send + Sync>;

/// A tracked price-level annotation. The live set always mirrors what is
/// rendered on the chart surface.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DrawingRecord {
    pub id: u64,
    pub price: f64,
    pub level_type: LevelKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub handle: PriceLineId,
}

/// One initialized chart session: surface, dispatch callback, and the
/// drawings created during it. Replaced wholesale on re-initialization.
struct Session {
    chart: Arc<dyn ChartSurface>,
    dispatch: DispatchFn,
    drawings: Vec<DrawingRecord>,
    next_drawing_id: u64,
}

impl Session {
    fn send(&self, action: UiAction) -> Result<(), AppError> {
        (self.dispatch)(action).map_err(|message| AppError::DispatchError { message })
    }

    /// Dispatch the toggle for one indicator. Oscillator-style indicators
    /// get a second dispatch for their pane — exactly two dispatches for
    /// those, exactly one for everything else.
    fn toggle(&self, id: IndicatorId, enabled: bool) -> Result<(), AppError> {
        let d = def(id);
        self.send(UiAction::ToggleIndicator {
            indicator: d.group.to_string(),
            sub_indicator: id.as_str().to_string(),
        })?;
        if d.requires_aux_pane {
            self.send(UiAction::SetOscillatorPane {
                show: enabled,
                pane_type: id.as_str().to_string(),
            })?;
        }
        Ok(())
    }
}

/// The pipeline. Inert until [`ChartPipeline::initialize`] is called;
/// mutating entry points before then return a failed outcome, never panic.
#[derive(Default)]
pub struct ChartPipeline {
    session: Mutex<Option<Session>>,
}

impl ChartPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure (or reconfigure) the pipeline for a chart session. The
    /// surface and dispatch callback are replaced together; drawings
    /// tracked for a previous session are forgotten with it.
    pub fn initialize(&self, chart: Arc<dyn ChartSurface>, dispatch: DispatchFn) {
        *self.session.lock() = Some(Session {
            chart,
            dispatch,
            drawings: Vec::new(),
            next_drawing_id: 1,
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Snapshot of the live drawing records.
    pub fn drawings(&self) -> Vec<DrawingRecord> {
        self.session
            .lock()
            .as_ref()
            .map(|s| s.drawings.clone())
            .unwrap_or_default()
    }

    // ── Dispatcher ──────────────────────────────────────────────

    /// Apply a single command. External failures (chart surface, dispatch
    /// callback) are caught here and converted into a failed outcome —
    /// nothing propagates past this boundary.
    pub fn apply(&self, intent: &ChartCommand) -> CommandOutcome {
        match self.apply_inner(intent) {
            Ok(message) => CommandOutcome::ok(intent.clone(), message),
            Err(e) => CommandOutcome::failed(Some(intent.clone()), e),
        }
    }

    fn apply_inner(&self, intent: &ChartCommand) -> Result<String, AppError> {
        // One lock per command: order holds within a batch, while
        // overlapping batches interleave command-by-command.
        let mut guard = self.session.lock();
        let session = guard.as_mut().ok_or(AppError::NotInitialized)?;

        match intent {
            ChartCommand::ToggleIndicator {
                indicator_id,
                enabled,
            } => {
                session.toggle(*indicator_id, *enabled)?;
                let state = if *enabled { "enabled" } else { "disabled" };
                Ok(format!("{indicator_id} {state}"))
            }

            ChartCommand::ApplyPreset { preset_name } => {
                let preset =
                    presets::lookup(preset_name).ok_or_else(|| AppError::UnknownPreset {
                        name: preset_name.clone(),
                    })?;
                if preset.resets_defaults {
                    session.send(UiAction::ResetToDefaults)?;
                }
                for id in preset.indicator_ids {
                    session.toggle(*id, true)?;
                }
                Ok(preset.description())
            }

            ChartCommand::HighlightLevel {
                price,
                level_type,
                label,
            } => {
                let handle = session
                    .chart
                    .create_price_line(*price, level_type.color(), label.as_deref())
                    .map_err(|message| AppError::ChartError { message })?;
                let id = session.next_drawing_id;
                session.next_drawing_id += 1;
                session.drawings.push(DrawingRecord {
                    id,
                    price: *price,
                    level_type: *level_type,
                    label: label.clone(),
                    handle,
                });
                Ok(match label {
                    Some(l) => format!("{level_type} level at ${price} ({l})"),
                    None => format!("{level_type} level at ${price}"),
                })
            }

            ChartCommand::ClearDrawings => {
                let mut first_err: Option<String> = None;
                for record in session.drawings.drain(..) {
                    if let Err(e) = session.chart.remove_price_line(record.handle) {
                        first_err.get_or_insert(e);
                    }
                }
                match first_err {
                    Some(message) => Err(AppError::ChartError { message }),
                    None => Ok("Cleared all drawings".to_string()),
                }
            }
        }
    }

    // ── Command processor ───────────────────────────────────────

    /// Apply the single best command parsed from free text. If the text
    /// parses to several commands, only the first is applied — this is the
    /// single-intent convenience entry point.
    pub fn process_indicator_command(&self, text: &str) -> CommandOutcome {
        match parser::parse(text).into_iter().next() {
            Some(intent) => self.apply(&intent),
            None => CommandOutcome::failed(None, "No chart command recognized"),
        }
    }

    /// Process one agent response: legacy colon commands, then structured
    /// commands, then commands parsed from the response text, in that
    /// order. The order is preserved from the original system as a
    /// compatibility choice, not a guarantee anything may rely on.
    ///
    /// Failures are isolated per command: every applied (or unresolvable)
    /// command yields one outcome and never aborts its siblings.
    pub fn process_enhanced_response(
        &self,
        response_text: &str,
        legacy: &[String],
        structured: &[ChartCommand],
    ) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::new();

        for command in legacy {
            match parser::translate_legacy(command) {
                LegacyResolution::Resolved(intent) => outcomes.push(self.apply(&intent)),
                LegacyResolution::Unknown { alias } => outcomes.push(CommandOutcome::failed(
                    None,
                    AppError::UnknownIndicator { alias },
                )),
                // Another subsystem's legacy verb — not ours to answer for.
                LegacyResolution::Foreign => {}
            }
        }

        for intent in structured {
            outcomes.push(self.apply(intent));
        }

        for intent in parser::parse(response_text) {
            outcomes.push(self.apply(&intent));
        }

        outcomes
    }

    // ── Single-intent conveniences ──────────────────────────────

    pub fn toggle_indicator(&self, indicator_id: IndicatorId, enabled: bool) -> CommandOutcome {
        self.apply(&ChartCommand::ToggleIndicator {
            indicator_id,
            enabled,
        })
    }

    pub fn apply_indicator_preset(&self, name: &str) -> CommandOutcome {
        self.apply(&ChartCommand::ApplyPreset {
            preset_name: name.to_string(),
        })
    }

    pub fn highlight_level(
        &self,
        price: f64,
        level_type: LevelKind,
        label: Option<&str>,
    ) -> CommandOutcome {
        self.apply(&ChartCommand::HighlightLevel {
            price,
            level_type,
            label: label.map(str::to_string),
        })
    }

    pub fn clear_drawings(&self) -> CommandOutcome {
        self.apply(&ChartCommand::ClearDrawings)
    }

    /// Fixed descriptive text per indicator; a generic fallback for ids the
    /// registry does not know. Read-only — works before `initialize`.
    pub fn get_indicator_explanation(&self, id: &str) -> String {
        indicators::explanation(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use crate::chart::SUPPORT_COLOR;

    /// Chart surface test double that records every call.
    #[derive(Default)]
    struct RecordingChart {
        next_id: AtomicU64,
        created: Mutex<Vec<(f64, String, Option<String>)>>,
        removed: Mutex<Vec<PriceLineId>>,
        fail_creates: bool,
    }

    impl ChartSurface for RecordingChart {
        fn create_price_line(
            &self,
            price: f64,
            color: &str,
            label: Option<&str>,
        ) -> Result<PriceLineId, String> {
            if self.fail_creates {
                return Err("series disposed".to_string());
            }
            self.created
                .lock()
                .push((price, color.to_string(), label.map(str::to_string)));
            Ok(PriceLineId(self.next_id.fetch_add(1, Ordering::Relaxed)))
        }

        fn remove_price_line(&self, handle: PriceLineId) -> Result<(), String> {
            self.removed.lock().push(handle);
            Ok(())
        }
    }

    fn recording_dispatch() -> (DispatchFn, Arc<Mutex<Vec<UiAction>>>) {
        let actions: Arc<Mutex<Vec<UiAction>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&actions);
        let dispatch: DispatchFn = Arc::new(move |action| {
            sink.lock().push(action);
            Ok(())
        });
        (dispatch, actions)
    }

    fn initialized() -> (ChartPipeline, Arc<RecordingChart>, Arc<Mutex<Vec<UiAction>>>) {
        let pipeline = ChartPipeline::new();
        let chart = Arc::new(RecordingChart::default());
        let (dispatch, actions) = recording_dispatch();
        pipeline.initialize(chart.clone(), dispatch);
        (pipeline, chart, actions)
    }

    #[test]
    fn mutating_before_initialize_fails_locally() {
        let pipeline = ChartPipeline::new();
        let outcome = pipeline.toggle_indicator(IndicatorId::Rsi, true);
        assert!(!outcome.success);
        assert!(outcome.message.contains("not initialized"));
    }

    #[test]
    fn oscillator_toggle_dispatches_exactly_two_actions() {
        let (pipeline, _, actions) = initialized();
        let outcome = pipeline.toggle_indicator(IndicatorId::Rsi, true);
        assert!(outcome.success);
        assert_eq!(outcome.message, "rsi enabled");
        let actions = actions.lock();
        assert_eq!(
            *actions,
            vec![
                UiAction::ToggleIndicator {
                    indicator: "oscillators".into(),
                    sub_indicator: "rsi".into(),
                },
                UiAction::SetOscillatorPane {
                    show: true,
                    pane_type: "rsi".into(),
                },
            ]
        );
    }

    #[test]
    fn plain_indicator_toggle_dispatches_exactly_one_action() {
        let (pipeline, _, actions) = initialized();
        let outcome = pipeline.toggle_indicator(IndicatorId::Ma50, false);
        assert!(outcome.success);
        assert_eq!(outcome.message, "ma50 disabled");
        assert_eq!(
            *actions.lock(),
            vec![UiAction::ToggleIndicator {
                indicator: "movingAverages".into(),
                sub_indicator: "ma50".into(),
            }]
        );
    }

    #[test]
    fn basic_preset_resets_then_toggles_in_order() {
        let (pipeline, _, actions) = initialized();
        let outcome = pipeline.apply_indicator_preset("basic");
        assert!(outcome.success);
        assert_eq!(outcome.message, "Applied basic analysis (MA20, MA50)");
        assert_eq!(
            *actions.lock(),
            vec![
                UiAction::ResetToDefaults,
                UiAction::ToggleIndicator {
                    indicator: "movingAverages".into(),
                    sub_indicator: "ma20".into(),
                },
                UiAction::ToggleIndicator {
                    indicator: "movingAverages".into(),
                    sub_indicator: "ma50".into(),
                },
            ]
        );
    }

    #[test]
    fn unknown_preset_fails_without_dispatch() {
        let (pipeline, _, actions) = initialized();
        let outcome = pipeline.apply_indicator_preset("quantum");
        assert!(!outcome.success);
        assert!(outcome.message.contains("quantum"));
        assert!(actions.lock().is_empty());
    }

    #[test]
    fn highlight_level_draws_and_tracks() {
        let (pipeline, chart, _) = initialized();
        let outcome = pipeline.highlight_level(420.0, LevelKind::Support, Some("Key Support"));
        assert!(outcome.success);
        assert!(outcome.message.contains("support level at $420"));
        assert!(outcome.message.contains("Key Support"));
        assert_eq!(
            *chart.created.lock(),
            vec![(420.0, SUPPORT_COLOR.to_string(), Some("Key Support".to_string()))]
        );
        assert_eq!(pipeline.drawings().len(), 1);
    }

    #[test]
    fn highlight_level_fails_when_chart_rejects() {
        let pipeline = ChartPipeline::new();
        let chart = Arc::new(RecordingChart {
            fail_creates: true,
            ..RecordingChart::default()
        });
        let (dispatch, _) = recording_dispatch();
        pipeline.initialize(chart, dispatch);
        let outcome = pipeline.highlight_level(100.0, LevelKind::Resistance, None);
        assert!(!outcome.success);
        assert!(outcome.message.contains("series disposed"));
        assert!(pipeline.drawings().is_empty());
    }

    #[test]
    fn clear_drawings_with_none_live_is_a_successful_noop() {
        let (pipeline, chart, _) = initialized();
        let outcome = pipeline.clear_drawings();
        assert!(outcome.success);
        assert_eq!(outcome.message, "Cleared all drawings");
        assert!(chart.removed.lock().is_empty());
    }

    #[test]
    fn clear_drawings_removes_every_annotation() {
        let (pipeline, chart, _) = initialized();
        pipeline.highlight_level(100.0, LevelKind::Support, None);
        pipeline.highlight_level(200.0, LevelKind::Resistance, None);
        let outcome = pipeline.clear_drawings();
        assert!(outcome.success);
        assert_eq!(chart.removed.lock().len(), 2);
        assert!(pipeline.drawings().is_empty());
    }

    #[test]
    fn dispatch_failure_becomes_failed_outcome() {
        let pipeline = ChartPipeline::new();
        let chart = Arc::new(RecordingChart::default());
        let dispatch: DispatchFn = Arc::new(|_| Err("store torn down".to_string()));
        pipeline.initialize(chart, dispatch);
        let outcome = pipeline.toggle_indicator(IndicatorId::Ma20, true);
        assert!(!outcome.success);
        assert!(outcome.message.contains("store torn down"));
    }

    #[test]
    fn text_command_applies_first_parsed_intent_only() {
        let (pipeline, chart, actions) = initialized();
        let outcome = pipeline.process_indicator_command("There is support at $420");
        assert!(outcome.success);
        assert!(outcome.message.contains("support level at $420"));
        assert!(actions.lock().is_empty());
        assert_eq!(chart.created.lock().len(), 1);
    }

    #[test]
    fn unrecognized_text_fails_without_side_effects() {
        let (pipeline, chart, actions) = initialized();
        let outcome = pipeline.process_indicator_command("what a lovely day");
        assert!(!outcome.success);
        assert!(outcome.intent.is_none());
        assert!(actions.lock().is_empty());
        assert!(chart.created.lock().is_empty());
    }

    #[test]
    fn empty_enhanced_response_is_a_noop() {
        let (pipeline, _, actions) = initialized();
        let outcomes = pipeline.process_enhanced_response("No chart commands", &[], &[]);
        assert!(outcomes.is_empty());
        assert!(actions.lock().is_empty());
    }

    #[test]
    fn enhanced_response_merges_in_source_order() {
        let (pipeline, _, _) = initialized();
        let legacy = vec![
            "LOAD:TSLA".to_string(),
            "INDICATOR:RSI".to_string(),
            "INDICATOR:vwap".to_string(),
        ];
        let structured = vec![ChartCommand::ClearDrawings];
        let outcomes =
            pipeline.process_enhanced_response("show the ma20", &legacy, &structured);

        // LOAD:TSLA is another subsystem's command and yields no outcome.
        assert_eq!(outcomes.len(), 4);
        assert_eq!(
            outcomes.first().and_then(|o| o.intent.clone()),
            Some(ChartCommand::ToggleIndicator {
                indicator_id: IndicatorId::Rsi,
                enabled: true
            })
        );
        let unknown = outcomes.get(1).unwrap();
        assert!(!unknown.success);
        assert!(unknown.message.contains("vwap"));
        assert_eq!(
            outcomes.get(2).and_then(|o| o.intent.clone()),
            Some(ChartCommand::ClearDrawings)
        );
        assert_eq!(
            outcomes.get(3).and_then(|o| o.intent.clone()),
            Some(ChartCommand::ToggleIndicator {
                indicator_id: IndicatorId::Ma20,
                enabled: true
            })
        );
    }

    #[test]
    fn failures_do_not_abort_sibling_commands() {
        let (pipeline, _, actions) = initialized();
        let legacy = vec!["INDICATOR:vwap".to_string(), "INDICATOR:macd".to_string()];
        let outcomes = pipeline.process_enhanced_response("", &legacy, &[]);
        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes.first().unwrap().success);
        assert!(outcomes.get(1).unwrap().success);
        // macd still dispatched its toggle + pane pair.
        assert_eq!(actions.lock().len(), 2);
    }

    #[test]
    fn reinitialize_replaces_the_session_wholesale() {
        let (pipeline, chart, _) = initialized();
        pipeline.highlight_level(100.0, LevelKind::Support, None);
        assert_eq!(pipeline.drawings().len(), 1);

        let chart2 = Arc::new(RecordingChart::default());
        let (dispatch2, actions2) = recording_dispatch();
        pipeline.initialize(chart2, dispatch2);
        assert!(pipeline.drawings().is_empty());

        let outcome = pipeline.toggle_indicator(IndicatorId::Volume, true);
        assert!(outcome.success);
        assert_eq!(actions2.lock().len(), 1);
        // The first session's chart never saw a removal — its drawings
        // belong to the torn-down session.
        assert!(chart.removed.lock().is_empty());
    }

    #[test]
    fn explanation_works_without_initialization() {
        let pipeline = ChartPipeline::new();
        assert!(pipeline.get_indicator_explanation("macd").contains("MACD"));
        assert!(pipeline
            .get_indicator_explanation("mystery")
            .contains("not an indicator"));
    }
}
