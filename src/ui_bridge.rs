//! Tauri-specific dispatch: forwards each `UiAction` to the frontend store
//! as a `chart:action` event. Only compiled with the `tauri-app` feature.

use std::sync::Arc;

use crate::events::CHART_ACTION;
use crate::pipeline::DispatchFn;

/// Build a [`DispatchFn`] that emits actions to the frontend over Tauri
/// events. The frontend's store listener applies them to chart state.
pub fn tauri_dispatch(app_handle: tauri::AppHandle) -> DispatchFn {
    Arc::new(move |action| {
        tauri::Emitter::emit(&app_handle, CHART_ACTION, &action).map_err(|e| e.to_string())
    })
}
