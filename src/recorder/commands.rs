use serde::{Deserialize, Serialize};
use serde_json::Value;
use tauri::State;

use crate::models::{ExportRecord, SessionParameters};
use crate::AppState;

use super::controller::FinishOutcome;
use super::cursor::{TwistingMove, ValueType, WeavingMove};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordType {
    Twisting,
    Weaving,
}

/// Runs `$body` against the controller for `$kind` and serializes the result.
/// Snapshot types differ per record type, so the frontend receives JSON.
macro_rules! with_controller {
    ($state:expr, $kind:expr, |$controller:ident| $body:expr) => {
        match $kind {
            RecordType::Twisting => {
                let $controller = $state.twisting.clone();
                to_json($body.await)
            }
            RecordType::Weaving => {
                let $controller = $state.weaving.clone();
                to_json($body.await)
            }
        }
    };
}

fn to_json<T: Serialize>(result: anyhow::Result<T>) -> Result<Value, String> {
    let value = result.map_err(|e| e.to_string())?;
    serde_json::to_value(value).map_err(|e| e.to_string())
}

fn single_key(key: &str) -> Result<char, String> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(key), None) => Ok(key),
        _ => Err(format!("expected a single key, got '{key}'")),
    }
}

#[tauri::command]
pub async fn get_session(state: State<'_, AppState>, record_type: RecordType) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| async {
        Ok::<_, anyhow::Error>(controller.snapshot().await)
    })
}

#[tauri::command]
pub async fn set_parameters(
    state: State<'_, AppState>,
    record_type: RecordType,
    parameters: Value,
) -> Result<Value, String> {
    let parameters = SessionParameters::from_json(&parameters);
    with_controller!(state, record_type, |controller| controller
        .set_parameters(parameters))
}

#[tauri::command]
pub async fn start_recording(state: State<'_, AppState>, record_type: RecordType) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.start_recording())
}

#[tauri::command]
pub async fn back_to_parameters(
    state: State<'_, AppState>,
    record_type: RecordType,
) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.back_to_parameters())
}

#[tauri::command]
pub async fn report_problem(state: State<'_, AppState>, record_type: RecordType) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.report_problem())
}

#[tauri::command]
pub async fn add_problem(
    state: State<'_, AppState>,
    record_type: RecordType,
    description: String,
) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller
        .add_problem(&description))
}

#[tauri::command]
pub async fn delete_problem(
    state: State<'_, AppState>,
    record_type: RecordType,
    index: usize,
) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.delete_problem(index))
}

#[tauri::command]
pub async fn back_from_problems(
    state: State<'_, AppState>,
    record_type: RecordType,
) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.back_from_problems())
}

#[tauri::command]
pub async fn input_key(
    state: State<'_, AppState>,
    record_type: RecordType,
    key: String,
) -> Result<Value, String> {
    let key = single_key(&key)?;
    with_controller!(state, record_type, |controller| controller.input_key(key))
}

#[tauri::command]
pub async fn backspace(state: State<'_, AppState>, record_type: RecordType) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.backspace())
}

#[tauri::command]
pub async fn clear_input(state: State<'_, AppState>, record_type: RecordType) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.clear_input())
}

#[tauri::command]
pub async fn submit_value(state: State<'_, AppState>, record_type: RecordType) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.submit())
}

#[tauri::command]
pub async fn delete_stored_value(
    state: State<'_, AppState>,
    record_type: RecordType,
) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.delete_stored_value())
}

/// `movement` is a `TwistingMove` or `WeavingMove` depending on `record_type`,
/// e.g. `{"type":"jumpToColumn","value":33}`.
#[tauri::command]
pub async fn move_cursor(
    state: State<'_, AppState>,
    record_type: RecordType,
    movement: Value,
) -> Result<Value, String> {
    match record_type {
        RecordType::Twisting => {
            let movement: TwistingMove =
                serde_json::from_value(movement).map_err(|e| e.to_string())?;
            to_json(state.twisting.move_cursor(movement).await)
        }
        RecordType::Weaving => {
            let movement: WeavingMove =
                serde_json::from_value(movement).map_err(|e| e.to_string())?;
            to_json(state.weaving.move_cursor(movement).await)
        }
    }
}

#[tauri::command]
pub async fn toggle_value_type(
    state: State<'_, AppState>,
    record_type: RecordType,
) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller.toggle_value_type())
}

#[tauri::command]
pub async fn set_value_type(
    state: State<'_, AppState>,
    record_type: RecordType,
    value_type: ValueType,
) -> Result<Value, String> {
    with_controller!(state, record_type, |controller| controller
        .set_value_type(value_type))
}

#[tauri::command]
pub async fn finish_session_export(
    state: State<'_, AppState>,
    record_type: RecordType,
    clear_after: bool,
) -> Result<FinishOutcome, String> {
    let outcome = match record_type {
        RecordType::Twisting => state.twisting.finish(clear_after).await,
        RecordType::Weaving => state.weaving.finish(clear_after).await,
    };
    outcome.map_err(|e| e.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedExport {
    pub path: String,
    #[serde(flatten)]
    pub outcome: FinishOutcome,
}

/// Finishes the session and writes the CSV into the export directory. The
/// session is only cleared once the file is on disk.
#[tauri::command]
pub async fn save_session_export(
    state: State<'_, AppState>,
    record_type: RecordType,
    clear_after: bool,
) -> Result<SavedExport, String> {
    let directory = state.export_directory();
    let saved = match record_type {
        RecordType::Twisting => state.twisting.finish_to(&directory, clear_after).await,
        RecordType::Weaving => state.weaving.finish_to(&directory, clear_after).await,
    };
    let (path, outcome) = saved.map_err(|e| e.to_string())?;
    Ok(SavedExport {
        path: path.display().to_string(),
        outcome,
    })
}

#[tauri::command]
pub async fn list_exports(
    state: State<'_, AppState>,
    record_type: RecordType,
    limit: Option<u32>,
) -> Result<Vec<ExportRecord>, String> {
    let limit = limit.unwrap_or(20);
    let records = match record_type {
        RecordType::Twisting => state.twisting.export_history(limit).await,
        RecordType::Weaving => state.weaving.export_history(limit).await,
    };
    records.map_err(|e| e.to_string())
}
