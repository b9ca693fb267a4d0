use std::collections::BTreeMap;

use serde_json::Value;
use tauri::State;

use crate::AppState;

use super::{ApiError, ListQuery, Paginated};

/// `Ok(None)` means the request was superseded on its channel and the
/// caller should keep whatever it is already showing.
fn settle<T>(result: Result<T, ApiError>) -> Result<Option<T>, String> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ApiError::Cancelled) => Ok(None),
        Err(err) => Err(err.user_message()),
    }
}

#[tauri::command]
pub async fn fetch_page(
    state: State<'_, AppState>,
    channel: String,
    path: String,
    query: Option<ListQuery>,
) -> Result<Option<Paginated<Value>>, String> {
    let client = state.api();
    let query = query.unwrap_or_else(|| ListQuery::with_per_page(state.settings.current().api.per_page));
    let latest = state.requests.channel(&channel);
    settle(latest.run(client.list(&path, &query)).await)
}

#[tauri::command]
pub async fn lookup(
    state: State<'_, AppState>,
    channel: String,
    path: String,
    params: Option<BTreeMap<String, String>>,
) -> Result<Option<Value>, String> {
    let client = state.api();
    let params: Vec<(String, String)> = params.unwrap_or_default().into_iter().collect();
    let latest = state.requests.channel(&channel);
    settle(latest.run(client.get(&path, &params)).await)
}

#[tauri::command]
pub async fn submit_record(
    state: State<'_, AppState>,
    path: String,
    body: Value,
) -> Result<Value, String> {
    let client = state.api();
    client
        .post(&path, &body)
        .await
        .map_err(|err| err.user_message())
}

#[tauri::command]
pub async fn delete_record(state: State<'_, AppState>, path: String) -> Result<(), String> {
    let client = state.api();
    client.delete(&path).await.map_err(|err| err.user_message())
}

#[tauri::command]
pub fn cancel_request(state: State<'_, AppState>, channel: String) {
    state.requests.cancel(&channel);
}
