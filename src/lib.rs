pub mod api;
pub mod db;
pub mod models;
pub mod recorder;
pub mod scanner;
pub mod settings;
pub mod utils;

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, RwLock},
};

use anyhow::{Context, Result};
use log::info;

use api::{ApiClient, RequestChannels};
use db::{Database, SessionStore};
use recorder::{RecordKind, RecordingController, SessionNotifier, Twisting, Weaving};
use scanner::BarcodeScanner;
use settings::{RecorderSettings, SettingsStore};

pub const DATA_DIR_ENV: &str = "TENSION_RECORDER_DATA_DIR";
const DATABASE_FILE: &str = "tension-recorder.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

pub struct AppState {
    pub db: Database,
    pub twisting: RecordingController<Twisting>,
    pub weaving: RecordingController<Weaving>,
    pub settings: SettingsStore,
    pub requests: RequestChannels,
    pub scanner: Mutex<BarcodeScanner>,
    api: RwLock<ApiClient>,
    data_dir: PathBuf,
}

impl AppState {
    /// Opens settings and storage under `data_dir` and restores both sessions.
    pub async fn initialize(data_dir: PathBuf, notifier: Arc<dyn SessionNotifier>) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
        let current = settings.current();
        utils::logging::init(&current.log_level);
        info!("Using data directory {}", data_dir.display());

        let database = Database::new(data_dir.join(DATABASE_FILE))?;
        let twisting = RecordingController::<Twisting>::load(
            SessionStore::new(database.clone(), Twisting::NAMESPACE),
            notifier.clone(),
        )
        .await?;
        let weaving = RecordingController::<Weaving>::load(
            SessionStore::new(database.clone(), Weaving::NAMESPACE),
            notifier,
        )
        .await?;

        Ok(Self {
            db: database,
            twisting,
            weaving,
            api: RwLock::new(ApiClient::new(&current.api)?),
            settings,
            requests: RequestChannels::default(),
            scanner: Mutex::new(BarcodeScanner::default()),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn api(&self) -> ApiClient {
        match self.api.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn export_directory(&self) -> PathBuf {
        self.settings.export_directory(&self.data_dir)
    }

    /// Persists new settings and rebuilds the HTTP client from them.
    pub fn update_settings(&self, settings: RecorderSettings) -> Result<()> {
        let client = ApiClient::new(&settings.api)?;
        self.settings.update(settings)?;
        let mut api = match self.api.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *api = client;
        Ok(())
    }
}

/// `TENSION_RECORDER_DATA_DIR` when set, otherwise `fallback`.
pub fn resolve_data_dir(fallback: PathBuf) -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or(fallback)
}

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Arc;

    use log::warn;
    use tauri::{Emitter, Manager, State};

    use crate::api::commands::{cancel_request, delete_record, fetch_page, lookup, submit_record};
    use crate::recorder::commands::{
        add_problem, back_from_problems, back_to_parameters, backspace, clear_input,
        delete_problem, delete_stored_value, finish_session_export, get_session, input_key,
        list_exports, move_cursor, report_problem, save_session_export, set_parameters,
        set_value_type, start_recording, submit_value, toggle_value_type,
    };
    use crate::recorder::SessionNotifier;
    use crate::scanner::ScannerState;
    use crate::settings::RecorderSettings;
    use crate::{resolve_data_dir, AppState};

    impl SessionNotifier for tauri::AppHandle {
        fn session_changed(&self, event: &str, payload: serde_json::Value) {
            if let Err(err) = self.emit(event, payload) {
                warn!("Failed to emit {event}: {err}");
            }
        }
    }

    fn lock_scanner(state: &AppState) -> std::sync::MutexGuard<'_, crate::scanner::BarcodeScanner> {
        match state.scanner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[tauri::command]
    fn get_settings(state: State<AppState>) -> RecorderSettings {
        state.settings.current()
    }

    #[tauri::command]
    fn update_settings(
        settings: RecorderSettings,
        state: State<AppState>,
        app_handle: tauri::AppHandle,
    ) -> Result<(), String> {
        state
            .update_settings(settings.clone())
            .map_err(|e| e.to_string())?;
        app_handle
            .emit("settings-updated", &settings)
            .map_err(|e| e.to_string())
    }

    #[tauri::command]
    fn scanner_start(state: State<AppState>) -> ScannerState {
        lock_scanner(&state).start().clone()
    }

    #[tauri::command]
    fn scanner_stop(state: State<AppState>) -> ScannerState {
        lock_scanner(&state).stop().clone()
    }

    #[tauri::command]
    fn scanner_detected(code: String, state: State<AppState>) -> Option<String> {
        lock_scanner(&state).on_detect(&code)
    }

    #[tauri::command]
    fn scanner_failed(name: String, detail: Option<String>, state: State<AppState>) -> ScannerState {
        lock_scanner(&state)
            .on_error(&name, detail.as_deref().unwrap_or_default())
            .clone()
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        tauri::Builder::default()
            .plugin(tauri_plugin_opener::init())
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_data_dir = app
                        .path()
                        .app_data_dir()
                        .map_err(|err| anyhow::anyhow!(err))?;
                    let data_dir = resolve_data_dir(app_data_dir);

                    let notifier: Arc<dyn SessionNotifier> = Arc::new(app.handle().clone());
                    let state = tauri::async_runtime::block_on(AppState::initialize(
                        data_dir, notifier,
                    ))?;
                    log::info!("Tension Recorder ready");
                    app.manage(state);
                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                get_session,
                set_parameters,
                start_recording,
                back_to_parameters,
                report_problem,
                add_problem,
                delete_problem,
                back_from_problems,
                input_key,
                backspace,
                clear_input,
                submit_value,
                delete_stored_value,
                move_cursor,
                toggle_value_type,
                set_value_type,
                finish_session_export,
                save_session_export,
                list_exports,
                fetch_page,
                lookup,
                submit_record,
                delete_record,
                cancel_request,
                get_settings,
                update_settings,
                scanner_start,
                scanner_stop,
                scanner_detected,
                scanner_failed,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}

#[cfg(feature = "desktop")]
pub use desktop::run;
