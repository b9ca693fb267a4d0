use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::db::{SessionStore, Slice};
use crate::models::{ExportRecord, ProblemReport, SessionParameters};

use super::cursor::{PositionCursor, ValueType};
use super::export::{ExportTable, PersistedSession};
use super::kind::RecordKind;
use super::state::{Changes, SessionError, SessionState, SessionView};
use super::values::{MeasurementPair, MeasurementStore, PairSpecStatus, SpecRange};

/// Receives a fresh snapshot whenever a session changes.
pub trait SessionNotifier: Send + Sync {
    fn session_changed(&self, event: &str, payload: serde_json::Value);
}

pub struct NullNotifier;

impl SessionNotifier for NullNotifier {
    fn session_changed(&self, _event: &str, _payload: serde_json::Value) {}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct SessionSnapshot<K: RecordKind> {
    pub record_kind: &'static str,
    pub view: SessionView,
    pub parameters: SessionParameters,
    pub cursor: K::Cursor,
    pub input: String,
    pub current_pair: MeasurementPair,
    pub current_status: PairSpecStatus,
    pub spec_range: SpecRange,
    pub filled: usize,
    pub problems: Vec<ProblemReport>,
    pub values: K::Values,
}

impl<K: RecordKind> SessionSnapshot<K> {
    fn capture(state: &SessionState<K>) -> Self {
        let spec_range = SpecRange::from_parameters(&state.parameters);
        let current_pair = state.values.pair(state.cursor.coordinate());
        Self {
            record_kind: K::NAMESPACE,
            view: state.view.clone(),
            parameters: state.parameters.clone(),
            cursor: state.cursor.clone(),
            input: state.input.as_str().to_string(),
            current_status: PairSpecStatus::evaluate(&spec_range, &current_pair),
            current_pair,
            spec_range,
            filled: state.values.filled(),
            problems: state.problems.clone(),
            values: state.values.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishOutcome {
    pub file_name: String,
    pub csv: String,
    pub data_rows: usize,
    pub cleared: bool,
}

/// Owns one record type's session and keeps durable storage in step with it.
pub struct RecordingController<K: RecordKind> {
    state: Arc<Mutex<SessionState<K>>>,
    store: SessionStore,
    notifier: Arc<dyn SessionNotifier>,
}

impl<K: RecordKind> Clone for RecordingController<K> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            store: self.store.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<K: RecordKind> RecordingController<K> {
    /// Restores every slice from durable storage, defaulting the missing ones.
    pub async fn load(store: SessionStore, notifier: Arc<dyn SessionNotifier>) -> Result<Self> {
        let mut cursor: K::Cursor = store.load(Slice::Cursor, K::Cursor::default()).await?;
        cursor.normalize();

        let state = SessionState::<K> {
            view: store.load(Slice::View, SessionView::Parameters).await?,
            parameters: store
                .load(Slice::Parameters, SessionParameters::default())
                .await?,
            cursor,
            values: store.load(Slice::Values, K::Values::default()).await?,
            problems: store.load(Slice::Problems, Vec::new()).await?,
            input: Default::default(),
        };

        info!(
            "Loaded {} session: view {}, {} filled positions, {} problems",
            K::NAMESPACE,
            state.view.as_str(),
            state.values.filled(),
            state.problems.len()
        );

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            store,
            notifier,
        })
    }

    pub async fn snapshot(&self) -> SessionSnapshot<K> {
        SessionSnapshot::capture(&*self.state.lock().await)
    }

    /// Runs `action` against the state and writes back each slice it touched.
    /// The lock is held until storage has accepted the writes, so slice
    /// writes reach the worker in action order.
    ///
    /// A failed write is returned to the caller but memory keeps the
    /// mutation. The slice is written in full again the next time an action
    /// touches it; until then export reflects what storage holds.
    async fn apply<F>(&self, action: F) -> Result<SessionSnapshot<K>>
    where
        F: FnOnce(&mut SessionState<K>) -> Result<Changes, SessionError>,
    {
        let mut state = self.state.lock().await;
        let changes = action(&mut *state)?;
        self.persist(&*state, changes).await?;

        let snapshot = SessionSnapshot::capture(&*state);
        drop(state);
        self.notify(&snapshot);
        Ok(snapshot)
    }

    async fn persist(&self, state: &SessionState<K>, changes: Changes) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        debug!("{} slices changed: {changes:?}", K::NAMESPACE);

        if changes.parameters {
            self.store.save(Slice::Parameters, &state.parameters).await?;
        }
        if changes.values {
            self.store.save(Slice::Values, &state.values).await?;
        }
        if changes.problems {
            self.store.save(Slice::Problems, &state.problems).await?;
        }
        if changes.cursor {
            self.store.save(Slice::Cursor, &state.cursor).await?;
        }
        if changes.view {
            self.store.save(Slice::View, &state.view).await?;
        }
        Ok(())
    }

    fn notify(&self, snapshot: &SessionSnapshot<K>) {
        match serde_json::to_value(snapshot) {
            Ok(payload) => self
                .notifier
                .session_changed(&format!("{}-session-changed", K::NAMESPACE), payload),
            Err(err) => warn!("Failed to serialize {} snapshot: {err}", K::NAMESPACE),
        }
    }

    pub async fn set_parameters(&self, parameters: SessionParameters) -> Result<SessionSnapshot<K>> {
        self.apply(|state| state.set_parameters(parameters)).await
    }

    pub async fn start_recording(&self) -> Result<SessionSnapshot<K>> {
        self.apply(|state| state.start_recording()).await
    }

    pub async fn back_to_parameters(&self) -> Result<SessionSnapshot<K>> {
        self.apply(|state| state.back_to_parameters()).await
    }

    pub async fn report_problem(&self) -> Result<SessionSnapshot<K>> {
        self.apply(|state| state.report_problem()).await
    }

    pub async fn add_problem(&self, description: &str) -> Result<SessionSnapshot<K>> {
        self.apply(|state| state.add_problem(description, Utc::now()))
            .await
    }

    pub async fn delete_problem(&self, index: usize) -> Result<SessionSnapshot<K>> {
        self.apply(|state| state.delete_problem(index)).await
    }

    pub async fn back_from_problems(&self) -> Result<SessionSnapshot<K>> {
        self.apply(|state| state.back_from_problems()).await
    }

    pub async fn input_key(&self, key: char) -> Result<SessionSnapshot<K>> {
        self.apply(|state| Ok(state.input_key(key))).await
    }

    pub async fn backspace(&self) -> Result<SessionSnapshot<K>> {
        self.apply(|state| Ok(state.backspace())).await
    }

    pub async fn clear_input(&self) -> Result<SessionSnapshot<K>> {
        self.apply(|state| Ok(state.clear_input())).await
    }

    pub async fn submit(&self) -> Result<SessionSnapshot<K>> {
        self.apply(|state| state.submit()).await
    }

    pub async fn delete_stored_value(&self) -> Result<SessionSnapshot<K>> {
        self.apply(|state| state.delete_stored_value()).await
    }

    pub async fn move_cursor(
        &self,
        movement: <K::Cursor as PositionCursor>::Move,
    ) -> Result<SessionSnapshot<K>> {
        self.apply(|state| {
            state.move_cursor(movement).map_err(|err| {
                warn!("Rejected {} cursor move: {err}", K::NAMESPACE);
                err
            })
        })
        .await
    }

    pub async fn toggle_value_type(&self) -> Result<SessionSnapshot<K>> {
        self.apply(|state| Ok(state.toggle_value_type())).await
    }

    pub async fn set_value_type(&self, value_type: ValueType) -> Result<SessionSnapshot<K>> {
        self.apply(|state| Ok(state.set_value_type(value_type))).await
    }

    /// What durable storage currently holds, independent of memory.
    pub async fn persisted(&self) -> Result<PersistedSession<K>> {
        Ok(PersistedSession {
            parameters: self
                .store
                .load(Slice::Parameters, SessionParameters::default())
                .await?,
            values: self.store.load(Slice::Values, K::Values::default()).await?,
            problems: self.store.load(Slice::Problems, Vec::new()).await?,
        })
    }

    /// Exports the stored session as CSV. With `clear_after` the stored
    /// slices are wiped and the session restarts on the parameters view;
    /// otherwise recording continues untouched.
    pub async fn finish(&self, clear_after: bool) -> Result<FinishOutcome> {
        self.finish_with(clear_after, |_| Ok(())).await
    }

    /// Like [`finish`](Self::finish), but the CSV is written under
    /// `directory` before anything is cleared. A failed write leaves the
    /// session untouched.
    pub async fn finish_to(
        &self,
        directory: &Path,
        clear_after: bool,
    ) -> Result<(PathBuf, FinishOutcome)> {
        let mut saved = None;
        let outcome = self
            .finish_with(clear_after, |outcome| {
                saved = Some(save_export(directory, outcome)?);
                Ok(())
            })
            .await?;
        let path = saved.context("export was not written")?;
        Ok((path, outcome))
    }

    /// Builds the export, hands it to `deliver`, logs it, and only then
    /// clears. Any failure before the clear leaves storage and memory as
    /// they were.
    async fn finish_with<F>(&self, clear_after: bool, deliver: F) -> Result<FinishOutcome>
    where
        F: FnOnce(&FinishOutcome) -> Result<()>,
    {
        let mut state = self.state.lock().await;
        state.can_finish()?;

        let persisted = self.persisted().await?;
        let exported_at = Utc::now();
        let table = ExportTable::build(&persisted, exported_at);
        let outcome = FinishOutcome {
            file_name: table.file_name(K::NAMESPACE),
            csv: table.to_csv()?,
            data_rows: table.data_row_count(),
            cleared: clear_after,
        };

        deliver(&outcome)?;

        self.store
            .database()
            .insert_export_record(
                K::NAMESPACE,
                &outcome.file_name,
                outcome.data_rows as u32,
                clear_after,
                exported_at,
            )
            .await?;

        if clear_after {
            self.store.clear().await?;
            state.reset();
        }

        info!(
            "Finished {} session: exported {} ({} rows, cleared: {clear_after})",
            K::NAMESPACE,
            outcome.file_name,
            outcome.data_rows
        );

        let snapshot = SessionSnapshot::capture(&*state);
        drop(state);
        self.notify(&snapshot);

        Ok(outcome)
    }

    pub async fn export_history(&self, limit: u32) -> Result<Vec<ExportRecord>> {
        self.store
            .database()
            .list_export_records(K::NAMESPACE, limit)
            .await
    }
}

/// Writes a finished export under `directory`, returning the full path.
pub fn save_export(directory: &Path, outcome: &FinishOutcome) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create export directory {}", directory.display()))?;
    let path = directory.join(&outcome.file_name);
    std::fs::write(&path, &outcome.csv)
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    info!("Saved export to {}", path.display());
    Ok(path)
}
