//! The current-weather snapshot store.
//!
//! Holds one canonical [`WeatherSnapshot`] plus fetch status. Every call to
//! [`WeatherSnapshotStore::fetch_weather`] issues exactly one request; there
//! are no automatic retries. Calls may overlap: each takes a sequence number
//! and, when stale-response discarding is on, a response that resolves after a
//! newer one has already been applied is dropped.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use skyatlas_core::EventBus;
use tokio::sync::broadcast;

use crate::error::WeatherError;
use crate::provider::WeatherSource;
use crate::types::WeatherSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// What a completed fetch did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The response was merged; carries the snapshot after the merge.
    Applied(WeatherSnapshot),
    /// A newer request had already resolved, so this response was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherEvent {
    StatusChanged(FetchStatus),
    SnapshotUpdated(WeatherSnapshot),
}

#[derive(Debug, Default)]
struct State {
    status: FetchStatus,
    snapshot: Option<WeatherSnapshot>,
    /// Last issued request number.
    issued: u64,
    /// Request number of the last response that changed the store.
    applied: u64,
}

/// Puts back the pre-request status when a fetch is dropped before its
/// response is handled, unless a newer request has taken over.
struct LoadingGuard<'a> {
    store: &'a WeatherSnapshotStore,
    seq: u64,
    previous: FetchStatus,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.store.state.lock();
        if state.issued != self.seq || state.status != FetchStatus::Loading {
            return;
        }
        state.status = std::mem::take(&mut self.previous);
        let status = state.status.clone();
        drop(state);

        tracing::debug!("Weather request {} dropped before completion", self.seq);
        self.store
            .events
            .publish(WeatherEvent::StatusChanged(status));
    }
}

pub struct WeatherSnapshotStore {
    source: Arc<dyn WeatherSource>,
    discard_stale: bool,
    state: Mutex<State>,
    events: EventBus<WeatherEvent>,
}

impl WeatherSnapshotStore {
    pub fn new(source: Arc<dyn WeatherSource>, discard_stale: bool) -> Self {
        Self {
            source,
            discard_stale,
            state: Mutex::new(State::default()),
            events: EventBus::default(),
        }
    }

    /// Fetch current weather for `city` and merge it into the snapshot.
    ///
    /// An empty name fails immediately without a request. On any failure the
    /// stored snapshot is left untouched and the status becomes `Failed`.
    /// Superseded responses, successful or not, come back as
    /// [`FetchOutcome::Stale`] when discarding is enabled. The name is sent to
    /// the provider exactly as given.
    ///
    /// Dropping the returned future mid-request restores the status it
    /// replaced, so an abandoned fetch never leaves the store `Loading`.
    pub async fn fetch_weather(&self, city: &str) -> Result<FetchOutcome, WeatherError> {
        let (seq, previous) = {
            let mut state = self.state.lock();
            state.issued += 1;
            let seq = state.issued;

            if city.trim().is_empty() {
                state.applied = seq;
                state.status = FetchStatus::Failed(WeatherError::EmptyCityName.to_string());
                let status = state.status.clone();
                drop(state);
                self.events.publish(WeatherEvent::StatusChanged(status));
                return Err(WeatherError::EmptyCityName);
            }

            let previous = std::mem::replace(&mut state.status, FetchStatus::Loading);
            (seq, previous)
        };
        self.events
            .publish(WeatherEvent::StatusChanged(FetchStatus::Loading));
        let mut guard = LoadingGuard {
            store: self,
            seq,
            previous,
            armed: true,
        };

        tracing::debug!("Fetching weather for {:?} (request {})", city, seq);
        let result = self.source.fetch_current(city).await;
        guard.armed = false;

        let mut state = self.state.lock();
        if self.discard_stale && seq < state.applied {
            tracing::debug!(
                "Discarding weather response {} for {:?}: request {} already applied",
                seq,
                city,
                state.applied
            );
            return Ok(FetchOutcome::Stale);
        }
        state.applied = seq;

        match result {
            Ok(update) => {
                let snapshot = match state.snapshot.as_mut() {
                    Some(existing) => {
                        existing.merge(update);
                        existing.clone()
                    }
                    None => {
                        state.snapshot = Some(update.clone());
                        update
                    }
                };
                state.status = FetchStatus::Ready;
                drop(state);

                tracing::info!("Weather updated for {:?}", city);
                self.events
                    .publish(WeatherEvent::SnapshotUpdated(snapshot.clone()));
                self.events
                    .publish(WeatherEvent::StatusChanged(FetchStatus::Ready));
                Ok(FetchOutcome::Applied(snapshot))
            }
            Err(e) => {
                state.status = FetchStatus::Failed(e.to_string());
                let status = state.status.clone();
                drop(state);

                tracing::warn!("Weather fetch for {:?} failed: {}", city, e);
                self.events.publish(WeatherEvent::StatusChanged(status));
                Err(e)
            }
        }
    }

    pub fn status(&self) -> FetchStatus {
        self.state.lock().status.clone()
    }

    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        self.state.lock().snapshot.clone()
    }

    /// Failure reason of the last applied fetch, if it failed.
    pub fn error(&self) -> Option<String> {
        match &self.state.lock().status {
            FetchStatus::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().status == FetchStatus::Loading
    }

    pub fn discards_stale_responses(&self) -> bool {
        self.discard_stale
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WeatherEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Notify;

    /// Answers per city, optionally holding a city's response until released.
    #[derive(Default)]
    struct TestSource {
        responses: HashMap<String, Result<WeatherSnapshot, WeatherError>>,
        gates: HashMap<String, Arc<Notify>>,
        calls: Mutex<Vec<String>>,
    }

    impl TestSource {
        fn respond(mut self, city: &str, result: Result<WeatherSnapshot, WeatherError>) -> Self {
            self.responses.insert(city.to_string(), result);
            self
        }

        fn gate(mut self, city: &str) -> (Self, Arc<Notify>) {
            let gate = Arc::new(Notify::new());
            self.gates.insert(city.to_string(), gate.clone());
            (self, gate)
        }
    }

    #[async_trait]
    impl WeatherSource for TestSource {
        async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
            self.calls.lock().push(city.to_string());
            if let Some(gate) = self.gates.get(city) {
                gate.notified().await;
            }
            self.responses
                .get(city)
                .cloned()
                .unwrap_or_else(|| Err(WeatherError::Parse("unscripted city".into())))
        }
    }

    fn snapshot(city: &str, temperature: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            city: Some(city.to_string()),
            temperature: Some(temperature),
            ..Default::default()
        }
    }

    fn city_not_found() -> WeatherError {
        WeatherError::Provider {
            code: 404,
            message: "city not found".into(),
        }
    }

    #[tokio::test]
    async fn test_starts_idle_and_empty() {
        let store = WeatherSnapshotStore::new(Arc::new(TestSource::default()), true);
        assert_eq!(store.status(), FetchStatus::Idle);
        assert!(store.snapshot().is_none());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let source = Arc::new(
            TestSource::default()
                .respond("Paris", Ok(snapshot("Paris", 15.0)))
                .respond("InvalidCity", Err(city_not_found())),
        );
        let store = WeatherSnapshotStore::new(source.clone(), true);

        let outcome = store.fetch_weather("Paris").await.unwrap();
        assert_eq!(outcome, FetchOutcome::Applied(snapshot("Paris", 15.0)));
        assert_eq!(store.status(), FetchStatus::Ready);

        let err = store.fetch_weather("InvalidCity").await.unwrap_err();
        assert_eq!(err, city_not_found());

        assert_eq!(store.status(), FetchStatus::Failed("city not found".into()));
        assert_eq!(store.error().as_deref(), Some("city not found"));
        let kept = store.snapshot().unwrap();
        assert_eq!(kept.temperature, Some(15.0));
        assert_eq!(kept.city.as_deref(), Some("Paris"));
        assert_eq!(source.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_name_fails_without_request() {
        let source = Arc::new(TestSource::default());
        let store = WeatherSnapshotStore::new(source.clone(), true);

        let err = store.fetch_weather("   ").await.unwrap_err();

        assert_eq!(err, WeatherError::EmptyCityName);
        assert_eq!(store.status(), FetchStatus::Failed("empty city name".into()));
        assert!(source.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_name_reaches_source_unchanged() {
        let source =
            Arc::new(TestSource::default().respond(" Paris ", Ok(snapshot("Paris", 15.0))));
        let store = WeatherSnapshotStore::new(source.clone(), true);

        store.fetch_weather(" Paris ").await.unwrap();

        assert_eq!(*source.calls.lock(), vec![" Paris "]);
        assert_eq!(store.status(), FetchStatus::Ready);
    }

    #[tokio::test]
    async fn test_dropped_fetch_restores_status() {
        let (source, _gate) = TestSource::default()
            .respond("Paris", Ok(snapshot("Paris", 15.0)))
            .gate("Rome");
        let store = WeatherSnapshotStore::new(Arc::new(source), true);
        store.fetch_weather("Paris").await.unwrap();
        let mut rx = store.subscribe();

        {
            let pending = store.fetch_weather("Rome");
            tokio::pin!(pending);
            let started = async {
                while !store.is_loading() {
                    tokio::task::yield_now().await;
                }
            };
            tokio::select! {
                _ = &mut pending => unreachable!("fetch is gated"),
                _ = started => {}
            }
        }

        assert_eq!(store.status(), FetchStatus::Ready);
        assert_eq!(store.snapshot().unwrap().city.as_deref(), Some("Paris"));
        assert_eq!(
            rx.recv().await.unwrap(),
            WeatherEvent::StatusChanged(FetchStatus::Loading)
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            WeatherEvent::StatusChanged(FetchStatus::Ready)
        );
    }

    #[tokio::test]
    async fn test_dropped_fetch_leaves_newer_request_loading() {
        let (source, _paris) = TestSource::default().gate("Paris");
        let (source, rome) = source
            .respond("Rome", Ok(snapshot("Rome", 22.0)))
            .gate("Rome");
        let store = WeatherSnapshotStore::new(Arc::new(source), true);

        let mut older = Box::pin(store.fetch_weather("Paris"));
        let mut newer = Box::pin(store.fetch_weather("Rome"));
        let started = async {
            while store.state.lock().issued < 2 {
                tokio::task::yield_now().await;
            }
        };
        tokio::select! {
            _ = &mut older => unreachable!("fetch is gated"),
            _ = &mut newer => unreachable!("fetch is gated"),
            _ = started => {}
        }

        drop(older);
        assert!(store.is_loading());

        rome.notify_one();
        assert!(matches!(newer.await.unwrap(), FetchOutcome::Applied(_)));
        assert_eq!(store.status(), FetchStatus::Ready);
    }

    #[tokio::test]
    async fn test_refetch_merges_present_fields_only() {
        let mut partial = WeatherSnapshot {
            temperature: Some(18.5),
            ..Default::default()
        };
        partial.humidity = Some(40.0);

        let mut first = snapshot("Paris", 15.0);
        first.country = Some("FR".into());

        let source = Arc::new(
            TestSource::default()
                .respond("Paris", Ok(first))
                .respond("Paris update", Ok(partial)),
        );
        let store = WeatherSnapshotStore::new(source, true);

        store.fetch_weather("Paris").await.unwrap();
        store.fetch_weather("Paris update").await.unwrap();

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.temperature, Some(18.5));
        assert_eq!(snap.humidity, Some(40.0));
        assert_eq!(snap.city.as_deref(), Some("Paris"));
        assert_eq!(snap.country.as_deref(), Some("FR"));
    }

    #[tokio::test]
    async fn test_loading_keeps_snapshot_visible() {
        let (source, gate) = TestSource::default()
            .respond("Paris", Ok(snapshot("Paris", 15.0)))
            .respond("Rome", Ok(snapshot("Rome", 22.0)))
            .gate("Rome");
        let store = WeatherSnapshotStore::new(Arc::new(source), true);
        store.fetch_weather("Paris").await.unwrap();

        let pending = store.fetch_weather("Rome");
        let observer = async {
            while !store.is_loading() {
                tokio::task::yield_now().await;
            }
            assert_eq!(store.snapshot().unwrap().city.as_deref(), Some("Paris"));
            assert!(store.error().is_none());
            gate.notify_one();
        };

        let (result, ()) = tokio::join!(pending, observer);
        assert!(matches!(result.unwrap(), FetchOutcome::Applied(_)));
        assert_eq!(store.snapshot().unwrap().city.as_deref(), Some("Rome"));
    }

    /// Issues Paris then Rome, lets Rome resolve first, then releases Paris.
    async fn race(discard_stale: bool) -> (FetchOutcome, FetchOutcome, WeatherSnapshotStore) {
        let (source, paris) = TestSource::default()
            .respond("Paris", Ok(snapshot("Paris", 15.0)))
            .respond("Rome", Ok(snapshot("Rome", 22.0)))
            .gate("Paris");
        let (source, rome) = source.gate("Rome");
        let store = WeatherSnapshotStore::new(Arc::new(source), discard_stale);

        let (older, newer) = {
            let older = store.fetch_weather("Paris");
            let newer = store.fetch_weather("Rome");
            let driver = async {
                rome.notify_one();
                while store.snapshot().and_then(|s| s.city).as_deref() != Some("Rome") {
                    tokio::task::yield_now().await;
                }
                paris.notify_one();
            };
            let (older, newer, ()) = tokio::join!(older, newer, driver);
            (older.unwrap(), newer.unwrap())
        };
        (older, newer, store)
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let (older, newer, store) = race(true).await;

        assert_eq!(older, FetchOutcome::Stale);
        assert!(matches!(newer, FetchOutcome::Applied(_)));
        assert_eq!(store.snapshot().unwrap().city.as_deref(), Some("Rome"));
        assert_eq!(store.status(), FetchStatus::Ready);
    }

    #[tokio::test]
    async fn test_last_resolved_wins_when_discarding_disabled() {
        let (older, _, store) = race(false).await;

        assert!(matches!(older, FetchOutcome::Applied(_)));
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.city.as_deref(), Some("Paris"));
        assert_eq!(snap.temperature, Some(15.0));
    }

    #[tokio::test]
    async fn test_events_follow_transitions() {
        let source =
            Arc::new(TestSource::default().respond("Paris", Ok(snapshot("Paris", 15.0))));
        let store = WeatherSnapshotStore::new(source, true);
        let mut rx = store.subscribe();

        store.fetch_weather("Paris").await.unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            WeatherEvent::StatusChanged(FetchStatus::Loading)
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            WeatherEvent::SnapshotUpdated(snapshot("Paris", 15.0))
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            WeatherEvent::StatusChanged(FetchStatus::Ready)
        );
    }
}
