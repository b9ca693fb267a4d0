use std::{
    collections::HashMap,
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use log::debug;
use tokio_util::sync::CancellationToken;

use super::ApiError;

/// Handle for one issued request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: u64,
    token: CancellationToken,
}

impl RequestTicket {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Tracks the most recently issued request on one channel (a list view, a
/// lookup box). Issuing a new request cancels the previous one, and a result
/// that arrives after being superseded is discarded.
#[derive(Debug, Default)]
pub struct LatestRequest {
    issued: AtomicU64,
    current: Mutex<Option<RequestTicket>>,
}

impl LatestRequest {
    pub fn begin(&self) -> RequestTicket {
        let ticket = RequestTicket {
            generation: self.issued.fetch_add(1, Ordering::SeqCst) + 1,
            token: CancellationToken::new(),
        };

        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = current.replace(ticket.clone()) {
            debug!("Superseding request #{}", previous.generation);
            previous.token.cancel();
        }
        ticket
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        let current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        current
            .as_ref()
            .map(|latest| latest.generation == ticket.generation)
            .unwrap_or(false)
            && !ticket.is_cancelled()
    }

    /// Cancels whatever is in flight, e.g. when the owning view goes away.
    pub fn cancel(&self) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = current.take() {
            previous.token.cancel();
        }
    }

    /// Drives `request` under `ticket`, yielding `ApiError::Cancelled` if the
    /// ticket is cancelled first or was superseded by the time it finished.
    pub async fn guard<F, T>(&self, ticket: RequestTicket, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let result = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => Err(ApiError::Cancelled),
            result = request => result,
        };

        if self.is_current(&ticket) {
            result
        } else {
            Err(ApiError::Cancelled)
        }
    }

    pub async fn run<F, T>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let ticket = self.begin();
        self.guard(ticket, request).await
    }
}

/// Named request channels, created on first use.
#[derive(Debug, Default)]
pub struct RequestChannels {
    channels: Mutex<HashMap<String, Arc<LatestRequest>>>,
}

impl RequestChannels {
    pub fn channel(&self, name: &str) -> Arc<LatestRequest> {
        let mut channels = match self.channels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        channels.entry(name.to_string()).or_default().clone()
    }

    pub fn cancel(&self, name: &str) {
        let channel = {
            let channels = match self.channels.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            channels.get(name).cloned()
        };
        if let Some(channel) = channel {
            channel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_cancels_previous_ticket() {
        let latest = LatestRequest::default();
        let first = latest.begin();
        let second = latest.begin();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!latest.is_current(&first));
        assert!(latest.is_current(&second));
    }

    #[tokio::test]
    async fn superseded_ticket_never_yields_result() {
        let latest = LatestRequest::default();
        let first = latest.begin();
        let second = latest.begin();

        let stale = latest.guard(first, async { Ok::<_, ApiError>(1) }).await;
        assert!(matches!(stale, Err(ApiError::Cancelled)));

        let fresh = latest.guard(second, async { Ok::<_, ApiError>(2) }).await;
        assert_eq!(fresh.unwrap(), 2);
    }

    #[tokio::test]
    async fn result_arriving_after_supersession_is_discarded() {
        let latest = Arc::new(LatestRequest::default());
        let ticket = latest.begin();
        let inner = latest.clone();

        let result = latest
            .guard(ticket, async move {
                inner.begin();
                Ok::<_, ApiError>(5)
            })
            .await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn pending_request_is_aborted_on_cancel() {
        let latest = Arc::new(LatestRequest::default());
        let (_tx, rx) = tokio::sync::oneshot::channel::<u32>();

        let runner = latest.clone();
        let handle = tokio::spawn(async move {
            runner
                .run(async move { rx.await.map_err(|err| ApiError::Network(err.to_string())) })
                .await
        });

        while latest.issued.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        latest.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn failures_pass_through_untouched() {
        let latest = LatestRequest::default();
        let result = latest
            .run(async { Err::<u32, _>(ApiError::Network("connection refused".into())) })
            .await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }

    #[test]
    fn channels_are_independent() {
        let channels = RequestChannels::default();
        let machines = channels.channel("machines").begin();
        let batches = channels.channel("batches").begin();

        assert!(Arc::ptr_eq(&channels.channel("machines"), &channels.channel("machines")));

        channels.cancel("machines");
        assert!(machines.is_cancelled());
        assert!(!batches.is_cancelled());

        channels.cancel("unknown");
    }
}
