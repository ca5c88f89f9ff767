//! Minimum spacing between requests made by one adapter.

use std::time::Duration;

use jobpacker_core::SourceError;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::adapter::FetchContext;

/// Spaces consecutive requests at least `min_interval` apart, ±25% jitter.
///
/// Each adapter owns its own pacer, so one board's pacing never delays
/// another board.
#[derive(Debug)]
pub(crate) struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub(crate) fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the next request may go out, then claim the slot.
    ///
    /// Fails with `Timeout` when the wait would overrun the fetch deadline,
    /// and with `Transient` when the harvest is cancelled while waiting.
    pub(crate) async fn wait(&self, ctx: &FetchContext) -> Result<(), SourceError> {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + jittered(self.min_interval);
            if ready_at > ctx.deadline() {
                return Err(SourceError::timeout(
                    "request pacing would exceed the fetch deadline",
                ));
            }
            tokio::select! {
                biased;
                () = ctx.cancelled() => return Err(SourceError::transient("cancelled while pacing")),
                () = tokio::time::sleep_until(ready_at) => {}
            }
        }
        *last = Some(Instant::now());
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn jittered(base: Duration) -> Duration {
    if base.is_zero() {
        return base;
    }
    let ms = base.as_millis() as f64 * (rand::random::<f64>() * 0.5 + 0.75);
    Duration::from_millis(ms as u64)
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;

    #[test]
    fn jitter_stays_within_a_quarter_of_base() {
        let base = Duration::from_millis(1000);
        for _ in 0..100 {
            let d = jittered(base);
            assert!(d >= Duration::from_millis(750) && d <= Duration::from_millis(1250), "{d:?}");
        }
        assert_eq!(jittered(Duration::ZERO), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn second_request_waits_for_interval() {
        let pacer = RequestPacer::new(Duration::from_millis(400));
        let ctx = FetchContext::new(Instant::now() + Duration::from_secs(10), CancellationToken::new());

        let start = Instant::now();
        pacer.wait(&ctx).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);

        pacer.wait(&ctx).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_past_deadline_is_a_timeout() {
        let pacer = RequestPacer::new(Duration::from_secs(5));
        let ctx = FetchContext::new(Instant::now() + Duration::from_secs(1), CancellationToken::new());
        pacer.wait(&ctx).await.unwrap();
        let err = pacer.wait(&ctx).await.unwrap_err();
        assert_eq!(err.kind, jobpacker_core::SourceErrorKind::Timeout);
    }
}
