//! Cancellable fetches
//!
//! A screen hands its token to the fetch it starts and cancels the token on
//! teardown. A cancelled fetch resolves to `None` and must not touch state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Identifies one fetch issued by one screen mount
#[derive(Debug, Clone)]
pub struct FetchSession {
    id: u64,
    token: CancellationToken,
}

impl FetchSession {
    pub fn new() -> Self {
        Self {
            id: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True while results for `id` may still be applied
    pub fn accepts(&self, id: u64) -> bool {
        self.id == id && !self.token.is_cancelled()
    }
}

impl Default for FetchSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `fut` unless `token` is cancelled first. The token is checked again
/// after the future resolves, so a late cancellation also yields `None`.
pub async fn until_cancelled<F>(token: CancellationToken, fut: F) -> Option<F::Output>
where
    F: Future,
{
    let output = tokio::select! {
        biased;
        _ = token.cancelled() => return None,
        output = fut => output,
    };

    if token.is_cancelled() {
        None
    } else {
        Some(output)
    }
}
