//! Cooperative cancellation shared between the caller and pipeline stages.
//!
//! Every stage checks the token at entry. The only stage that suspends is the
//! Markdown conversion, which races its worker against
//! [`CancelToken::cancelled`].
use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use tokio::sync::Notify;

use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct Inner {
  cancelled: AtomicBool,
  notify:    Notify,
}

/// A cloneable cancellation signal.
///
/// Cloning is cheap; all clones observe the same state. Once cancelled, a
/// token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
  inner: Arc<Inner>,
}

impl CancelToken {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Signal cancellation and wake every task waiting in
  /// [`cancelled`](Self::cancelled).
  pub fn cancel(&self) {
    if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
      log::debug!("Cancellation requested");
    }
    self.inner.notify.notify_waiters();
  }

  #[must_use]
  pub fn is_cancelled(&self) -> bool {
    self.inner.cancelled.load(Ordering::SeqCst)
  }

  /// Return [`Error::Cancelled`] if the token has been cancelled.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Cancelled`] once [`cancel`](Self::cancel) was called.
  pub fn check(&self) -> Result<()> {
    if self.is_cancelled() {
      Err(Error::Cancelled)
    } else {
      Ok(())
    }
  }

  /// Resolve once the token is cancelled.
  pub async fn cancelled(&self) {
    loop {
      let notified = self.inner.notify.notified();
      tokio::pin!(notified);
      // Register before re-checking the flag so a concurrent `cancel` cannot
      // slip between the check and the await.
      notified.as_mut().enable();
      if self.is_cancelled() {
        return;
      }
      notified.await;
    }
  }

  /// Cancel this token after `timeout` elapses.
  ///
  /// Must be called from within a tokio runtime. The timer task holds a clone
  /// of the token and exits early if the token is cancelled first.
  pub fn cancel_after(&self, timeout: Duration) {
    let token = self.clone();
    tokio::spawn(async move {
      tokio::select! {
        () = token.cancelled() => {},
        () = tokio::time::sleep(timeout) => {
          log::debug!("Deadline of {timeout:?} exceeded");
          token.cancel();
        },
      }
    });
  }
}
