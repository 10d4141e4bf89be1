//! Connectivity signal.
//!
//! The platform layer owns a `ConnectivityMonitor` and feeds it transitions;
//! the engine holds `ConnectivityHandle`s and folds the latest value into
//! every published `FeedState`. The flag is advisory. Fetches are attempted
//! regardless and their failures drive the offline fallback, so a wrong
//! guess here costs nothing but a label.

use tokio::sync::watch;

/// Source of truth for the connectivity flag.
pub struct ConnectivityMonitor {
  tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
  /// Start a monitor that assumes connectivity until told otherwise.
  pub fn new() -> Self {
    let (tx, _) = watch::channel(true);
    Self { tx }
  }

  /// Get a handle that always sees the latest reported state.
  pub fn handle(&self) -> ConnectivityHandle {
    ConnectivityHandle {
      rx: self.tx.subscribe(),
    }
  }

  /// Report a connectivity transition.
  pub fn set_connected(&self, connected: bool) {
    self.tx.send_replace(connected);
  }
}

impl Default for ConnectivityMonitor {
  fn default() -> Self {
    Self::new()
  }
}

/// Read side of the connectivity signal.
#[derive(Debug, Clone)]
pub struct ConnectivityHandle {
  rx: watch::Receiver<bool>,
}

impl ConnectivityHandle {
  pub fn is_offline(&self) -> bool {
    !*self.rx.borrow()
  }
}
