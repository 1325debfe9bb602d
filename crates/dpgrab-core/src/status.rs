use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared "is the chat platform reachable" flag.
///
/// The Telegram adapter writes it; the liveness endpoint reads it.
#[derive(Clone, Debug, Default)]
pub struct ConnectionStatus {
    connected: Arc<AtomicBool>,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn set_connected(&self, connected: bool) {
        let previous = self.connected.swap(connected, Ordering::SeqCst);
        if previous != connected {
            tracing::info!(connected, "chat platform connectivity changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = ConnectionStatus::default();
        let b = a.clone();
        assert!(!b.is_connected());
        a.set_connected(true);
        assert!(b.is_connected());
        b.set_connected(false);
        assert!(!a.is_connected());
    }
}
