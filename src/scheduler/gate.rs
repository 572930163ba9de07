use tokio::sync::watch;

/// Open/closed switch the worker must pass before every tick
#[derive(Debug)]
pub struct TickGate {
    tx: watch::Sender<bool>,
}

impl TickGate {
    /// A closed gate
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    pub fn close(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Wait until the gate is open. Returns false if the gate was dropped.
    pub async fn wait_open(rx: &mut watch::Receiver<bool>) -> bool {
        rx.wait_for(|open| *open).await.is_ok()
    }
}

impl Default for TickGate {
    fn default() -> Self {
        Self::new()
    }
}
