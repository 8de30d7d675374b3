use color_eyre::Result;
use color_eyre::eyre::eyre;
use tokio::sync::Semaphore;

/// Blocks a waiter until a fixed number of signals have been received.
///
/// Starts with zero permits; every [`signal`](Self::signal) adds one and
/// [`wait`](Self::wait) acquires all of them at once.
#[derive(Debug)]
pub struct CompletionBarrier {
    expected: u32,
    permits: Semaphore,
}

impl CompletionBarrier {
    pub fn new(expected: u32) -> Self {
        Self {
            expected,
            permits: Semaphore::new(0),
        }
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    /// Number of signals received and not yet consumed by `wait`.
    pub fn signalled(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn signal(&self) {
        self.permits.add_permits(1);
    }

    pub async fn wait(&self) -> Result<()> {
        let permits = self
            .permits
            .acquire_many(self.expected)
            .await
            .map_err(|e| eyre!("completion barrier closed: {e}"))?;
        permits.forget();
        Ok(())
    }
}
