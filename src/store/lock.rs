//! The single-writer serialisation primitive guarding every mutating
//! Entry Store operation.
//!
//! `tokio::sync::Mutex` documents FIFO wake order, which is the ordering
//! guarantee §5 relies on: mutating operations are totally ordered by
//! acquisition order. `search` never touches this lock.

use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct SerialisationMutex(Mutex<()>);

impl SerialisationMutex {
    pub fn new() -> Self {
        Self(Mutex::new(()))
    }

    /// Acquire the lock. The returned guard must be held for the entire
    /// read-modify-write span of the caller's operation; dropping it early
    /// releases the next waiter before the rewrite is durable.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn acquire_serialises_concurrent_holders() {
        let lock = Arc::new(SerialisationMutex::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..20 {
            let lock = lock.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = lock.acquire().await;
                let before = counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                assert_eq!(counter.load(Ordering::SeqCst), before + 1);
            }));
        }

        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }
}
