//! Per-key async locks
//!
//! Serializes the read-then-write sections of the lending workflow within
//! this process: code issuing per partition and availability flips per book.
//! Always take a partition lock before a book lock.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: String) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            // Entries only referenced by the map are neither held nor awaited
            map.retain(|_, m| Arc::strong_count(m) > 1);
            map.entry(key).or_default().clone()
        };
        mutex.lock_owned().await
    }

    /// Number of keys currently held or awaited
    pub fn len(&self) -> usize {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.values().filter(|m| Arc::strong_count(m) > 1).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn book_key(code: &str) -> String {
    format!("book:{}", code)
}

pub fn genre_key(genre: &str) -> String {
    format!("genre:{}", genre)
}

pub fn borrower_key(borrower: &str) -> String {
    format!("borrower:{}", borrower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let guard = locks.lock(book_key("LIB-FIC-0001")).await;

        let waiting = tokio::time::timeout(
            Duration::from_millis(50),
            locks.lock(book_key("LIB-FIC-0001")),
        )
        .await;
        assert!(waiting.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(
            Duration::from_millis(50),
            locks.lock(book_key("LIB-FIC-0001")),
        )
        .await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _book = locks.lock(book_key("LIB-FIC-0001")).await;
        let other = tokio::time::timeout(
            Duration::from_millis(50),
            locks.lock(borrower_key("alice")),
        )
        .await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn released_keys_are_pruned() {
        let locks = KeyedLocks::new();
        {
            let _a = locks.lock(genre_key("FIC")).await;
            let _b = locks.lock(genre_key("SCI")).await;
            assert_eq!(locks.len(), 2);
        }
        assert!(locks.is_empty());

        let _c = locks.lock(genre_key("HIS")).await;
        assert_eq!(locks.inner.lock().unwrap().len(), 1);
    }
}
