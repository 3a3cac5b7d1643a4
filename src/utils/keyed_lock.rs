use moka::{Entry, ops::compute::Op, sync::Cache};
use std::hash::Hash;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A key's mutex plus the number of holders and waiters referencing it.
#[derive(Default)]
struct Slot {
    mutex: Arc<Mutex<()>>,
    users: AtomicUsize,
}

type LockTable<K> = Cache<K, Arc<Slot>, ahash::RandomState>;

/// A table of async mutexes addressed by key.
///
/// Holders of the same key run one at a time, different keys never contend.
/// A key's entry lives exactly as long as someone holds or awaits it, so no entry
/// can disappear under a running critical section.
#[derive(Clone)]
pub struct KeyedLocks<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    table: LockTable<K>,
}

/// Exclusive access to one key of a [`KeyedLocks`].
pub struct KeyedLockGuard<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    // Field order matters: the mutex is released before the slot is given back.
    _guard: OwnedMutexGuard<()>,
    _ticket: Ticket<K>,
}

/// Registration of one user in a slot. Dropping it unregisters, also when the
/// `lock` future is cancelled while waiting.
struct Ticket<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    key: K,
    table: LockTable<K>,
}

impl<K> Drop for Ticket<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.table
            .entry(self.key.clone())
            .and_compute_with(|entry| match entry {
                Some(slot) if slot.value().users.fetch_sub(1, Ordering::AcqRel) == 1 => {
                    Op::Remove
                }
                _ => Op::Nop,
            });
    }
}

impl<K> KeyedLocks<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            table: Cache::builder().build_with_hasher(ahash::RandomState::new()),
        }
    }

    /// Waits for exclusive access to `key`. Access ends when the guard drops.
    pub async fn lock(&self, key: K) -> KeyedLockGuard<K> {
        let slot = self
            .table
            .entry(key.clone())
            .and_upsert_with(|existing| {
                let slot = existing.map_or_else(|| Arc::new(Slot::default()), Entry::into_value);
                slot.users.fetch_add(1, Ordering::AcqRel);
                slot
            })
            .into_value();
        let ticket = Ticket {
            key,
            table: self.table.clone(),
        };

        let guard = slot.mutex.clone().lock_owned().await;
        KeyedLockGuard {
            _guard: guard,
            _ticket: ticket,
        }
    }

    #[cfg(test)]
    fn is_tracked(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyedLocks::<i64>::new();
        let guard = locks.lock(1).await;

        let contender = locks.clone();
        let waiter = tokio::spawn(async move {
            let _g = contender.lock(1).await;
        });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn different_keys_do_not_contend() {
        let locks = KeyedLocks::<i64>::new();
        let _a = locks.lock(1).await;
        let _b = tokio::time::timeout(Duration::from_secs(1), locks.lock(2))
            .await
            .expect("lock for another key is free");
    }

    #[tokio::test]
    async fn entry_outlives_a_long_critical_section() {
        let locks = KeyedLocks::<i64>::new();
        let guard = locks.lock(7).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        locks.table.run_pending_tasks();
        assert!(locks.is_tracked(&7));

        let contender = locks.clone();
        let waiter = tokio::spawn(async move {
            let _g = contender.lock(7).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert!(!locks.is_tracked(&7));
    }

    #[tokio::test]
    async fn cancelled_waiter_releases_its_slot() {
        let locks = KeyedLocks::<i64>::new();
        let guard = locks.lock(3).await;

        let pending = tokio::time::timeout(Duration::from_millis(20), locks.lock(3)).await;
        assert!(pending.is_err());
        assert!(locks.is_tracked(&3));

        drop(guard);
        assert!(!locks.is_tracked(&3));
        let _again = locks.lock(3).await;
    }
}
