use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<i64, Arc<AsyncMutex<()>>>;

/// One async mutex per student id. Holding the guard serializes every
/// read-modify-write of that student's ledger; other students are unaffected.
/// Entries live only while someone holds or waits for them.
#[derive(Default)]
pub struct StudentLocks {
    locks: Mutex<LockMap>,
}

/// Exclusive access to one student. Dropping it releases the lock and forgets
/// the entry when nobody else is queued on it.
pub struct StudentGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    student_id: i64,
    registry: &'a StudentLocks,
}

impl StudentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, student_id: i64) -> StudentGuard<'_> {
        let lock = {
            let mut locks = self.map();
            locks
                .entry(student_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        StudentGuard {
            guard: Some(lock.lock_owned().await),
            student_id,
            registry: self,
        }
    }

    pub fn tracked(&self) -> usize {
        self.map().len()
    }

    fn map(&self) -> std::sync::MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for StudentGuard<'_> {
    fn drop(&mut self) {
        // New acquirers clone under the map lock, so the count is stable here.
        let mut locks = self.registry.map();
        drop(self.guard.take());
        if locks
            .get(&self.student_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.student_id);
        }
    }
}
