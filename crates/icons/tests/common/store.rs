//! In-memory object store that counts calls and can inject failures.

use async_trait::async_trait;
use bytes::Bytes;
use presence_storage::{ObjectStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Default)]
pub struct CountingStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    puts: AtomicUsize,
    probes: AtomicUsize,
    fail_puts: AtomicBool,
    fail_next_probes: AtomicUsize,
    discard_writes: AtomicBool,
    put_delay_ms: AtomicU64,
}

#[allow(dead_code)]
impl CountingStore {
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Remove an object behind the resolver's back.
    pub fn remove_out_of_band(&self, key: &str) -> bool {
        self.objects.lock().unwrap().remove(key).is_some()
    }

    /// Place an object without counting a put.
    pub fn seed(&self, key: &str, data: &[u8]) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data: Bytes::copy_from_slice(data),
                content_type: "image/png".to_string(),
            },
        );
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_next_probes(&self, n: usize) {
        self.fail_next_probes.store(n, Ordering::SeqCst);
    }

    /// Acknowledge puts without storing anything.
    pub fn discard_writes(&self, discard: bool) {
        self.discard_writes.store(discard, Ordering::SeqCst);
    }

    pub fn put_delay(&self, delay: Duration) {
        self.put_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for CountingStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .fail_next_probes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StorageError::S3("probe refused: AccessDenied".into()));
        }
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.object(key)
            .map(|o| o.data)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);

        let delay = self.put_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::S3("put refused: AccessDenied".into()));
        }
        if self.discard_writes.load(Ordering::SeqCst) {
            return Ok(());
        }

        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.remove_out_of_band(key) {
            Ok(())
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    fn backend_name(&self) -> &'static str {
        "counting-memory"
    }
}
