use crate::domain::ports::SessionStore;
use std::collections::HashMap;
use std::sync::Mutex;

/// Session flags held for the lifetime of one process run.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        // 鎖中毒時視為沒有資料
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_set_get_remove() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get("flag"), None);

        store.set("flag", "true");
        assert_eq!(store.get("flag").as_deref(), Some("true"));

        store.remove("flag");
        assert_eq!(store.get("flag"), None);
    }

    #[test]
    fn test_shared_across_threads() {
        let store = Arc::new(MemorySessionStore::new());
        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.set("hasSeenNewsletter", "true"))
        };
        writer.join().unwrap();
        assert_eq!(store.get("hasSeenNewsletter").as_deref(), Some("true"));
    }
}
