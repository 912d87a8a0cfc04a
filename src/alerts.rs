use std::sync::Arc;

use tokio::sync::Mutex;

/// Admin-curated list of origin states that trigger a direct admin copy of a
/// listing. Ordered, duplicates allowed, case preserved as entered; matching
/// is case-insensitive. Never persisted, so every restart begins empty.
#[derive(Clone, Default)]
pub struct AlertFilter {
    entries: Arc<Mutex<Vec<String>>>,
}

impl AlertFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return the resulting list.
    pub async fn add(&self, state: &str) -> Vec<String> {
        let mut entries = self.entries.lock().await;
        entries.push(state.to_string());
        entries.clone()
    }

    /// Remove every entry exactly equal to `state` (case-sensitive) and
    /// return the resulting list.
    pub async fn remove(&self, state: &str) -> Vec<String> {
        let mut entries = self.entries.lock().await;
        entries.retain(|entry| entry != state);
        entries.clone()
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.entries.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of entries matching `state` case-insensitively. One alert is
    /// sent per matching entry, so a duplicated entry alerts twice.
    pub async fn matches(&self, state: &str) -> usize {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|entry| entry.eq_ignore_ascii_case(state))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_then_show_contains_entry() {
        let filter = AlertFilter::new();
        filter.add("texas").await;
        assert_eq!(filter.snapshot().await, vec!["texas".to_string()]);
    }

    #[tokio::test]
    async fn del_removes_all_exact_matches() {
        let filter = AlertFilter::new();
        filter.add("texas").await;
        filter.add("ohio").await;
        filter.add("texas").await;

        let remaining = filter.remove("texas").await;
        assert_eq!(remaining, vec!["ohio".to_string()]);
    }

    #[tokio::test]
    async fn del_is_case_sensitive() {
        let filter = AlertFilter::new();
        filter.add("Texas").await;

        let remaining = filter.remove("texas").await;
        assert_eq!(remaining, vec!["Texas".to_string()]);
    }

    #[tokio::test]
    async fn matching_is_case_insensitive() {
        let filter = AlertFilter::new();
        filter.add("texas").await;
        assert_eq!(filter.matches("Texas").await, 1);
        assert_eq!(filter.matches("TEXAS").await, 1);
        assert_eq!(filter.matches("Ohio").await, 0);
    }

    #[tokio::test]
    async fn duplicate_entries_match_twice() {
        let filter = AlertFilter::new();
        filter.add("texas").await;
        filter.add("Texas").await;
        assert_eq!(filter.matches("TEXAS").await, 2);
    }

    #[tokio::test]
    async fn clear_empties_the_list() {
        let filter = AlertFilter::new();
        filter.add("texas").await;
        filter.clear().await;
        assert!(filter.snapshot().await.is_empty());
    }
}
