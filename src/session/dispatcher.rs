use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use super::error::ObserverError;
use crate::tracking::DerivedRecord;

/// Receives every record that passes the relevance gate, serialized as a
/// JSON array.
pub trait Observer: Send + Sync {
    fn notify(&self, record: &str) -> Result<(), ObserverError>;
}

impl<F> Observer for F
where
    F: Fn(&str) -> Result<(), ObserverError> + Send + Sync,
{
    fn notify(&self, record: &str) -> Result<(), ObserverError> {
        self(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Default)]
pub struct Dispatcher {
    observers: Vec<(SubscriptionId, Arc<dyn Observer>)>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.observers.iter().position(|(sub, _)| *sub == id) {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Calls observers in registration order. A failing observer is logged
    /// and skipped; the rest still receive the record. Returns how many
    /// observers accepted it.
    pub fn notify(&self, record: &DerivedRecord) -> usize {
        if self.observers.is_empty() {
            return 0;
        }
        let payload = record.to_json();
        let mut delivered = 0;
        for (id, observer) in &self.observers {
            match observer.notify(&payload) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    log::error!("An error occurred when notifying subscriber {:?}: {}", id, e)
                }
            }
        }
        delivered
    }
}

/// Keeps the most recently dispatched records in memory.
pub struct RecentRecords {
    capacity: usize,
    records: Mutex<VecDeque<String>>,
}

impl RecentRecords {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.iter().cloned().collect()
    }
}

impl Observer for RecentRecords {
    fn notify(&self, record: &str) -> Result<(), ObserverError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::HeroRelation;

    fn record(id: u32) -> DerivedRecord {
        DerivedRecord::new(
            id,
            None,
            HeroRelation {
                distance: 1.0,
                angle: Some(45.0),
            },
        )
    }

    fn collector() -> (Arc<Mutex<Vec<String>>>, Arc<dyn Observer>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer = move |record: &str| -> Result<(), ObserverError> {
            sink.lock().unwrap().push(record.to_string());
            Ok(())
        };
        (seen, Arc::new(observer))
    }

    #[test]
    fn notifies_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            dispatcher.subscribe(Arc::new(move |_: &str| -> Result<(), ObserverError> {
                order.lock().unwrap().push(tag);
                Ok(())
            }));
        }
        assert_eq!(dispatcher.notify(&record(1)), 3);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn failing_observer_does_not_starve_the_rest() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe(Arc::new(|_: &str| -> Result<(), ObserverError> {
            Err(ObserverError::Rejected("closed".into()))
        }));
        let (seen, observer) = collector();
        dispatcher.subscribe(observer);

        assert_eq!(dispatcher.notify(&record(2)), 1);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["[2,null,null,null,null,1.0,45.0]".to_string()]
        );
    }

    #[test]
    fn unsubscribe_removes_only_that_observer() {
        let mut dispatcher = Dispatcher::new();
        let (first_seen, first) = collector();
        let (second_seen, second) = collector();
        let first_id = dispatcher.subscribe(first);
        dispatcher.subscribe(second);

        assert!(dispatcher.unsubscribe(first_id));
        assert!(!dispatcher.unsubscribe(first_id));
        dispatcher.notify(&record(3));

        assert!(first_seen.lock().unwrap().is_empty());
        assert_eq!(second_seen.lock().unwrap().len(), 1);
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn recent_records_are_bounded() {
        let recent = RecentRecords::new(2);
        for id in 0..3 {
            recent.notify(&record(id).to_json()).unwrap();
        }
        let snapshot = recent.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].starts_with("[1,"));
    }
}
