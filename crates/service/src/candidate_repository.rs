use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use regdesk_core::constants::CANDIDATES_KEY;
use regdesk_core::{Candidate, CandidatePatch, NewCandidate, decode_candidates, encode_candidates};
use regdesk_storage::KeyValueStore;

use crate::ServiceError;
use crate::subject::{Subject, Subscription};

/// Sole owner and writer of the candidate list.
///
/// Every mutation writes the whole list to the key-value store, then swaps
/// the in-memory snapshot and publishes it. Mutations are serialized, so
/// subscribers see snapshots in the order mutations were applied.
pub struct CandidateRepository {
    kv: Arc<dyn KeyValueStore>,
    list: Subject<Vec<Candidate>>,
    write_lock: Mutex<()>,
}

impl CandidateRepository {
    /// Loads the persisted list.
    ///
    /// A missing, unparsable or unreadable entry yields an empty list.
    #[must_use]
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let initial = read_list(kv.as_ref());
        tracing::debug!(count = initial.len(), "Candidate list loaded");
        Self { kv, list: Subject::new(initial), write_lock: Mutex::new(()) }
    }

    /// Snapshot of every candidate, most recently created first.
    pub fn list(&self) -> Vec<Candidate> {
        self.list.get()
    }

    /// Current list followed by one snapshot per successful mutation.
    pub fn subscribe(&self) -> Subscription<Vec<Candidate>> {
        self.list.subscribe()
    }

    /// In-memory lookup; never touches persistence.
    pub fn get_by_id(&self, id: &str) -> Option<Candidate> {
        self.list.get().into_iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.list.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores a new candidate with a fresh id and both timestamps set to now.
    pub fn create(&self, input: NewCandidate) -> Result<Candidate, ServiceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let candidate = Candidate::from_new(uuid::Uuid::new_v4().to_string(), input, Utc::now());
        let mut next = Vec::with_capacity(self.list.get().len() + 1);
        next.push(candidate.clone());
        next.extend(self.list.get());

        self.commit(next)?;
        tracing::info!(id = %candidate.id, "Candidate created");
        Ok(candidate)
    }

    /// Merges `patch` into the candidate with `id` and stamps `updated_at`.
    ///
    /// Returns `Ok(None)` for an unknown id; nothing is written or published.
    pub fn update(
        &self,
        id: &str,
        patch: CandidatePatch,
    ) -> Result<Option<Candidate>, ServiceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = self.list.get();
        let Some(target) = next.iter_mut().find(|c| c.id == id) else {
            tracing::debug!(id, "Update skipped, candidate not found");
            return Ok(None);
        };
        target.apply(patch, Utc::now());
        let updated = target.clone();

        self.commit(next)?;
        tracing::info!(id, "Candidate updated");
        Ok(Some(updated))
    }

    /// Deletes the candidate with `id`. Returns `true` if one was removed.
    pub fn remove(&self, id: &str) -> Result<bool, ServiceError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.list.get();
        let before = current.len();
        let next: Vec<Candidate> = current.into_iter().filter(|c| c.id != id).collect();
        if next.len() == before {
            return Ok(false);
        }

        self.commit(next)?;
        tracing::info!(id, "Candidate removed");
        Ok(true)
    }

    /// Persist first; the snapshot only changes once the write succeeded.
    fn commit(&self, next: Vec<Candidate>) -> Result<(), ServiceError> {
        let encoded = encode_candidates(&next)?;
        self.kv.set(CANDIDATES_KEY, &encoded)?;
        tracing::debug!(count = next.len(), bytes = encoded.len(), "Candidate list persisted");
        self.list.publish(next);
        Ok(())
    }
}

fn read_list(kv: &dyn KeyValueStore) -> Vec<Candidate> {
    let raw = match kv.get(CANDIDATES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read candidate list, starting empty");
            return Vec::new();
        },
    };
    decode_candidates(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored candidate list is corrupted, starting empty");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use regdesk_core::{CandidatePatch, is_valid_phone};
    use regdesk_storage::{KeyValueStore, MemoryKeyValueStore};

    use super::*;

    fn input(name: &str) -> NewCandidate {
        NewCandidate {
            name: name.to_owned(),
            email: "a@b.com".to_owned(),
            phone: "+40712345678".to_owned(),
            age: 30,
            country: "Romania".to_owned(),
            country_code: "RO".to_owned(),
            ..NewCandidate::default()
        }
    }

    fn repo() -> (CandidateRepository, Arc<MemoryKeyValueStore>) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        (CandidateRepository::load(kv.clone()), kv)
    }

    #[test]
    fn test_create_prepends_and_publishes() {
        let (repo, _kv) = repo();
        let mut sub = repo.subscribe();
        assert_eq!(sub.try_recv().map(|l| l.len()), Some(0));

        let first = repo.create(input("first")).unwrap();
        let second = repo.create(input("second")).unwrap();

        let emissions = sub.drain();
        assert_eq!(emissions.len(), 2);
        assert_eq!(emissions[0].len(), 1);
        assert_eq!(emissions[1].len(), 2);
        assert_eq!(emissions[1][0].id, second.id);
        assert_eq!(emissions[1][1].id, first.id);
    }

    #[test]
    fn test_ids_are_unique() {
        let (repo, _kv) = repo();
        let ids: HashSet<String> =
            (0..50).map(|i| repo.create(input(&format!("c{i}"))).unwrap().id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_scenario_record_fields() {
        let (repo, kv) = repo();
        let candidate = repo.create(input("ana maria")).unwrap();

        assert!(!candidate.id.is_empty());
        assert_eq!(candidate.updated_at, Some(candidate.created_at));
        assert!(is_valid_phone(&candidate.phone));
        assert_eq!(candidate.display_name(), "Ana Maria");

        let stored = decode_candidates(&kv.get(CANDIDATES_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, vec![candidate]);
    }

    #[test]
    fn test_update_unknown_id_leaves_store_untouched() {
        let (repo, kv) = repo();
        repo.create(input("only")).unwrap();
        let before = kv.get(CANDIDATES_KEY).unwrap();
        let mut sub = repo.subscribe();
        sub.drain();

        let result = repo
            .update("missing", CandidatePatch { age: Some(40), ..Default::default() })
            .unwrap();

        assert!(result.is_none());
        assert_eq!(kv.get(CANDIDATES_KEY).unwrap(), before);
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_update_merges_and_stamps() {
        let (repo, _kv) = repo();
        let created = repo.create(input("ana")).unwrap();

        let updated = repo
            .update(&created.id, CandidatePatch { age: Some(31), ..Default::default() })
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.age, 31);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(repo.get_by_id(&created.id), Some(updated));
    }

    #[test]
    fn test_remove_then_get_is_absent() {
        let (repo, _kv) = repo();
        let keep = repo.create(input("keep")).unwrap();
        let gone = repo.create(input("gone")).unwrap();

        assert!(repo.remove(&gone.id).unwrap());
        assert!(repo.get_by_id(&gone.id).is_none());
        assert!(repo.get_by_id(&keep.id).is_some());
        assert!(!repo.remove(&gone.id).unwrap());
    }

    #[test]
    fn test_list_is_a_copy() {
        let (repo, _kv) = repo();
        repo.create(input("a")).unwrap();

        let mut copy = repo.list();
        copy[0].name = "mutated".to_owned();
        copy.clear();

        assert_eq!(repo.list()[0].name, "a");
    }

    #[test]
    fn test_reload_restores_list() {
        let (repo, kv) = repo();
        let created = repo.create(input("persisted")).unwrap();
        drop(repo);

        let reloaded = CandidateRepository::load(kv);
        assert_eq!(reloaded.list(), vec![created]);
    }

    #[test]
    fn test_empty_or_corrupted_store_loads_empty() {
        let empty = CandidateRepository::load(Arc::new(MemoryKeyValueStore::new()));
        assert!(empty.is_empty());

        for garbage in ["{not json", "{}", "[{\"id\":1}]", ""] {
            let kv = Arc::new(MemoryKeyValueStore::with_entries([(CANDIDATES_KEY, garbage)]));
            let repo = CandidateRepository::load(kv);
            assert!(repo.list().is_empty(), "garbage {garbage:?} should load empty");
        }
    }
}
