use std::collections::HashMap;

use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::api::{ApiError, PetApi};
use crate::models::{CareEvent, NewCare, NewPet, Pet};

/// Identifier of one logical query result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Pets { limit: u32, offset: u32 },
    Cares { pet_id: i64 },
}

/// The finite set of invalidation patterns mutations may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationTarget {
    /// Every pets page, whatever its limit/offset.
    Pets,
    /// The care list of a single pet.
    CaresFor(i64),
}

impl InvalidationTarget {
    fn matches(&self, key: &CacheKey) -> bool {
        match (self, key) {
            (InvalidationTarget::Pets, CacheKey::Pets { .. }) => true,
            (InvalidationTarget::CaresFor(id), CacheKey::Cares { pet_id }) => id == pet_id,
            _ => false,
        }
    }
}

/// Payload of one cache entry.
#[derive(Debug, Clone)]
pub enum ResourceValue {
    Pets(Vec<Pet>),
    Cares(Vec<CareEvent>),
}

type FetchOutcome = Option<Result<ResourceValue, ApiError>>;

/// Per-key state: Empty (absent) -> Loading -> Ready, with a stale
/// Ready/Loading entry refetched on the next read, and Failed retried
/// on the next read.
enum Entry {
    /// A fetch is in flight; waiters share the watch channel with the
    /// reader driving it.
    Loading { rx: watch::Receiver<FetchOutcome>, stale: bool },
    Ready { value: ResourceValue, stale: bool },
    Failed(ApiError),
}

/// Read-through cache over a `PetApi`.
///
/// Owned, explicit state: the application holds one instance (behind an
/// `Arc`) for its whole lifetime. Reads of the same key collapse onto a
/// single in-flight request; mutations invalidate only their named
/// target, and only after the external call succeeded.
pub struct ResourceCache<A> {
    api: A,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl<A: PetApi> ResourceCache<A> {
    pub fn new(api: A) -> Self {
        Self { api, entries: Mutex::new(HashMap::new()) }
    }

    /// Read one logical query, fetching at most once however many
    /// readers ask for the same key concurrently.
    ///
    /// The first reader of an absent/stale/failed entry drives the
    /// fetch; the rest await the shared outcome. If the driving reader
    /// is dropped mid-flight, a waiter observes the closed channel and
    /// takes over, so an abandoned read never wedges the entry.
    pub async fn read(&self, key: CacheKey) -> Result<ResourceValue, ApiError> {
        loop {
            enum Role {
                Wait(watch::Receiver<FetchOutcome>),
                Fetch(watch::Sender<FetchOutcome>),
            }

            let role = {
                let mut entries = self.entries.lock().await;
                match entries.get(&key) {
                    Some(Entry::Ready { value, stale: false }) => return Ok(value.clone()),
                    // Live in-flight fetch: join it. A closed channel
                    // means the driving reader was dropped.
                    Some(Entry::Loading { rx, .. }) if rx.has_changed().is_ok() => {
                        Role::Wait(rx.clone())
                    }
                    other => {
                        // Absent, stale, failed, or abandoned: lead a
                        // new fetch, keeping a mid-flight invalidation.
                        let stale = matches!(other, Some(Entry::Loading { stale: true, .. }));
                        if let Some(Entry::Failed(error)) = other {
                            debug!(?key, error = %error, "retrying entry that failed earlier");
                        }
                        let (tx, rx) = watch::channel(None);
                        entries.insert(key.clone(), Entry::Loading { rx, stale });
                        Role::Fetch(tx)
                    }
                }
            };

            match role {
                Role::Wait(mut rx) => {
                    while rx.changed().await.is_ok() {
                        if let Some(result) = rx.borrow_and_update().clone() {
                            return result;
                        }
                    }
                    // The driving reader vanished without an outcome;
                    // start over (and possibly take the lead).
                }
                Role::Fetch(tx) => {
                    let result = self.fetch(&key).await;
                    {
                        let mut entries = self.entries.lock().await;
                        let stale =
                            matches!(entries.get(&key), Some(Entry::Loading { stale: true, .. }));
                        let entry = match &result {
                            Ok(value) => Entry::Ready { value: value.clone(), stale },
                            Err(error) => Entry::Failed(error.clone()),
                        };
                        entries.insert(key.clone(), entry);
                    }
                    let _ = tx.send(Some(result.clone()));
                    return result;
                }
            }
        }
    }

    /// Single attempt against the external API, dispatched on key kind.
    async fn fetch(&self, key: &CacheKey) -> Result<ResourceValue, ApiError> {
        match key {
            CacheKey::Pets { limit, offset } => {
                self.api.list_pets(*limit, *offset).await.map(ResourceValue::Pets)
            }
            CacheKey::Cares { pet_id } => {
                self.api.list_cares(*pet_id).await.map(ResourceValue::Cares)
            }
        }
    }

    /// Cached pets page.
    pub async fn pets(&self, limit: u32, offset: u32) -> Result<Vec<Pet>, ApiError> {
        match self.read(CacheKey::Pets { limit, offset }).await? {
            ResourceValue::Pets(pets) => Ok(pets),
            ResourceValue::Cares(_) => unreachable!("pets key resolves to pets"),
        }
    }

    /// Cached care list of one pet.
    pub async fn cares(&self, pet_id: i64) -> Result<Vec<CareEvent>, ApiError> {
        match self.read(CacheKey::Cares { pet_id }).await? {
            ResourceValue::Cares(cares) => Ok(cares),
            ResourceValue::Pets(_) => unreachable!("cares key resolves to cares"),
        }
    }

    /// Mark entries matching `target` stale so their next read
    /// refetches. An entry invalidated while loading stays stale once
    /// its in-flight result lands.
    pub async fn invalidate(&self, target: InvalidationTarget) {
        let mut entries = self.entries.lock().await;
        for (key, entry) in entries.iter_mut() {
            if !target.matches(key) {
                continue;
            }
            match entry {
                Entry::Ready { stale, .. } | Entry::Loading { stale, .. } => *stale = true,
                Entry::Failed(_) => {}
            }
            debug!(?key, ?target, "invalidated");
        }
    }

    /// Create a pet, then invalidate every pets page.
    /// On failure nothing is invalidated: prior cached data stays valid.
    pub async fn create_pet_and_refresh(&self, pet: &NewPet) -> Result<Pet, ApiError> {
        let created = self.api.create_pet(pet).await?;
        self.invalidate(InvalidationTarget::Pets).await;
        Ok(created)
    }

    /// Delete a pet, then invalidate every pets page.
    pub async fn delete_pet_and_refresh(&self, id: i64) -> Result<(), ApiError> {
        self.api.delete_pet(id).await?;
        self.invalidate(InvalidationTarget::Pets).await;
        Ok(())
    }

    /// Create a care event, then invalidate the owning pet's care list.
    pub async fn create_care_and_refresh(
        &self,
        pet_id: i64,
        care: &NewCare,
    ) -> Result<CareEvent, ApiError> {
        let created = self.api.create_care(pet_id, care).await?;
        self.invalidate(InvalidationTarget::CaresFor(pet_id)).await;
        Ok(created)
    }

    /// Delete a care event, then invalidate the owning pet's care list.
    /// The delete endpoint is keyed by care id alone, so the owning pet
    /// is passed separately for invalidation.
    pub async fn delete_care_and_refresh(&self, pet_id: i64, care_id: i64) -> Result<(), ApiError> {
        self.api.delete_care(care_id).await?;
        self.invalidate(InvalidationTarget::CaresFor(pet_id)).await;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    use crate::models::{CareKind, Sex, Species};

    fn sample_pet(id: i64, name: &str) -> Pet {
        Pet {
            id,
            name: name.to_string(),
            species: Species::Dog,
            breed: "Labrador".to_string(),
            birth_date: "2020-01-01".to_string(),
            sex: Sex::Male,
        }
    }

    fn sample_care(id: i64, pet_id: i64) -> CareEvent {
        CareEvent {
            id,
            kind: CareKind::Vaccination,
            description: "Refuerzo anual".to_string(),
            scheduled_at: "2025-06-16T08:00:00Z".to_string(),
            pet_id,
        }
    }

    #[derive(Default)]
    struct StubState {
        pets: StdMutex<Vec<Pet>>,
        cares: StdMutex<Vec<CareEvent>>,
        pet_fetches: AtomicUsize,
        care_fetches: AtomicUsize,
        fail_list_pets_once: AtomicBool,
        fail_create_pet: AtomicBool,
        list_delay: StdMutex<Option<Duration>>,
    }

    #[derive(Clone, Default)]
    struct StubApi {
        state: Arc<StubState>,
    }

    impl StubApi {
        fn with_pets(pets: Vec<Pet>) -> Self {
            let stub = Self::default();
            *stub.state.pets.lock().unwrap() = pets;
            stub
        }

        fn pet_fetches(&self) -> usize {
            self.state.pet_fetches.load(Ordering::SeqCst)
        }

        fn care_fetches(&self) -> usize {
            self.state.care_fetches.load(Ordering::SeqCst)
        }
    }

    impl PetApi for StubApi {
        async fn list_pets(&self, _limit: u32, _offset: u32) -> Result<Vec<Pet>, ApiError> {
            self.state.pet_fetches.fetch_add(1, Ordering::SeqCst);
            let delay = *self.state.list_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.state.fail_list_pets_once.swap(false, Ordering::SeqCst) {
                return Err(ApiError::Http { status: 500, message: "HTTP 500".to_string() });
            }
            Ok(self.state.pets.lock().unwrap().clone())
        }

        async fn create_pet(&self, pet: &NewPet) -> Result<Pet, ApiError> {
            if self.state.fail_create_pet.load(Ordering::SeqCst) {
                return Err(ApiError::Http {
                    status: 400,
                    message: "Datos inválidos".to_string(),
                });
            }
            let mut pets = self.state.pets.lock().unwrap();
            let id = pets.len() as i64 + 1;
            let created = Pet {
                id,
                name: pet.name.clone(),
                species: pet.species,
                breed: pet.breed.clone(),
                birth_date: pet.birth_date.clone(),
                sex: pet.sex,
            };
            pets.push(created.clone());
            Ok(created)
        }

        async fn delete_pet(&self, id: i64) -> Result<(), ApiError> {
            self.state.pets.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }

        async fn list_cares(&self, pet_id: i64) -> Result<Vec<CareEvent>, ApiError> {
            self.state.care_fetches.fetch_add(1, Ordering::SeqCst);
            let cares = self.state.cares.lock().unwrap();
            Ok(cares.iter().filter(|c| c.pet_id == pet_id).cloned().collect())
        }

        async fn create_care(&self, pet_id: i64, care: &NewCare) -> Result<CareEvent, ApiError> {
            let mut cares = self.state.cares.lock().unwrap();
            let created = CareEvent {
                id: cares.len() as i64 + 1,
                kind: care.kind,
                description: care.description.clone(),
                scheduled_at: care.scheduled_at.clone(),
                pet_id,
            };
            cares.push(created.clone());
            Ok(created)
        }

        async fn delete_care(&self, id: i64) -> Result<(), ApiError> {
            self.state.cares.lock().unwrap().retain(|c| c.id != id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_second_read_hits_cache() {
        let api = StubApi::with_pets(vec![sample_pet(1, "Rex")]);
        let cache = ResourceCache::new(api.clone());

        let first = cache.pets(50, 0).await.expect("first read failed");
        let second = cache.pets(50, 0).await.expect("second read failed");

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(api.pet_fetches(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_collapse_to_one_fetch() {
        let api = StubApi::with_pets(vec![sample_pet(1, "Rex")]);
        *api.state.list_delay.lock().unwrap() = Some(Duration::from_millis(20));
        let cache = ResourceCache::new(api.clone());

        let (a, b) = tokio::join!(cache.pets(50, 0), cache.pets(50, 0));

        assert_eq!(a.expect("read a failed").len(), 1);
        assert_eq!(b.expect("read b failed").len(), 1);
        assert_eq!(api.pet_fetches(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_separately() {
        let api = StubApi::with_pets(vec![sample_pet(1, "Rex")]);
        let cache = ResourceCache::new(api.clone());

        cache.pets(50, 0).await.expect("page one failed");
        cache.pets(50, 50).await.expect("page two failed");

        assert_eq!(api.pet_fetches(), 2);
    }

    #[tokio::test]
    async fn test_delete_pet_invalidates_pets_but_not_cares() {
        let api = StubApi::with_pets(vec![sample_pet(1, "Rex"), sample_pet(2, "Luna")]);
        *api.state.cares.lock().unwrap() = vec![sample_care(1, 2)];
        let cache = ResourceCache::new(api.clone());

        assert_eq!(cache.pets(50, 0).await.expect("pets read failed").len(), 2);
        assert_eq!(cache.cares(2).await.expect("cares read failed").len(), 1);

        cache.delete_pet_and_refresh(1).await.expect("delete failed");

        let pets = cache.pets(50, 0).await.expect("refetch failed");
        assert!(pets.iter().all(|p| p.id != 1));
        assert_eq!(api.pet_fetches(), 2);

        // The unrelated cares entry still serves from cache
        assert_eq!(cache.cares(2).await.expect("cares reread failed").len(), 1);
        assert_eq!(api.care_fetches(), 1);
    }

    #[tokio::test]
    async fn test_create_care_invalidates_only_that_pet() {
        let api = StubApi::default();
        *api.state.cares.lock().unwrap() = vec![sample_care(1, 1), sample_care(2, 2)];
        let cache = ResourceCache::new(api.clone());

        assert_eq!(cache.cares(1).await.expect("cares 1 failed").len(), 1);
        assert_eq!(cache.cares(2).await.expect("cares 2 failed").len(), 1);
        assert_eq!(api.care_fetches(), 2);

        let draft = NewCare {
            kind: CareKind::Bath,
            description: "Baño mensual".to_string(),
            scheduled_at: "2025-06-17T10:00:00.000Z".to_string(),
        };
        cache.create_care_and_refresh(1, &draft).await.expect("create care failed");

        assert_eq!(cache.cares(1).await.expect("cares 1 refetch failed").len(), 2);
        assert_eq!(cache.cares(2).await.expect("cares 2 reread failed").len(), 1);
        // Pet 1 refetched, pet 2 untouched
        assert_eq!(api.care_fetches(), 3);
    }

    #[tokio::test]
    async fn test_failed_mutation_preserves_cache() {
        let api = StubApi::with_pets(vec![sample_pet(1, "Rex")]);
        let cache = ResourceCache::new(api.clone());

        let before = cache.pets(50, 0).await.expect("initial read failed");

        api.state.fail_create_pet.store(true, Ordering::SeqCst);
        let draft = NewPet {
            name: "Coco".to_string(),
            species: Species::Rabbit,
            breed: "Enano".to_string(),
            birth_date: "2023-05-01".to_string(),
            sex: Sex::Male,
        };
        let err = cache.create_pet_and_refresh(&draft).await.expect_err("create should fail");
        assert_eq!(err.to_string(), "Datos inválidos");

        // No invalidation: the prior entry still serves without a fetch
        let after = cache.pets(50, 0).await.expect("reread failed");
        assert_eq!(after.len(), before.len());
        assert_eq!(api.pet_fetches(), 1);
    }

    #[tokio::test]
    async fn test_failed_read_retries_on_next_read() {
        let api = StubApi::with_pets(vec![sample_pet(1, "Rex")]);
        api.state.fail_list_pets_once.store(true, Ordering::SeqCst);
        let cache = ResourceCache::new(api.clone());

        let err = cache.pets(50, 0).await.expect_err("first read should fail");
        assert_eq!(err, ApiError::Http { status: 500, message: "HTTP 500".to_string() });

        let pets = cache.pets(50, 0).await.expect("retry failed");
        assert_eq!(pets.len(), 1);
        assert_eq!(api.pet_fetches(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_read_does_not_wedge_the_entry() {
        let api = StubApi::with_pets(vec![sample_pet(1, "Rex")]);
        *api.state.list_delay.lock().unwrap() = Some(Duration::from_millis(50));
        let cache = ResourceCache::new(api.clone());

        // Drop the driving read mid-fetch
        let abandoned =
            tokio::time::timeout(Duration::from_millis(5), cache.pets(50, 0)).await;
        assert!(abandoned.is_err());

        // A later read takes over and completes
        *api.state.list_delay.lock().unwrap() = None;
        let pets = cache.pets(50, 0).await.expect("takeover read failed");
        assert_eq!(pets.len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_while_loading_stays_stale() {
        let api = StubApi::with_pets(vec![sample_pet(1, "Rex")]);
        *api.state.list_delay.lock().unwrap() = Some(Duration::from_millis(20));
        let cache = Arc::new(ResourceCache::new(api.clone()));

        let reader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.pets(50, 0).await })
        };
        // Wait until the reader's fetch is in flight, then invalidate
        while api.pet_fetches() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        cache.invalidate(InvalidationTarget::Pets).await;

        reader.await.expect("reader panicked").expect("read failed");
        assert_eq!(api.pet_fetches(), 1);

        // The landed entry carries the staleness: next read refetches
        *api.state.list_delay.lock().unwrap() = None;
        cache.pets(50, 0).await.expect("refetch failed");
        assert_eq!(api.pet_fetches(), 2);
    }
}
