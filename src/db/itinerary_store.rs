//! Itinerary persistence
//!
//! Records are append-only. Generation never reads them back; the list and
//! get endpoints exist for the planner's "saved trips" page.

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use bson::{doc, Document};
use mongodb::{options::ReturnDocument, Client, Collection};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::models::itinerary::{NewItinerary, StoredItinerary};

const ITINERARIES_COLLECTION: &str = "Itineraries";
const COUNTERS_COLLECTION: &str = "Counters";
const ITINERARY_COUNTER: &str = "itineraries";

#[async_trait]
pub trait ItineraryStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Persist a generated itinerary and assign it the next integer id.
    async fn create(&self, new: NewItinerary) -> Result<StoredItinerary, StoreError>;

    /// Newest first, optionally only one owner's records.
    async fn list(&self, owner_id: Option<i64>) -> Result<Vec<StoredItinerary>, StoreError>;

    async fn get(&self, id: i64) -> Result<StoredItinerary, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    records: BTreeMap<i64, StoredItinerary>,
}

/// Process-local store used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryItineraryStore {
    state: RwLock<MemoryState>,
}

impl MemoryItineraryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItineraryStore for MemoryItineraryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, new: NewItinerary) -> Result<StoredItinerary, StoreError> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let record = StoredItinerary::from_new(state.next_id, new, Utc::now());
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self, owner_id: Option<i64>) -> Result<Vec<StoredItinerary>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .records
            .values()
            .rev()
            .filter(|r| owner_id.map_or(true, |owner| r.user_id == Some(owner)))
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<StoredItinerary, StoreError> {
        self.state
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct MongoItineraryStore {
    client: Arc<Client>,
    database: String,
}

impl MongoItineraryStore {
    pub fn new(client: Arc<Client>, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    fn itineraries(&self) -> Collection<StoredItinerary> {
        self.client
            .database(&self.database)
            .collection(ITINERARIES_COLLECTION)
    }

    /// Atomically bump the counter document; upserted on first use.
    async fn next_id(&self) -> Result<i64, StoreError> {
        let counters: Collection<Document> = self
            .client
            .database(&self.database)
            .collection(COUNTERS_COLLECTION);
        let counter = counters
            .find_one_and_update(
                doc! { "_id": ITINERARY_COUNTER },
                doc! { "$inc": { "seq": 1_i64 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(StoreError::IdAllocation)?;
        counter.get_i64("seq").map_err(|_| StoreError::IdAllocation)
    }
}

#[async_trait]
impl ItineraryStore for MongoItineraryStore {
    fn name(&self) -> &'static str {
        "mongodb"
    }

    async fn create(&self, new: NewItinerary) -> Result<StoredItinerary, StoreError> {
        let id = self.next_id().await?;
        let record = StoredItinerary::from_new(id, new, Utc::now());
        self.itineraries().insert_one(&record).await?;
        log::info!("Saved itinerary {} for {}", record.id, record.destination);
        Ok(record)
    }

    async fn list(&self, owner_id: Option<i64>) -> Result<Vec<StoredItinerary>, StoreError> {
        let cursor = self
            .itineraries()
            .find(owner_filter(owner_id))
            .sort(doc! { "id": -1 })
            .await?;
        let records: Vec<StoredItinerary> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn get(&self, id: i64) -> Result<StoredItinerary, StoreError> {
        self.itineraries()
            .find_one(doc! { "id": id })
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

fn owner_filter(owner_id: Option<i64>) -> Document {
    match owner_id {
        Some(owner) => doc! { "userId": owner },
        None => doc! {},
    }
}
