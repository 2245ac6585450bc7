use std::marker::PhantomData;

use serde_json::Value;

use crate::models::{new_id, Record};
use crate::storage::{Storage, StorageError};

/// Typed access to one storage slot. Records are addressed by id only.
#[derive(Clone)]
pub struct Repository<T> {
    storage: Storage,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Repository<T> {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            _record: PhantomData,
        }
    }

    /// Every stored record. A slot that cannot be loaded reads as empty.
    pub async fn all(&self) -> Vec<T> {
        let _guard = self.storage.lock().await;
        match self.load_locked().await {
            Ok(records) => records,
            Err(err) => {
                log::error!(target: "storage", "showing {} as empty: {err}", T::KEY);
                Vec::new()
            }
        }
    }

    /// Stores `record`, assigning an id first if it has none.
    pub async fn append(&self, mut record: T) -> Result<T, StorageError> {
        if record.id().is_empty() {
            record.set_id(new_id());
        }
        let _guard = self.storage.lock().await;
        let mut records = self.load_locked().await?;
        records.push(record.clone());
        self.save_locked(&records).await?;
        Ok(record)
    }

    /// Applies `change` to the record with `id` and persists the slot.
    /// Returns `Ok(None)` when no record has that id.
    pub async fn update<F>(&self, id: &str, change: F) -> Result<Option<T>, StorageError>
    where
        F: FnOnce(&mut T),
    {
        let _guard = self.storage.lock().await;
        let mut records = self.load_locked().await?;
        let Some(record) = records.iter_mut().find(|record| record.id() == id) else {
            return Ok(None);
        };
        change(record);
        let updated = record.clone();
        self.save_locked(&records).await?;
        Ok(Some(updated))
    }

    pub async fn remove(&self, id: &str) -> Result<Option<T>, StorageError> {
        let _guard = self.storage.lock().await;
        let mut records = self.load_locked().await?;
        let Some(position) = records.iter().position(|record| record.id() == id) else {
            return Ok(None);
        };
        let removed = records.remove(position);
        self.save_locked(&records).await?;
        Ok(Some(removed))
    }

    /// Decodes the slot. Rejected elements are quarantined and new ids saved
    /// before any record is returned.
    async fn load_locked(&self) -> Result<Vec<T>, StorageError> {
        let raw = self.storage.try_load(T::KEY).await?;
        let (records, rejected, migrated) = decode_all::<T>(raw);
        if migrated == 0 && rejected.is_empty() {
            return Ok(records);
        }

        if migrated > 0 {
            log::info!(
                target: "storage",
                "assigned ids to {migrated} record(s) in {}",
                T::KEY
            );
        }
        self.storage.reject(T::KEY, rejected).await?;
        self.save_locked(&records).await?;
        Ok(records)
    }

    async fn save_locked(&self, records: &[T]) -> Result<(), StorageError> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.storage.save(T::KEY, &values).await
    }
}

/// Splits raw slot elements into decoded records and rejects, assigning ids
/// to records stored without one. Returns the number of ids assigned.
fn decode_all<T: Record>(raw: Vec<Value>) -> (Vec<T>, Vec<Value>, usize) {
    let mut records = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();
    let mut migrated = 0;

    for value in raw {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(mut record) => {
                if record.id().is_empty() {
                    record.set_id(new_id());
                    migrated += 1;
                }
                records.push(record);
            }
            Err(err) => {
                log::warn!(target: "storage", "malformed record in {}: {err}", T::KEY);
                rejected.push(value);
            }
        }
    }

    (records, rejected, migrated)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::db::test_pool;
    use crate::models::{Booking, BookingStatus, Feedback, KEY_BOOKINGS, KEY_FEEDBACK};
    use crate::testing::{booking, feedback};

    use super::*;

    #[actix_web::test]
    async fn append_assigns_id_and_keeps_order() {
        let repo: Repository<Booking> = Repository::new(Storage::new(test_pool().await));
        let first = repo.append(booking("Asha", "2026-10-20", "09:00")).await.unwrap();
        let second = repo.append(booking("Ben", "2026-10-21", "10:00")).await.unwrap();

        assert!(!first.id.is_empty());
        assert_ne!(first.id, second.id);
        let names: Vec<_> = repo.all().await.into_iter().map(|b| b.name).collect();
        assert_eq!(names, ["Asha", "Ben"]);
    }

    #[actix_web::test]
    async fn update_targets_record_by_id() {
        let repo: Repository<Booking> = Repository::new(Storage::new(test_pool().await));
        repo.append(booking("Asha", "2026-10-20", "09:00")).await.unwrap();
        let ben = repo.append(booking("Ben", "2026-10-21", "10:00")).await.unwrap();

        let updated = repo
            .update(&ben.id, |b| b.status = BookingStatus::Confirmed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);

        let stored = repo.all().await;
        assert_eq!(stored[0].status, BookingStatus::Pending);
        assert_eq!(stored[1].status, BookingStatus::Confirmed);
        assert!(repo.update("missing", |_| {}).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn remove_drops_only_that_record() {
        let repo: Repository<Feedback> = Repository::new(Storage::new(test_pool().await));
        let a = repo.append(feedback("Ana", false)).await.unwrap();
        let b = repo.append(feedback("Bo", false)).await.unwrap();

        let removed = repo.remove(&a.id).await.unwrap().unwrap();
        assert_eq!(removed.name, "Ana");
        let remaining = repo.all().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b.id);
        assert!(repo.remove(&a.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn legacy_records_get_stable_ids() {
        let storage = Storage::new(test_pool().await);
        storage
            .save(
                KEY_FEEDBACK,
                &[json!({
                    "name": "Old Timer",
                    "location": "Chennai",
                    "type": "Client",
                    "message": "Saved before ids existed.",
                    "approved": false,
                    "timestamp": "2025-01-02T03:04:05.000Z"
                })],
            )
            .await
            .unwrap();

        let repo: Repository<Feedback> = Repository::new(storage);
        let first = repo.all().await;
        let second = repo.all().await;
        assert_eq!(first.len(), 1);
        assert!(!first[0].id.is_empty());
        assert_eq!(first[0].id, second[0].id);
    }

    #[actix_web::test]
    async fn malformed_elements_are_quarantined_once() {
        let storage = Storage::new(test_pool().await);
        let good = serde_json::to_value(booking("Asha", "2026-10-20", "09:00")).unwrap();
        storage
            .save(KEY_BOOKINGS, &[good, json!({"name": "no date"})])
            .await
            .unwrap();

        let repo: Repository<Booking> = Repository::new(storage.clone());
        assert_eq!(repo.all().await.len(), 1);
        assert_eq!(repo.all().await.len(), 1);
        assert_eq!(storage.load("bookings.rejected").await, vec![json!({"name": "no date"})]);
    }

    #[actix_web::test]
    async fn unreadable_slot_is_left_untouched_by_append() {
        let storage = Storage::new(test_pool().await);
        let original = br#"[{"name":"Old One"},{"name":"Old Two"}]"#;
        storage.put_blob(KEY_BOOKINGS, original).await;

        let repo: Repository<Booking> = Repository::new(storage.clone());
        assert!(repo.all().await.is_empty());
        assert!(repo.append(booking("New", "2026-10-20", "09:00")).await.is_err());

        assert_eq!(storage.get_blob(KEY_BOOKINGS).await.as_deref(), Some(&original[..]));
        assert!(storage.get_raw("bookings.corrupt").await.is_none());
    }

    #[actix_web::test]
    async fn malformed_elements_stay_put_when_quarantine_fails() {
        let storage = Storage::new(test_pool().await);
        let good = serde_json::to_value(booking("Asha", "2026-10-20", "09:00")).unwrap();
        storage
            .save(KEY_BOOKINGS, &[good, json!({"name": "no date"})])
            .await
            .unwrap();
        storage.put_blob("bookings.rejected", b"[]").await;

        let repo: Repository<Booking> = Repository::new(storage.clone());
        assert!(repo.all().await.is_empty());
        assert!(repo.append(booking("Ben", "2026-10-21", "10:00")).await.is_err());

        let slot = storage.get_raw(KEY_BOOKINGS).await.unwrap();
        assert!(slot.contains("no date"));
        assert!(slot.contains("Asha"));
        assert!(!slot.contains("Ben"));
    }
}
