use crate::boss::{Boss, CutRecord, NewCutRecord};
use crate::error::StoreError;
use crate::respawn::EventMode;

/// The persistence contract the tracker relies on.
///
/// Every call is one blocking round trip. Implementations never retry;
/// a failure is returned to the caller as-is.
pub trait RecordStore {
    /// Backend name for logs (e.g. "sqlite", "rest").
    fn name(&self) -> &str;

    /// All bosses, ascending by id.
    fn list_bosses(&self) -> Result<Vec<Boss>, StoreError>;

    /// All cut records. Order is not significant.
    fn list_cut_records(&self) -> Result<Vec<CutRecord>, StoreError>;

    /// Insert one record; the store assigns the id.
    fn insert_cut_record(&self, record: &NewCutRecord) -> Result<CutRecord, StoreError>;

    /// Insert a batch, returning the stored rows in input order.
    fn insert_cut_records(&self, records: &[NewCutRecord]) -> Result<Vec<CutRecord>, StoreError>;

    /// Remove every cut record, returning how many were removed.
    fn delete_all_cut_records(&self) -> Result<usize, StoreError>;

    fn get_event_mode(&self) -> Result<EventMode, StoreError>;

    fn set_event_mode(&self, mode: EventMode) -> Result<(), StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn list_bosses(&self) -> Result<Vec<Boss>, StoreError> {
        (**self).list_bosses()
    }

    fn list_cut_records(&self) -> Result<Vec<CutRecord>, StoreError> {
        (**self).list_cut_records()
    }

    fn insert_cut_record(&self, record: &NewCutRecord) -> Result<CutRecord, StoreError> {
        (**self).insert_cut_record(record)
    }

    fn insert_cut_records(&self, records: &[NewCutRecord]) -> Result<Vec<CutRecord>, StoreError> {
        (**self).insert_cut_records(records)
    }

    fn delete_all_cut_records(&self) -> Result<usize, StoreError> {
        (**self).delete_all_cut_records()
    }

    fn get_event_mode(&self) -> Result<EventMode, StoreError> {
        (**self).get_event_mode()
    }

    fn set_event_mode(&self, mode: EventMode) -> Result<(), StoreError> {
        (**self).set_event_mode(mode)
    }
}
