use crate::error::Result;
use crate::reference::MinutiaRef;
use crate::store::BucketStore;

/// Insertions into a [`BucketStore`] that are undone unless committed.
///
/// Dropping an uncommitted journal removes every entry it inserted, newest
/// first, which returns each touched bucket to its previous contents and
/// allocation. [`Journal::savepoint`] / [`Journal::rollback_to`] undo a
/// suffix of the journal while keeping the rest staged.
pub(crate) struct Journal<'a> {
    store: &'a mut BucketStore,
    staged: Vec<(usize, MinutiaRef)>,
    committed: bool,
}

impl<'a> Journal<'a> {
    pub(crate) fn begin(store: &'a mut BucketStore) -> Self {
        Self {
            store,
            staged: Vec::new(),
            committed: false,
        }
    }

    pub(crate) fn insert(&mut self, bucket: usize, r: MinutiaRef) -> Result<()> {
        self.staged.try_reserve(1)?;
        self.store.insert(bucket, r)?;
        self.staged.push((bucket, r));
        Ok(())
    }

    /// Marks the current end of the journal.
    pub(crate) fn savepoint(&self) -> usize {
        self.staged.len()
    }

    /// Undoes every insertion made after `savepoint`.
    pub(crate) fn rollback_to(&mut self, savepoint: usize) {
        while self.staged.len() > savepoint {
            if let Some((bucket, r)) = self.staged.pop() {
                if !self.store.remove(bucket, r) {
                    tracing::warn!(bucket, ?r, "journal entry missing during rollback");
                }
            }
        }
    }

    /// Keeps all staged insertions. Returns how many there were.
    pub(crate) fn commit(mut self) -> usize {
        self.committed = true;
        self.staged.len()
    }
}

impl Drop for Journal<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.staged.is_empty() {
            tracing::debug!(entries = self.staged.len(), "reverting uncommitted journal");
            self.rollback_to(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(raw: u32) -> MinutiaRef {
        MinutiaRef::from_raw(raw)
    }

    #[test]
    fn commit_keeps_entries() {
        let mut store = BucketStore::new(8, 2);
        let mut journal = Journal::begin(&mut store);
        journal.insert(1, r(0)).unwrap();
        journal.insert(1, r(1)).unwrap();
        journal.insert(5, r(2)).unwrap();
        assert_eq!(journal.commit(), 3);

        assert_eq!(store.entries(1), &[r(0), r(1)]);
        assert_eq!(store.entries(5), &[r(2)]);
    }

    #[test]
    fn drop_reverts() {
        let mut store = BucketStore::new(8, 2);
        store.insert(1, r(9)).unwrap();
        {
            let mut journal = Journal::begin(&mut store);
            journal.insert(1, r(0)).unwrap();
            journal.insert(1, r(1)).unwrap();
            journal.insert(3, r(2)).unwrap();
            assert_eq!(journal.savepoint(), 3);
        }
        assert_eq!(store.entries(1), &[r(9)]);
        assert_eq!(store.allocated(1), 2);
        assert_eq!(store.allocated(3), 0);
        assert_eq!(store.occupied(), 1);
    }

    #[test]
    fn rollback_to_savepoint() {
        let mut store = BucketStore::new(8, 2);
        let mut journal = Journal::begin(&mut store);
        journal.insert(0, r(0)).unwrap();
        let sp = journal.savepoint();
        journal.insert(0, r(1)).unwrap();
        journal.insert(2, r(1)).unwrap();
        journal.rollback_to(sp);
        assert_eq!(journal.savepoint(), 1);
        journal.commit();

        assert_eq!(store.entries(0), &[r(0)]);
        assert!(store.entries(2).is_empty());
    }

    #[test]
    fn failed_insert_is_not_staged() {
        let mut store = BucketStore::new(4, 2);
        let mut journal = Journal::begin(&mut store);
        journal.insert(0, r(0)).unwrap();
        assert!(journal.insert(4, r(1)).is_err());
        assert_eq!(journal.savepoint(), 1);
        drop(journal);
        assert!(store.is_empty());
    }
}
