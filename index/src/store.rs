use std::collections::HashMap;

use crate::error::{IndexError, Result};
use crate::reference::MinutiaRef;

/// Entries of one bucket, packed with no gaps.
///
/// `allocated` is the number of slots reserved, always `entries.len()`
/// rounded up to a multiple of the store's `alloc_step`.
#[derive(Debug, Default, Clone)]
struct Bucket {
    entries: Vec<MinutiaRef>,
    allocated: usize,
}

/// Per-bucket growable lists of [`MinutiaRef`].
///
/// The bucket space is fixed at construction; storage exists only for
/// buckets that hold at least one entry.
#[derive(Debug, Clone)]
pub struct BucketStore {
    buckets: HashMap<usize, Bucket>,
    bucket_count: usize,
    alloc_step: usize,
}

impl BucketStore {
    pub fn new(bucket_count: usize, alloc_step: usize) -> Self {
        Self {
            buckets: HashMap::new(),
            bucket_count,
            alloc_step: alloc_step.max(1),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Adds `alloc_step` slots to `bucket`, keeping its entries.
    pub fn ensure_capacity(&mut self, bucket: usize) -> Result<()> {
        self.check(bucket)?;
        let step = self.alloc_step;
        let allocated = match self.buckets.get_mut(&bucket) {
            Some(slot) => {
                let additional = slot.allocated + step - slot.entries.len();
                slot.entries.try_reserve_exact(additional)?;
                slot.allocated += step;
                slot.allocated
            }
            None => {
                // Reserve before inserting so a failure leaves the bucket absent.
                let mut entries = Vec::new();
                entries.try_reserve_exact(step)?;
                self.buckets.try_reserve(1)?;
                self.buckets.insert(bucket, Bucket { entries, allocated: step });
                step
            }
        };
        tracing::trace!(bucket, allocated, "bucket grown");
        Ok(())
    }

    /// Appends `r` after the last entry of `bucket`, growing it when full.
    /// Returns the position written.
    pub fn insert(&mut self, bucket: usize, r: MinutiaRef) -> Result<usize> {
        self.check(bucket)?;
        let full = self
            .buckets
            .get(&bucket)
            .is_none_or(|b| b.entries.len() >= b.allocated);
        if full {
            self.ensure_capacity(bucket)?;
        }
        let slot = self.buckets.get_mut(&bucket).ok_or(IndexError::OutOfMemory)?;
        slot.entries.push(r);
        Ok(slot.entries.len() - 1)
    }

    /// Removes the first entry equal to `r`, shifting later entries down.
    /// Returns `false` if `bucket` does not contain `r`.
    pub fn remove(&mut self, bucket: usize, r: MinutiaRef) -> bool {
        let step = self.alloc_step;
        let Some(slot) = self.buckets.get_mut(&bucket) else {
            return false;
        };
        let Some(position) = slot.entries.iter().position(|&e| e == r) else {
            return false;
        };
        slot.entries.remove(position);

        if slot.entries.is_empty() {
            self.buckets.remove(&bucket);
            return true;
        }
        let needed = slot.entries.len().div_ceil(step) * step;
        if needed < slot.allocated {
            slot.allocated = needed;
            slot.entries.shrink_to(needed);
        }
        true
    }

    /// Entries of `bucket` in insertion order. Empty for untouched buckets.
    pub fn entries(&self, bucket: usize) -> &[MinutiaRef] {
        self.buckets
            .get(&bucket)
            .map(|b| b.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Slots reserved for `bucket`; zero for untouched buckets.
    pub fn allocated(&self, bucket: usize) -> usize {
        self.buckets.get(&bucket).map_or(0, |b| b.allocated)
    }

    /// Number of buckets holding at least one entry.
    pub fn occupied(&self) -> usize {
        self.buckets.len()
    }

    /// Total entries over all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn check(&self, bucket: usize) -> Result<()> {
        if bucket >= self.bucket_count {
            return Err(IndexError::InvalidParameter(format!(
                "bucket {bucket} outside 0..{}",
                self.bucket_count
            )));
        }
        Ok(())
    }
}
