//! Adding and removing a template's neighbor descriptors.
//!
//! Every neighbor of every minutia is hashed to a bucket by its relative
//! `(x, y, angle)` and the bucket receives the minutia's [`MinutiaRef`].

use fingerhash_minutiae::Minutia;

use crate::config::MAX_MINUTIAE_PER_TEMPLATE;
use crate::error::{IndexError, Result};
use crate::hash::GroupSpace;
use crate::journal::Journal;
use crate::reference::MinutiaRef;
use crate::store::BucketStore;

/// Indexes `minutiae` under `template_id`.
///
/// All or nothing: on failure the store is left exactly as it was.
/// Returns the number of entries inserted.
pub(crate) fn insert_template(
    store: &mut BucketStore,
    space: &GroupSpace,
    template_id: u32,
    minutiae: &[Minutia],
) -> Result<usize> {
    check_size(minutiae)?;

    let mut journal = Journal::begin(store);
    for minutia in minutiae {
        let savepoint = journal.savepoint();
        if let Err(err) = insert_minutia(&mut journal, space, template_id, minutia) {
            journal.rollback_to(savepoint);
            tracing::warn!(template_id, minutia = minutia.id, %err, "enrollment rolled back");
            return Err(err);
        }
    }
    Ok(journal.commit())
}

fn insert_minutia(journal: &mut Journal<'_>, space: &GroupSpace, template_id: u32, minutia: &Minutia) -> Result<()> {
    let r = MinutiaRef::encode(template_id, minutia.id)?;
    for n in &minutia.neighbors {
        let bucket = space.bucket_index(n.relative_x.into(), n.relative_y.into(), n.relative_angle.into())?;
        journal.insert(bucket, r)?;
    }
    Ok(())
}

/// Removes the entries [`insert_template`] made for `template_id`.
///
/// Succeeds only if every neighbor's entry was found. Entries that are
/// found are removed even when others are missing.
pub(crate) fn remove_template(
    store: &mut BucketStore,
    space: &GroupSpace,
    template_id: u32,
    minutiae: &[Minutia],
) -> Result<()> {
    check_size(minutiae)?;

    let mut total = 0usize;
    let mut removed = 0usize;
    for minutia in minutiae {
        let r = MinutiaRef::encode(template_id, minutia.id)?;
        for n in &minutia.neighbors {
            total += 1;
            match space.bucket_index(n.relative_x.into(), n.relative_y.into(), n.relative_angle.into()) {
                Ok(bucket) => {
                    if store.remove(bucket, r) {
                        removed += 1;
                    }
                }
                Err(err) => tracing::trace!(template_id, minutia = minutia.id, %err, "neighbor outside index"),
            }
        }
    }

    if removed == total {
        Ok(())
    } else if removed == 0 {
        Err(IndexError::NotFound)
    } else {
        tracing::warn!(template_id, removed, total, "template partially removed");
        Err(IndexError::IncompleteRemoval { removed, total })
    }
}

fn check_size(minutiae: &[Minutia]) -> Result<()> {
    if minutiae.is_empty() {
        return Err(IndexError::TooFewMinutiae);
    }
    if minutiae.len() > MAX_MINUTIAE_PER_TEMPLATE as usize {
        return Err(IndexError::InvalidParameter(format!(
            "template has {} minutiae, at most {MAX_MINUTIAE_PER_TEMPLATE} can be indexed",
            minutiae.len()
        )));
    }
    Ok(())
}
