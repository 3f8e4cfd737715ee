//! Batch Partitioning
//!
//! Splits an ordered list of items into consecutive chunks of at most
//! `limit` items. Each chunk later becomes one Safe transaction with its own
//! nonce, so the relative order of items is never changed.

use crate::error::PartitionError;

pub fn partition<T: Clone>(items: &[T], limit: usize) -> Result<Vec<Vec<T>>, PartitionError> {
    if limit == 0 {
        return Err(PartitionError::InvalidLimit(limit));
    }
    Ok(items.chunks(limit).map(<[T]>::to_vec).collect())
}
