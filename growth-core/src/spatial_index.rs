//! Spatial lookup over cell positions.
//!
//! A uniform grid of cubic buckets answers "which cells might lie within
//! `r` of this point" without scanning every cell. Answers may include
//! cells slightly out of range; the caller filters by exact distance.

use crate::error::{GrowthError, Result};
use crate::types::CellId;
use glam::{IVec3, Vec3};
use std::collections::HashMap;

/// Uniform bucket grid mapping cell positions to cell ids.
///
/// Space is cut into cubes of `cell_size` and each cube keeps the ids of
/// the cells whose position falls inside it. The grid is unbounded: only
/// occupied buckets are stored, keyed by their integer coordinates.
///
/// Queries return a candidate superset. Every cell within the query
/// radius is included, but so may be cells up to one bucket further
/// away; callers filter by exact squared distance.
///
/// Queries take `&self` and may run from many workers at once. Mutation
/// needs `&mut self`, which the borrow checker keeps out of any parallel
/// batch.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    cell_size: f32,
    buckets: HashMap<IVec3, Vec<CellId>>,
    len: usize,
}

impl SpatialIndex {
    /// Creates an empty index with buckets of width `cell_size`.
    ///
    /// # Panics
    /// Panics if `cell_size` is not finite and positive.
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be finite and positive"
        );
        Self {
            cell_size,
            buckets: HashMap::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn key(&self, p: Vec3) -> IVec3 {
        (p / self.cell_size).floor().as_ivec3()
    }

    /// Inserts `id` at `position`.
    pub fn add(&mut self, position: Vec3, id: CellId) -> Result<()> {
        if !position.is_finite() {
            return Err(GrowthError::NonFinitePosition { cell: id });
        }
        let key = self.key(position);
        self.buckets.entry(key).or_default().push(id);
        self.len += 1;
        Ok(())
    }

    /// Moves `id` from `old` to `new`.
    ///
    /// When both positions fall in the same bucket nothing changes.
    /// Otherwise the entry is removed from the old bucket and pushed into
    /// the new one. Fails if `id` is not stored in the bucket of `old`.
    pub fn update(&mut self, old: Vec3, new: Vec3, id: CellId) -> Result<()> {
        if !new.is_finite() {
            return Err(GrowthError::NonFinitePosition { cell: id });
        }
        let from = self.key(old);
        let to = self.key(new);
        if from == to {
            return Ok(());
        }

        let bucket = self
            .buckets
            .get_mut(&from)
            .ok_or(GrowthError::IndexEntryMissing { cell: id })?;
        let slot = bucket
            .iter()
            .position(|&e| e == id)
            .ok_or(GrowthError::IndexEntryMissing { cell: id })?;
        bucket.swap_remove(slot);
        if bucket.is_empty() {
            self.buckets.remove(&from);
        }

        self.buckets.entry(to).or_default().push(id);
        Ok(())
    }

    /// Calls `callback` for every candidate within `radius` of `position`.
    pub fn search_callback<F>(&self, position: Vec3, radius: f32, mut callback: F)
    where
        F: FnMut(CellId),
    {
        let min = self.key(position - Vec3::splat(radius));
        let max = self.key(position + Vec3::splat(radius));

        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    if let Some(bucket) = self.buckets.get(&IVec3::new(x, y, z)) {
                        for &id in bucket {
                            callback(id);
                        }
                    }
                }
            }
        }
    }

    /// Candidates within `radius` of `position`, in no particular order.
    pub fn search(&self, position: Vec3, radius: f32) -> Vec<CellId> {
        let mut result = Vec::new();
        self.search_into(position, radius, &mut result);
        result
    }

    /// Like [`SpatialIndex::search`], reusing `result`'s allocation.
    pub fn search_into(&self, position: Vec3, radius: f32, result: &mut Vec<CellId>) {
        result.clear();
        self.search_callback(position, radius, |id| result.push(id));
    }

    /// Candidates from the 27 buckets around `position`; complete for any
    /// radius up to one bucket width.
    pub fn nearby(&self, position: Vec3) -> Vec<CellId> {
        let center = self.key(position);
        let mut result = Vec::new();
        for z in -1..=1 {
            for y in -1..=1 {
                for x in -1..=1 {
                    if let Some(bucket) = self.buckets.get(&(center + IVec3::new(x, y, z))) {
                        result.extend_from_slice(bucket);
                    }
                }
            }
        }
        result
    }
}
