//! Spatial hash broad phase
//!
//! A grid of entity-id buckets at a coarser resolution than the tile
//! map. The hash lives for exactly one physics tick: cleared, refilled
//! from every body's bbox, queried, forgotten. There is no removal API
//! and no incremental update - at this entity count a full rebuild is
//! cheaper than bookkeeping.

use super::components::Bbox;
use super::entity::Entity;

/// Bucket edge length in tile units. Kept larger than the largest body
/// so a typical query touches at most four buckets.
pub const CELL_SIZE: f32 = 2.0;

pub struct SpatialHash {
    cols: i32,
    rows: i32,
    /// Bucket arena indexed by grid coordinate; cleared, not
    /// reallocated, each tick
    buckets: Vec<Vec<Entity>>,
}

impl SpatialHash {
    /// Size the bucket grid for a map of the given tile dimensions.
    pub fn new(map_width: i32, map_height: i32) -> Self {
        let cols = ((map_width as f32 / CELL_SIZE).ceil() as i32).max(1);
        let rows = ((map_height as f32 / CELL_SIZE).ceil() as i32).max(1);
        Self {
            cols,
            rows,
            buckets: (0..cols * rows).map(|_| Vec::new()).collect(),
        }
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Inclusive bucket range spanned by a box on both axes
    fn range(&self, bbox: &Bbox) -> (i32, i32, i32, i32) {
        let x0 = (bbox.x / CELL_SIZE).floor() as i32;
        let y0 = (bbox.y / CELL_SIZE).floor() as i32;
        let x1 = ((bbox.x + bbox.w) / CELL_SIZE).floor() as i32;
        let y1 = ((bbox.y + bbox.h) / CELL_SIZE).floor() as i32;
        (x0, y0, x1, y1)
    }

    /// Insert an entity into every bucket its box spans. Buckets
    /// outside the grid are skipped, not an error - bodies pressed
    /// against the map edge overhang harmlessly.
    pub fn insert(&mut self, entity: Entity, bbox: &Bbox) {
        let (x0, y0, x1, y1) = self.range(bbox);
        for gy in y0..=y1 {
            for gx in x0..=x1 {
                if gx < 0 || gy < 0 || gx >= self.cols || gy >= self.rows {
                    continue;
                }
                self.buckets[(gy * self.cols + gx) as usize].push(entity);
            }
        }
    }

    /// Append every entity in the buckets a box spans. The result may
    /// contain duplicates (an entity sits in each bucket it overlaps);
    /// the narrow phase dedupes pairs, not this.
    pub fn query_into(&self, bbox: &Bbox, out: &mut Vec<Entity>) {
        let (x0, y0, x1, y1) = self.range(bbox);
        for gy in y0..=y1 {
            for gx in x0..=x1 {
                if gx < 0 || gy < 0 || gx >= self.cols || gy >= self.rows {
                    continue;
                }
                out.extend_from_slice(&self.buckets[(gy * self.cols + gx) as usize]);
            }
        }
    }

    #[cfg(test)]
    pub fn query(&self, bbox: &Bbox) -> Vec<Entity> {
        let mut out = Vec::new();
        self.query_into(bbox, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: f32, y: f32, w: f32, h: f32) -> Bbox {
        Bbox { x, y, w, h }
    }

    fn ent(i: u32) -> Entity {
        Entity::new(i, 0)
    }

    #[test]
    fn test_small_body_lands_in_one_bucket() {
        let mut hash = SpatialHash::new(16, 16);
        hash.insert(ent(1), &bbox(0.5, 0.5, 0.4, 0.4));
        assert_eq!(hash.query(&bbox(0.0, 0.0, 1.9, 1.9)), vec![ent(1)]);
        // A query over a different cell sees nothing
        assert!(hash.query(&bbox(4.5, 4.5, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_straddling_body_spans_buckets() {
        let mut hash = SpatialHash::new(16, 16);
        // Crosses the x=2 bucket boundary
        hash.insert(ent(2), &bbox(1.8, 0.5, 0.5, 0.5));
        assert_eq!(hash.query(&bbox(0.5, 0.5, 0.5, 0.5)), vec![ent(2)]);
        assert_eq!(hash.query(&bbox(2.5, 0.5, 0.5, 0.5)), vec![ent(2)]);
        // A query spanning both buckets sees the duplicate
        assert_eq!(hash.query(&bbox(1.0, 0.5, 2.0, 0.5)).len(), 2);
    }

    #[test]
    fn test_out_of_grid_is_skipped() {
        let mut hash = SpatialHash::new(8, 8);
        hash.insert(ent(3), &bbox(-5.0, -5.0, 1.0, 1.0));
        hash.insert(ent(4), &bbox(100.0, 100.0, 1.0, 1.0));
        // Neither insert landed in the grid, and an oversized query
        // touching out-of-range buckets is tolerated too
        assert!(hash.query(&bbox(-5.0, -5.0, 120.0, 120.0)).is_empty());
    }

    #[test]
    fn test_clear_reuses_buckets() {
        let mut hash = SpatialHash::new(8, 8);
        hash.insert(ent(5), &bbox(1.0, 1.0, 0.5, 0.5));
        hash.clear();
        assert!(hash.query(&bbox(0.0, 0.0, 7.9, 7.9)).is_empty());
    }
}
