// src/core/matching/histogram.rs
//
// Fixed-point time-offset histogram. Offsets are scaled to integer buckets
// before counting so equal offsets never drift apart in floating point.

use std::collections::HashMap;

/// Dense tables above this many buckets fall back to a hash map
pub const MAX_DENSE_BUCKETS: usize = 1 << 22;

#[derive(Debug, Clone)]
enum Storage {
    Dense { counts: Vec<u32>, min_bucket: i64 },
    Sparse(HashMap<i64, u32>),
}

/// Vote counts per rounded time offset
#[derive(Debug, Clone)]
pub struct OffsetHistogram {
    storage: Storage,
    scale: f64,
    total: u64,
}

impl OffsetHistogram {
    /// Histogram covering offsets in `[min_offset, max_offset]` seconds,
    /// with `scale` buckets per second
    pub fn with_range(min_offset: f64, max_offset: f64, scale: f64) -> Self {
        let min_bucket = bucket(min_offset, scale);
        let max_bucket = bucket(max_offset, scale);
        let span = max_bucket.saturating_sub(min_bucket).saturating_add(1);

        let storage = if span > 0 && (span as u64) <= MAX_DENSE_BUCKETS as u64 {
            Storage::Dense {
                counts: vec![0; span as usize],
                min_bucket,
            }
        } else {
            Storage::Sparse(HashMap::new())
        };

        Self {
            storage,
            scale,
            total: 0,
        }
    }

    /// Histogram backed by a hash map, for unknown ranges
    pub fn sparse(scale: f64) -> Self {
        Self {
            storage: Storage::Sparse(HashMap::new()),
            scale,
            total: 0,
        }
    }

    pub fn is_dense(&self) -> bool {
        matches!(self.storage, Storage::Dense { .. })
    }

    pub fn add(&mut self, offset: f64) {
        let b = bucket(offset, self.scale);
        self.total += 1;

        match &mut self.storage {
            Storage::Dense { counts, min_bucket } => {
                let idx = b - *min_bucket;
                if idx >= 0 && (idx as usize) < counts.len() {
                    counts[idx as usize] += 1;
                    return;
                }
            }
            Storage::Sparse(map) => {
                *map.entry(b).or_insert(0) += 1;
                return;
            }
        }

        // Offset outside the declared range
        self.promote();
        if let Storage::Sparse(map) = &mut self.storage {
            *map.entry(b).or_insert(0) += 1;
        }
    }

    /// Total votes cast
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Tallest bucket as `(offset_seconds, count)`
    ///
    /// Ties go to the smallest absolute offset, then to the negative one.
    pub fn mode(&self) -> Option<(f64, u32)> {
        let mut best: Option<(i64, u32)> = None;
        let mut consider = |b: i64, count: u32| {
            if count == 0 {
                return;
            }
            let better = match best {
                None => true,
                Some((best_b, best_count)) => {
                    count > best_count
                        || (count == best_count && (b.abs(), b) < (best_b.abs(), best_b))
                }
            };
            if better {
                best = Some((b, count));
            }
        };

        match &self.storage {
            Storage::Dense { counts, min_bucket } => {
                for (i, &count) in counts.iter().enumerate() {
                    consider(min_bucket + i as i64, count);
                }
            }
            Storage::Sparse(map) => {
                for (&b, &count) in map {
                    consider(b, count);
                }
            }
        }

        best.map(|(b, count)| (b as f64 / self.scale, count))
    }

    fn promote(&mut self) {
        if let Storage::Dense { counts, min_bucket } = &self.storage {
            let map = counts
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c > 0)
                .map(|(i, &c)| (*min_bucket + i as i64, c))
                .collect();
            self.storage = Storage::Sparse(map);
        }
    }
}

fn bucket(offset: f64, scale: f64) -> i64 {
    (offset * scale).round() as i64
}
