use ecoboids_data::{Agent, DeathMarker, FoodSource, Obstacle, Position};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Anything with a place in the world that the index can bucket.
pub trait Positioned {
    fn position(&self) -> Position;
}

impl Positioned for Position {
    fn position(&self) -> Position {
        *self
    }
}

impl Positioned for Agent {
    fn position(&self) -> Position {
        self.position
    }
}

impl Positioned for FoodSource {
    fn position(&self) -> Position {
        self.position
    }
}

impl Positioned for Obstacle {
    fn position(&self) -> Position {
        self.position
    }
}

impl Positioned for DeathMarker {
    fn position(&self) -> Position {
        self.position
    }
}

/// Extent of the toroidal world. Both axes wrap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f64,
    pub height: f64,
}

impl WorldBounds {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Folds a position back into `[0, width) x [0, height)`.
    #[must_use]
    pub fn wrap(&self, p: Position) -> Position {
        Position {
            x: wrap_axis(p.x, self.width),
            y: wrap_axis(p.y, self.height),
        }
    }

    /// Shortest displacement from `from` to `to` over all wrap-around images.
    #[must_use]
    pub fn delta(&self, from: Position, to: Position) -> (f64, f64) {
        (
            shortest_axis_delta(to.x - from.x, self.width),
            shortest_axis_delta(to.y - from.y, self.height),
        )
    }

    #[must_use]
    pub fn distance_sq(&self, a: Position, b: Position) -> f64 {
        let (dx, dy) = self.delta(a, b);
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn distance(&self, a: Position, b: Position) -> f64 {
        self.distance_sq(a, b).sqrt()
    }
}

#[inline]
fn wrap_axis(v: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        return v;
    }
    let w = v.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if w >= extent {
        0.0
    } else {
        w
    }
}

#[inline]
fn shortest_axis_delta(raw: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        return raw;
    }
    let d = raw.rem_euclid(extent);
    if d > extent * 0.5 {
        d - extent
    } else {
        d
    }
}

/// One query hit: index into the slice passed to [`SpatialHash::insert`] and
/// its wrapped distance from the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// Uniform grid over the toroidal world for proximity queries.
///
/// Uses the "offset array" layout (like compressed sparse rows):
/// `cell_offsets[i]..cell_offsets[i+1]` holds every entry bucketed in cell `i`,
/// in insertion order.
///
/// The number of cells per axis is `floor(extent / cell_size)`, so each cell
/// is at least `cell_size` wide and the 3x3 block around a query cell always
/// covers a radius of `cell_size`.
///
/// # Examples
/// ```
/// use ecoboids_core::spatial_hash::{SpatialHash, WorldBounds};
/// use ecoboids_data::Position;
///
/// let mut index = SpatialHash::new(10.0, WorldBounds::new(100.0, 100.0));
/// index.insert(&[Position::new(1.0, 1.0), Position::new(99.0, 1.0)]);
///
/// // The second point is two units away across the left edge.
/// let hits = index.query_nearby(Position::new(1.0, 1.0), 8, Some(5.0));
/// assert_eq!(hits.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct SpatialHash {
    pub cell_size: f64,
    bounds: WorldBounds,
    cols: usize,
    rows: usize,
    cell_w: f64,
    cell_h: f64,
    cell_offsets: Vec<usize>,
    entries: Vec<(usize, Position)>,
}

impl SpatialHash {
    #[must_use]
    pub fn new(cell_size: f64, bounds: WorldBounds) -> Self {
        let mut index = Self {
            cell_size,
            bounds,
            cols: 1,
            rows: 1,
            cell_w: bounds.width,
            cell_h: bounds.height,
            cell_offsets: vec![0; 2],
            entries: Vec::new(),
        };
        index.resize(bounds);
        index
    }

    /// Re-derives the grid for new world bounds. Drops all entries.
    pub fn resize(&mut self, bounds: WorldBounds) {
        let size = if self.cell_size.is_finite() && self.cell_size > 0.0 {
            self.cell_size
        } else {
            bounds.width.max(bounds.height).max(1.0)
        };
        self.bounds = bounds;
        self.cols = axis_cells(bounds.width, size);
        self.rows = axis_cells(bounds.height, size);
        self.cell_w = if bounds.width > 0.0 {
            bounds.width / self.cols as f64
        } else {
            size
        };
        self.cell_h = if bounds.height > 0.0 {
            bounds.height / self.rows as f64
        } else {
            size
        };
        self.cell_offsets.clear();
        self.cell_offsets.resize(self.cols * self.rows + 1, 0);
        self.entries.clear();
    }

    #[must_use]
    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wrapped `(col, row)` of the cell holding `p`, `None` for non-finite input.
    #[inline]
    #[must_use]
    pub fn cell_coords(&self, p: Position) -> Option<(usize, usize)> {
        if !p.is_finite() {
            return None;
        }
        let w = self.bounds.wrap(p);
        let cx = ((w.x / self.cell_w) as usize).min(self.cols - 1);
        let cy = ((w.y / self.cell_h) as usize).min(self.rows - 1);
        Some((cx, cy))
    }

    #[inline]
    fn cell_idx(&self, p: Position) -> Option<usize> {
        self.cell_coords(p).map(|(cx, cy)| cy * self.cols + cx)
    }

    /// Clears the grid and buckets every item again. Items with non-finite
    /// positions are left out.
    pub fn insert<T: Positioned + Sync>(&mut self, items: &[T]) {
        let cell_count = self.cols * self.rows;

        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        items.par_iter().for_each(|item| {
            if let Some(idx) = self.cell_idx(item.position()) {
                atomic_counts[idx].fetch_add(1, AtomicOrdering::Relaxed);
            }
        });
        let counts: Vec<usize> = atomic_counts.into_iter().map(|a| a.into_inner()).collect();

        self.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            self.cell_offsets[i] = total;
            total += count;
        }
        self.cell_offsets[cell_count] = total;

        self.entries.clear();
        self.entries.resize(total, (0, Position::default()));

        let mut cursor = self.cell_offsets[..cell_count].to_vec();
        for (index, item) in items.iter().enumerate() {
            let p = item.position();
            if let Some(cell) = self.cell_idx(p) {
                self.entries[cursor[cell]] = (index, self.bounds.wrap(p));
                cursor[cell] += 1;
            }
        }
    }

    /// Entities within `max_distance` of `position`. `None` or an infinite
    /// distance scans the whole grid.
    ///
    /// When more than `max_neighbors` candidates qualify, they are sorted
    /// closest-first (ties in insertion order) and truncated. Otherwise the
    /// candidates come back in grid-scan order without being sorted.
    #[must_use]
    pub fn query_nearby(
        &self,
        position: Position,
        max_neighbors: usize,
        max_distance: Option<f64>,
    ) -> Vec<Neighbor> {
        let mut result = Vec::new();
        self.query_into(position, max_neighbors, max_distance, &mut result);
        result
    }

    /// Allocation-free variant of [`Self::query_nearby`] reusing `result`.
    pub fn query_into(
        &self,
        position: Position,
        max_neighbors: usize,
        max_distance: Option<f64>,
        result: &mut Vec<Neighbor>,
    ) {
        result.clear();
        if max_neighbors == 0 || self.entries.is_empty() {
            return;
        }
        let max_distance = match max_distance {
            Some(d) if d.is_nan() || d < 0.0 => return,
            Some(d) if d.is_infinite() => None,
            other => other,
        };
        let Some((cx, cy)) = self.cell_coords(position) else {
            return;
        };

        let (reach_x, reach_y) = match max_distance {
            Some(d) => (
                ((d / self.cell_w).ceil() as usize).max(1),
                ((d / self.cell_h).ceil() as usize).max(1),
            ),
            None => (self.cols, self.rows),
        };
        let max_sq = max_distance.map_or(f64::INFINITY, |d| d * d);

        let (row_start, row_len) = wrapped_span(cy, reach_y, self.rows);
        let (col_start, col_len) = wrapped_span(cx, reach_x, self.cols);

        for r in 0..row_len {
            let row = (row_start + r) % self.rows;
            for c in 0..col_len {
                let col = (col_start + c) % self.cols;
                let cell = row * self.cols + col;
                let start = self.cell_offsets[cell];
                let end = self.cell_offsets[cell + 1];
                for &(index, p) in &self.entries[start..end] {
                    let d_sq = self.bounds.distance_sq(position, p);
                    if d_sq <= max_sq {
                        // squared for now, rooted once the cap is applied
                        result.push(Neighbor {
                            index,
                            distance: d_sq,
                        });
                    }
                }
            }
        }

        if result.len() > max_neighbors {
            result.sort_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then(a.index.cmp(&b.index))
            });
            result.truncate(max_neighbors);
        }
        for n in result.iter_mut() {
            n.distance = n.distance.sqrt();
        }
    }

    /// Number of entries within `radius` of `position`.
    #[must_use]
    pub fn count_nearby(&self, position: Position, radius: f64) -> usize {
        let mut hits = Vec::new();
        self.query_into(position, usize::MAX, Some(radius), &mut hits);
        hits.len()
    }
}

fn axis_cells(extent: f64, cell_size: f64) -> usize {
    if !(extent.is_finite() && extent > 0.0) {
        return 1;
    }
    ((extent / cell_size).floor() as usize).max(1)
}

/// First cell and number of cells covering `center ± reach` on an axis of
/// `n` cells, visiting each cell at most once.
fn wrapped_span(center: usize, reach: usize, n: usize) -> (usize, usize) {
    if reach.saturating_mul(2).saturating_add(1) >= n {
        (0, n)
    } else {
        ((center + n - reach) % n, 2 * reach + 1)
    }
}
