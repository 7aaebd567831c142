//! Static k-d tree over RGB colors answering bulk k-nearest queries
//!
//! Distances are squared Euclidean in RGB space. Equal distances are ordered
//! by ascending build-time index, so results are fully deterministic.

use crate::color::extractor::{CandidateTile, RgbColor};
use crate::io::error::{MosaicError, Result, invalid_parameter};
use rayon::prelude::*;
use std::collections::BinaryHeap;
use std::path::PathBuf;

/// Points per leaf before a node is split
const LEAF_CAPACITY: usize = 8;

/// Query points handed to one rayon task at a time
const QUERY_CHUNK: usize = 256;

#[derive(Clone, Copy, Debug)]
enum Node {
    Leaf {
        start: usize,
        end: usize,
    },
    Split {
        axis: usize,
        value: i32,
        left: usize,
        right: usize,
    },
}

/// Indexed point: coordinates and position in the build-time sequence
#[derive(Clone, Copy, Debug)]
struct Entry {
    point: [i32; 3],
    index: usize,
}

/// Immutable nearest-color structure built once over an ordered color list
#[derive(Clone, Debug)]
pub struct ColorIndex {
    nodes: Vec<Node>,
    entries: Vec<Entry>,
    root: usize,
}

/// Row-major table of neighbor indices, `k` per query point, nearest first
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborTable {
    k: usize,
    indices: Vec<usize>,
}

impl NeighborTable {
    /// Neighbors returned per query point
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Number of query points
    pub fn len(&self) -> usize {
        self.indices.len() / self.k
    }

    /// Whether the table holds no query points
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Neighbors of query point `point`, nearest first
    pub fn row(&self, point: usize) -> Option<&[usize]> {
        let start = point.checked_mul(self.k)?;
        self.indices.get(start..start + self.k)
    }

    /// Iterate over every query point's neighbors in query order
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.indices.chunks_exact(self.k)
    }
}

/// Bounded max-heap of the best candidates seen so far
///
/// Ordering on `(distance, index)` makes the worst element the one with the
/// largest distance, and among equals the largest index.
struct NearestSet {
    k: usize,
    heap: BinaryHeap<(i32, usize)>,
}

impl NearestSet {
    fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    fn worst_distance(&self) -> i32 {
        self.heap.peek().map_or(i32::MAX, |&(distance, _)| distance)
    }

    fn offer(&mut self, candidate: (i32, usize)) {
        if !self.is_full() {
            self.heap.push(candidate);
        } else if self.heap.peek().is_some_and(|&worst| candidate < worst) {
            self.heap.pop();
            self.heap.push(candidate);
        }
    }

    /// Append indices ordered nearest first, leaving the set empty for reuse
    fn drain_sorted_into(&mut self, out: &mut Vec<usize>) {
        let mut found = std::mem::take(&mut self.heap).into_sorted_vec();
        out.extend(found.iter().map(|&(_, index)| index));
        found.clear();
        self.heap = BinaryHeap::from(found);
    }
}

const fn squared_distance(a: &[i32; 3], b: &[i32; 3]) -> i32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

fn coordinate(point: &[i32; 3], axis: usize) -> i32 {
    point.get(axis).copied().unwrap_or(0)
}

const fn widen(color: RgbColor) -> [i32; 3] {
    [color[0] as i32, color[1] as i32, color[2] as i32]
}

impl ColorIndex {
    /// Build the tree over `colors`; query results index into this sequence
    ///
    /// # Errors
    ///
    /// Returns an error if `colors` is empty
    pub fn build(colors: &[RgbColor]) -> Result<Self> {
        if colors.is_empty() {
            return Err(MosaicError::EmptyCandidatePool {
                directory: PathBuf::from("<memory>"),
            });
        }

        let mut entries: Vec<Entry> = colors
            .iter()
            .enumerate()
            .map(|(index, &color)| Entry {
                point: widen(color),
                index,
            })
            .collect();

        let mut nodes = Vec::with_capacity(2 * colors.len() / LEAF_CAPACITY + 1);
        let root = Self::build_node(&mut nodes, &mut entries, 0);

        Ok(Self {
            nodes,
            entries,
            root,
        })
    }

    // Splits on the axis of widest spread at the median; left keeps values
    // at or below the split, right at or above.
    fn build_node(nodes: &mut Vec<Node>, slice: &mut [Entry], offset: usize) -> usize {
        let len = slice.len();
        if len <= LEAF_CAPACITY {
            nodes.push(Node::Leaf {
                start: offset,
                end: offset + len,
            });
            return nodes.len() - 1;
        }

        let spread = |axis: usize| {
            let values = slice.iter().map(|entry| coordinate(&entry.point, axis));
            let low = values.clone().min().unwrap_or(0);
            let high = values.max().unwrap_or(0);
            high - low
        };
        let axis = (0..3)
            .max_by_key(|&axis| (spread(axis), std::cmp::Reverse(axis)))
            .unwrap_or(0);

        let mid = len / 2;
        let (_, pivot, _) =
            slice.select_nth_unstable_by_key(mid, |entry| coordinate(&entry.point, axis));
        let value = coordinate(&pivot.point, axis);

        let slot = nodes.len();
        nodes.push(Node::Leaf { start: 0, end: 0 });
        let (left_half, right_half) = slice.split_at_mut(mid);
        let left = Self::build_node(nodes, left_half, offset);
        let right = Self::build_node(nodes, right_half, offset + mid);
        if let Some(node) = nodes.get_mut(slot) {
            *node = Node::Split {
                axis,
                value,
                left,
                right,
            };
        }
        slot
    }

    /// Number of indexed colors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no colors (never true for a built index)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check `k` against the population without clamping
    ///
    /// # Errors
    ///
    /// Returns an error if `k` is zero or exceeds the number of indexed colors
    pub fn validate_k(&self, k: usize) -> Result<()> {
        if k == 0 {
            return Err(invalid_parameter(
                "k",
                &k,
                &"at least one neighbor must be requested",
            ));
        }
        if k > self.len() {
            return Err(MosaicError::NeighborCountExceedsPool {
                requested: k,
                available: self.len(),
            });
        }
        Ok(())
    }

    /// Indices of the `k` colors nearest to `color`, nearest first
    ///
    /// # Errors
    ///
    /// Returns an error if `k` is zero or exceeds the number of indexed colors
    pub fn nearest(&self, color: RgbColor, k: usize) -> Result<Vec<usize>> {
        self.validate_k(k)?;
        let mut set = NearestSet::new(k);
        let mut out = Vec::with_capacity(k);
        self.search(self.root, &widen(color), &mut set);
        set.drain_sorted_into(&mut out);
        Ok(out)
    }

    /// Bulk k-nearest query over many colors
    ///
    /// Work is split into chunks across the rayon pool; each chunk reuses one
    /// candidate heap for all of its points.
    ///
    /// # Errors
    ///
    /// Returns an error if `k` is zero or exceeds the number of indexed colors
    pub fn query(&self, colors: &[RgbColor], k: usize) -> Result<NeighborTable> {
        self.validate_k(k)?;

        let chunks: Vec<Vec<usize>> = colors
            .par_chunks(QUERY_CHUNK)
            .map(|chunk| {
                let mut set = NearestSet::new(k);
                let mut out = Vec::with_capacity(chunk.len() * k);
                for &color in chunk {
                    self.search(self.root, &widen(color), &mut set);
                    set.drain_sorted_into(&mut out);
                }
                out
            })
            .collect();

        Ok(NeighborTable {
            k,
            indices: chunks.concat(),
        })
    }

    fn search(&self, node: usize, target: &[i32; 3], set: &mut NearestSet) {
        match self.nodes.get(node) {
            Some(&Node::Leaf { start, end }) => {
                for entry in self.entries.get(start..end).unwrap_or(&[]) {
                    set.offer((squared_distance(&entry.point, target), entry.index));
                }
            }
            Some(&Node::Split {
                axis,
                value,
                left,
                right,
            }) => {
                let diff = coordinate(target, axis) - value;
                let (near, far) = if diff < 0 {
                    (left, right)
                } else {
                    (right, left)
                };
                self.search(near, target, set);
                // Equal bound still descends: a lower index may tie the worst
                if !set.is_full() || diff * diff <= set.worst_distance() {
                    self.search(far, target, set);
                }
            }
            None => {}
        }
    }
}

/// Candidate identifiers and their color index, built together
///
/// The index answers with positions into `identifiers`; keeping both in one
/// value means they can never be rebuilt out of step.
#[derive(Clone, Debug)]
pub struct CandidatePool {
    identifiers: Vec<String>,
    colors: Vec<RgbColor>,
    index: ColorIndex,
}

impl CandidatePool {
    /// Index an ordered list of candidates
    ///
    /// # Errors
    ///
    /// Returns an error if `tiles` is empty
    pub fn build(tiles: Vec<CandidateTile>) -> Result<Self> {
        let (identifiers, colors): (Vec<String>, Vec<RgbColor>) = tiles
            .into_iter()
            .map(|tile| (tile.identifier, tile.color))
            .unzip();
        let index = ColorIndex::build(&colors)?;

        Ok(Self {
            identifiers,
            colors,
            index,
        })
    }

    /// The underlying color index
    pub const fn index(&self) -> &ColorIndex {
        &self.index
    }

    /// Identifier at a build-time position
    pub fn identifier(&self, position: usize) -> Option<&str> {
        self.identifiers.get(position).map(String::as_str)
    }

    /// Mean color at a build-time position
    pub fn color(&self, position: usize) -> Option<RgbColor> {
        self.colors.get(position).copied()
    }

    /// All identifiers in build order
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Whether the pool is empty (never true for a built pool)
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}
