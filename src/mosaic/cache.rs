use crate::io::error::{Result, invalid_parameter};
use crate::io::image::load_tile;
use image::RgbImage;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Source of decoded, resized tile pixels
///
/// Implementations decode the candidate named by `identifier` and resize it
/// to a `tile_size` square.
pub trait TileLoader {
    /// Produce the tile buffer for `identifier`
    ///
    /// # Errors
    ///
    /// Returns an error if the tile cannot be read or decoded
    fn load(&self, identifier: &str, tile_size: u32) -> Result<RgbImage>;
}

/// Loads tiles from a flat candidate directory using Lanczos resampling
#[derive(Clone, Debug)]
pub struct DirectoryTileLoader {
    directory: PathBuf,
}

impl DirectoryTileLoader {
    /// Load tiles from files inside `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl TileLoader for DirectoryTileLoader {
    fn load(&self, identifier: &str, tile_size: u32) -> Result<RgbImage> {
        load_tile(&self.directory.join(identifier), tile_size)
    }
}

/// Performance metrics for cache effectiveness
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from memory
    pub hits: usize,
    /// Lookups that went to the loader
    pub misses: usize,
    /// Entries dropped to respect the capacity
    pub evictions: usize,
}

struct CachedTile {
    image: RgbImage,
    last_used: u64,
}

/// Bounded least-recently-used cache of decoded tiles
///
/// Recency is a monotonically increasing tick; `recency` maps each live tick
/// to its identifier so the oldest entry is always the first key.
pub struct TileCache<L> {
    loader: L,
    tile_size: u32,
    capacity: usize,
    entries: HashMap<String, CachedTile>,
    recency: BTreeMap<u64, String>,
    clock: u64,

    /// Cache performance statistics
    pub stats: CacheStats,
}

impl<L: TileLoader> TileCache<L> {
    /// Create an empty cache holding at most `capacity` tiles of `tile_size`
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` or `tile_size` is zero
    pub fn new(loader: L, tile_size: u32, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(invalid_parameter(
                "cache_capacity",
                &capacity,
                &"cache must hold at least one tile",
            ));
        }
        if tile_size == 0 {
            return Err(invalid_parameter(
                "tile_size",
                &tile_size,
                &"must be at least 1 pixel",
            ));
        }

        Ok(Self {
            loader,
            tile_size,
            capacity,
            entries: HashMap::with_capacity(capacity.min(4096)),
            recency: BTreeMap::new(),
            clock: 0,
            stats: CacheStats::default(),
        })
    }

    /// Edge length of every cached tile
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Maximum number of tiles held
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tiles currently held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tiles are held
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `identifier` is resident, without touching its recency
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// The loader backing this cache
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// Fetch a tile, loading and inserting it on a miss
    ///
    /// A hit refreshes the entry's recency. A miss evicts the least recently
    /// used entry when the cache is full.
    ///
    /// # Errors
    ///
    /// Returns the loader's error on a miss; the cache is left unchanged
    pub fn get(&mut self, identifier: &str) -> Result<&RgbImage> {
        self.clock += 1;
        let now = self.clock;

        if self.entries.contains_key(identifier) {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
            let image = self.loader.load(identifier, self.tile_size)?;
            if self.entries.len() >= self.capacity {
                self.evict_oldest();
            }
            self.entries.insert(
                identifier.to_string(),
                CachedTile {
                    image,
                    last_used: now,
                },
            );
            self.recency.insert(now, identifier.to_string());
        }

        let entry = self
            .entries
            .get_mut(identifier)
            .ok_or_else(|| invalid_parameter("identifier", &identifier, &"missing after insert"))?;
        if entry.last_used != now {
            self.recency.remove(&entry.last_used);
            entry.last_used = now;
            self.recency.insert(now, identifier.to_string());
        }
        Ok(&entry.image)
    }

    fn evict_oldest(&mut self) {
        if let Some((_, identifier)) = self.recency.pop_first() {
            self.entries.remove(&identifier);
            self.stats.evictions += 1;
        }
    }
}
