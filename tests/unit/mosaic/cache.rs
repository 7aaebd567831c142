//! Tests for tile cache hits, loader call counts and LRU eviction

#[cfg(test)]
mod tests {
    use crate::support::{CountingLoader, write_solid};
    use framemosaic::MosaicError;
    use framemosaic::mosaic::cache::{CacheStats, DirectoryTileLoader, TileCache};

    fn loader() -> CountingLoader {
        CountingLoader::new(&[
            ("a", [255, 0, 0]),
            ("b", [0, 255, 0]),
            ("c", [0, 0, 255]),
            ("d", [9, 9, 9]),
        ])
    }

    // Tests a repeated lookup is served without a second decode
    // Verified by always calling the loader
    #[test]
    fn test_hit_skips_loader() {
        let mut cache = TileCache::new(loader(), 4, 8).unwrap();

        let first = cache.get("a").unwrap().clone();
        let second = cache.get("a").unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(cache.loader().calls(), 1);
        assert_eq!(
            cache.stats,
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 0
            }
        );
    }

    // Tests tiles come back at the configured size
    // Verified by passing the capacity as tile size
    #[test]
    fn test_tiles_have_configured_size() {
        let mut cache = TileCache::new(loader(), 5, 2).unwrap();
        assert_eq!(cache.get("b").unwrap().dimensions(), (5, 5));
        assert_eq!(cache.tile_size(), 5);
    }

    // Tests the least recently used entry is evicted first
    // Verified by evicting the most recently inserted entry
    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = TileCache::new(loader(), 2, 2).unwrap();

        cache.get("a").unwrap();
        cache.get("b").unwrap();
        cache.get("c").unwrap();

        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats.evictions, 1);
    }

    // Tests a hit refreshes recency so the other entry is evicted instead
    // Verified by ordering eviction by insertion time
    #[test]
    fn test_hit_refreshes_recency() {
        let mut cache = TileCache::new(loader(), 2, 2).unwrap();

        cache.get("a").unwrap();
        cache.get("b").unwrap();
        cache.get("a").unwrap();
        cache.get("c").unwrap();

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));

        cache.get("b").unwrap();
        assert_eq!(cache.loader().calls(), 4);
        assert!(!cache.contains("a"));
    }

    // Tests capacity is never exceeded across many distinct lookups
    // Verified by evicting only when len exceeds capacity
    #[test]
    fn test_capacity_bound() {
        let mut cache = TileCache::new(loader(), 1, 3).unwrap();
        for name in ["a", "b", "c", "d", "a", "b"] {
            cache.get(name).unwrap();
            assert!(cache.len() <= cache.capacity());
        }
    }

    // Tests a failed load leaves the cache untouched and surfaces the error
    // Verified by inserting a blank tile on failure
    #[test]
    fn test_load_failure_is_reported() {
        let mut cache = TileCache::new(loader(), 2, 2).unwrap();
        cache.get("a").unwrap();

        assert!(cache.get("missing").is_err());
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("a"));
    }

    // Tests zero capacity is rejected
    // Verified by removing the capacity check
    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            TileCache::new(loader(), 2, 0),
            Err(MosaicError::InvalidParameter { .. })
        ));
        assert!(TileCache::new(loader(), 0, 2).is_err());
    }

    // Tests the directory loader decodes and resizes files from disk
    // Verified by skipping the resize step
    #[test]
    fn test_directory_loader_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(dir.path(), "frame_000001.png", 9, [12, 34, 56]);

        let mut cache = TileCache::new(DirectoryTileLoader::new(dir.path()), 4, 4).unwrap();
        let tile = cache.get("frame_000001.png").unwrap();

        assert_eq!(tile.dimensions(), (4, 4));
        assert_eq!(tile.get_pixel(1, 1).0, [12, 34, 56]);
        assert!(matches!(
            cache.get("frame_000002.png"),
            Err(MosaicError::ImageLoad { .. })
        ));
    }
}
