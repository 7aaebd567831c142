//! Tests for default settings and configuration validation

#[cfg(test)]
mod tests {
    use framemosaic::MosaicError;
    use framemosaic::io::configuration::{
        CANDIDATE_EXTENSIONS, DEFAULT_CACHE_CAPACITY, DEFAULT_NEIGHBORS, DEFAULT_SEED,
        DEFAULT_TILE_SIZE, FRAME_FILE_PATTERN, MosaicConfig,
    };
    use std::path::Path;

    // Tests defaults match the documented pipeline layout
    // Verified by changing the default output path
    #[test]
    fn test_defaults() {
        let config = MosaicConfig::default();
        assert_eq!(config.target, Path::new("input.jpg"));
        assert_eq!(config.candidate_dir, Path::new("frames"));
        assert_eq!(config.output, Path::new("final_collage.jpg"));
        assert_eq!(config.tile_size, DEFAULT_TILE_SIZE);
        assert_eq!(config.neighbors, DEFAULT_NEIGHBORS);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.frame_rate, "1/2");
        assert!(config.validate().is_ok());
    }

    // Tests every zero-sized setting is rejected with its parameter name
    // Verified by removing the neighbors check
    #[test]
    fn test_zero_values_rejected() {
        let cases: [(&str, fn(&mut MosaicConfig)); 5] = [
            ("tile_size", |c| c.tile_size = 0),
            ("target_max_size", |c| c.target_max_size = 0),
            ("neighbors", |c| c.neighbors = 0),
            ("frame_size", |c| c.frame_size = 0),
            ("cache_capacity", |c| c.cache_capacity = 0),
        ];

        for (name, mutate) in cases {
            let mut config = MosaicConfig::default();
            mutate(&mut config);
            match config.validate() {
                Err(MosaicError::InvalidParameter { parameter, .. }) => {
                    assert_eq!(parameter, name);
                }
                other => unreachable!("Expected InvalidParameter for {name}, got {other:?}"),
            }
        }
    }

    // Tests an empty frame rate is rejected
    // Verified by accepting whitespace-only rates
    #[test]
    fn test_blank_frame_rate_rejected() {
        let config = MosaicConfig {
            frame_rate: "  ".to_string(),
            ..MosaicConfig::default()
        };
        assert!(config.validate().is_err());
    }

    // Tests the extractor's output pattern matches a recognized extension
    // Verified by switching the pattern to bmp
    #[test]
    fn test_frame_pattern_is_candidate() {
        let extension = Path::new(FRAME_FILE_PATTERN)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap();
        assert!(CANDIDATE_EXTENSIONS.contains(&extension));
    }
}
