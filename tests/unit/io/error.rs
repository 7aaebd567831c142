//! Tests for error formatting, source chaining and stage tagging

#[cfg(test)]
mod tests {
    use framemosaic::MosaicError;
    use framemosaic::io::error::{PipelineStage, WithStage, invalid_parameter};
    use std::error::Error;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = MosaicError::FileSystem {
            path: "/tmp/frames".into(),
            operation: "read directory",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(error.to_string().contains("read directory"));
    }

    // Tests the neighbor count error names both numbers
    // Verified by omitting the available count
    #[test]
    fn test_neighbor_count_message() {
        let error = MosaicError::NeighborCountExceedsPool {
            requested: 5,
            available: 2,
        };

        let message = error.to_string();
        assert!(message.contains('5'));
        assert!(message.contains('2'));
    }

    // Tests stage tags prefix the message and expose the inner error
    // Verified by dropping the stage name from Display
    #[test]
    fn test_stage_tag() {
        let result: Result<(), MosaicError> = Err(MosaicError::EmptyCandidatePool {
            directory: "frames".into(),
        });

        let error = result.in_stage(PipelineStage::BuildIndex).unwrap_err();

        assert_eq!(error.stage(), Some(PipelineStage::BuildIndex));
        assert!(error.to_string().starts_with("Stage 'build index' failed"));
        assert!(error.to_string().contains("frames"));
        assert!(error.source().is_some());
        assert!(matches!(
            error.root(),
            MosaicError::EmptyCandidatePool { .. }
        ));
    }

    // Tests io errors convert through the stage helper
    // Verified by removing the io::Error conversion
    #[test]
    fn test_io_error_conversion() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::other("disk full"));

        let error = result.in_stage(PipelineStage::SaveOutput).unwrap_err();
        assert!(matches!(error.root(), MosaicError::FileSystem { .. }));
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let message = invalid_parameter("tile_size", &0, &"must be positive").to_string();
        assert!(message.contains("tile_size"));
        assert!(message.contains("'0'"));
        assert!(message.contains("must be positive"));
    }

    // Tests untagged errors report no stage
    // Verified by defaulting stage to Assemble
    #[test]
    fn test_untagged_has_no_stage() {
        let error = MosaicError::Cancelled {
            completed: 3,
            total: 10,
        };
        assert_eq!(error.stage(), None);
        assert!(error.to_string().contains("3 of 10"));
    }
}
