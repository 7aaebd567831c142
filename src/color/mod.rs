/// Mean color extraction across a worker pool
pub mod extractor;
/// K-d tree nearest-color index
pub mod index;
