/// Process-wide libvips settings applied once by [`crate::initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of libvips worker threads per pipeline.
    pub concurrency: i32,
    /// Upper bound of the operation cache, in bytes.
    pub cache_max_mem: usize,
    /// Upper bound of the operation cache, in operations.
    pub cache_max: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            concurrency: 1,
            cache_max_mem: 100 * 1024 * 1024,
            cache_max: 500,
        }
    }
}

impl Config {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}
