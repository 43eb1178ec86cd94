//! Parallel processing strategy
//!
//! Reads retorno files with tokio and parses them on the blocking pool, several
//! at a time. Results are buffered in input order, so the output is identical
//! to the sequential strategy's.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (max_concurrent_files)
//!     ├── tokio::fs::read (file contents)
//!     ├── spawn_blocking (RetornoParser, one file per task)
//!     └── futures::StreamExt::buffered (ordered, bounded concurrency)
//! ```
//!
//! The parser holds state for exactly one file and the layout tables are
//! `'static`, so files share nothing while they are parsed.

use crate::strategy::{
    parse_retorno, write_file_events, FileEvents, ProcessingStrategy, RetornoSummary,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Configuration for parallel processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Maximum number of files read and parsed concurrently
    pub max_concurrent_files: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, falling back to the default for zero
    pub fn new(max_concurrent_files: usize) -> Self {
        let default = Self::default();

        let max_concurrent_files = if max_concurrent_files == 0 {
            warn!(
                "Invalid max_concurrent_files ({}), using default ({})",
                max_concurrent_files, default.max_concurrent_files
            );
            default.max_concurrent_files
        } else {
            max_concurrent_files
        };

        Self {
            max_concurrent_files,
        }
    }
}

/// Parallel processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

async fn read_and_parse(path: PathBuf) -> Result<FileEvents, String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;
    let file = path.display().to_string();
    tokio::task::spawn_blocking(move || parse_retorno(file, &bytes))
        .await
        .map_err(|e| format!("Parse task for '{}' failed: {}", path.display(), e))
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Parse the files concurrently and write their events in input order
    ///
    /// # Error Handling
    ///
    /// The first unreadable file fails the whole run; parse problems are
    /// logged per file, as in the sequential strategy.
    fn process(
        &self,
        input_paths: &[PathBuf],
        output: &mut dyn Write,
    ) -> Result<RetornoSummary, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_files)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let files: Vec<FileEvents> = runtime.block_on(
            stream::iter(input_paths.to_vec())
                .map(read_and_parse)
                .buffered(self.config.max_concurrent_files)
                .try_collect(),
        )?;

        write_file_events(&files, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::sync::SyncProcessingStrategy;
    use crate::strategy::test_support::{create_temp_file, remessa_bytes};
    use rstest::rstest;
    use std::path::Path;

    #[rstest]
    #[case::single_worker(1)]
    #[case::more_workers_than_files(8)]
    fn test_async_matches_sync_output(#[case] workers: usize) {
        let files: Vec<_> = (1..=5)
            .map(|n| create_temp_file(&remessa_bytes(&vec![100 * n; n as usize])))
            .collect();
        let paths: Vec<PathBuf> = files.iter().map(|f| f.path().to_path_buf()).collect();

        let mut expected = Vec::new();
        let expected_summary = SyncProcessingStrategy.process(&paths, &mut expected).unwrap();

        let mut output = Vec::new();
        let summary = AsyncProcessingStrategy::new(BatchConfig::new(workers))
            .process(&paths, &mut output)
            .unwrap();

        assert_eq!(output, expected);
        assert_eq!(summary, expected_summary);
        assert_eq!(summary.events, 15);
        // Header plus 1 + 2 + 3 + 4 + 5 events
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 16);
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let good = create_temp_file(&remessa_bytes(&[100]));
        let paths = vec![good.path().to_path_buf(), Path::new("missing.ret").to_path_buf()];

        let mut output = Vec::new();
        let result = AsyncProcessingStrategy::new(BatchConfig::default()).process(&paths, &mut output);
        assert!(result.unwrap_err().contains("Failed to open file"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_batch_config_zero_falls_back_to_default() {
        assert_eq!(BatchConfig::new(0).max_concurrent_files, num_cpus::get());
        assert_eq!(BatchConfig::new(3).max_concurrent_files, 3);
    }
}
