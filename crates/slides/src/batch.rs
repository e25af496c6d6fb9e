//! Parallel conversion of independent documents.

use crate::convert_document;
use crate::options::ConvertOptions;
use deckmark_core::Presentation;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// A single document to convert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    /// Document identifier (typically the file path).
    pub id: String,
    /// Markdown or JSON source.
    pub source: String,
}

/// Result for a single document in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Identifier matching the input.
    pub id: String,
    /// Converted deck (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Presentation>,
    /// Error message (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Total number of documents submitted.
    pub total: u32,
    /// Number of successful conversions.
    pub succeeded: u32,
    /// Number of failed conversions.
    pub failed: u32,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to the global rayon pool.
    pub max_threads: Option<usize>,
    /// Whether to continue after an error. Defaults to true.
    pub continue_on_error: Option<bool>,
}

/// All results plus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct BatchProcessingResult {
    /// One result per processed input, in input order.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

/// Converts many documents in parallel.
///
/// Each document gets its own parsing context, so results never depend on
/// scheduling. Results come back in input order. With `continue_on_error`
/// off, documents are converted sequentially and processing stops after the
/// first failure.
pub fn convert_batch(
    inputs: Vec<BatchInput>,
    options: &ConvertOptions,
    batch: &BatchOptions,
) -> BatchProcessingResult {
    let start = Instant::now();
    let continue_on_error = batch.continue_on_error.unwrap_or(true);

    let pool = batch.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| log::warn!("Falling back to the global thread pool: {}", err))
            .ok()
    });

    let total = u32::try_from(inputs.len()).unwrap_or(u32::MAX);
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_input = |input: BatchInput| -> BatchResult {
        match convert_document(&input.source, options) {
            Ok(presentation) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    result: Some(presentation),
                    error: None,
                }
            }
            Err(e) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log::debug!("Conversion of '{}' failed: {}", input.id, e);
                BatchResult {
                    id: input.id,
                    result: None,
                    error: Some(e.to_string()),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if continue_on_error {
        if let Some(pool) = pool {
            pool.install(|| inputs.into_par_iter().map(process_input).collect())
        } else {
            inputs.into_par_iter().map(process_input).collect()
        }
    } else {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(input);
            let stop = result.error.is_some();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    };

    BatchProcessingResult {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: &str, source: &str) -> BatchInput {
        BatchInput {
            id: id.to_string(),
            source: source.to_string(),
        }
    }

    fn inputs() -> Vec<BatchInput> {
        vec![
            input("a.md", "# Alpha\n\n- one\n"),
            input("broken.json", "{ not json"),
            input("c.json", r#"{"title": "Gamma", "slides": []}"#),
        ]
    }

    #[test]
    fn keeps_input_order_and_counts() {
        let out = convert_batch(inputs(), &ConvertOptions::default(), &BatchOptions::default());

        let ids: Vec<&str> = out.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a.md", "broken.json", "c.json"]);
        assert_eq!(out.stats.total, 3);
        assert_eq!(out.stats.succeeded, 2);
        assert_eq!(out.stats.failed, 1);

        assert_eq!(
            out.results[0].result.as_ref().map(|p| p.title.as_str()),
            Some("Alpha")
        );
        assert!(out.results[1].error.is_some());
        assert_eq!(
            out.results[2].result.as_ref().map(|p| p.title.as_str()),
            Some("Gamma")
        );
    }

    #[test]
    fn stops_after_first_error_when_asked() {
        let batch = BatchOptions {
            max_threads: None,
            continue_on_error: Some(false),
        };
        let out = convert_batch(inputs(), &ConvertOptions::default(), &batch);
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.stats.failed, 1);
    }

    #[test]
    fn dedicated_pool() {
        let batch = BatchOptions {
            max_threads: Some(2),
            continue_on_error: None,
        };
        let out = convert_batch(inputs(), &ConvertOptions::default(), &batch);
        assert_eq!(out.results.len(), 3);
        assert_eq!(out.stats.succeeded, 2);
    }
}
