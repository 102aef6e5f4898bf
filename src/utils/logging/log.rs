//! Logging utilities
//!
//! This module provides standardized logging functions for pipeline stages.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

/// Log a stage start with consistent format
///
/// # Arguments
/// * `stage` - Description of the stage
/// * `items` - Number of items the stage will process
pub fn log_stage_start(stage: &str, items: usize) {
    log::info!("{stage}: starting on {items} items");
}

/// Log a stage completion with consistent format
///
/// # Arguments
/// * `stage` - Description of the stage
/// * `items` - Number of items processed
/// * `elapsed` - Optional elapsed time
pub fn log_stage_complete(stage: &str, items: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!("{stage}: completed {items} items in {duration:?}");
    } else {
        log::info!("{stage}: completed {items} items");
    }
}

/// Log a data-quality problem for one disease.
///
/// These never stop processing; the affected value is skipped or read as unknown.
pub fn log_data_quality_warning(orpha_code: &str, issue: impl Display) {
    log::warn!("Data quality [ORPHA:{orpha_code}]: {issue}");
}

/// Log a warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `path` - Optional path related to the warning
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}
