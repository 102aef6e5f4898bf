//! Logging utilities for stage output and progress tracking
//!
//! This module provides consistent log lines for pipeline stages and
//! data-quality warnings, plus progress bars for the per-disease pass.

pub mod log;
pub mod progress;

// Re-export commonly used functions for convenience
pub use log::{log_data_quality_warning, log_stage_complete, log_stage_start, log_warning};
pub use progress::{create_main_progress_bar, create_spinner, finish_progress_bar};
