//! Run aggregation and report rendering.
//!
//! A [`ReportSummary`] is derived from a [`crate::pipeline::BenchmarkRun`]
//! and rendered twice: as Markdown for people and as JSON for machines.

pub mod aggregate;
pub mod render;

pub use aggregate::{
    AxisAverages, FailureEntry, ReportAggregator, ReportSummary, ResultRow, AXIS_NAMES,
    DEFAULT_TOP_N, STRENGTH_THRESHOLD, WEAKNESS_THRESHOLD,
};
pub use render::{render_json, render_markdown, write_reports, ReportPaths};
