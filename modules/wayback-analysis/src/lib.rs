pub mod aggregate;
pub mod changes;
pub mod diff;
pub mod error;
pub mod export;
pub mod robots;

pub use aggregate::{folder_table, status_class, status_table, CountTable, StatusClass, YearRow};
pub use changes::{change_counts, change_history, top_changing, HISTORY_LIMIT};
pub use diff::{semantic_diff, DiffOp, DiffSpan};
pub use error::{AnalysisError, Result};
pub use export::{export_file_name, select, write_csv, ExportFilter};
pub use robots::{
    compare, dedupe_versions, find_version, robots_content, robots_history, timeline,
    RobotsComparison, TimelineEntry,
};
