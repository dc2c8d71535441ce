/// workbook export for generated schedules
pub mod sheets;
pub mod workbook;

use thiserror::Error;

pub use workbook::{file_stem, Sheet, Workbook};

/// errors writing a workbook to disk
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
