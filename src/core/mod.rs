pub mod engine;
pub mod extract;
pub mod fetch;
pub mod notify;
pub mod persist;
pub mod pipeline;
pub mod spreadsheet;

pub use crate::domain::model::{ReportArtifacts, StockRow, StockTable};
pub use crate::domain::ports::{Mailer, Pipeline, Storage};
pub use crate::utils::error::Result;
