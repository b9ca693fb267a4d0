pub mod export_record;
pub mod parameters;
pub mod problem;

pub use export_record::ExportRecord;
pub use parameters::SessionParameters;
pub use problem::ProblemReport;
