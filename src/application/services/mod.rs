pub mod images;
pub mod lookup;

pub use images::{RecordResolution, Resolution, resolve_image, resolve_records};
pub use lookup::{LookupMode, LookupPlan, PlannedRecord, plan_lookup};
