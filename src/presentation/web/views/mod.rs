mod viewer;

pub use viewer::{ImageView, RecordRowView, ResultView, ViewerPageView};
