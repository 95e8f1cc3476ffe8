pub mod annotator;
pub mod app;
pub mod cli;
pub mod dom;
pub mod settings;

pub use annotator::{hours_label, AnnotationReport, AnnotatorOptions, PriceAnnotator};
pub use app::{HoursApp, PageReport, RateStatus};
pub use dom::{Annotation, PriceDom, PriceElement, SnapshotDom};
pub use settings::SettingsService;
