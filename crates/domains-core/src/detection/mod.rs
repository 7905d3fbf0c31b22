pub mod components;
pub mod config;
pub mod domain;
pub mod measure;
pub mod outline;
pub mod threshold;

pub use config::DomainFilter;
pub use domain::{detect_domains, Detection, Domain};
pub use measure::ShapeMeasurements;
pub use outline::Outline;
