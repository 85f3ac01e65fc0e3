pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod plot;
pub mod timeline;

pub use config::{ChartStyle, Config, OutputSettings, SourceLayout};
pub use fetch::{HtmlSource, TimelineSource, WebSource};
pub use timeline::{Observation, RawObservation, RawTimeline, Timeline};
