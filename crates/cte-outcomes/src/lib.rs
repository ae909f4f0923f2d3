//! Outcome-measure visualization pipeline.
//!
//! An outcome is flattened into resolved measurement rows, classified into
//! one of four shapes, and then turned into a declarative chart and a
//! plain-language interpretation. Both outputs are pure functions of the
//! outcome record and the heuristic tables.

pub mod chart;
pub mod error;
pub mod heuristics;
pub mod interpret;
pub mod normalize;
pub mod shape;
pub mod visualize;

pub use chart::{
    AxisLabels, ChartKind, ChartSpec, Marker, PALETTE, Point, PointX, Series, build_chart,
    normal_density, sanitize_title, sort_time_points,
};
pub use error::{HeuristicsError, Result};
pub use heuristics::Heuristics;
pub use interpret::{Interpretation, Section, SectionBody, interpret};
pub use normalize::{MeasurementRow, flatten, parse_number};
pub use shape::{OutcomeShape, classify};
pub use visualize::{OutcomeVisualization, visualize, visualize_study};
