//! Document model types shared by the analysis pipeline and the PDF engine.
//!
//! Everything here is created fresh per processing request. Roles and
//! spans are assigned once at analysis time and never mutated afterwards;
//! a new analysis produces new values.

mod element;
mod geometry;
mod segment;
mod span;
mod unit;

pub use element::{DocumentPosition, ElementContext, ElementRole};
pub use geometry::{Point, Rect, Rgb};
pub use segment::{join_segments, Segment, SegmentKind};
pub use span::{PageSpan, StyleFlags};
pub use unit::{DocumentMetadata, TextDocument, TextUnit};
