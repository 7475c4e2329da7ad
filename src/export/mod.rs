//! Static PNG and animated GIF export.
//!
//! Export always renders a private clone of the layers, so live animation progress is never
//! touched.

/// Static and animated export entry points.
pub mod exporter;
/// Frame sink trait and built-in sinks.
pub mod sink;
