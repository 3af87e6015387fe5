//! Cross-cutting wrappers around the pipeline

mod instrumented;

pub use instrumented::InstrumentedShortener;
