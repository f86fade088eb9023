pub mod api;
pub mod cli;
pub mod error;
pub mod extraction;
pub mod io;
pub mod types;

pub use api::{run, OutputPaths, RunOptions, RunReport};
pub use cli::report::TextReport;
pub use error::{Result, SkullStripError};
pub use extraction::{BrainExtractor, Extraction, SurfaceEvolutionExtractor};
pub use types::*;
