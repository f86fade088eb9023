//! Brain extraction behind a swappable capability interface

mod evolution;
pub mod icosphere;
pub mod surface;

pub use evolution::SurfaceEvolutionExtractor;

use crate::error::Result;
use crate::types::{ExtractionParameters, Mesh, SegmentedVolume, Volume};

/// Output of a brain extractor
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Closed surface around the brain, in world coordinates
    pub mesh: Mesh,
    /// Brain mask and masked intensities on the input grid
    pub segmented: SegmentedVolume,
}

/// Segments the brain from a volume
///
/// Implementations must return a segmented volume with the same geometry
/// as the input.
pub trait BrainExtractor {
    /// Short identifier used in logs and reports
    fn name(&self) -> &str;

    /// Runs the extraction
    ///
    /// # Errors
    ///
    /// Returns `Extraction` when the algorithm cannot produce a surface.
    fn extract(&self, volume: &Volume, params: &ExtractionParameters) -> Result<Extraction>;
}
