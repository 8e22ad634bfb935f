//! Pipeline stages, in execution order
//!
//! region → filtering → identifiers → ordering → numbering → generation

pub mod filtering;
pub mod generation;
pub mod identifiers;
pub mod numbering;
pub mod ordering;
pub mod region;

pub use filtering::FilteringStage;
pub use generation::GenerationStage;
pub use identifiers::{IdentifierNormalizer, normalize_guide_ids, strip_region_suffix};
pub use numbering::NumberingStage;
pub use ordering::OrderingStage;
pub use region::{RegionNameTable, RegionResolver};
