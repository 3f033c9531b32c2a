//! Built-in breed knowledge and knowledge file loading.

use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Breed reference text used when no knowledge file is available.
///
/// Sections are separated by blank lines so the chunker keeps each breed
/// together.
pub const DEFAULT_KNOWLEDGE: &str = "\
Indian Cattle Breeds Knowledge Base

SAHIWAL:
- Origin: Punjab region, India/Pakistan
- Characteristics: Reddish brown color, drooping ears, hump in males
- Milk yield: 2000-3000 liters per lactation
- Adaptability: Heat tolerant, good for tropical climates
- Uses: Dairy production, crossbreeding programs

GIR:
- Origin: Gujarat, India
- Characteristics: Red and white spotted, large hump, long ears
- Milk yield: 1500-2000 liters per lactation
- Adaptability: Hardy, drought resistant
- Uses: Dairy and draught purposes

RED SINDHI:
- Origin: Sindh region, Pakistan
- Characteristics: Deep red color, white markings on face and legs
- Milk yield: 1800-2500 liters per lactation
- Adaptability: Heat tolerant, disease resistant
- Uses: Primarily dairy production

THARPARKAR:
- Origin: Thar Desert, Rajasthan
- Characteristics: White or light gray color, medium size
- Milk yield: 1200-1800 liters per lactation
- Adaptability: Desert adapted, drought resistant
- Uses: Dairy and draught in arid regions

HARIANA:
- Origin: Haryana, India
- Characteristics: White or light gray, compact body
- Milk yield: 1000-1500 liters per lactation
- Adaptability: Good for northern plains
- Uses: Dual purpose (dairy and draught)

JERSEY (Exotic):
- Origin: Jersey Island, UK
- Characteristics: Small size, fawn color, no hump
- Milk yield: 4000-6000 liters per lactation
- Adaptability: Requires good management, heat sensitive
- Uses: High milk production

HOLSTEIN FRIESIAN (Exotic):
- Origin: Netherlands/Germany
- Characteristics: Black and white patches, large size
- Milk yield: 6000-8000 liters per lactation
- Adaptability: Requires intensive management, heat sensitive
- Uses: Commercial dairy production

CROSSBREED IDENTIFICATION:
- Look for mixed characteristics from parent breeds
- Size, color, and conformation may vary
- Milk yield typically intermediate between parents
- May show hybrid vigor in some traits
";

/// Read the knowledge file, falling back to [`DEFAULT_KNOWLEDGE`].
///
/// A missing, unreadable, or blank file is not an error.
pub fn load_knowledge(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => {
            info!("Loaded knowledge base from {}", path.display());
            text
        }
        Ok(_) => {
            warn!("Knowledge base {} is empty, using built-in knowledge", path.display());
            DEFAULT_KNOWLEDGE.to_string()
        }
        Err(e) => {
            warn!(
                "Knowledge base {} not readable ({}), using built-in knowledge",
                path.display(),
                e
            );
            DEFAULT_KNOWLEDGE.to_string()
        }
    }
}
