pub mod classifier;
pub mod taxonomy;

pub use classifier::{ClassificationError, build_classification_prompt, parse_emotion_response, resolve_label};
pub use taxonomy::{EmotionEntry, EmotionLabel, EmotionTaxonomy, TaxonomyLoader, FALLBACK_LABEL};
