mod classifier;
mod lexicon;

pub use classifier::{classify_stage, LayerClassifier, LayerRules};
pub use lexicon::{
    Lexicon, LexiconConfig, DEFAULT_HUB_SUBCLASS_THRESHOLD, DEFAULT_RELATIONSHIP_THRESHOLD,
};
