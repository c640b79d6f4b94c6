//! Learned color models: their file format, the read-only store the matcher
//! scores against, and the learner that produces them from recorded results.

mod learner;
mod model_file;
mod model_store;

pub use learner::{ModelLearner, MASK_SUFFIX, MEASUREMENT_EXTENSION, RECORDING_EXTENSION};
pub use model_file::{
    load_model, model_path, save_model, validate_model_name, ColorSetEntry, ModelDocument,
    ModelSection, MODEL_FILE_EXTENSION,
};
pub use model_store::{MergeOutcome, ModelStore, ModelStoreBuilder};
