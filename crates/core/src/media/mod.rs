//! Media classification.
//!
//! Maps a source file to one of the three categories the converter knows
//! how to handle. Extension lookup is tried first; unknown extensions fall
//! back to the MIME registry.

mod classify;
mod types;

pub use classify::{
    classify, target_formats_for, AUDIO_EXTENSIONS, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS,
};
pub use types::MediaCategory;
