pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;

pub use error::{ResizerError, ResizerResult};
pub use validation::{validate_target_size, validate_file_name, MAX_DIMENSION, MAX_PIXELS};
pub use formats::{detect_format, ensure_encodable, prepare_for_encoding, format_name};
pub use fs::{read_input, save_artifact, save_archive};
