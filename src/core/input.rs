//! Selected input images and their identities.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::utils::ResizerError;

/// Stable identity of a selected image. Never reused within one batch coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(u64);

impl ImageId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for ImageId {
    type Err = ResizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#')
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ResizerError::state(format!("Invalid image id: {s}")))
    }
}

/// One user-selected original file.
///
/// Immutable after creation; owned by its resize controller.
#[derive(Clone)]
pub struct InputImage {
    pub id: ImageId,
    pub name: String,
    pub raw: Arc<[u8]>,
}

impl InputImage {
    pub fn new(id: ImageId, name: impl Into<String>, raw: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id,
            name: name.into(),
            raw: raw.into(),
        }
    }
}

impl fmt::Debug for InputImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputImage")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("raw_len", &self.raw.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_parses_with_or_without_hash() {
        assert_eq!("#7".parse::<ImageId>().unwrap(), ImageId::new(7));
        assert_eq!("7".parse::<ImageId>().unwrap(), ImageId::new(7));
        assert!("seven".parse::<ImageId>().is_err());
    }

    #[test]
    fn id_displays_with_hash() {
        assert_eq!(ImageId::new(3).to_string(), "#3");
    }
}
