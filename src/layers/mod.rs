pub mod circle;
pub mod info_window;
pub mod macros;
pub mod marker;

use crate::core::map::MigrationMap;

/// Which map an overlay belongs to.
///
/// `Unset` (never attached) and `Cleared` (detached with `set_map(None)`)
/// are reported differently to callers and must stay distinct.
#[derive(Debug, Clone, Default)]
pub enum MapAttachment {
    #[default]
    Unset,
    Cleared,
    Attached(MigrationMap),
}

impl MapAttachment {
    pub fn map(&self) -> Option<&MigrationMap> {
        match self {
            MapAttachment::Attached(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, MapAttachment::Unset)
    }

    pub fn is_cleared(&self) -> bool {
        matches!(self, MapAttachment::Cleared)
    }
}

impl From<Option<&MigrationMap>> for MapAttachment {
    fn from(map: Option<&MigrationMap>) -> Self {
        match map {
            Some(map) => MapAttachment::Attached(map.clone()),
            None => MapAttachment::Cleared,
        }
    }
}
