//! Effective access resolved for a user on a node.

use serde::{Deserialize, Serialize};

use crate::share::ShareRole;

/// Effective access, ordered `None < Viewer < Editor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Access {
    /// No access.
    None,
    /// Read access.
    Viewer,
    /// Read and write access.
    Editor,
}

impl Access {
    /// Whether the caller may read the node.
    pub fn can_read(&self) -> bool {
        *self >= Self::Viewer
    }

    /// Whether the caller may mutate the node.
    pub fn can_write(&self) -> bool {
        *self == Self::Editor
    }

    /// Whether this access satisfies `required`.
    pub fn satisfies(&self, required: Access) -> bool {
        *self >= required
    }
}

impl From<ShareRole> for Access {
    fn from(role: ShareRole) -> Self {
        match role {
            ShareRole::Viewer => Self::Viewer,
            ShareRole::Editor => Self::Editor,
        }
    }
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Viewer => write!(f, "VIEWER"),
            Self::Editor => write!(f, "EDITOR"),
        }
    }
}
