//! Item entity model.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of tree node. Folders sort before files.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "item_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    /// A folder; may have children, never has content.
    Folder,
    /// A file; always has a blob key, never has children.
    File,
}

impl ItemType {
    /// Return the type as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "FOLDER",
            Self::File => "FILE",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Blob key under which a file item's content is stored.
pub fn blob_key_for(item_id: Uuid) -> String {
    format!("items/{item_id}")
}

/// A node in the item forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    /// Unique item identifier.
    pub id: Uuid,
    /// The user who created the item. Never changes.
    pub owner_id: Uuid,
    /// Parent folder (None for roots).
    pub parent_id: Option<Uuid>,
    /// Folder or file.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Display name.
    pub name: String,
    /// MIME type supplied at upload (files only).
    pub mime_type: Option<String>,
    /// Content size in bytes (files only).
    pub size_bytes: Option<i64>,
    /// Blob store key (files only).
    pub blob_key: Option<String>,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last renamed or moved.
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Build a new folder owned by `owner_id`.
    pub fn new_folder(owner_id: Uuid, parent_id: Option<Uuid>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            parent_id,
            item_type: ItemType::Folder,
            name: name.into(),
            mime_type: None,
            size_bytes: None,
            blob_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a new file owned by `owner_id`; the blob key is derived from the new id.
    pub fn new_file(
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: impl Into<String>,
        mime_type: Option<String>,
        size_bytes: i64,
    ) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        Self {
            id,
            owner_id,
            parent_id,
            item_type: ItemType::File,
            name: name.into(),
            mime_type,
            size_bytes: Some(size_bytes),
            blob_key: Some(blob_key_for(id)),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is a root item (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this item is a folder.
    pub fn is_folder(&self) -> bool {
        self.item_type == ItemType::Folder
    }

    /// Check if this item is a file.
    pub fn is_file(&self) -> bool {
        self.item_type == ItemType::File
    }

    /// Listing order: folders first, then by name, then oldest first.
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        self.item_type
            .cmp(&other.item_type)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

/// Output record for an item; hides the owner and the blob key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    /// Item ID.
    pub id: Uuid,
    /// Parent folder ID.
    pub parent_id: Option<Uuid>,
    /// Folder or file.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Display name.
    pub name: String,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: Option<i64>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            parent_id: item.parent_id,
            item_type: item.item_type,
            name: item.name.clone(),
            mime_type: item.mime_type.clone(),
            size_bytes: item.size_bytes,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<Item> for ItemSummary {
    fn from(item: Item) -> Self {
        Self::from(&item)
    }
}
