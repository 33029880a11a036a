//! Realtime change protocol
//!
//! Server → client only. After a successful write the server pushes a
//! `Change` to every socket of the owning user; clients re-fetch or patch
//! their cache. `Resync` is sent when a socket fell behind and missed events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{CatalogItem, Collection, ItemImage};

/// Table a change happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Items,
    Collections,
    ItemImages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ChangeKind {
    Insert { record: Value },
    Update { record: Value },
    Delete { id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

/// Message on `GET /api/realtime/ws`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RealtimeMessage {
    /// Subscription established
    Ready,
    Change { event: ChangeEvent },
    /// Events were dropped; reload everything
    Resync,
}

fn record<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl ChangeEvent {
    pub fn item_inserted(item: &CatalogItem) -> Self {
        Self {
            table: ChangeTable::Items,
            kind: ChangeKind::Insert {
                record: record(item),
            },
        }
    }

    pub fn item_updated(item: &CatalogItem) -> Self {
        Self {
            table: ChangeTable::Items,
            kind: ChangeKind::Update {
                record: record(item),
            },
        }
    }

    pub fn collection_inserted(collection: &Collection) -> Self {
        Self {
            table: ChangeTable::Collections,
            kind: ChangeKind::Insert {
                record: record(collection),
            },
        }
    }

    pub fn collection_updated(collection: &Collection) -> Self {
        Self {
            table: ChangeTable::Collections,
            kind: ChangeKind::Update {
                record: record(collection),
            },
        }
    }

    pub fn image_inserted(image: &ItemImage) -> Self {
        Self {
            table: ChangeTable::ItemImages,
            kind: ChangeKind::Insert {
                record: record(image),
            },
        }
    }

    pub fn image_updated(image: &ItemImage) -> Self {
        Self {
            table: ChangeTable::ItemImages,
            kind: ChangeKind::Update {
                record: record(image),
            },
        }
    }

    pub fn deleted(table: ChangeTable, id: i64) -> Self {
        Self {
            table,
            kind: ChangeKind::Delete { id },
        }
    }

    /// Decode the inserted/updated record as a concrete row type
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        match &self.kind {
            ChangeKind::Insert { record } | ChangeKind::Update { record } => {
                serde_json::from_value(record.clone()).ok()
            }
            ChangeKind::Delete { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape() {
        let msg = RealtimeMessage::Change {
            event: ChangeEvent::deleted(ChangeTable::Items, 42),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "Change",
                "event": {"table": "items", "op": "delete", "id": 42}
            })
        );
        let back: RealtimeMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn decode_record() {
        let image = ItemImage {
            id: 3,
            item_id: 1,
            url: "https://cdn.example.com/a.jpg".into(),
            is_primary: true,
            created_at: 0,
        };
        let event = ChangeEvent::image_inserted(&image);
        assert_eq!(event.decode::<ItemImage>(), Some(image));
        assert_eq!(
            ChangeEvent::deleted(ChangeTable::ItemImages, 3).decode::<ItemImage>(),
            None
        );
    }
}
