use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::spam::StoreError;

/// A contact-form submission accepted past the spam guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub received_at_ms: i64,
    /// Identity key the submission was rate-limited under, kept for abuse
    /// triage.
    pub identity: String,
}

/// Sled-backed mailbox for accepted contact messages.
pub struct MessageStore {
    tree: sled::Tree,
}

impl MessageStore {
    pub fn open(db: &sled::Db) -> Result<Self, StoreError> {
        let tree = db.open_tree("contact_messages")?;
        Ok(Self { tree })
    }

    /// Persist an accepted submission, returning the stored message.
    pub fn save(
        &self,
        name: &str,
        email: &str,
        body: &str,
        identity: &str,
    ) -> Result<ContactMessage, StoreError> {
        let msg = ContactMessage {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            body: body.to_string(),
            received_at_ms: Utc::now().timestamp_millis(),
            identity: identity.to_string(),
        };
        // Key by timestamp then id so iteration yields arrival order.
        let key = format!("{:020}:{}", msg.received_at_ms, msg.id);
        let value = bincode::serialize(&msg)?;
        self.tree.insert(key.as_bytes(), value)?;
        Ok(msg)
    }

    /// All stored messages in arrival order, skipping undecodable entries.
    pub fn list(&self) -> Result<Vec<ContactMessage>, StoreError> {
        let mut out = Vec::new();
        for item in self.tree.iter() {
            let (_, raw) = item?;
            if let Ok(msg) = bincode::deserialize::<ContactMessage>(&raw) {
                out.push(msg);
            }
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}
