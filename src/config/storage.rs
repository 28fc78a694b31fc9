use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageConfig {
    /// Prefix prepended to every object key written for an uploaded song
    pub key_prefix: String,
}

impl StorageConfig {
    pub fn object_key(&self, song_id: &uuid::Uuid) -> String {
        format!("{}{}.wav", self.key_prefix, song_id)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: "songs/".to_string(),
        }
    }
}
