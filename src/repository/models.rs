use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RepositoryError;
use crate::fingerprint::{self, Fingerprint};

pub const MIN_SONG_YEAR: i32 = 1800;

/// Catalog entry for an uploaded recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: i32,
    /// Object store key of the uploaded WAV
    pub s3_key: String,
    /// Packed fingerprints, see [`fingerprint::encode_blob`]
    pub fingerprint_blob: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl Song {
    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        fingerprint::decode_blob(&self.fingerprint_blob)
            .into_iter()
            .map(|fp| fp.with_song_id(self.id))
            .collect()
    }

    /// Field checks applied before a song is persisted
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.id.is_nil() {
            return Err(RepositoryError::InvalidSong("id is required".into()));
        }
        if self.title.trim().is_empty() {
            return Err(RepositoryError::InvalidSong("title is required".into()));
        }
        if self.artist.trim().is_empty() {
            return Err(RepositoryError::InvalidSong("artist is required".into()));
        }
        if self.s3_key.trim().is_empty() {
            return Err(RepositoryError::InvalidSong("storage key is required".into()));
        }

        let max_year = Utc::now().year() + 1;
        if !(MIN_SONG_YEAR..=max_year).contains(&self.year) {
            return Err(RepositoryError::InvalidSong(format!(
                "year {} is outside {MIN_SONG_YEAR}..={max_year}",
                self.year
            )));
        }
        Ok(())
    }
}

/// Fingerprint row with its repository-assigned id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFingerprint {
    pub id: i64,
    pub song_id: Uuid,
    pub hash: u32,
    pub time_offset: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> Song {
        Song {
            id: Uuid::new_v4(),
            title: "Blue in Green".into(),
            artist: "Miles Davis".into(),
            album: "Kind of Blue".into(),
            year: 1959,
            s3_key: "songs/blue.wav".into(),
            fingerprint_blob: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn accepts_complete_song() {
        assert!(song().validate().is_ok());
    }

    #[test]
    fn album_is_optional() {
        let song = Song {
            album: String::new(),
            ..song()
        };
        assert!(song.validate().is_ok());
    }

    #[test]
    fn rejects_blank_fields() {
        for song in [
            Song { id: Uuid::nil(), ..song() },
            Song { title: "  ".into(), ..song() },
            Song { artist: String::new(), ..song() },
            Song { s3_key: String::new(), ..song() },
        ] {
            assert!(matches!(song.validate(), Err(RepositoryError::InvalidSong(_))));
        }
    }

    #[test]
    fn year_bounds() {
        let next_year = Utc::now().year() + 1;
        assert!(Song { year: 1800, ..song() }.validate().is_ok());
        assert!(Song { year: next_year, ..song() }.validate().is_ok());
        assert!(Song { year: 1799, ..song() }.validate().is_err());
        assert!(Song { year: next_year + 1, ..song() }.validate().is_err());
    }

    #[test]
    fn blob_fingerprints_carry_song_id() {
        let mut song = song();
        song.fingerprint_blob = vec![0, 0, 0, 9, 0, 0, 0, 4];
        let fps = song.fingerprints();
        assert_eq!(fps.len(), 1);
        assert_eq!(fps[0].song_id, Some(song.id));
        assert_eq!(fps[0].hash, 9);
        assert_eq!(fps[0].time_offset, 4);
    }
}
