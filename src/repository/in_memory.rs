use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FingerprintRepository, RepositoryError, Song, SongRepository, StoredFingerprint};
use crate::fingerprint::Fingerprint;

/// Song and fingerprint tables held in process memory
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
}

#[derive(Debug, Default)]
struct CatalogState {
    songs: HashMap<Uuid, Song>,
    /// Ordered by ascending id
    fingerprints: Vec<StoredFingerprint>,
    by_hash: HashMap<u32, Vec<usize>>,
    last_id: i64,
}

impl CatalogState {
    fn insert_fingerprint(&mut self, song_id: Uuid, fingerprint: &Fingerprint) -> i64 {
        let row = self.fingerprints.len();
        self.last_id += 1;
        let id = self.last_id;
        self.fingerprints.push(StoredFingerprint {
            id,
            song_id,
            hash: fingerprint.hash,
            time_offset: fingerprint.time_offset,
        });
        self.by_hash.entry(fingerprint.hash).or_default().push(row);
        id
    }

    fn rebuild_hash_index(&mut self) {
        self.by_hash.clear();
        for (row, fp) in self.fingerprints.iter().enumerate() {
            self.by_hash.entry(fp.hash).or_default().push(row);
        }
    }

    fn owner(&self, fingerprint: &Fingerprint) -> Result<Uuid, RepositoryError> {
        let song_id = fingerprint.song_id.ok_or(RepositoryError::MissingSongId)?;
        if !self.songs.contains_key(&song_id) {
            return Err(RepositoryError::UnknownSong(song_id));
        }
        Ok(song_id)
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn song_count(&self) -> usize {
        self.state.read().await.songs.len()
    }

    pub async fn fingerprint_count(&self) -> usize {
        self.state.read().await.fingerprints.len()
    }
}

#[async_trait]
impl SongRepository for InMemoryCatalog {
    async fn save_song(&self, song: Song) -> Result<(), RepositoryError> {
        song.validate()?;

        let mut state = self.state.write().await;
        if state.songs.contains_key(&song.id) {
            return Err(RepositoryError::Duplicate(song.id));
        }
        state.songs.insert(song.id, song);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Song>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.songs.get(&id).cloned())
    }

    async fn delete_song(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.songs.remove(&id).is_none() {
            return Err(RepositoryError::UnknownSong(id));
        }

        let before = state.fingerprints.len();
        state.fingerprints.retain(|fp| fp.song_id != id);
        if state.fingerprints.len() != before {
            state.rebuild_hash_index();
        }
        Ok(())
    }

    async fn find_by_fingerprint(&self, hash: u32) -> Result<Option<Song>, RepositoryError> {
        let state = self.state.read().await;
        let song = state
            .by_hash
            .get(&hash)
            .and_then(|rows| rows.first())
            .and_then(|&row| state.songs.get(&state.fingerprints[row].song_id))
            .cloned();
        Ok(song)
    }
}

#[async_trait]
impl FingerprintRepository for InMemoryCatalog {
    async fn save_fingerprint(&self, fingerprint: Fingerprint) -> Result<i64, RepositoryError> {
        let mut state = self.state.write().await;
        let song_id = state.owner(&fingerprint)?;
        Ok(state.insert_fingerprint(song_id, &fingerprint))
    }

    async fn save_fingerprints(
        &self,
        fingerprints: &[Fingerprint],
    ) -> Result<Vec<i64>, RepositoryError> {
        let mut state = self.state.write().await;
        let owners = fingerprints
            .iter()
            .map(|fp| state.owner(fp))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(owners
            .into_iter()
            .zip(fingerprints)
            .map(|(song_id, fp)| state.insert_fingerprint(song_id, fp))
            .collect())
    }

    async fn find_by_hash(&self, hash: u32) -> Result<Vec<StoredFingerprint>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .by_hash
            .get(&hash)
            .map(|rows| rows.iter().map(|&row| state.fingerprints[row]).collect())
            .unwrap_or_default())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StoredFingerprint>, RepositoryError> {
        let state = self.state.read().await;
        let row = state.fingerprints.binary_search_by_key(&id, |fp| fp.id).ok();
        Ok(row.map(|row| state.fingerprints[row]))
    }

    async fn find_by_song_id(
        &self,
        song_id: Uuid,
    ) -> Result<Vec<StoredFingerprint>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .fingerprints
            .iter()
            .filter(|fp| fp.song_id == song_id)
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn song(title: &str) -> Song {
        let id = Uuid::new_v4();
        Song {
            id,
            title: title.into(),
            artist: "Artist".into(),
            album: String::new(),
            year: 2001,
            s3_key: format!("songs/{id}.wav"),
            fingerprint_blob: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn fp(song_id: Uuid, hash: u32, time_offset: u32) -> Fingerprint {
        Fingerprint {
            song_id: Some(song_id),
            hash,
            time_offset,
        }
    }

    #[tokio::test]
    async fn saves_and_finds_songs() {
        let catalog = InMemoryCatalog::new();
        let song = song("First");
        catalog.save_song(song.clone()).await.unwrap();

        let found = SongRepository::find_by_id(&catalog, song.id).await.unwrap();
        assert_eq!(found, Some(song));
        let missing = SongRepository::find_by_id(&catalog, Uuid::new_v4()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn duplicate_and_invalid_songs_are_rejected() {
        let catalog = InMemoryCatalog::new();
        let song = song("Dup");
        catalog.save_song(song.clone()).await.unwrap();

        let err = catalog.save_song(song.clone()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(id) if id == song.id));

        let invalid = Song {
            year: 1700,
            ..self::song("Old")
        };
        let err = catalog.save_song(invalid).await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidSong(_)));
        assert_eq!(catalog.song_count().await, 1);
    }

    #[tokio::test]
    async fn hash_lookup_returns_every_row_in_order() {
        let catalog = InMemoryCatalog::new();
        let a = song("A");
        let b = song("B");
        catalog.save_song(a.clone()).await.unwrap();
        catalog.save_song(b.clone()).await.unwrap();

        let ids = catalog
            .save_fingerprints(&[fp(a.id, 7, 0), fp(a.id, 8, 1), fp(b.id, 7, 3)])
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 2, 3]);

        let rows = catalog.find_by_hash(7).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].song_id, a.id);
        assert_eq!(rows[1].song_id, b.id);
        assert_eq!(rows[1].time_offset, 3);
        assert!(catalog.find_by_hash(99).await.unwrap().is_empty());

        let owner = catalog.find_by_fingerprint(7).await.unwrap();
        assert_eq!(owner.map(|s| s.id), Some(a.id));
        assert!(catalog.find_by_fingerprint(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fingerprint_lookup_by_id_and_song() {
        let catalog = InMemoryCatalog::new();
        let a = song("A");
        catalog.save_song(a.clone()).await.unwrap();
        let id = catalog.save_fingerprint(fp(a.id, 5, 2)).await.unwrap();

        let row = FingerprintRepository::find_by_id(&catalog, id).await.unwrap();
        assert_eq!(
            row,
            Some(StoredFingerprint {
                id,
                song_id: a.id,
                hash: 5,
                time_offset: 2
            })
        );
        assert!(FingerprintRepository::find_by_id(&catalog, 0).await.unwrap().is_none());
        assert!(FingerprintRepository::find_by_id(&catalog, -4).await.unwrap().is_none());
        assert_eq!(catalog.find_by_song_id(a.id).await.unwrap().len(), 1);
        assert!(catalog.find_by_song_id(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_song_drops_its_fingerprints() {
        let catalog = InMemoryCatalog::new();
        let a = song("A");
        let b = song("B");
        catalog.save_song(a.clone()).await.unwrap();
        catalog.save_song(b.clone()).await.unwrap();
        catalog
            .save_fingerprints(&[fp(a.id, 7, 0), fp(b.id, 7, 1), fp(a.id, 9, 2)])
            .await
            .unwrap();

        catalog.delete_song(a.id).await.unwrap();
        assert!(SongRepository::find_by_id(&catalog, a.id).await.unwrap().is_none());
        assert!(catalog.find_by_song_id(a.id).await.unwrap().is_empty());
        assert!(catalog.find_by_hash(9).await.unwrap().is_empty());

        let rows = catalog.find_by_hash(7).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].song_id, b.id);
        assert_eq!(rows[0].id, 2);
        let same = FingerprintRepository::find_by_id(&catalog, 2).await.unwrap();
        assert_eq!(same, Some(rows[0]));
        assert_eq!(catalog.find_by_fingerprint(7).await.unwrap().map(|s| s.id), Some(b.id));

        let next = catalog.save_fingerprint(fp(b.id, 11, 3)).await.unwrap();
        assert_eq!(next, 4);

        let err = catalog.delete_song(a.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownSong(id) if id == a.id));
    }

    #[tokio::test]
    async fn batch_with_an_orphan_stores_nothing() {
        let catalog = InMemoryCatalog::new();
        let a = song("A");
        catalog.save_song(a.clone()).await.unwrap();

        let orphan = Fingerprint {
            song_id: None,
            hash: 1,
            time_offset: 0,
        };
        let err = catalog
            .save_fingerprints(&[fp(a.id, 1, 0), orphan])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingSongId));

        let err = catalog.save_fingerprint(fp(Uuid::new_v4(), 1, 0)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownSong(_)));
        assert_eq!(catalog.fingerprint_count().await, 0);
    }
}
