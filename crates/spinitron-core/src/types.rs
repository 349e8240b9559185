//! Core data types for playlist entries and catalog matches
//!
//! Field names serialize in the camelCase shape consumers of the
//! playlist feed already expect (`artworkUrl100`, `itunes`, ...).

use serde::{Deserialize, Serialize};

/// One song logged in a scraped playlist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub song: Song,
    pub artist: Artist,
    pub disk: Disk,
    pub label: Label,
}

impl PlaylistEntry {
    /// Whether song, artist and disk names are all known
    ///
    /// Only entries with all three are worth a catalog lookup.
    pub fn is_identifiable(&self) -> bool {
        !self.song.name.is_empty() && !self.artist.name.is_empty() && !self.disk.name.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Spin id from the row anchor (e.g., "8812345")
    pub id: Option<String>,
    /// Play time as shown in the feed (e.g., "9:41 PM")
    pub time: String,
    pub name: String,
    /// Content code (e.g., "L" for local)
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
}

/// Release the song was played from, plus any catalog enrichment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url30: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url60: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url100: Option<String>,
    /// Catalog store page for the matched track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itunes: Option<String>,
}

impl Disk {
    /// Copies whatever artwork/reference fields the match carries
    pub fn apply(&mut self, track: &CatalogTrack) {
        if track.artwork_url30.is_some() {
            self.artwork_url30 = track.artwork_url30.clone();
        }
        if track.artwork_url60.is_some() {
            self.artwork_url60 = track.artwork_url60.clone();
        }
        if track.artwork_url100.is_some() {
            self.artwork_url100 = track.artwork_url100.clone();
        }
        if track.track_view_url.is_some() {
            self.itunes = track.track_view_url.clone();
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.artwork_url30.is_some()
            || self.artwork_url60.is_some()
            || self.artwork_url100.is_some()
            || self.itunes.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: Option<String>,
    pub name: String,
    /// Four-digit release year, when the feed shows one
    pub year: Option<String>,
}

/// One candidate returned by a catalog search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTrack {
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub collection_name: String,
    #[serde(default)]
    pub artwork_url30: Option<String>,
    #[serde(default)]
    pub artwork_url60: Option<String>,
    #[serde(default)]
    pub artwork_url100: Option<String>,
    #[serde(default)]
    pub track_view_url: Option<String>,
}

impl CatalogTrack {
    /// Case-insensitive match on artist and collection name
    pub fn matches(&self, entry: &PlaylistEntry) -> bool {
        self.artist_name.to_lowercase() == entry.artist.name.to_lowercase()
            && self.collection_name.to_lowercase() == entry.disk.name.to_lowercase()
    }
}
