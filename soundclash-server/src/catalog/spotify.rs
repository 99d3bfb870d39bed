//! Spotify Web API client
//!
//! Client-credentials OAuth, then track/album/playlist lookups with
//! internal pagination until the cursor is exhausted. Every record is
//! normalized to a `Contestant` whose id is the canonical
//! open.spotify.com track URL.
//!
//! API reference: https://developer.spotify.com/documentation/web-api

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use soundclash_common::models::Contestant;
use soundclash_common::{Error, Result};

use crate::catalog::TrackCatalog;

/// Spotify Web API base URL
const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Client-credentials token endpoint
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Default timeout for Spotify API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Refresh the cached token this long before its stated expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("soundclash/", env!("CARGO_PKG_VERSION"));

fn unavailable(context: &str, err: impl std::fmt::Display) -> Error {
    Error::CatalogUnavailable(format!("{context}: {err}"))
}

/// The kind of catalog resource a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resource {
    Track,
    Album,
    Playlist,
}

/// Extract (resource kind, base-62 id) from an open.spotify.com URL or
/// a spotify: URI. Returns None for anything else.
fn parse_resource(url: &str) -> Option<(Resource, String)> {
    let kinds = [
        ("track", Resource::Track),
        ("album", Resource::Album),
        ("playlist", Resource::Playlist),
    ];

    if let Some(rest) = url.strip_prefix("spotify:") {
        let mut parts = rest.splitn(2, ':');
        let kind = parts.next()?;
        let id = parts.next()?;
        let (_, resource) = kinds.iter().find(|(name, _)| *name == kind)?;
        return Some((*resource, id.to_string()));
    }

    if !url.contains("spotify.com") {
        return None;
    }

    // Path segments, tolerating locale prefixes like /intl-fr/track/...
    let path = url.split_once("spotify.com/").map(|(_, p)| p)?;
    let mut segments = path.split('/');
    while let Some(segment) = segments.next() {
        if let Some((_, resource)) = kinds.iter().find(|(name, _)| *name == segment) {
            let id = segments.next()?.split(['?', '#']).next()?;
            if id.is_empty() {
                return None;
            }
            return Some((*resource, id.to_string()));
        }
    }

    None
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

// ---- Spotify response shapes (only the fields we read) ----

#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiAlbumRef {
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    /// None for local playlist files; those entries are skipped.
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    #[serde(default)]
    external_urls: ExternalUrls,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    album: Option<ApiAlbumRef>,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<ApiTrack>,
}

/// One page of a paginated listing; `next` is a complete URL.
#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

/// Spotify catalog client with a cached client-credentials token.
pub struct SpotifyCatalog {
    http: Client,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyCatalog {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
            client_id,
            client_secret,
            token: Mutex::new(None),
        }
    }

    /// Current access token, refreshed through the client-credentials
    /// flow when missing or near expiry.
    async fn bearer_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        debug!("requesting new Spotify access token");
        let response = self
            .http
            .post(SPOTIFY_TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| unavailable("Spotify token request failed", e))?
            .error_for_status()
            .map_err(|e| unavailable("Spotify token request rejected", e))?
            .json::<TokenResponse>()
            .await
            .map_err(|e| unavailable("Spotify token response malformed", e))?;

        let expires_at = Instant::now() + Duration::from_secs(response.expires_in)
            - TOKEN_EXPIRY_MARGIN;
        let access_token = response.access_token.clone();
        *cached = Some(CachedToken {
            access_token: response.access_token,
            expires_at,
        });

        Ok(access_token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let token = self.bearer_token().await?;
        self.http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| unavailable("Spotify request failed", e))?
            .error_for_status()
            .map_err(|e| unavailable("Spotify request rejected", e))?
            .json::<T>()
            .await
            .map_err(|e| unavailable("Spotify response malformed", e))
    }

    /// Walk a paginated listing until the `next` cursor is exhausted.
    async fn collect_pages<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut url = Some(first_url);

        while let Some(page_url) = url {
            let page: Page<T> = self.get_json(&page_url).await?;
            items.extend(page.items);
            url = page.next;
        }

        Ok(items)
    }

    async fn fetch_track(&self, id: &str) -> Result<Vec<Contestant>> {
        let track: ApiTrack = self.get_json(&format!("{SPOTIFY_API_URL}/tracks/{id}")).await?;
        Ok(contestant_from_track(track, None).into_iter().collect())
    }

    async fn fetch_album(&self, id: &str) -> Result<Vec<Contestant>> {
        // Album-track listings carry no per-track artwork, so fetch the
        // album once and inject its cover into every record.
        let album: ApiAlbum = self.get_json(&format!("{SPOTIFY_API_URL}/albums/{id}")).await?;
        let cover = album.images.first().map(|image| image.url.clone());

        let tracks: Vec<ApiTrack> = self
            .collect_pages(format!("{SPOTIFY_API_URL}/albums/{id}/tracks?limit=50"))
            .await?;

        Ok(tracks
            .into_iter()
            .filter_map(|track| contestant_from_track(track, cover.clone()))
            .collect())
    }

    async fn fetch_playlist(&self, id: &str) -> Result<Vec<Contestant>> {
        let items: Vec<PlaylistItem> = self
            .collect_pages(format!("{SPOTIFY_API_URL}/playlists/{id}/tracks?limit=100"))
            .await?;

        Ok(items
            .into_iter()
            // Local files show up as null tracks or tracks without an id
            .filter_map(|item| item.track)
            .filter_map(|track| contestant_from_track(track, None))
            .collect())
    }
}

/// Normalize one API track. Returns None for id-less (local) tracks.
fn contestant_from_track(track: ApiTrack, album_image: Option<String>) -> Option<Contestant> {
    let track_id = track.id?;
    let canonical_url = track
        .external_urls
        .spotify
        .unwrap_or_else(|| format!("https://open.spotify.com/track/{track_id}"));

    let image_url = album_image.or_else(|| {
        track
            .album
            .as_ref()
            .and_then(|album| album.images.first())
            .map(|image| image.url.clone())
    });

    let embed_html = format!(
        "<iframe style=\"border-radius:12px\" \
         src=\"https://open.spotify.com/embed/track/{track_id}?utm_source=generator\" \
         width=\"100%\" height=\"152\" frameBorder=\"0\" allowfullscreen=\"\" \
         allow=\"autoplay; clipboard-write; encrypted-media; fullscreen; picture-in-picture\" \
         loading=\"lazy\"></iframe>"
    );

    Some(Contestant {
        id: canonical_url.clone(),
        title: track.name,
        artist: track
            .artists
            .first()
            .map(|artist| artist.name.clone())
            .unwrap_or_else(|| "Unknown Artist".to_string()),
        image_url,
        embed_html: Some(embed_html),
        original_url: canonical_url,
        preview_url: track.preview_url,
    })
}

#[async_trait]
impl TrackCatalog for SpotifyCatalog {
    async fn lookup(&self, url: &str) -> Result<Vec<Contestant>> {
        let Some((resource, id)) = parse_resource(url) else {
            return Err(Error::CatalogUnavailable(format!(
                "not a recognized Spotify URL: {url}"
            )));
        };

        match resource {
            Resource::Track => self.fetch_track(&id).await,
            Resource::Album => self.fetch_album(&id).await,
            Resource::Playlist => self.fetch_playlist(&id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_track_urls() {
        let (resource, id) =
            parse_resource("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC").unwrap();
        assert_eq!(resource, Resource::Track);
        assert_eq!(id, "4uLU6hMCjMI75M1A2tKUQC");
    }

    #[test]
    fn parses_urls_with_query_and_locale() {
        let (resource, id) = parse_resource(
            "https://open.spotify.com/intl-de/album/6dVIqQ8qmQ5GBnJ9shOYGE?si=abc123",
        )
        .unwrap();
        assert_eq!(resource, Resource::Album);
        assert_eq!(id, "6dVIqQ8qmQ5GBnJ9shOYGE");
    }

    #[test]
    fn parses_spotify_uris() {
        let (resource, id) = parse_resource("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M").unwrap();
        assert_eq!(resource, Resource::Playlist);
        assert_eq!(id, "37i9dQZF1DXcBWIGoYBM5M");
    }

    #[test]
    fn rejects_foreign_urls() {
        assert!(parse_resource("https://example.com/track/123").is_none());
        assert!(parse_resource("https://open.spotify.com/artist/abc").is_none());
        assert!(parse_resource("not a url").is_none());
    }

    #[test]
    fn local_tracks_are_skipped() {
        let track = ApiTrack {
            id: None,
            name: "Local File".to_string(),
            artists: vec![],
            external_urls: ExternalUrls::default(),
            preview_url: None,
            album: None,
        };
        assert!(contestant_from_track(track, None).is_none());
    }

    #[test]
    fn album_image_wins_over_track_album() {
        let track = ApiTrack {
            id: Some("abc123".to_string()),
            name: "Song".to_string(),
            artists: vec![ApiArtist {
                name: "Artist".to_string(),
            }],
            external_urls: ExternalUrls::default(),
            preview_url: None,
            album: Some(ApiAlbumRef {
                images: vec![ApiImage {
                    url: "track-level.jpg".to_string(),
                }],
            }),
        };
        let contestant = contestant_from_track(track, Some("album-level.jpg".to_string())).unwrap();
        assert_eq!(contestant.image_url.as_deref(), Some("album-level.jpg"));
        assert_eq!(contestant.id, "https://open.spotify.com/track/abc123");
    }
}
