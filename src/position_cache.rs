use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{
    ACCEPT, ETAG, HeaderMap, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use serde::{Deserialize, Serialize};

use crate::api::ApiFailure;
use crate::reference::Position;

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "practice_planner";
const CACHE_FILE: &str = "positions.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    sports: BTreeMap<i64, CachedPositions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedPositions {
    positions: Vec<Position>,
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: i64,
}

/// Position lists per sport, revalidated with ETag / Last-Modified and kept
/// on disk between runs. Lists served without validators are not stored.
pub struct PositionCache {
    path: Option<PathBuf>,
    file: Mutex<Option<CacheFile>>,
}

impl PositionCache {
    pub fn in_user_cache() -> Self {
        Self::at(app_cache_dir().map(|dir| dir.join(CACHE_FILE)))
    }

    /// `None` keeps the cache in memory only.
    pub fn at(path: Option<PathBuf>) -> Self {
        Self {
            path,
            file: Mutex::new(None),
        }
    }

    /// Last stored list for a sport, without touching the network.
    pub fn cached(&self, sport_id: i64) -> Option<Vec<Position>> {
        self.entry(sport_id).map(|entry| entry.positions)
    }

    pub fn fetch(&self, client: &Client, url: &str, sport_id: i64) -> Result<Vec<Position>> {
        let cached = self.entry(sport_id);

        let mut req = client.get(url).header(ACCEPT, "application/json");
        if let Some(entry) = cached.as_ref() {
            if let Some(etag) = entry.etag.as_ref() {
                req = req.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = entry.last_modified.as_ref() {
                req = req.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        let resp = req.send().map_err(ApiFailure::transport)?;
        let status = resp.status();
        if status == StatusCode::NOT_MODIFIED {
            let Some(mut entry) = cached else {
                return Err(anyhow!("positions for sport {sport_id}: 304 without a stored list"));
            };
            entry.fetched_at = chrono::Utc::now().timestamp();
            let positions = entry.positions.clone();
            self.store(sport_id, entry);
            return Ok(positions);
        }

        let etag = header_text(resp.headers(), ETAG);
        let last_modified = header_text(resp.headers(), LAST_MODIFIED);
        let body = resp.text().map_err(ApiFailure::transport)?;
        if !status.is_success() {
            return Err(ApiFailure::from_response(status, &body).into());
        }
        let positions = serde_json::from_str::<Vec<Position>>(&body)
            .with_context(|| format!("unexpected positions response for sport {sport_id}"))?;

        if etag.is_some() || last_modified.is_some() {
            self.store(
                sport_id,
                CachedPositions {
                    positions: positions.clone(),
                    etag,
                    last_modified,
                    fetched_at: chrono::Utc::now().timestamp(),
                },
            );
        }
        Ok(positions)
    }

    fn entry(&self, sport_id: i64) -> Option<CachedPositions> {
        let mut guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        let file = guard.get_or_insert_with(|| self.load());
        file.sports.get(&sport_id).cloned()
    }

    fn store(&self, sport_id: i64, entry: CachedPositions) {
        let mut guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        let file = guard.get_or_insert_with(|| self.load());
        file.version = CACHE_VERSION;
        file.sports.insert(sport_id, entry);
        // Write failures only cost a full download next run.
        let _ = self.save(file);
    }

    fn load(&self) -> CacheFile {
        let Some(raw) = self.path.as_ref().and_then(|path| fs::read_to_string(path).ok()) else {
            return CacheFile::default();
        };
        serde_json::from_str::<CacheFile>(&raw)
            .ok()
            .filter(|file| file.version == CACHE_VERSION)
            .unwrap_or_default()
    }

    fn save(&self, file: &CacheFile) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("create position cache dir")?;
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(file).context("serialize position cache")?;
        fs::write(&tmp, json).context("write position cache")?;
        fs::rename(&tmp, path).context("swap position cache")?;
        Ok(())
    }
}

fn header_text(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("practice_planner_cache_{}_{name}", std::process::id()))
            .join(CACHE_FILE)
    }

    fn guard() -> Position {
        Position {
            id: 1,
            name: "Point Guard".to_string(),
            description: None,
            sport_id: 1,
            sport_name: None,
        }
    }

    #[test]
    fn stored_lists_survive_a_new_cache() {
        let path = scratch_path("reload");
        let cache = PositionCache::at(Some(path.clone()));
        cache.store(
            1,
            CachedPositions {
                positions: vec![guard()],
                etag: Some("\"v1\"".to_string()),
                last_modified: None,
                fetched_at: 0,
            },
        );

        let reopened = PositionCache::at(Some(path.clone()));
        assert_eq!(reopened.cached(1), Some(vec![guard()]));
        assert!(reopened.cached(2).is_none());
        let _ = fs::remove_dir_all(path.parent().unwrap_or(path.as_path()));
    }

    #[test]
    fn other_versions_are_ignored() {
        let path = scratch_path("version");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).expect("scratch dir");
        }
        let stale = r#"{"version":0,"sports":{"1":{"positions":[],"etag":"x","last_modified":null,"fetched_at":0}}}"#;
        fs::write(&path, stale).expect("write stale cache");

        let cache = PositionCache::at(Some(path.clone()));
        assert!(cache.cached(1).is_none());
        let _ = fs::remove_dir_all(path.parent().unwrap_or(path.as_path()));
    }
}
