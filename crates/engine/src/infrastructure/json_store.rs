//! JSON-file persistence for projects and image assets.
//!
//! Each project and asset is one pretty-printed JSON document under the data
//! directory. Good enough for a single-process engine; the port traits keep
//! the door open for a real database later.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use storyreel_domain::{AssetId, Project, ProjectId};

use crate::ports::{AssetStoreError, AssetStorePort, ProjectRepo, RepoError, StoredAsset};

pub struct JsonProjectStore {
    projects_dir: PathBuf,
    assets_dir: PathBuf,
}

impl JsonProjectStore {
    /// Open (and create if needed) the store rooted at `data_dir`.
    pub async fn open(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let data_dir = data_dir.as_ref();
        let projects_dir = data_dir.join("projects");
        let assets_dir = data_dir.join("assets");
        tokio::fs::create_dir_all(&projects_dir).await?;
        tokio::fs::create_dir_all(&assets_dir).await?;
        Ok(Self {
            projects_dir,
            assets_dir,
        })
    }

    fn project_path(&self, id: ProjectId) -> PathBuf {
        self.projects_dir.join(format!("{id}.json"))
    }

    fn asset_path(&self, id: AssetId) -> PathBuf {
        self.assets_dir.join(format!("{id}.json"))
    }

    /// Store a new asset; used by the asset upload path.
    pub async fn put_asset(&self, asset: &StoredAsset) -> Result<(), AssetStoreError> {
        let json =
            serde_json::to_vec_pretty(asset).map_err(|e| AssetStoreError::store("put_asset", e))?;
        tokio::fs::write(self.asset_path(asset.id), json)
            .await
            .map_err(|e| AssetStoreError::store("put_asset", e))
    }
}

#[async_trait]
impl ProjectRepo for JsonProjectStore {
    async fn get(&self, id: ProjectId) -> Result<Option<Project>, RepoError> {
        let path = self.project_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepoError::storage("get_project", e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| RepoError::Serialization(e.to_string()))
    }

    async fn save(&self, project: &Project) -> Result<(), RepoError> {
        let json = serde_json::to_vec_pretty(project)
            .map_err(|e| RepoError::Serialization(e.to_string()))?;
        // Write-then-rename so a crash mid-write never truncates the document
        let path = self.project_path(project.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| RepoError::storage("save_project", e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| RepoError::storage("save_project", e))
    }

    async fn list(&self) -> Result<Vec<Project>, RepoError> {
        let mut projects = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.projects_dir)
            .await
            .map_err(|e| RepoError::storage("list_projects", e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::storage("list_projects", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| RepoError::storage("list_projects", e))?;
            match serde_json::from_slice::<Project>(&bytes) {
                Ok(project) => projects.push(project),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable project file");
                }
            }
        }
        projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(projects)
    }
}

#[async_trait]
impl AssetStorePort for JsonProjectStore {
    async fn get(&self, id: AssetId) -> Result<Option<StoredAsset>, AssetStoreError> {
        let path = self.asset_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AssetStoreError::store("get_asset", e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| AssetStoreError::store("get_asset", e))
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<StoredAsset>, AssetStoreError> {
        let mut assets = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.assets_dir)
            .await
            .map_err(|e| AssetStoreError::store("list_assets", e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AssetStoreError::store("list_assets", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| AssetStoreError::store("list_assets", e))?;
            match serde_json::from_slice::<StoredAsset>(&bytes) {
                Ok(asset) if asset.project_id == project_id => assets.push(asset),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable asset file");
                }
            }
        }
        // Stable order: upload time, then id to break ties
        assets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(assets)
    }
}
