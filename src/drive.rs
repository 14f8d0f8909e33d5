//! OneDrive operations over the Microsoft Graph REST API
//!
//! Each operation is a thin composition over the request executor and one or
//! two Graph endpoints. Listing and search follow `@odata.nextLink`
//! continuation links so results beyond the first page are seen.

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::client::GraphClient;
use crate::config::Config;
use crate::error::{OdriveError, Result};
use crate::token::TokenStore;

/// Item metadata as returned by Graph
#[derive(Debug, Deserialize)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    folder: Option<serde_json::Value>,
    #[serde(rename = "parentReference")]
    parent_reference: Option<ParentReference>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct ParentReference {
    path: Option<String>,
}

/// One page of a children/search listing
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    value: Vec<DriveItem>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

/// A search result with its full path resolved
#[derive(Debug)]
pub struct SearchHit {
    pub id: String,
    pub path: String,
}

/// OneDrive manager built on the authenticated executor
pub struct DriveManager {
    client: GraphClient,
    base_url: String,
}

impl DriveManager {
    pub fn new(config: &Config, store: TokenStore) -> Self {
        Self {
            client: GraphClient::new(config, store),
            base_url: config.graph_base_url.clone(),
        }
    }

    /// Fetch all pages of a listing, following continuation links
    async fn collect_pages(&self, first_url: String) -> Result<Vec<DriveItem>> {
        let mut items = Vec::new();
        let mut next = Some(first_url);

        while let Some(url) = next {
            let response = self.client.execute(|c| c.get(&url)).await?;
            let page: ListResponse = response.json().await?;
            items.extend(page.value);
            next = page.next_link;
        }

        Ok(items)
    }

    /// Enumerate all children of the drive root
    pub async fn list_children(&self) -> Result<Vec<DriveItem>> {
        self.collect_pages(format!("{}/me/drive/root/children", self.base_url))
            .await
    }

    /// Children of the root that are folders
    pub async fn list_folders(&self) -> Result<Vec<DriveItem>> {
        Ok(self
            .list_children()
            .await?
            .into_iter()
            .filter(|item| item.is_folder())
            .collect())
    }

    /// Find a root child by exact name (case-sensitive) and return its id
    pub async fn find_folder_id(&self, folder_name: &str) -> Result<String> {
        self.list_children()
            .await?
            .into_iter()
            .find(|item| item.name == folder_name)
            .map(|item| item.id)
            .ok_or_else(|| {
                OdriveError::NotFound(format!("no item named '{}' under the drive root", folder_name))
            })
    }

    /// Upload a local file to a path under the drive root
    pub async fn upload_to_root(
        &self,
        source: &Path,
        destination_path: &str,
        content_type: Option<&str>,
    ) -> Result<DriveItem> {
        let url = format!(
            "{}/me/drive/root:/{}:/content",
            self.base_url, destination_path
        );
        self.put_content(url, source, destination_path, content_type)
            .await
    }

    /// Upload a local file into a folder addressed by id
    pub async fn upload_to_folder(
        &self,
        folder_id: &str,
        source: &Path,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<DriveItem> {
        let url = format!(
            "{}/me/drive/items/{}:/{}:/content",
            self.base_url, folder_id, filename
        );
        self.put_content(url, source, filename, content_type).await
    }

    /// PUT the whole file as the request body
    async fn put_content(
        &self,
        url: String,
        source: &Path,
        display_name: &str,
        content_type: Option<&str>,
    ) -> Result<DriveItem> {
        let bytes = fs::read(source)?;
        let content_type = match content_type {
            Some(ct) => ct.to_string(),
            None => mime_guess::from_path(source)
                .first_or_octet_stream()
                .to_string(),
        };

        let pb = transfer_bar(bytes.len() as u64, format!("Uploading {}", display_name));

        let response = self
            .client
            .execute(|c| {
                c.put(&url)
                    .header(header::CONTENT_TYPE, content_type.clone())
                    .body(bytes.clone())
            })
            .await?;

        pb.finish_with_message(format!("Uploaded {}", display_name));

        let item: DriveItem = response.json().await?;
        info!("Uploaded {} ({} bytes)", item.name, bytes.len());
        Ok(item)
    }

    /// Download a file addressed by folder id + name
    pub async fn download(&self, folder_id: &str, file_name: &str, dest: &Path) -> Result<()> {
        let url = format!(
            "{}/me/drive/items/{}:/{}:/content",
            self.base_url, folder_id, file_name
        );
        self.fetch_content(url, file_name, dest).await
    }

    /// Download a file addressed by item id
    pub async fn download_by_id(&self, item_id: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/me/drive/items/{}/content", self.base_url, item_id);
        self.fetch_content(url, item_id, dest).await
    }

    /// GET the content endpoint and write the full body, overwriting `dest`
    async fn fetch_content(&self, url: String, display_name: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let response = self.client.execute(|c| c.get(&url)).await?;
        let bytes = response.bytes().await?;

        let pb = transfer_bar(bytes.len() as u64, format!("Downloading {}", display_name));
        fs::write(dest, &bytes)?;
        pb.finish_with_message(format!("Downloaded {}", display_name));

        info!("Downloaded {} to {:?}", display_name, dest);
        Ok(())
    }

    /// Delete a file addressed by folder id + name (204 indicates success)
    pub async fn delete(&self, folder_id: &str, file_name: &str) -> Result<()> {
        let url = format!("{}/me/drive/items/{}:/{}", self.base_url, folder_id, file_name);
        self.client.execute(|c| c.delete(&url)).await?;
        info!("Deleted {}", file_name);
        Ok(())
    }

    /// Search the drive by keyword, resolving each hit's full path
    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchHit>> {
        let url = format!(
            "{}/me/drive/root/search(q='{}')",
            self.base_url,
            urlencoding::encode(keyword)
        );
        let items = self.collect_pages(url).await?;

        // One metadata lookup per hit to resolve the path
        let mut hits = Vec::with_capacity(items.len());
        for item in items {
            let path = self.item_path(&item.id).await?;
            hits.push(SearchHit { id: item.id, path });
        }
        Ok(hits)
    }

    /// Resolve an item's full path from its id (parent path + name)
    pub async fn item_path(&self, item_id: &str) -> Result<String> {
        let url = format!("{}/me/drive/items/{}", self.base_url, item_id);
        let response = self.client.execute(|c| c.get(&url)).await?;
        let item: DriveItem = response.json().await?;

        let parent = item.parent_reference.and_then(|p| p.path);
        Ok(match parent {
            Some(parent) => format!("{}/{}", parent, item.name),
            None => item.name,
        })
    }
}

fn transfer_bar(total: u64, message: String) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(message);
    pb.set_position(total);
    pb
}
