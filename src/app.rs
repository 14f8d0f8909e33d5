//! Main application orchestrator
//!
//! Wires the token store, auth client and drive manager together, runs the
//! selected operation and renders its result. All failure detail is carried
//! in the returned error; main decides presentation and exit code.

use std::path::Path;

use crate::auth::AuthClient;
use crate::cli::Command;
use crate::config::Config;
use crate::drive::DriveManager;
use crate::error::Result;
use crate::token::TokenStore;

pub struct App {
    auth: AuthClient,
    drive: DriveManager,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::with_config(&config)
    }

    pub fn with_config(config: &Config) -> Result<Self> {
        let store = TokenStore::new(config.token_path()?);
        Ok(Self {
            auth: AuthClient::new(config, store.clone()),
            drive: DriveManager::new(config, store),
        })
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Login => self.login().await,
            Command::List => self.list().await,
            Command::Find { name } => self.find(&name).await,
            Command::Upload {
                source,
                filename,
                folder,
                content_type,
            } => {
                self.upload(&source, &filename, folder.as_deref(), content_type.as_deref())
                    .await
            }
            Command::Delete { name, folder } => self.delete(&name, &folder).await,
            Command::Download { name, folder, dest } => {
                self.download(&name, &folder, &dest).await
            }
            Command::DownloadById { item_id, dest } => {
                self.download_by_id(&item_id, &dest).await
            }
            Command::Search { keyword } => self.search(&keyword).await,
        }
    }

    async fn login(&self) -> Result<()> {
        self.auth.device_login().await?;
        println!("Login successful. Tokens saved.");
        Ok(())
    }

    async fn list(&self) -> Result<()> {
        let folders = self.drive.list_folders().await?;
        if folders.is_empty() {
            println!("No folders under the drive root.");
            return Ok(());
        }

        let width = folders
            .iter()
            .map(|f| f.name.len())
            .chain(std::iter::once("Folder Name".len()))
            .max()
            .unwrap_or(0);
        println!("{:<width$}  Folder ID", "Folder Name", width = width);
        for folder in &folders {
            println!("{:<width$}  {}", folder.name, folder.id, width = width);
        }
        Ok(())
    }

    async fn find(&self, name: &str) -> Result<()> {
        let id = self.drive.find_folder_id(name).await?;
        println!("Folder Name: {}", name);
        println!("Folder ID: {}", id);
        println!("Time and Date: {}", timestamp());
        Ok(())
    }

    async fn upload(
        &self,
        source: &Path,
        filename: &str,
        folder: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<()> {
        let item = match folder {
            Some(folder_id) => {
                self.drive
                    .upload_to_folder(folder_id, source, filename, content_type)
                    .await?
            }
            None => self.drive.upload_to_root(source, filename, content_type).await?,
        };

        println!("File uploaded successfully.");
        println!("Filename: {}", item.name);
        println!("Time and Date: {}", timestamp());
        Ok(())
    }

    async fn delete(&self, name: &str, folder_id: &str) -> Result<()> {
        self.drive.delete(folder_id, name).await?;
        println!("File '{}' deleted successfully.", name);
        println!("Folder ID: {}", folder_id);
        println!("Time and Date: {}", timestamp());
        Ok(())
    }

    async fn download(&self, name: &str, folder_id: &str, dest: &Path) -> Result<()> {
        self.drive.download(folder_id, name, dest).await?;
        println!("File downloaded successfully.");
        println!("Filename: {}", name);
        println!("Destination Path: {}", dest.display());
        println!("Time and Date: {}", timestamp());
        Ok(())
    }

    async fn download_by_id(&self, item_id: &str, dest: &Path) -> Result<()> {
        self.drive.download_by_id(item_id, dest).await?;
        println!("File downloaded successfully.");
        println!("File ID: {}", item_id);
        println!("Destination Path: {}", dest.display());
        println!("Time and Date: {}", timestamp());
        Ok(())
    }

    async fn search(&self, keyword: &str) -> Result<()> {
        let hits = self.drive.search(keyword).await?;
        if hits.is_empty() {
            println!("No files found with keyword '{}'.", keyword);
            return Ok(());
        }

        let width = hits
            .iter()
            .map(|h| h.path.len())
            .chain(std::iter::once("File Path".len()))
            .max()
            .unwrap_or(0);
        println!("{:<width$}  File ID", "File Path", width = width);
        for hit in &hits {
            println!("{:<width$}  {}", hit.path, hit.id, width = width);
        }
        Ok(())
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
