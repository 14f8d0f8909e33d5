//! Command-line interface definitions
//!
//! The flag surface is flat (`--login`, `--list`, `--up`, ...) with exactly
//! one action flag per invocation; `command()` validates the combination and
//! produces the operation to run.

use clap::Parser;
use std::path::PathBuf;

use crate::error::{OdriveError, Result};

#[derive(Parser, Debug)]
#[command(
    name = "odrive",
    version,
    about = "Command-line client for OneDrive via the Microsoft Graph API",
    long_about = r#"
odrive talks to OneDrive through the Microsoft Graph REST API:

  odrive --login
  odrive --list
  odrive --find <name>
  odrive --up <path> --filename <name> [--folder <id>] [--content-type <mime>]
  odrive --delete <name> --folder <id>
  odrive --download <name> --folder <id> --dest <path>
  odrive --fileid <id> --dest <path>
  odrive --search <keyword>

Tokens are stored in ~/.odrive/tokens.txt and refreshed automatically when
the API reports them expired.
"#
)]
pub struct Cli {
    /// Log in using the device-code flow
    #[arg(long)]
    pub login: bool,

    /// List folders under the drive root
    #[arg(long)]
    pub list: bool,

    /// Find a folder id by exact name
    #[arg(long, value_name = "NAME")]
    pub find: Option<String>,

    /// Upload a local file
    #[arg(long, value_name = "PATH")]
    pub up: Option<PathBuf>,

    /// Remote filename for --up
    #[arg(long, value_name = "NAME")]
    pub filename: Option<String>,

    /// Folder id for --up, --delete and --download
    #[arg(long, value_name = "ID")]
    pub folder: Option<String>,

    /// Delete a file by name (requires --folder)
    #[arg(long, value_name = "NAME")]
    pub delete: Option<String>,

    /// Download a file by name (requires --folder and --dest)
    #[arg(long, value_name = "NAME")]
    pub download: Option<String>,

    /// Download a file by item id (requires --dest)
    #[arg(long, value_name = "ID")]
    pub fileid: Option<String>,

    /// Local destination path for downloads
    #[arg(long, value_name = "PATH")]
    pub dest: Option<PathBuf>,

    /// Search the drive by keyword
    #[arg(long, value_name = "KEYWORD")]
    pub search: Option<String>,

    /// Content type for --up (default: guessed from the filename)
    #[arg(long, value_name = "MIME")]
    pub content_type: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// A validated operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    List,
    Find {
        name: String,
    },
    Upload {
        source: PathBuf,
        filename: String,
        folder: Option<String>,
        content_type: Option<String>,
    },
    Delete {
        name: String,
        folder: String,
    },
    Download {
        name: String,
        folder: String,
        dest: PathBuf,
    },
    DownloadById {
        item_id: String,
        dest: PathBuf,
    },
    Search {
        keyword: String,
    },
}

impl Cli {
    /// Validate the flag combination and produce the operation to run
    pub fn command(&self) -> Result<Command> {
        let actions = [
            self.login,
            self.list,
            self.find.is_some(),
            self.up.is_some(),
            self.delete.is_some(),
            self.download.is_some(),
            self.fileid.is_some(),
            self.search.is_some(),
        ];
        let selected = actions.iter().filter(|&&a| a).count();
        if selected != 1 {
            return Err(OdriveError::Usage(
                "Specify exactly one of --login, --list, --find, --up, --delete, \
                 --download, --fileid, --search"
                    .to_string(),
            ));
        }

        if self.login {
            return Ok(Command::Login);
        }
        if self.list {
            return Ok(Command::List);
        }
        if let Some(name) = &self.find {
            return Ok(Command::Find { name: name.clone() });
        }
        if let Some(source) = &self.up {
            let filename = self.required(&self.filename, "--up requires --filename")?;
            return Ok(Command::Upload {
                source: source.clone(),
                filename,
                folder: self.folder.clone(),
                content_type: self.content_type.clone(),
            });
        }
        if let Some(name) = &self.delete {
            let folder = self.required(&self.folder, "--delete requires --folder")?;
            return Ok(Command::Delete {
                name: name.clone(),
                folder,
            });
        }
        if let Some(name) = &self.download {
            let folder = self.required(&self.folder, "--download requires --folder")?;
            let dest = self.required(&self.dest, "--download requires --dest")?;
            return Ok(Command::Download {
                name: name.clone(),
                folder,
                dest,
            });
        }
        if let Some(item_id) = &self.fileid {
            let dest = self.required(&self.dest, "--fileid requires --dest")?;
            return Ok(Command::DownloadById {
                item_id: item_id.clone(),
                dest,
            });
        }
        if let Some(keyword) = &self.search {
            return Ok(Command::Search {
                keyword: keyword.clone(),
            });
        }

        unreachable!("exactly one action flag was selected");
    }

    fn required<T: Clone>(&self, value: &Option<T>, message: &str) -> Result<T> {
        value
            .clone()
            .ok_or_else(|| OdriveError::Usage(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let full: Vec<&str> = std::iter::once("odrive").chain(args.iter().copied()).collect();
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_single_action_flags() {
        assert_eq!(parse(&["--login"]).command().unwrap(), Command::Login);
        assert_eq!(parse(&["--list"]).command().unwrap(), Command::List);
        assert_eq!(
            parse(&["--search", "report"]).command().unwrap(),
            Command::Search {
                keyword: "report".to_string()
            }
        );
    }

    #[test]
    fn test_no_action_is_usage_error() {
        match parse(&[]).command() {
            Err(OdriveError::Usage(_)) => {}
            other => panic!("expected Usage error, got {:?}", other),
        }
    }

    #[test]
    fn test_two_actions_is_usage_error() {
        match parse(&["--list", "--login"]).command() {
            Err(OdriveError::Usage(_)) => {}
            other => panic!("expected Usage error, got {:?}", other),
        }
    }

    #[test]
    fn test_upload_variants() {
        let cmd = parse(&["--up", "/tmp/report.zip", "--filename", "report.zip"])
            .command()
            .unwrap();
        assert_eq!(
            cmd,
            Command::Upload {
                source: PathBuf::from("/tmp/report.zip"),
                filename: "report.zip".to_string(),
                folder: None,
                content_type: None,
            }
        );

        let cmd = parse(&[
            "--up",
            "/tmp/report.zip",
            "--filename",
            "report.zip",
            "--folder",
            "F1",
            "--content-type",
            "application/zip",
        ])
        .command()
        .unwrap();
        assert_eq!(
            cmd,
            Command::Upload {
                source: PathBuf::from("/tmp/report.zip"),
                filename: "report.zip".to_string(),
                folder: Some("F1".to_string()),
                content_type: Some("application/zip".to_string()),
            }
        );
    }

    #[test]
    fn test_upload_requires_filename() {
        match parse(&["--up", "/tmp/report.zip"]).command() {
            Err(OdriveError::Usage(msg)) => assert!(msg.contains("--filename")),
            other => panic!("expected Usage error, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_requires_folder() {
        match parse(&["--delete", "old.zip"]).command() {
            Err(OdriveError::Usage(msg)) => assert!(msg.contains("--folder")),
            other => panic!("expected Usage error, got {:?}", other),
        }

        assert_eq!(
            parse(&["--delete", "old.zip", "--folder", "F1"])
                .command()
                .unwrap(),
            Command::Delete {
                name: "old.zip".to_string(),
                folder: "F1".to_string()
            }
        );
    }

    #[test]
    fn test_download_requires_folder_and_dest() {
        match parse(&["--download", "a.txt", "--folder", "F1"]).command() {
            Err(OdriveError::Usage(msg)) => assert!(msg.contains("--dest")),
            other => panic!("expected Usage error, got {:?}", other),
        }

        assert_eq!(
            parse(&["--download", "a.txt", "--folder", "F1", "--dest", "/tmp/a.txt"])
                .command()
                .unwrap(),
            Command::Download {
                name: "a.txt".to_string(),
                folder: "F1".to_string(),
                dest: PathBuf::from("/tmp/a.txt"),
            }
        );
    }

    #[test]
    fn test_fileid_requires_dest() {
        match parse(&["--fileid", "X1"]).command() {
            Err(OdriveError::Usage(msg)) => assert!(msg.contains("--dest")),
            other => panic!("expected Usage error, got {:?}", other),
        }

        assert_eq!(
            parse(&["--fileid", "X1", "--dest", "/tmp/x"]).command().unwrap(),
            Command::DownloadById {
                item_id: "X1".to_string(),
                dest: PathBuf::from("/tmp/x"),
            }
        );
    }
}
