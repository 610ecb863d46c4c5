use std::path::{Component, Path, PathBuf};
use std::fs;
use log::{debug, info, warn, error};
use time::OffsetDateTime;
use crate::errors::WikiError;
use crate::services::collaborators::PageModel;
use crate::types::{DirEntry, EditInfo};

const PAGE_EXTENSION: &str = "md";

/// Actions the bundled server implements for every page
const SERVER_ACTIONS: [&str; 4] = ["info", "print", "raw", "refresh"];

/// Markdown page store on the file system.
///
/// Page `Parent/Some Page` lives in `<base>/Parent/Some_Page.md`.
#[derive(Clone)]
pub struct FileService {
    base_dir: PathBuf,
    allow_write: bool,
}

impl FileService {
    /// Create a new file service
    pub fn new(base_dir: PathBuf) -> Self {
        debug!("Creating FileService with base directory: {:?}", base_dir);
        Self { base_dir, allow_write: false }
    }

    /// Report pages as writable
    pub fn with_write(mut self, allow_write: bool) -> Self {
        self.allow_write = allow_write;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// List directory contents, hidden entries skipped, sorted by name
    pub fn list_directory(&self, path: &Path) -> Result<Vec<DirEntry>, WikiError> {
        let full_path = self.base_dir.join(path);
        debug!("Listing directory: {:?} (full path: {:?})", path, full_path);

        if !full_path.exists() {
            warn!("Directory does not exist: {:?}", full_path);
            return Err(WikiError::NotFound);
        }

        if !full_path.is_dir() {
            warn!("Path is not a directory: {:?}", full_path);
            return Err(WikiError::InvalidPath);
        }

        let entries = fs::read_dir(&full_path)
            .map_err(|e| {
                error!("Failed to read directory {:?}: {}", full_path, e);
                WikiError::Io(e)
            })?;

        let mut result = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let name = entry.file_name().to_string_lossy().to_string();
                    if name.starts_with('.') {
                        continue;
                    }
                    let is_dir = entry.file_type()
                        .map(|ft| ft.is_dir())
                        .unwrap_or(false);
                    let entry_path = if path.as_os_str().is_empty() {
                        PathBuf::from(&name)
                    } else {
                        path.join(&name)
                    };
                    result.push(DirEntry { name, is_dir, path: entry_path });
                }
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                }
            }
        }
        result.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        debug!("Listed directory {:?}, found {} entries", path, result.len());
        Ok(result)
    }

    /// Read file content
    pub fn read_file(&self, path: &Path) -> Result<String, WikiError> {
        let full_path = self.base_dir.join(path);
        debug!("Reading file: {:?} (full path: {:?})", path, full_path);

        if !full_path.is_file() {
            warn!("File does not exist: {:?}", full_path);
            return Err(WikiError::NotFound);
        }

        let content = fs::read_to_string(&full_path)
            .map_err(|e| {
                error!("Failed to read file {:?}: {}", full_path, e);
                WikiError::Io(e)
            })?;

        info!("Read file {:?}, {} bytes", path, content.len());
        Ok(content)
    }

    /// Relative file path of a page; rejects names escaping the base directory
    pub fn page_file(&self, page_name: &str) -> Result<PathBuf, WikiError> {
        if page_name.trim().is_empty() {
            return Err(WikiError::InvalidPath);
        }
        let relative = PathBuf::from(format!("{}.{}", page_name.replace(' ', "_"), PAGE_EXTENSION));
        for comp in relative.components() {
            match comp {
                Component::Normal(_) => {}
                _ => {
                    warn!("Rejected page name: '{}'", page_name);
                    return Err(WikiError::InvalidPath);
                }
            }
        }
        Ok(relative)
    }

    /// Read the source of a page
    pub fn read_page(&self, page_name: &str) -> Result<String, WikiError> {
        let file = self.page_file(page_name)?;
        self.read_file(&file)
    }

    /// All page names, sorted
    pub fn list_pages(&self) -> Result<Vec<String>, WikiError> {
        let mut pages = Vec::new();
        self.collect_pages(Path::new(""), &mut pages)?;
        pages.sort();
        Ok(pages)
    }

    fn collect_pages(&self, dir: &Path, pages: &mut Vec<String>) -> Result<(), WikiError> {
        for entry in self.list_directory(dir)? {
            if entry.is_dir {
                self.collect_pages(&entry.path, pages)?;
            } else if let Some(stem) = entry.name.strip_suffix(".md") {
                let parent = entry
                    .path
                    .parent()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default();
                let name = if parent.is_empty() {
                    stem.to_string()
                } else {
                    format!("{}/{}", parent.replace('\\', "/"), stem)
                };
                pages.push(name.replace('_', " "));
            }
        }
        Ok(())
    }

    /// Modification time of a page file
    pub fn page_mtime(&self, page_name: &str) -> Option<OffsetDateTime> {
        let file = self.page_file(page_name).ok()?;
        let modified = fs::metadata(self.base_dir.join(file)).and_then(|m| m.modified()).ok()?;
        Some(OffsetDateTime::from(modified))
    }

    /// Determine content type for a file
    pub fn content_type_for(&self, path: &Path) -> &'static str {
        let extension = path.extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "html" | "htm" => "text/html; charset=utf-8",
            "css" => "text/css; charset=utf-8",
            "js" => "application/javascript; charset=utf-8",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "svg" => "image/svg+xml",
            "ico" => "image/x-icon",
            "txt" | "md" => "text/plain; charset=utf-8",
            _ => "application/octet-stream",
        }
    }
}

impl PageModel for FileService {
    fn exists(&self, name: &str) -> bool {
        match self.page_file(name) {
            Ok(file) => self.base_dir.join(file).is_file(),
            Err(_) => false,
        }
    }

    fn last_edit_info(&self, name: &str) -> Option<EditInfo> {
        self.page_mtime(name).map(|time| EditInfo { time, editor: None })
    }

    fn is_writable(&self, _name: &str) -> bool {
        self.allow_write
    }

    fn page_format(&self, _name: &str) -> String {
        "markdown".to_string()
    }

    fn available_actions(&self, _name: &str) -> Vec<String> {
        SERVER_ACTIONS.iter().map(|a| a.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> (tempfile::TempDir, FileService) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FrontPage.md"), "# Welcome\n").unwrap();
        fs::create_dir(dir.path().join("Help")).unwrap();
        fs::write(dir.path().join("Help/On_Links.md"), "links").unwrap();
        fs::write(dir.path().join(".hidden.md"), "x").unwrap();
        let service = FileService::new(dir.path().to_path_buf());
        (dir, service)
    }

    #[test]
    fn maps_page_names_to_files() {
        let (_dir, service) = store();
        assert_eq!(service.page_file("Help/On Links").unwrap(), PathBuf::from("Help/On_Links.md"));
        assert!(matches!(service.page_file("../etc/passwd"), Err(WikiError::InvalidPath)));
        assert!(matches!(service.page_file(""), Err(WikiError::InvalidPath)));
    }

    #[test]
    fn lists_pages_recursively() {
        let (_dir, service) = store();
        assert_eq!(service.list_pages().unwrap(), vec!["FrontPage", "Help/On Links"]);
    }

    #[test]
    fn implements_page_model() {
        let (_dir, service) = store();
        assert!(service.exists("FrontPage"));
        assert!(service.exists("Help/On Links"));
        assert!(!service.exists("Missing"));
        assert!(service.last_edit_info("FrontPage").is_some());
        assert!(!service.is_writable("FrontPage"));
        assert!(service.clone().with_write(true).is_writable("FrontPage"));
        assert_eq!(service.read_page("FrontPage").unwrap(), "# Welcome\n");
        assert!(matches!(service.read_page("Missing"), Err(WikiError::NotFound)));
    }
}
