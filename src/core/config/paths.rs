use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub env_file: PathBuf,
    pub config_file: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::from_root(discover_project_root())
    }

    pub fn from_root(project_root: PathBuf) -> Self {
        let env_file = project_root.join(".env");
        let config_file = env::var("PDFRAG_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| project_root.join("config.yml"));
        let log_dir = project_root.join("logs");

        AppPaths {
            project_root,
            env_file,
            config_file,
            log_dir,
        }
    }

    /// Resolves a path from the config relative to the project root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.project_root.join(candidate)
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("PDFRAG_ROOT") {
        return PathBuf::from(root);
    }

    let cwd = env::current_dir().ok();
    if let Some(dir) = &cwd {
        if dir.join(".env").exists() || dir.join("config.yml").exists() {
            return dir.clone();
        }
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join(".env").exists() || manifest_dir.join("config.yml").exists() {
        return manifest_dir;
    }

    cwd.unwrap_or(manifest_dir)
}
