use std::path::{Component, Path, PathBuf};

/// Display helpers for paths shown to the user.
pub trait PathDisplayExt {
    /// Absolute, lexically normalized form, without touching the filesystem.
    fn display_absolute(&self) -> String;

    /// Form relative to `root`, falling back to the absolute form for paths
    /// outside of it.
    fn display_relative(&self, root: &Path) -> String;
}

impl PathDisplayExt for Path {
    fn display_absolute(&self) -> String {
        let absolute = if self.is_absolute() {
            self.to_path_buf()
        } else {
            match std::env::current_dir() {
                Ok(current_dir) => current_dir.join(self),
                Err(_) => self.to_path_buf(),
            }
        };
        normalize(&absolute).display().to_string()
    }

    fn display_relative(&self, root: &Path) -> String {
        match self.strip_prefix(root) {
            Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
            Ok(relative) => relative.display().to_string(),
            Err(_) => self.display_absolute(),
        }
    }
}

impl PathDisplayExt for PathBuf {
    fn display_absolute(&self) -> String {
        self.as_path().display_absolute()
    }

    fn display_relative(&self, root: &Path) -> String {
        self.as_path().display_relative(root)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            _ => components.push(component),
        }
    }
    components.iter().collect()
}
