//! # File Helpers
//!
//! Small path and text utilities shared by project persistence and hosts
//! that route dropped or browsed files to the right importer.

use std::path::Path;

/// True for image file extensions an importer can turn into a texture.
pub fn is_texture_path(path: &Path) -> bool {
    has_extension(path, &["jpg", "jpeg", "png", "tga", "bmp"])
}

/// True for model file extensions an importer can turn into meshes.
pub fn is_scene_path(path: &Path) -> bool {
    has_extension(path, &["obj", "gltf", "glb"])
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    extensions.iter().any(|candidate| *candidate == ext)
}

pub fn read_text(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

pub fn write_text(path: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_extensions_match_case_insensitively() {
        assert!(is_texture_path(Path::new("albedo.png")));
        assert!(is_texture_path(Path::new("photo.JPG")));
        assert!(is_texture_path(Path::new("dir/with.dots/normal.tga")));
        assert!(!is_texture_path(Path::new("model.gltf")));
        assert!(!is_texture_path(Path::new("no_extension")));
    }

    #[test]
    fn scene_extensions_match() {
        assert!(is_scene_path(Path::new("helmet.glb")));
        assert!(is_scene_path(Path::new("room.OBJ")));
        assert!(!is_scene_path(Path::new("albedo.png")));
    }

    #[test]
    fn write_creates_missing_directories() {
        let dir = std::env::temp_dir().join(format!("glade_io_{}", std::process::id()));
        let path = dir.join("nested/out.txt");
        write_text(&path, "hello").unwrap();
        assert_eq!(read_text(&path).unwrap(), "hello");
        std::fs::remove_dir_all(&dir).ok();
    }
}
