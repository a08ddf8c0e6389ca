pub mod format;
pub mod model;

pub mod settings {
    use serde::{Deserialize, Serialize};
    use std::fs;
    use std::path::PathBuf;

    fn default_base_url() -> String {
        "http://127.0.0.1:8000".to_string()
    }

    /// Client settings persisted under the platform config directory.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AppSettings {
        /// Base URL of the compliance backend (no trailing slash).
        #[serde(default = "default_base_url")]
        pub api_base_url: String,
    }

    impl Default for AppSettings {
        fn default() -> Self {
            Self {
                api_base_url: default_base_url(),
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        let proj =
            directories::ProjectDirs::from("com.local", "Compliance Desk", "ComplianceDesk")?;
        let _ = fs::create_dir_all(proj.config_dir());
        Some(proj.config_dir().join("settings.json"))
    }

    /// Load settings, falling back to defaults if the file is missing or unreadable.
    pub fn load_or_default() -> AppSettings {
        config_path()
            .and_then(|path| load_from(&path))
            .unwrap_or_default()
    }

    /// Read settings from a specific file. `None` if the file is missing
    /// or does not parse.
    pub fn load_from(path: &std::path::Path) -> Option<AppSettings> {
        if !path.exists() {
            return None;
        }
        let bytes = fs::read(path).ok()?;
        match serde_json::from_slice::<AppSettings>(&bytes) {
            Ok(s) => Some(s),
            Err(_) => {
                tracing::warn!("settings file is malformed, using defaults");
                None
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_default_settings() {
            let s = AppSettings::default();
            assert_eq!(s.api_base_url, "http://127.0.0.1:8000");
        }

        #[test]
        fn test_settings_roundtrip() {
            let s = AppSettings {
                api_base_url: "http://backend:8000".to_string(),
            };
            let json = serde_json::to_string(&s).unwrap();
            let back: AppSettings = serde_json::from_str(&json).unwrap();
            assert_eq!(back.api_base_url, s.api_base_url);
        }

        #[test]
        fn test_missing_field_falls_back_to_default() {
            let back: AppSettings = serde_json::from_str("{}").unwrap();
            assert_eq!(back.api_base_url, "http://127.0.0.1:8000");
        }

        #[test]
        fn test_load_from_disk_roundtrip() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settings.json");
            let s = AppSettings {
                api_base_url: "http://backend:8000".to_string(),
            };
            fs::write(&path, serde_json::to_vec_pretty(&s).unwrap()).unwrap();

            let back = load_from(&path).unwrap();
            assert_eq!(back.api_base_url, "http://backend:8000");
        }

        #[test]
        fn test_load_from_missing_or_malformed_is_none() {
            let dir = tempfile::tempdir().unwrap();
            assert!(load_from(&dir.path().join("absent.json")).is_none());

            let path = dir.path().join("settings.json");
            fs::write(&path, b"not json").unwrap();
            assert!(load_from(&path).is_none());
        }
    }
}
