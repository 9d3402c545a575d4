//! Deployment profile loading and management.
//!
//! A profile bundles the timing knobs of one live region.  Different
//! assistive-technology setups want different spacing between announcements,
//! so a deployment ships several named profiles and picks one at start-up.
//!
//! The expected YAML structure is:
//! ```yaml
//! profiles:
//!   default:
//!     min_interval_ms: 150
//!   screen_reader_slow:
//!     min_interval_ms: 500
//!     register_delay_ms: 150
//!     description: "Slower readers drop rapid updates"
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Default spacing between two surface writes.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 150;

/// Name of the profile used when none is requested.
pub const DEFAULT_PROFILE: &str = "default";

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// This is kept private – callers work with [`Profile`] / [`ProfileManager`]
/// instead.
#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: HashMap<String, ProfileEntry>,
}

/// Per-profile fields as they appear in the YAML file.
///
/// Every field is optional so that partial profiles are accepted gracefully.
#[derive(Debug, Deserialize)]
struct ProfileEntry {
    #[serde(default = "default_min_interval_ms")]
    min_interval_ms: u64,
    #[serde(default)]
    register_delay_ms: u64,
    description: Option<String>,
}

fn default_min_interval_ms() -> u64 {
    DEFAULT_MIN_INTERVAL_MS
}

// ── Public data structures ────────────────────────────────────────────────────

/// Timing configuration for one live region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Minimum spacing between surface writes.  `0` disables throttling.
    pub min_interval_ms: u64,
    /// Time a newly created region waits before its first write, so
    /// assistive technology can register the surface.
    pub register_delay_ms: u64,
    pub description: String,
}

impl Profile {
    /// The built-in profile used when no configuration file is supplied.
    pub fn default_profile(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            register_delay_ms: 0,
            description: String::from("Default announcement timing"),
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn register_delay(&self) -> Duration {
        Duration::from_millis(self.register_delay_ms)
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::default_profile(DEFAULT_PROFILE)
    }
}

// ── ProfileManager ────────────────────────────────────────────────────────────

/// Loads and manages deployment profiles from a YAML file.
#[derive(Debug, Default)]
pub struct ProfileManager {
    /// Map of profile name → [`Profile`].
    profiles: HashMap<String, Profile>,

    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl ProfileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and populates the internal profile map.
    ///
    /// * If the file contains no profiles a single `"default"` profile is
    ///   inserted.
    /// * Calling this method a second time replaces all previously loaded
    ///   profiles.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading announcement profiles from: {}", path.display());

        self.profiles.clear();
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: ProfileFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        for (name, entry) in file.profiles {
            let profile = Profile {
                name: name.clone(),
                min_interval_ms: entry.min_interval_ms,
                register_delay_ms: entry.register_delay_ms,
                description: entry.description.unwrap_or_default(),
            };

            debug!(
                "  Profile: {} | interval: {}ms | register delay: {}ms",
                profile.name, profile.min_interval_ms, profile.register_delay_ms,
            );

            self.profiles.insert(name, profile);
        }

        if self.profiles.is_empty() {
            warn!("No profiles found in configuration file, using default profile");
            self.profiles
                .insert(DEFAULT_PROFILE.to_string(), Profile::default());
        }

        self.loaded = true;

        info!("Successfully loaded {} profile(s)", self.profiles.len());
        Ok(())
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn get_all_profiles(&self) -> &HashMap<String, Profile> {
        &self.profiles
    }

    /// The profile called `name`, falling back to the loaded `"default"`
    /// profile and then to the built-in [`Profile::default`].
    pub fn resolve(&self, name: &str) -> Profile {
        if let Some(profile) = self.profiles.get(name) {
            return profile.clone();
        }
        if self.loaded {
            warn!(profile = name, "Unknown profile, falling back to '{}'", DEFAULT_PROFILE);
        }
        self.profiles
            .get(DEFAULT_PROFILE)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── Profile ───────────────────────────────────────────────────────────────

    #[test]
    fn default_profile_has_expected_values() {
        let profile = Profile::default();
        assert_eq!(profile.name, "default");
        assert_eq!(profile.min_interval(), Duration::from_millis(150));
        assert_eq!(profile.register_delay(), Duration::ZERO);
        assert!(!profile.description.is_empty());
    }

    // ── ProfileManager: load_from_file ────────────────────────────────────────

    #[test]
    fn load_example_yaml() {
        let yaml = r#"
profiles:
  default:
    min_interval_ms: 150
  screen_reader_slow:
    min_interval_ms: 500
    register_delay_ms: 150
    description: "Slower readers drop rapid updates"
  unthrottled:
    min_interval_ms: 0
"#;
        let f = yaml_tempfile(yaml);
        let mut mgr = ProfileManager::new();
        mgr.load_from_file(f.path()).unwrap();

        assert!(mgr.is_loaded());
        assert_eq!(mgr.get_all_profiles().len(), 3);

        let slow = mgr.get_profile("screen_reader_slow").unwrap();
        assert_eq!(slow.min_interval_ms, 500);
        assert_eq!(slow.register_delay_ms, 150);
        assert_eq!(slow.description, "Slower readers drop rapid updates");

        let fast = mgr.get_profile("unthrottled").unwrap();
        assert_eq!(fast.min_interval(), Duration::ZERO);
    }

    #[test]
    fn bundled_profiles_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("profiles.yaml");
        let mut mgr = ProfileManager::new();
        mgr.load_from_file(&path).unwrap();

        assert_eq!(mgr.resolve(DEFAULT_PROFILE).min_interval_ms, DEFAULT_MIN_INTERVAL_MS);
        assert_eq!(mgr.resolve("unthrottled").min_interval(), Duration::ZERO);
    }

    #[test]
    fn optional_fields_use_defaults_when_absent() {
        let yaml = "profiles:\n  minimal: {}\n";
        let f = yaml_tempfile(yaml);
        let mut mgr = ProfileManager::new();
        mgr.load_from_file(f.path()).unwrap();

        let profile = mgr.get_profile("minimal").unwrap();
        assert_eq!(profile.min_interval_ms, DEFAULT_MIN_INTERVAL_MS);
        assert_eq!(profile.register_delay_ms, 0);
        assert_eq!(profile.description, "");
    }

    #[test]
    fn empty_profiles_section_inserts_default_profile() {
        let f = yaml_tempfile("profiles: {}\n");
        let mut mgr = ProfileManager::new();
        mgr.load_from_file(f.path()).unwrap();

        assert!(mgr.is_loaded());
        assert!(mgr.get_profile(DEFAULT_PROFILE).is_some());
    }

    #[test]
    fn missing_file_returns_error() {
        let mut mgr = ProfileManager::new();
        let result = mgr.load_from_file(Path::new("/nonexistent/path/profiles.yaml"));
        assert!(result.is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        let mut mgr = ProfileManager::new();
        assert!(mgr.load_from_file(f.path()).is_err());
        assert!(!mgr.is_loaded());
    }

    // ── ProfileManager: resolve ───────────────────────────────────────────────

    #[test]
    fn resolve_falls_back_to_loaded_default() {
        let yaml = "profiles:\n  default:\n    min_interval_ms: 300\n";
        let f = yaml_tempfile(yaml);
        let mut mgr = ProfileManager::new();
        mgr.load_from_file(f.path()).unwrap();

        assert_eq!(mgr.resolve("nonexistent").min_interval_ms, 300);
    }

    #[test]
    fn resolve_without_config_uses_builtin_default() {
        let mgr = ProfileManager::new();
        assert_eq!(mgr.resolve("anything"), Profile::default());
    }

    #[test]
    fn reload_replaces_previous_profiles() {
        let f1 = yaml_tempfile("profiles:\n  p1: {}\n");
        let f2 = yaml_tempfile("profiles:\n  p2: {}\n");

        let mut mgr = ProfileManager::new();
        mgr.load_from_file(f1.path()).unwrap();
        assert!(mgr.get_profile("p1").is_some());

        mgr.load_from_file(f2.path()).unwrap();
        assert!(mgr.get_profile("p1").is_none(), "old profile must be gone");
        assert!(mgr.get_profile("p2").is_some());
    }
}
