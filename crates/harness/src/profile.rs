//! Execution profiles: which client environment runs which test files

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{HarnessError, HarnessResult};

/// Browser engines the CDP driver can attach to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Chrome,
    Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A device-emulation preset applied on top of the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct DevicePreset {
    pub name: &'static str,
    pub viewport: Viewport,
    pub device_scale_factor: f64,
    pub is_mobile: bool,
    pub user_agent: &'static str,
}

/// Look up a known device preset by name.
pub fn device_preset(name: &str) -> Option<DevicePreset> {
    match name {
        "pixel-5" => Some(DevicePreset {
            name: "pixel-5",
            viewport: Viewport { width: 393, height: 851 },
            device_scale_factor: 2.75,
            is_mobile: true,
            user_agent: "Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
        }),
        "iphone-12" => Some(DevicePreset {
            name: "iphone-12",
            viewport: Viewport { width: 390, height: 844 },
            device_scale_factor: 3.0,
            is_mobile: true,
            user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 14_4 like Mac OS X) \
                         AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 \
                         Mobile/15E148 Safari/604.1",
        }),
        _ => None,
    }
}

/// One execution profile: a file-match pattern bound to a client environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Unique profile name.
    pub name: String,

    /// Regex matched against test file paths.
    pub test_match: String,

    /// Profiles that must complete before this one runs.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Browser engine for UI profiles.
    #[serde(default)]
    pub browser: BrowserKind,

    /// Explicit viewport (ignored when a device preset is set).
    #[serde(default)]
    pub viewport: Option<Viewport>,

    /// Device preset name (see [`device_preset`]).
    #[serde(default)]
    pub device: Option<String>,

    /// Extra headers for API profiles.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,

    /// Compiled `test_match`, filled in during validation.
    #[serde(skip)]
    matcher: OnceLock<Regex>,
}

impl Profile {
    /// Whether this profile's pattern matches the given file path.
    ///
    /// Uses the regex compiled at load time; a pattern that fails to
    /// compile never matches (only reachable on a hand-built profile,
    /// since loading rejects bad patterns).
    pub fn matches(&self, path: &Path) -> bool {
        if self.matcher.get().is_none() {
            if let Ok(re) = Regex::new(&self.test_match) {
                let _ = self.matcher.set(re);
            }
        }
        match self.matcher.get() {
            Some(re) => re.is_match(&path.to_string_lossy()),
            None => false,
        }
    }

    /// Resolve the effective device preset, if any.
    pub fn resolved_device(&self) -> HarnessResult<Option<DevicePreset>> {
        match &self.device {
            None => Ok(None),
            Some(name) => device_preset(name)
                .map(Some)
                .ok_or_else(|| HarnessError::Config(format!("unknown device preset: {name}"))),
        }
    }
}

/// The full set of profiles declared in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSet {
    pub profiles: Vec<Profile>,
}

impl ProfileSet {
    /// Parse a profile set from YAML.
    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        let set: Self = serde_yaml::from_str(yaml)?;
        set.validate()?;
        Ok(set)
    }

    /// Parse a profile set from a YAML file.
    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    fn validate(&self) -> HarnessResult<()> {
        for (i, p) in self.profiles.iter().enumerate() {
            let re = Regex::new(&p.test_match).map_err(|e| {
                HarnessError::Config(format!("profile '{}': bad test_match: {e}", p.name))
            })?;
            let _ = p.matcher.set(re);
            p.resolved_device()?;
            if self.profiles[..i].iter().any(|q| q.name == p.name) {
                return Err(HarnessError::Config(format!("duplicate profile name: {}", p.name)));
            }
            for dep in &p.depends_on {
                if !self.profiles.iter().any(|q| &q.name == dep) {
                    return Err(HarnessError::UnknownProfile(dep.clone()));
                }
            }
        }
        Ok(())
    }

    /// Find a profile by name.
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// All profiles whose pattern matches the given file path.
    pub fn matching(&self, path: &Path) -> Vec<&Profile> {
        self.profiles.iter().filter(|p| p.matches(path)).collect()
    }

    /// Profiles in dependency-respecting order: every profile appears after
    /// all of its dependencies. Cycles are a config error.
    pub fn execution_order(&self) -> HarnessResult<Vec<&Profile>> {
        self.order_subset(self.profiles.iter().collect())
    }

    /// Dependency order for one profile: its transitive dependencies first,
    /// then the profile itself.
    pub fn execution_order_for(&self, name: &str) -> HarnessResult<Vec<&Profile>> {
        let root = self
            .get(name)
            .ok_or_else(|| HarnessError::UnknownProfile(name.to_string()))?;

        // Collect the transitive closure, then order it.
        let mut wanted = vec![root];
        let mut i = 0;
        while i < wanted.len() {
            let deps: Vec<&Profile> = wanted[i]
                .depends_on
                .iter()
                .filter_map(|d| self.get(d))
                .collect();
            for dep in deps {
                if !wanted.iter().any(|p| p.name == dep.name) {
                    wanted.push(dep);
                }
            }
            i += 1;
        }
        self.order_subset(wanted)
    }

    fn order_subset<'a>(&'a self, mut remaining: Vec<&'a Profile>) -> HarnessResult<Vec<&'a Profile>> {
        let mut ordered: Vec<&Profile> = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let before = ordered.len();
            let mut blocked = Vec::new();

            for p in remaining.drain(..) {
                // The subset always contains its own transitive dependencies.
                if p.depends_on.iter().all(|d| ordered.iter().any(|o| &o.name == d)) {
                    ordered.push(p);
                } else {
                    blocked.push(p);
                }
            }

            if ordered.len() == before {
                let names: Vec<&str> = blocked.iter().map(|p| p.name.as_str()).collect();
                return Err(HarnessError::DependencyCycle(names.join(", ")));
            }
            remaining = blocked;
        }

        Ok(ordered)
    }
}
