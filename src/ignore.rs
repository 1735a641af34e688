use glob::Pattern;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path};
use tracing::{debug, warn};

const GLOBAL_LEAN: &[&str] = &[
    ".git", ".hg", ".svn", ".vscode", ".idea", ".vs", ".cache", "tmp", ".tmp", "logs",
    "coverage", "node_modules", "__pycache__", "dist", "build", "out", "bin", "obj", "target",
    "Debug", "Release",
];

const WEB_NODE: &[&str] = &[
    ".next", ".nuxt", ".output", ".vercel", ".expo", ".angular", ".svelte-kit",
    ".parcel-cache", ".webpack", ".rollup.cache", ".turbo", ".nx", ".pnpm-store", ".yarn",
    ".pnp.*", "bower_components",
];

const PYTHONIC: &[&str] = &[
    ".venv", "venv", "env", ".env", ".tox", ".nox", ".ipynb_checkpoints", ".mypy_cache",
    ".pytest_cache", ".ruff_cache", ".eggs", "*.egg-info", "_build", "site",
];

const JVM_ANDROID: &[&str] = &[
    "target", "build", ".gradle", ".mvn", "app/build", ".cxx", "captures",
];

const DOTNET_UNITY: &[&str] = &[
    "x64", "x86", "ARM", "ARM64", "TestResults", "BenchmarkDotNet.Artifacts", "Library",
    "Logs", "Temp", "Obj", "Build", "Builds", "UserSettings",
];

const C_CPP_CMAKE: &[&str] = &[
    "cmake-build-*", "CMakeFiles", "CMakeCache.txt", "_deps", ".deps", ".conan",
    "vcpkg_installed", "vcpkg_downloads",
];

const APPLE_SWIFT_XCODE: &[&str] = &[
    ".build", "DerivedData", "Pods", "Carthage/Build", "*.xcworkspace", "*.xcodeproj",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnorePreset {
    None,
    #[default]
    GlobalLean,
    WebNode,
    Pythonic,
    JvmAndroid,
    DotnetUnity,
    CCppCmake,
    AppleSwiftXcode,
    Custom,
}

pub const ALL_IGNORE_PRESETS: [IgnorePreset; 9] = [
    IgnorePreset::None,
    IgnorePreset::GlobalLean,
    IgnorePreset::WebNode,
    IgnorePreset::Pythonic,
    IgnorePreset::JvmAndroid,
    IgnorePreset::DotnetUnity,
    IgnorePreset::CCppCmake,
    IgnorePreset::AppleSwiftXcode,
    IgnorePreset::Custom,
];

pub const DEFAULT_IGNORE_PRESET: IgnorePreset = IgnorePreset::GlobalLean;

impl IgnorePreset {
    pub fn name(&self) -> &'static str {
        match self {
            IgnorePreset::None => "None",
            IgnorePreset::GlobalLean => "Global-Lean",
            IgnorePreset::WebNode => "Web/Node",
            IgnorePreset::Pythonic => "Pythonic",
            IgnorePreset::JvmAndroid => "JVM/Android",
            IgnorePreset::DotnetUnity => ".NET/Unity",
            IgnorePreset::CCppCmake => "C/C++/CMake",
            IgnorePreset::AppleSwiftXcode => "Apple/Swift/Xcode",
            IgnorePreset::Custom => "Custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_IGNORE_PRESETS
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Folder names of the preset. `Custom` has none of its own.
    pub fn folders(&self) -> BTreeSet<String> {
        let extra: &[&str] = match self {
            IgnorePreset::None | IgnorePreset::Custom => return BTreeSet::new(),
            IgnorePreset::GlobalLean => &[],
            IgnorePreset::WebNode => WEB_NODE,
            IgnorePreset::Pythonic => PYTHONIC,
            IgnorePreset::JvmAndroid => JVM_ANDROID,
            IgnorePreset::DotnetUnity => DOTNET_UNITY,
            IgnorePreset::CCppCmake => C_CPP_CMAKE,
            IgnorePreset::AppleSwiftXcode => APPLE_SWIFT_XCODE,
        };
        GLOBAL_LEAN
            .iter()
            .chain(extra.iter())
            .map(|s| (*s).to_owned())
            .collect()
    }
}

impl fmt::Display for IgnorePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts a comma-separated list into a set of folder names.
pub fn parse_ignore_list(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Resolves a preset by display name. Unknown names fall back to the default preset.
pub fn get_ignore_set(preset_name: &str, custom_text: &str) -> BTreeSet<String> {
    match IgnorePreset::from_name(preset_name) {
        Some(IgnorePreset::Custom) => parse_ignore_list(custom_text),
        Some(preset) => preset.folders(),
        None => {
            debug!(
                "Unknown ignore preset '{}', using {}",
                preset_name, DEFAULT_IGNORE_PRESET
            );
            DEFAULT_IGNORE_PRESET.folders()
        }
    }
}

/// Compiled set of ignored folder names, globs and multi-segment paths.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    names: BTreeSet<String>,
    patterns: Vec<Vec<Pattern>>,
}

impl IgnoreFilter {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = BTreeSet::new();
        let mut patterns = Vec::new();
        for entry in entries {
            let entry = entry.as_ref().trim().trim_matches('/');
            if entry.is_empty() {
                continue;
            }
            let compiled: Result<Vec<Pattern>, _> = entry
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(Pattern::new)
                .collect();
            match compiled {
                Ok(segments) => {
                    names.insert(entry.to_owned());
                    patterns.push(segments);
                }
                Err(e) => warn!("Invalid ignore pattern '{}': {}", entry, e),
            }
        }
        debug!("Using ignore folders: {:?}", names);
        IgnoreFilter { names, patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// Whether a directory, given relative to the walk root, should be pruned.
    pub fn is_ignored_dir<P: AsRef<Path>>(&self, relative_dir: P) -> bool {
        let components: Vec<String> = relative_dir
            .as_ref()
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        self.matches_components(&components)
    }

    /// Same as [`IgnoreFilter::is_ignored_dir`] for a POSIX path string.
    pub fn is_ignored_posix(&self, relative_dir: &str) -> bool {
        let components: Vec<String> = relative_dir
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .map(str::to_owned)
            .collect();
        self.matches_components(&components)
    }

    fn matches_components(&self, components: &[String]) -> bool {
        if components.is_empty() {
            return false;
        }
        self.patterns.iter().any(|segments| {
            if segments.len() > components.len() {
                return false;
            }
            let tail = &components[components.len() - segments.len()..];
            segments
                .iter()
                .zip(tail)
                .all(|(pattern, part)| pattern.matches(part))
        })
    }
}
