use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level extension categories that can be toggled as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Text,
    Data,
    Code,
}

pub const ALL_CATEGORIES: [Category; 3] = [Category::Text, Category::Data, Category::Code];

const TEXT_SUBSETS: &[&str] = &["Text: Plain", "Text: Markup"];

const DATA_SUBSETS: &[&str] = &[
    "Data: Tabular",
    "Data: Structured",
    "Data: Config",
    "Data: Logs",
];

const CODE_SUBSETS: &[&str] = &[
    "Code: Python",
    "Code: Rust",
    "Code: Web",
    "Code: C/C++",
    "Code: JVM",
    "Code: .NET",
    "Code: Go",
    "Code: Ruby",
    "Code: PHP",
    "Code: Shell",
    "Code: SQL",
    "Code: Swift",
];

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Text => "Text",
            Category::Data => "Data",
            Category::Code => "Code",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Category::Text),
            "data" => Some(Category::Data),
            "code" => Some(Category::Code),
            _ => None,
        }
    }

    /// Names of the subsets belonging to this category.
    pub fn subsets(&self) -> &'static [&'static str] {
        match self {
            Category::Text => TEXT_SUBSETS,
            Category::Data => DATA_SUBSETS,
            Category::Code => CODE_SUBSETS,
        }
    }

    /// Category owning a subset.
    pub fn of_subset(subset: &str) -> Option<Self> {
        ALL_CATEGORIES
            .into_iter()
            .find(|category| category.subsets().contains(&subset))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extensions of a named subset. Unknown subsets are empty.
pub fn subset_extensions(subset: &str) -> &'static [&'static str] {
    match subset {
        "Text: Plain" => &[".txt", ".text", ".asc", ".dok"],
        "Text: Markup" => &[".md", ".markdown", ".rst", ".adoc", ".tex", ".rtf", ".org"],
        "Data: Tabular" => &[".csv", ".tsv"],
        "Data: Structured" => &[".json", ".jsonl", ".xml", ".yml", ".yaml", ".toml"],
        "Data: Config" => &[".ini", ".cfg", ".conf", ".env", ".properties"],
        "Data: Logs" => &[".log", ".xlog", ".lst"],
        "Code: Python" => &[".py", ".pyi", ".pyx"],
        "Code: Rust" => &[".rs"],
        "Code: Web" => &[
            ".html", ".htm", ".css", ".scss", ".js", ".jsx", ".mjs", ".ts", ".tsx", ".vue",
            ".svelte",
        ],
        "Code: C/C++" => &[".c", ".h", ".cpp", ".hpp", ".cc", ".cxx"],
        "Code: JVM" => &[".java", ".kt", ".kts", ".scala", ".gradle"],
        "Code: .NET" => &[".cs", ".fs", ".vb", ".csproj"],
        "Code: Go" => &[".go"],
        "Code: Ruby" => &[".rb"],
        "Code: PHP" => &[".php"],
        "Code: Shell" => &[".sh", ".bash", ".zsh", ".bat", ".ps1"],
        "Code: SQL" => &[".sql"],
        "Code: Swift" => &[".swift"],
        _ => &[],
    }
}
