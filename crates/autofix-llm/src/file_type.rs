use std::path::Path;

/// Language label used in fix prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Python,
    JavaScriptTypeScript,
    Java,
    Ruby,
    Go,
    Php,
    CCpp,
    CSharp,
    Html,
    Css,
    Unknown,
}

/// Lower-case extension (without dot) to language
const EXTENSIONS: &[(&str, FileType)] = &[
    ("py", FileType::Python),
    ("js", FileType::JavaScriptTypeScript),
    ("jsx", FileType::JavaScriptTypeScript),
    ("ts", FileType::JavaScriptTypeScript),
    ("tsx", FileType::JavaScriptTypeScript),
    ("java", FileType::Java),
    ("rb", FileType::Ruby),
    ("go", FileType::Go),
    ("php", FileType::Php),
    ("c", FileType::CCpp),
    ("cpp", FileType::CCpp),
    ("h", FileType::CCpp),
    ("hpp", FileType::CCpp),
    ("cs", FileType::CSharp),
    ("html", FileType::Html),
    ("htm", FileType::Html),
    ("css", FileType::Css),
    ("scss", FileType::Css),
    ("sass", FileType::Css),
    ("less", FileType::Css),
];

impl FileType {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let Some(ext) = path.as_ref().extension().and_then(|e| e.to_str()) else {
            return FileType::Unknown;
        };
        let ext = ext.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, file_type)| *file_type)
            .unwrap_or(FileType::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileType::Python => "Python",
            FileType::JavaScriptTypeScript => "JavaScript/TypeScript",
            FileType::Java => "Java",
            FileType::Ruby => "Ruby",
            FileType::Go => "Go",
            FileType::Php => "PHP",
            FileType::CCpp => "C/C++",
            FileType::CSharp => "C#",
            FileType::Html => "HTML",
            FileType::Css => "CSS",
            FileType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(FileType::from_path("calculator/calculator.py"), FileType::Python);
        assert_eq!(FileType::from_path("web/App.TSX"), FileType::JavaScriptTypeScript);
        assert_eq!(FileType::from_path("native/lib.hpp").label(), "C/C++");
        assert_eq!(FileType::from_path("styles/site.scss").to_string(), "CSS");
    }

    #[test]
    fn test_unknown_extensions() {
        assert_eq!(FileType::from_path("Makefile"), FileType::Unknown);
        assert_eq!(FileType::from_path("notes.txt"), FileType::Unknown);
        assert_eq!(FileType::Unknown.label(), "Unknown");
    }
}
