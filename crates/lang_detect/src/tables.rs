use std::fmt;

/// Canonical language tags recognized by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageTag {
    Python,
    Javascript,
    Java,
    C,
    Cpp,
    Csharp,
    Go,
    Ruby,
    Php,
    Rust,
    Typescript,
    Kotlin,
    Swift,
    Scala,
    Perl,
    R,
    Bash,
    Html,
    Css,
    Sql,
    Json,
    Xml,
    Yaml,
    Markdown,
}

impl LanguageTag {
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageTag::Python => "python",
            LanguageTag::Javascript => "javascript",
            LanguageTag::Java => "java",
            LanguageTag::C => "c",
            LanguageTag::Cpp => "cpp",
            LanguageTag::Csharp => "csharp",
            LanguageTag::Go => "go",
            LanguageTag::Ruby => "ruby",
            LanguageTag::Php => "php",
            LanguageTag::Rust => "rust",
            LanguageTag::Typescript => "typescript",
            LanguageTag::Kotlin => "kotlin",
            LanguageTag::Swift => "swift",
            LanguageTag::Scala => "scala",
            LanguageTag::Perl => "perl",
            LanguageTag::R => "r",
            LanguageTag::Bash => "bash",
            LanguageTag::Html => "html",
            LanguageTag::Css => "css",
            LanguageTag::Sql => "sql",
            LanguageTag::Json => "json",
            LanguageTag::Xml => "xml",
            LanguageTag::Yaml => "yaml",
            LanguageTag::Markdown => "markdown",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased file extension (with leading dot) to language.
pub const EXTENSION_TABLE: &[(&str, LanguageTag)] = &[
    (".py", LanguageTag::Python),
    (".js", LanguageTag::Javascript),
    (".java", LanguageTag::Java),
    (".c", LanguageTag::C),
    (".cpp", LanguageTag::Cpp),
    (".cc", LanguageTag::Cpp),
    (".cxx", LanguageTag::Cpp),
    (".cs", LanguageTag::Csharp),
    (".go", LanguageTag::Go),
    (".rb", LanguageTag::Ruby),
    (".php", LanguageTag::Php),
    (".rs", LanguageTag::Rust),
    (".ts", LanguageTag::Typescript),
    (".kt", LanguageTag::Kotlin),
    (".swift", LanguageTag::Swift),
    (".scala", LanguageTag::Scala),
    (".pl", LanguageTag::Perl),
    (".r", LanguageTag::R),
    (".sh", LanguageTag::Bash),
    (".html", LanguageTag::Html),
    (".css", LanguageTag::Css),
    (".sql", LanguageTag::Sql),
    (".json", LanguageTag::Json),
    (".xml", LanguageTag::Xml),
    (".yaml", LanguageTag::Yaml),
    (".yml", LanguageTag::Yaml),
    (".md", LanguageTag::Markdown),
];

/// Guesser display names and common spellings, all lower-case. Order matters
/// for the punctuation-stripped comparison: the first key that matches wins.
pub const NAME_ALIASES: &[(&str, LanguageTag)] = &[
    ("python", LanguageTag::Python),
    ("py", LanguageTag::Python),
    ("python3", LanguageTag::Python),
    ("javascript", LanguageTag::Javascript),
    ("js", LanguageTag::Javascript),
    ("java", LanguageTag::Java),
    ("c", LanguageTag::C),
    ("c++", LanguageTag::Cpp),
    ("cpp", LanguageTag::Cpp),
    ("c#", LanguageTag::Csharp),
    ("csharp", LanguageTag::Csharp),
    ("c-sharp", LanguageTag::Csharp),
    ("c# (c-sharp)", LanguageTag::Csharp),
    ("go", LanguageTag::Go),
    ("golang", LanguageTag::Go),
    ("ruby", LanguageTag::Ruby),
    ("rb", LanguageTag::Ruby),
    ("php", LanguageTag::Php),
    ("rust", LanguageTag::Rust),
    ("typescript", LanguageTag::Typescript),
    ("ts", LanguageTag::Typescript),
    ("kotlin", LanguageTag::Kotlin),
    ("swift", LanguageTag::Swift),
    ("scala", LanguageTag::Scala),
    ("perl", LanguageTag::Perl),
    ("r", LanguageTag::R),
    ("bash", LanguageTag::Bash),
    ("sh", LanguageTag::Bash),
    ("shell", LanguageTag::Bash),
    ("html", LanguageTag::Html),
    ("xml+html", LanguageTag::Html),
    ("css", LanguageTag::Css),
    ("sql", LanguageTag::Sql),
    ("json", LanguageTag::Json),
    ("xml", LanguageTag::Xml),
    ("yaml", LanguageTag::Yaml),
    ("yml", LanguageTag::Yaml),
    ("markdown", LanguageTag::Markdown),
    ("md", LanguageTag::Markdown),
];

pub fn language_for_extension(extension: &str) -> Option<LanguageTag> {
    EXTENSION_TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, tag)| *tag)
}
