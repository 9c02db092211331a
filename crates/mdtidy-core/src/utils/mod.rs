use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static DATED_FILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}-(.+)\.md$").expect("hardcoded slug regex must compile")
});

/// Normalize a path relative to some root into a forward-slash key.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use mdtidy_core::normalize_relative_path;
///
/// assert_eq!(normalize_relative_path(Path::new("1/practice/a.md")), "1/practice/a.md");
/// # if cfg!(windows) {
/// #     assert_eq!(normalize_relative_path(Path::new("1\\practice\\a.md")), "1/practice/a.md");
/// # }
/// ```
pub fn normalize_relative_path(path: &Path) -> String {
    let mut s = path.to_string_lossy().to_string();
    if std::path::MAIN_SEPARATOR == '\\' {
        s = s.replace('\\', "/");
    }
    s
}

/// Derive a slug from a post file name.
///
/// Rules:
/// - `YYYY-MM-DD-rest.md` becomes `rest`
/// - anything else loses its `.md` extension
///
/// # Examples
///
/// ```
/// use mdtidy_core::slug_from_filename;
///
/// assert_eq!(slug_from_filename("2024-11-03-gesp-1-practice.md"), "gesp-1-practice");
/// assert_eq!(slug_from_filename("syllabus.md"), "syllabus");
/// assert_eq!(slug_from_filename("2024-11-03.md"), "2024-11-03");
/// ```
pub fn slug_from_filename(file_name: &str) -> String {
    if let Some(caps) = DATED_FILE_REGEX.captures(file_name) {
        return caps[1].to_string();
    }
    file_name
        .strip_suffix(".md")
        .unwrap_or(file_name)
        .to_string()
}

/// File name of `path` as UTF-8, lossily converted.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Hugo-style partials and section indexes (`_index.md`) start with an underscore.
pub fn is_underscore_file(path: &Path) -> bool {
    file_name_of(path).starts_with('_')
}
