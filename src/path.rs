use std::{
    io,
    path::{Path, PathBuf},
};

/// Extension appended to every saved page
pub const SAVED_PAGE_EXTENSION: &str = "txt";

/// Name used when a URL has neither a path segment nor an authority
const FALLBACK_PAGE_NAME: &str = "index";

/// Resolve the file path a page fetched from `url` is saved to,
/// creating `<output_dir>/<folder_name>` when it does not exist yet.
///
/// Without `output_dir` the folder is placed next to the running executable.
pub fn resolve_output_path(
    output_dir: Option<&Path>,
    url: &str,
    folder_name: &str,
) -> io::Result<PathBuf> {
    let dir = match output_dir {
        Some(dir) => dir.join(folder_name),
        None => default_output_root().join(folder_name),
    };
    ensure_dir(&dir)?;
    Ok(dir.join(derive_file_name(url)))
}

/// Create `dir` and its parents; an existing directory is not an error
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        // Another job may have created it between the check and the call.
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(err) => Err(err),
    }
}

/// Derive `<last segment with '.' replaced by '_'>.txt` from a URL
pub fn derive_file_name(url: &str) -> String {
    let stem = last_segment(url)
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| FALLBACK_PAGE_NAME.to_string());
    format!("{}.{SAVED_PAGE_EXTENSION}", stem.replace('.', "_"))
}

/// Raw last slash-delimited segment, ignoring scheme, query, fragment and trailing slashes.
///
/// For a bare authority (`http://www.gmw.cn/`) that is the authority itself.
fn last_segment(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return None;
    }
    path.rsplit('/').next().map(str::to_string)
}

fn default_output_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
