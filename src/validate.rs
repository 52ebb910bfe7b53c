use std::path::PathBuf;

use validator::ValidationError;

use crate::url_list::is_http_url;

/// Return error if any URL is not http(s)
pub fn validate_http_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    if let Some(url) = urls.iter().find(|url| !is_http_url(url)) {
        let mut err = ValidationError::new("unsupported_scheme");
        err.message = Some(format!("only http and https URLs are supported: '{url}'").into());
        return Err(err);
    }
    Ok(())
}

/// Return error if file does not exist at given path
pub fn validate_file_not_exists(path: &PathBuf) -> Result<(), ValidationError> {
    if !path.exists() {
        let mut err = ValidationError::new("not_exists");
        err.message = Some(format!("file does not exist at {path:?}").into());
        return Err(err);
    }
    if !path.is_file() {
        let mut err = ValidationError::new("not_file");
        err.message = Some(format!("path is not a file: {path:?}").into());
        return Err(err);
    }
    Ok(())
}

/// Return error if output path exists but is not a directory
pub fn validate_output_dir(path: &PathBuf) -> Result<(), ValidationError> {
    if path.exists() && !path.is_dir() {
        let mut err = ValidationError::new("not_dir");
        err.message = Some(format!("output path is not a directory: {path:?}").into());
        return Err(err);
    }
    Ok(())
}
