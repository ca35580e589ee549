//! Opening listing links in the system browser
//!
//! The browser is launched as a separate process, so the destination site
//! receives no referrer and the app window stays where it is.

use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("refusing to open '{0}': only http and https links are supported")]
    UnsupportedUrl(String),
    #[error("failed to open {url}: {source}")]
    Launch {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Program and arguments that hand `url` to the desktop's default browser
fn opener(url: &str) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("open", vec![url.to_string()])
    } else if cfg!(target_os = "windows") {
        // The empty title keeps `start` from treating the URL as a window title
        ("cmd", vec!["/C".into(), "start".into(), String::new(), url.to_string()])
    } else {
        ("xdg-open", vec![url.to_string()])
    }
}

/// Only web links are handed to the browser
pub fn is_web_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("https://") || url.starts_with("http://")
}

/// Open a listing link in a new browser window or tab
pub fn open_listing(url: &str) -> Result<(), BrowserError> {
    let url = url.trim();
    if !is_web_url(url) {
        return Err(BrowserError::UnsupportedUrl(url.to_string()));
    }

    let (program, args) = opener(url);
    Command::new(program)
        .args(&args)
        .spawn()
        .map_err(|source| BrowserError::Launch {
            url: url.to_string(),
            source,
        })?;

    tracing::info!(%url, "opened listing in browser");
    Ok(())
}
