//! HTML export
//!
//! The page itself comes from plotly's standalone template; this module
//! writes it out and hands it to the browser.

use anyhow::{Context, Result};
use std::path::Path;

use crate::figure::Figure;

/// Standalone page for a figure
pub fn render(figure: &Figure) -> String {
    figure.plot().to_html()
}

/// Write the document, creating parent directories as needed
pub fn write_html(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {:?}", parent))?;
        }
    }
    std::fs::write(path, html).with_context(|| format!("writing {:?}", path))?;
    tracing::info!(path = ?path, bytes = html.len(), "HTML written");
    Ok(())
}

/// `file://` URL for a local file, absolute when the path can be resolved
pub fn file_url(path: &Path) -> String {
    let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let display = target.to_string_lossy().replace('\\', "/");
    if display.starts_with('/') {
        format!("file://{}", display)
    } else {
        format!("file:///{}", display)
    }
}

/// Open the exported file in the default browser.
///
/// Failures are logged and otherwise ignored.
pub fn open_in_browser(path: &Path) {
    let url = file_url(path);
    match webbrowser::open(&url) {
        Ok(()) => tracing::info!("Opened {} in browser", url),
        Err(e) => tracing::warn!("Could not open browser: {}. Please open {} manually.", e, url),
    }
}
