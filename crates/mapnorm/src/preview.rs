//! Standalone HTML preview of a normalized map.
//!
//! The preview is a directory `preview_<name>` next to the output file,
//! holding `preview.html` (the template with the map inserted) and
//! `style.css`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use thiserror::Error;

use mapnorm_core::document::Element;

use crate::{config::PreviewConfig, markup};

const BUILTIN_TEMPLATE: &str = include_str!("../assets/preview-template.html");
const BUILTIN_STYLESHEET: &str = include_str!("../assets/style.css");

const PAGE_FILE: &str = "preview.html";
const STYLESHEET_FILE: &str = "style.css";
const VIEWPORT_OPEN: &str = r#"<div class="svg-pan-zoom_viewport">"#;
const VIEWPORT_CLOSE: &str = "</div>";

/// Errors raised while generating a preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("output path {} has no file name", .0.display())]
    InvalidOutput(PathBuf),

    #[error("failed to clear preview directory {}: {source}", .path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create preview directory {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read preview template {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("preview template has no closing </body> tag")]
    TemplateBody,

    #[error("failed to copy stylesheet {}: {source}", .path.display())]
    Stylesheet {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render map markup: {0}")]
    Render(#[source] io::Error),
}

/// Creates the preview directory for the map `svg` written to `output`.
///
/// An existing preview directory is removed first. Returns the directory
/// path.
///
/// # Errors
///
/// Returns [`PreviewError`] if any filesystem step fails or the template
/// cannot receive the map.
pub fn create_preview(
    svg: &Element,
    output: &Path,
    config: &PreviewConfig,
) -> Result<PathBuf, PreviewError> {
    let name = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| PreviewError::InvalidOutput(output.to_path_buf()))?;
    let parent = output.parent().unwrap_or_else(|| Path::new(""));
    let dir = parent.join(format!("preview_{name}"));

    if dir.exists() {
        debug!(path = dir.display().to_string(); "Removing existing preview directory");
        fs::remove_dir_all(&dir).map_err(|source| PreviewError::Clear {
            path: dir.clone(),
            source,
        })?;
    }
    fs::create_dir_all(&dir).map_err(|source| PreviewError::Create {
        path: dir.clone(),
        source,
    })?;

    let template = match config.template() {
        Some(path) => fs::read_to_string(path).map_err(|source| PreviewError::Template {
            path: path.to_path_buf(),
            source,
        })?,
        None => BUILTIN_TEMPLATE.to_string(),
    };
    let map = markup::render_element(svg).map_err(PreviewError::Render)?;
    let page = render_page(&template, &name, &map)?;

    let page_path = dir.join(PAGE_FILE);
    fs::write(&page_path, page).map_err(|source| PreviewError::Write {
        path: page_path.clone(),
        source,
    })?;

    let stylesheet_path = dir.join(STYLESHEET_FILE);
    match config.stylesheet() {
        Some(path) => {
            fs::copy(path, &stylesheet_path).map_err(|source| PreviewError::Stylesheet {
                path: path.to_path_buf(),
                source,
            })?;
        }
        None => {
            fs::write(&stylesheet_path, BUILTIN_STYLESHEET).map_err(|source| {
                PreviewError::Write {
                    path: stylesheet_path.clone(),
                    source,
                }
            })?;
        }
    }

    info!(path = dir.display().to_string(); "Preview created");
    Ok(dir)
}

/// Fills `template` with the page title and the wrapped map.
///
/// The title replaces the content of the first `<title>` element, if any;
/// the map goes right before the last `</body>`.
fn render_page(template: &str, title: &str, map: &str) -> Result<String, PreviewError> {
    let body_end = template.rfind("</body>").ok_or(PreviewError::TemplateBody)?;

    let mut page = String::with_capacity(template.len() + map.len() + 64);
    page.push_str(&template[..body_end]);
    page.push_str(VIEWPORT_OPEN);
    page.push_str(map);
    page.push_str(VIEWPORT_CLOSE);
    page.push('\n');
    page.push_str(&template[body_end..]);

    Ok(replace_title(&page, title))
}

fn replace_title(page: &str, title: &str) -> String {
    let Some(open) = page.find("<title>") else {
        return page.to_string();
    };
    let content_start = open + "<title>".len();
    let Some(length) = page[content_start..].find("</title>") else {
        return page.to_string();
    };

    let escaped = title
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        "{}{}{}",
        &page[..content_start],
        escaped,
        &page[content_start + length..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> Element {
        Element::new("svg")
            .with_attribute("viewBox", "0 0 5 5")
            .with_child(Element::new("rect").with_attribute("data-type", "area"))
    }

    #[test]
    fn test_render_page_inserts_map_before_body_end() {
        let template = "<html><head><title>x</title></head><body>\n<script></script>\n</body></html>";

        let page = render_page(template, "plan", "<svg/>").unwrap();

        assert_eq!(
            page,
            "<html><head><title>plan</title></head><body>\n<script></script>\n\
             <div class=\"svg-pan-zoom_viewport\"><svg/></div>\n</body></html>"
        );
    }

    #[test]
    fn test_render_page_requires_body() {
        let err = render_page("<html></html>", "plan", "<svg/>").unwrap_err();
        assert!(matches!(err, PreviewError::TemplateBody));
    }

    #[test]
    fn test_title_is_escaped() {
        let page = replace_title("<title></title>", "a<b");
        assert_eq!(page, "<title>a&lt;b</title>");
    }

    #[test]
    fn test_builtin_template_accepts_map() {
        assert!(render_page(BUILTIN_TEMPLATE, "plan", "<svg/>").is_ok());
    }

    #[test]
    fn test_create_preview_writes_page_and_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("floor.transformed.svg");

        let preview = create_preview(&map(), &output, &PreviewConfig::default()).unwrap();

        assert_eq!(preview, dir.path().join("preview_floor.transformed"));
        let page = fs::read_to_string(preview.join("preview.html")).unwrap();
        assert!(page.contains("<title>floor.transformed</title>"));
        assert!(page.contains(
            r#"<div class="svg-pan-zoom_viewport"><svg viewBox="0 0 5 5"><rect data-type="area"/></svg></div>"#
        ));
        let style = fs::read_to_string(preview.join("style.css")).unwrap();
        assert_eq!(style, BUILTIN_STYLESHEET);
    }

    #[test]
    fn test_create_preview_replaces_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("floor.svg");
        let stale = dir.path().join("preview_floor").join("stale.txt");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let preview = create_preview(&map(), &output, &PreviewConfig::default()).unwrap();

        assert!(!stale.exists());
        assert!(preview.join("preview.html").exists());
    }

    #[test]
    fn test_create_preview_with_configured_files() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.html");
        let stylesheet = dir.path().join("map.css");
        fs::write(&template, "<title></title><body></body>").unwrap();
        fs::write(&stylesheet, "svg { width: 100%; }").unwrap();
        let config = PreviewConfig::new(Some(template), Some(stylesheet));

        let preview = create_preview(&map(), &dir.path().join("a.svg"), &config).unwrap();

        let page = fs::read_to_string(preview.join("preview.html")).unwrap();
        assert!(page.starts_with("<title>a</title><body><div class=\"svg-pan-zoom_viewport\">"));
        let style = fs::read_to_string(preview.join("style.css")).unwrap();
        assert_eq!(style, "svg { width: 100%; }");
    }

    #[test]
    fn test_missing_template_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = PreviewConfig::new(Some(dir.path().join("missing.html")), None);

        let err = create_preview(&map(), &dir.path().join("a.svg"), &config).unwrap_err();

        assert!(matches!(err, PreviewError::Template { .. }));
    }
}
