//! Page rendering via `minijinja`.
//!
//! The game page is a single `game.html` template. It is either read from
//! a templates directory at startup, so the page can be restyled without
//! recompiling, or taken from the copy built into the binary. The
//! template name keeps its `.html` suffix so `minijinja` HTML-escapes
//! everything it prints, including the player's raw guesses.

use std::path::Path;

use minijinja::Environment;

use crate::coordinator::PageView;

/// Name the page template is registered under.
const TEMPLATE_NAME: &str = "game.html";

/// The page shipped with the server.
const BUILTIN_TEMPLATE: &str = include_str!("../templates/game.html");

/// Errors raised while loading or rendering the page template.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The template file could not be read.
    #[error("failed to read template {path}: {reason}")]
    Read {
        /// Path that was read.
        path: String,
        /// The underlying I/O error text.
        reason: String,
    },

    /// The template did not parse or failed while rendering.
    #[error("template error: {0}")]
    Template(String),
}

/// Renders [`PageView`]s into HTML.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    /// A renderer using the built-in page.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if the built-in page does not parse.
    pub fn builtin() -> Result<Self, RenderError> {
        Self::from_source(BUILTIN_TEMPLATE)
    }

    /// A renderer loading `game.html` from `templates_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Read`] if the file is missing or unreadable,
    /// or [`RenderError::Template`] if it does not parse.
    pub fn from_dir(templates_dir: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = templates_dir.as_ref().join(TEMPLATE_NAME);
        let source = std::fs::read_to_string(&path).map_err(|e| RenderError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_source(source)
    }

    /// A renderer using the given template source.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if the source does not parse.
    pub fn from_source(source: impl Into<String>) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME, source.into())
            .map_err(|e| RenderError::Template(format!("failed to add page template: {e}")))?;
        Ok(Self { env })
    }

    /// Render one page.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Template`] if rendering fails.
    pub fn render(&self, page: &PageView) -> Result<String, RenderError> {
        self.env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| RenderError::Template(format!("missing page template: {e}")))?
            .render(page)
            .map_err(|e| RenderError::Template(format!("page render failed: {e}")))
    }
}

impl std::fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRenderer").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use guessr_core::session::RoundView;

    use super::*;

    fn page(over: bool, history: Vec<String>) -> PageView {
        PageView {
            visits: 3,
            last_visit: "14.11.2023 22:13:20".to_owned(),
            round: RoundView {
                display_secret: if over { "42".to_owned() } else { "***".to_owned() },
                time_left: 37,
                message: Some("secret is larger".to_owned()),
                input_error: false,
                history,
                over,
                won: over,
            },
            round_secs: 60,
            guess_window_secs: 5,
            secret_min: 1,
            secret_max: 100,
        }
    }

    #[test]
    fn builtin_page_renders_round() {
        let renderer = PageRenderer::builtin().unwrap();
        let html = renderer
            .render(&page(false, vec!["30".to_owned(), "45".to_owned()]))
            .unwrap();

        assert!(html.contains("Guess the number!"));
        assert!(html.contains("***"));
        assert!(html.contains("37"));
        assert!(html.contains("secret is larger"));
        assert!(html.contains("30"));
        assert!(html.contains("45"));
        assert!(html.contains("14.11.2023 22:13:20"));
        assert!(html.contains("name=\"guess\""));
    }

    #[test]
    fn finished_round_reveals_secret_and_hides_guess_form() {
        let renderer = PageRenderer::builtin().unwrap();
        let html = renderer.render(&page(true, Vec::new())).unwrap();
        assert!(html.contains("42"));
        assert!(!html.contains("name=\"guess\""));
        assert!(html.contains("name=\"restart\""));
    }

    #[test]
    fn guesses_are_html_escaped() {
        let renderer = PageRenderer::builtin().unwrap();
        let html = renderer
            .render(&page(false, vec!["<script>alert(1)</script>".to_owned()]))
            .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn broken_source_is_rejected() {
        let result = PageRenderer::from_source("{% for x in %}");
        assert!(matches!(result, Err(RenderError::Template(_))));
    }

    #[test]
    fn render_time_failure_is_reported() {
        let renderer = PageRenderer::from_source("{{ nothing.here }}").unwrap();
        let result = renderer.render(&page(false, Vec::new()));
        assert!(matches!(result, Err(RenderError::Template(_))));
    }

    #[test]
    fn templates_load_from_directory() {
        let unique = format!(
            "guessr_test_templates_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        );
        let dir = std::env::temp_dir().join(unique);
        std::fs::create_dir_all(&dir).ok();
        std::fs::write(dir.join("game.html"), "visits={{ visits }}").ok();

        let renderer = PageRenderer::from_dir(&dir).unwrap();
        let html = renderer.render(&page(false, Vec::new())).unwrap();
        assert_eq!(html, "visits=3");

        let with_slash = format!("{}/", dir.display());
        assert!(PageRenderer::from_dir(with_slash).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_directory_is_a_read_error() {
        let result = PageRenderer::from_dir("/nonexistent/guessr-templates");
        let expected = "/nonexistent/guessr-templates/game.html";
        assert!(matches!(result, Err(RenderError::Read { ref path, .. }) if path == expected));
    }
}
