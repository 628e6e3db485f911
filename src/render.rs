//! Template rendering.
//!
//! A template is ordinary UTF-8 text with embedded tags:
//!
//! - `<% skip %>` — produce nothing; the entry is marked skipped.
//! - `<%= env NAME %>` — the value of the environment variable `NAME`
//!   (empty when unset).
//! - `<%= hostname %>` — the machine's host name.
//! - `<%%` — a literal `<%`.
//!
//! Files that are not valid UTF-8 are copied through unchanged, so binary
//! artifacts can live in a source tree without harm. The engine invokes
//! rendering only for file entries, never for directories.

use anyhow::{Context as _, Result, bail};
use std::path::Path;

use crate::exec;

/// Result of rendering one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendered {
    /// The output file was written.
    Written,
    /// The template opted out; no output was written.
    Skipped,
}

/// Renders a source template into an output artifact.
pub trait Render {
    /// Render `source` into `output`, or signal a skip.
    ///
    /// On [`Rendered::Skipped`] the implementation must not have written
    /// `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read, the output cannot be
    /// written, or the template contains an invalid tag.
    fn render(&self, source: &Path, output: &Path) -> Result<Rendered>;
}

/// The tag-expanding renderer used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    /// Expand all tags in `text`, or return `None` when a skip directive
    /// was encountered.
    fn expand(self, text: &str) -> Result<Option<String>> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(pos) = rest.find("<%") {
            out.push_str(&rest[..pos]);
            rest = &rest[pos + 2..];

            // <%% is a literal <%
            if let Some(after) = rest.strip_prefix('%') {
                out.push_str("<%");
                rest = after;
                continue;
            }

            let (is_expression, body_start) = match rest.strip_prefix('=') {
                Some(after) => (true, after),
                None => (false, rest),
            };
            let end = body_start
                .find("%>")
                .context("unterminated template tag")?;
            let body = body_start[..end].trim();
            rest = &body_start[end + 2..];

            if is_expression {
                out.push_str(&self.evaluate(body)?);
            } else if body == "skip" {
                return Ok(None);
            } else {
                bail!("unknown template directive: <% {body} %>");
            }
        }
        out.push_str(rest);
        Ok(Some(out))
    }

    fn evaluate(self, expression: &str) -> Result<String> {
        if expression == "hostname" {
            return hostname();
        }
        if let Some(name) = expression.strip_prefix("env ") {
            return Ok(std::env::var(name.trim()).unwrap_or_default());
        }
        bail!("unknown template expression: <%= {expression} %>");
    }
}

impl Render for TemplateRenderer {
    fn render(&self, source: &Path, output: &Path) -> Result<Rendered> {
        let bytes = std::fs::read(source)
            .with_context(|| format!("reading template {}", source.display()))?;

        let expanded = match std::str::from_utf8(&bytes) {
            Ok(text) => match self.expand(text).with_context(|| {
                format!("rendering template {}", source.display())
            })? {
                Some(expanded) => expanded.into_bytes(),
                None => return Ok(Rendered::Skipped),
            },
            // Not text: pass the bytes through untouched.
            Err(_) => bytes,
        };

        std::fs::write(output, expanded)
            .with_context(|| format!("writing output {}", output.display()))?;
        Ok(Rendered::Written)
    }
}

/// The machine's host name: environment first, `hostname` binary second.
fn hostname() -> Result<String> {
    for variable in ["HOSTNAME", "COMPUTERNAME"] {
        if let Ok(value) = std::env::var(variable)
            && !value.is_empty()
        {
            return Ok(value);
        }
    }
    let result = exec::run_unchecked("hostname", &[])?;
    if result.success {
        Ok(result.stdout.trim().to_string())
    } else {
        bail!("cannot determine hostname")
    }
}
