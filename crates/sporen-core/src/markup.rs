/// Vector markup produced by the diagram generator.
///
/// The composite view injects this markup verbatim (it is never escaped), so it is kept apart
/// from ordinary strings. Values are created by [`crate::generator::GeneratorAdapter`]; code
/// that builds one by hand has to go through [`TrustedSvg::trust`], which makes every other
/// entry point into the raw-markup layer visible at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrustedSvg(String);

impl TrustedSvg {
    /// Marks `markup` as trusted. Callers guarantee it is well-formed SVG that carries no
    /// attacker-controlled content.
    pub fn trust(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The markup without a leading XML declaration or doctype, suitable for nesting inside
    /// another SVG document.
    pub fn embeddable(&self) -> &str {
        let mut rest = self.0.trim_start();
        loop {
            if rest.starts_with("<?xml") || rest.starts_with("<!DOCTYPE") {
                match rest.find('>') {
                    Some(end) => rest = rest[end + 1..].trim_start(),
                    None => return "",
                }
            } else {
                return rest;
            }
        }
    }
}
