#![forbid(unsafe_code)]

//! In-memory selection state and the editor style derived from it.

use crate::manifest::{FontManifest, css_weight};

/// The four user-controlled fields of the widget.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    /// Free-form sample text.
    pub text: String,
    /// Selected family key, or empty.
    pub family: String,
    /// Selected variant key, or empty.
    pub variant: String,
    /// Italic flag used when rendering the preview.
    pub italic: bool,
}

impl Selection {
    /// Selection with the manifest's first family and first variant, empty
    /// text and italic off.
    #[must_use]
    pub fn defaults_for(manifest: &FontManifest) -> Self {
        let (family, variant) = manifest.default_selection();
        Self {
            text: String::new(),
            family,
            variant,
            italic: false,
        }
    }

    /// Restore family and variant to the manifest's first keys.
    pub fn reset_font(&mut self, manifest: &FontManifest) {
        let (family, variant) = manifest.default_selection();
        self.family = family;
        self.variant = variant;
    }

    /// Whether the selected variant belongs to the selected family. Trivially
    /// true while either side is empty.
    #[must_use]
    pub fn is_consistent(&self, manifest: &FontManifest) -> bool {
        if self.family.is_empty() || self.variant.is_empty() {
            return true;
        }
        manifest
            .family(&self.family)
            .is_some_and(|f| f.has_variant(&self.variant))
    }

    /// Whether the selected family offers an italic variant.
    #[must_use]
    pub fn italic_available(&self, manifest: &FontManifest) -> bool {
        manifest
            .family(&self.family)
            .is_some_and(|f| f.has_italic())
    }

    #[must_use]
    pub fn editor_style(&self) -> EditorStyle {
        EditorStyle {
            family: self.family.clone(),
            weight: css_weight(&self.variant).to_owned(),
            style: if self.italic { "italic" } else { "normal" },
        }
    }
}

/// Inline style applied to the text editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorStyle {
    pub family: String,
    pub weight: String,
    pub style: &'static str,
}

impl EditorStyle {
    #[must_use]
    pub fn to_inline_css(&self) -> String {
        let mut css = String::with_capacity(64 + self.family.len());
        if !self.family.is_empty() {
            css.push_str("font-family: '");
            css.push_str(&crate::styles::escape_css_string(&self.family));
            css.push_str("'; ");
        }
        css.push_str("font-weight: ");
        css.push_str(&self.weight);
        css.push_str("; font-style: ");
        css.push_str(self.style);
        css.push(';');
        css
    }
}
