#![forbid(unsafe_code)]

//! Elm-style model for the preview widget.
//!
//! User input and the startup fetch become [`Msg`] values; [`PreviewModel::update`]
//! mutates the selection and returns a [`Cmd`] describing side effects. The
//! model itself never touches storage or the document, so persistence only
//! happens when a `Save` message produces [`Cmd::PersistPreferences`].

use tracing::debug;

use crate::config::PreviewConfig;
use crate::manifest::{FontManifest, variant_label};
use crate::prefs::StoredPreferences;
use crate::selection::{EditorStyle, Selection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The manifest fetch resolved.
    ManifestLoaded(FontManifest),
    /// The manifest fetch or parse failed.
    ManifestFailed(String),
    FamilySelected(String),
    VariantSelected(String),
    ItalicToggled,
    TextEdited(String),
    Reset,
    Save,
}

/// Side effects requested by [`PreviewModel::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cmd {
    #[default]
    None,
    /// Regenerate and attach the `@font-face` sheet for the current manifest.
    InjectStyles,
    /// Write the snapshot to the preference store.
    PersistPreferences(Selection),
    /// Emit a diagnostic line.
    Log(String),
}

impl Cmd {
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    #[must_use]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Everything the frontend needs to render one frame of the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub heading: String,
    pub family_options: Vec<SelectOption>,
    pub variant_options: Vec<SelectOption>,
    pub selected_family: String,
    pub selected_variant: String,
    pub italic_checked: bool,
    pub italic_enabled: bool,
    pub text: String,
    pub editor_style: EditorStyle,
}

#[derive(Debug, Clone)]
pub struct PreviewModel {
    config: PreviewConfig,
    manifest: FontManifest,
    selection: Selection,
}

impl PreviewModel {
    /// Create the model, seeding the selection from persisted preferences.
    ///
    /// A restored family and variant only last until the manifest arrives;
    /// loading it always selects the manifest's first keys. Text and italic
    /// survive the load.
    #[must_use]
    pub fn new(config: PreviewConfig, restored: StoredPreferences) -> Self {
        let mut selection = Selection::default();
        restored.apply_to(&mut selection);
        Self {
            config,
            manifest: FontManifest::empty(),
            selection,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    #[must_use]
    pub fn manifest(&self) -> &FontManifest {
        &self.manifest
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn update(&mut self, msg: Msg) -> Cmd {
        match msg {
            Msg::ManifestLoaded(manifest) => {
                self.manifest = manifest;
                self.selection.reset_font(&self.manifest);
                debug!(
                    families = self.manifest.len(),
                    family = %self.selection.family,
                    variant = %self.selection.variant,
                    "manifest applied"
                );
                Cmd::InjectStyles
            }
            Msg::ManifestFailed(reason) => {
                // Degraded mode: controls stay empty, no retry.
                Cmd::log(format!("font manifest unavailable: {reason}"))
            }
            Msg::FamilySelected(family) => {
                if self.config.reconcile_variant_on_family_change
                    && let Some(first) = self
                        .manifest
                        .family(&family)
                        .and_then(|f| f.first_variant())
                    && !self.selection_family_has(&family, &self.selection.variant)
                {
                    self.selection.variant = first.id.as_str().to_owned();
                }
                self.selection.family = family;
                Cmd::none()
            }
            Msg::VariantSelected(variant) => {
                self.selection.variant = variant;
                Cmd::none()
            }
            Msg::ItalicToggled => {
                self.selection.italic = !self.selection.italic;
                Cmd::none()
            }
            Msg::TextEdited(text) => {
                self.selection.text = text;
                Cmd::none()
            }
            Msg::Reset => {
                self.selection.text.clear();
                self.selection.italic = false;
                self.selection.reset_font(&self.manifest);
                Cmd::none()
            }
            Msg::Save => Cmd::PersistPreferences(self.selection.clone()),
        }
    }

    #[must_use]
    pub fn view(&self) -> PreviewView {
        let family_options = self
            .manifest
            .families()
            .iter()
            .map(|f| SelectOption {
                value: f.name.clone(),
                label: f.name.clone(),
            })
            .collect();
        let variant_options = self
            .manifest
            .family(&self.selection.family)
            .map(|f| {
                f.variants
                    .iter()
                    .map(|v| SelectOption {
                        value: v.id.as_str().to_owned(),
                        label: variant_label(v.id.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        PreviewView {
            heading: self.config.heading.clone(),
            family_options,
            variant_options,
            selected_family: self.selection.family.clone(),
            selected_variant: self.selection.variant.clone(),
            italic_checked: self.selection.italic,
            italic_enabled: self.selection.italic_available(&self.manifest),
            text: self.selection.text.clone(),
            editor_style: self.selection.editor_style(),
        }
    }

    fn selection_family_has(&self, family: &str, variant: &str) -> bool {
        self.manifest
            .family(family)
            .is_some_and(|f| f.has_variant(variant))
    }
}
