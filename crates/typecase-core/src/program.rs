#![forbid(unsafe_code)]

//! Program driver: runs [`PreviewModel`] and executes its commands against a
//! preference store and a style host.
//!
//! The driver is the only place where effects happen. Failures are logged
//! and swallowed so the widget keeps working in a degraded state.

use tracing::{info, warn};

use crate::config::PreviewConfig;
use crate::manifest::{FontManifest, ManifestError};
use crate::model::{Cmd, Msg, PreviewModel, PreviewView};
use crate::prefs::{KeyValueStore, PreferenceStore};
use crate::styles::{StyleHost, StyleInjector};

pub struct PreviewProgram<S: KeyValueStore, H: StyleHost> {
    model: PreviewModel,
    prefs: PreferenceStore<S>,
    styles: StyleInjector<H>,
}

impl<S: KeyValueStore, H: StyleHost> PreviewProgram<S, H> {
    /// Build the program, reading persisted preferences once.
    pub fn new(config: PreviewConfig, store: S, host: H) -> Self {
        let prefs = PreferenceStore::new(store, config.storage_keys.clone());
        let restored = prefs.load();
        Self {
            model: PreviewModel::new(config, restored),
            prefs,
            styles: StyleInjector::new(host),
        }
    }

    #[must_use]
    pub fn model(&self) -> &PreviewModel {
        &self.model
    }

    #[must_use]
    pub fn view(&self) -> PreviewView {
        self.model.view()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        self.prefs.backend()
    }

    #[must_use]
    pub fn styles(&self) -> &StyleInjector<H> {
        &self.styles
    }

    /// Feed the outcome of the manifest retrieval into the model.
    pub fn manifest_result(&mut self, result: Result<FontManifest, ManifestError>) {
        let msg = match result {
            Ok(manifest) => Msg::ManifestLoaded(manifest),
            Err(err) => Msg::ManifestFailed(err.to_string()),
        };
        self.dispatch(msg);
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let cmd = self.model.update(msg);
        self.execute(cmd);
    }

    /// Detach the injected style unit. Also runs on drop.
    pub fn teardown(&mut self) {
        self.styles.clear();
    }

    fn execute(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::InjectStyles => match self.styles.inject(self.model.manifest()) {
                Ok(rules) => info!(
                    families = self.model.manifest().len(),
                    rules, "font manifest loaded"
                ),
                Err(err) => warn!(error = %err, "failed to attach font faces"),
            },
            Cmd::PersistPreferences(snapshot) => match self.prefs.save(&snapshot) {
                Ok(()) => info!(family = %snapshot.family, variant = %snapshot.variant, "preferences saved"),
                Err(err) => warn!(error = %err, "failed to save preferences"),
            },
            Cmd::Log(line) => warn!("{line}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryStore;
    use crate::selection::Selection;
    use crate::styles::MemoryStyleHost;
    use pretty_assertions::assert_eq;

    const FONTS: &str = r#"{"Roboto": {"400": "a.woff2", "400italic": "b.woff2"}, "Inter": {"300": "c.woff2"}}"#;

    fn program() -> PreviewProgram<MemoryStore, MemoryStyleHost> {
        PreviewProgram::new(
            PreviewConfig::default(),
            MemoryStore::new(),
            MemoryStyleHost::new(),
        )
    }

    #[test]
    fn load_injects_one_sheet() {
        let mut p = program();
        p.manifest_result(FontManifest::from_json_str(FONTS));
        assert!(p.styles().is_attached());
        assert_eq!(p.styles().rule_count(), 3);
        assert_eq!(p.styles().host().attached_count(), 1);
    }

    #[test]
    fn failed_load_injects_nothing() {
        let mut p = program();
        p.manifest_result(FontManifest::from_json_str("<html>"));
        assert!(!p.styles().is_attached());
        assert!(p.view().family_options.is_empty());
    }

    #[test]
    fn save_persists_and_reset_does_not() {
        let mut p = program();
        p.manifest_result(FontManifest::from_json_str(FONTS));
        p.dispatch(Msg::TextEdited("hi".into()));
        p.dispatch(Msg::Save);
        assert_eq!(p.store().writes(), 4);
        p.dispatch(Msg::Reset);
        assert_eq!(p.store().writes(), 4);
        assert_eq!(p.store().entries()["text"], "hi");
    }

    #[test]
    fn next_session_restores_text_and_italic_and_takes_manifest_font() {
        let mut first = program();
        first.manifest_result(FontManifest::from_json_str(FONTS));
        first.dispatch(Msg::FamilySelected("Inter".into()));
        first.dispatch(Msg::VariantSelected("300".into()));
        first.dispatch(Msg::TextEdited("persist me".into()));
        first.dispatch(Msg::ItalicToggled);
        first.dispatch(Msg::Save);
        let store = first.store().clone();

        let mut second = PreviewProgram::new(PreviewConfig::default(), store, MemoryStyleHost::new());
        assert_eq!(second.model().selection().family, "Inter");
        assert_eq!(second.model().selection().variant, "300");
        second.manifest_result(FontManifest::from_json_str(FONTS));
        assert_eq!(
            second.model().selection(),
            &Selection {
                text: "persist me".into(),
                family: "Roboto".into(),
                variant: "400".into(),
                italic: true,
            }
        );
    }

    #[test]
    fn teardown_detaches_sheet() {
        let mut p = program();
        p.manifest_result(FontManifest::from_json_str(FONTS));
        p.teardown();
        assert!(!p.styles().is_attached());
        assert_eq!(p.styles().host().attached_count(), 0);
    }
}
