#![forbid(unsafe_code)]

//! DOM-independent rendering decisions.
//!
//! Option lists are only rebuilt when their contents change, so a re-render
//! after typing in the editor does not reset an open `<select>`. The editor's
//! value is only written when it differs, which keeps the caret in place.

use typecase_core::{PreviewView, SelectOption};

/// Class names applied to the widget's elements.
pub mod class {
    pub const ROOT: &str = "typecase";
    pub const HEADING: &str = "heading";
    pub const CONTROLS: &str = "controls";
    pub const SWITCH: &str = "switch";
    pub const TOGGLE_SWITCH: &str = "toggle-switch";
    pub const EDITOR: &str = "text-editor";
    pub const BUTTONS: &str = "buttons";
}

pub const FAMILY_LABEL: &str = "Font Family";
pub const VARIANT_LABEL: &str = "Variant";
pub const ITALIC_LABEL: &str = "Italic";
pub const RESET_LABEL: &str = "Reset";
pub const SAVE_LABEL: &str = "Save";

/// Element id of the italic checkbox, unique per mounted widget.
#[must_use]
pub fn italic_switch_id(root_id: &str) -> String {
    format!("{root_id}-italic-switch")
}

/// What needs to change in the DOM to reflect a view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderPlan {
    pub rebuild_families: bool,
    pub rebuild_variants: bool,
    pub write_text: bool,
}

/// Last state written to the DOM.
#[derive(Debug, Clone, Default)]
pub struct RenderCache {
    families: Option<Vec<SelectOption>>,
    variants: Option<Vec<SelectOption>>,
}

impl RenderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `view` against the cache and remember the new option lists.
    /// `editor_text` is the editor's current DOM value.
    pub fn plan(&mut self, view: &PreviewView, editor_text: &str) -> RenderPlan {
        RenderPlan {
            rebuild_families: replace_if_changed(&mut self.families, &view.family_options),
            rebuild_variants: replace_if_changed(&mut self.variants, &view.variant_options),
            write_text: editor_text != view.text,
        }
    }

    /// Forget everything, forcing a full rebuild next time.
    pub fn invalidate(&mut self) {
        self.families = None;
        self.variants = None;
    }
}

fn replace_if_changed(slot: &mut Option<Vec<SelectOption>>, next: &[SelectOption]) -> bool {
    if slot.as_deref() == Some(next) {
        return false;
    }
    *slot = Some(next.to_vec());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use typecase_core::{FontManifest, Msg, PreviewConfig, PreviewModel, StoredPreferences};

    fn model() -> PreviewModel {
        let mut model = PreviewModel::new(PreviewConfig::default(), StoredPreferences::default());
        model.update(Msg::ManifestLoaded(
            FontManifest::from_json_str(
                r#"{"Roboto": {"400": "a", "400italic": "b"}, "Inter": {"300": "c"}}"#,
            )
            .unwrap(),
        ));
        model
    }

    #[test]
    fn first_render_rebuilds_everything() {
        let mut cache = RenderCache::new();
        let plan = cache.plan(&model().view(), "");
        assert_eq!(
            plan,
            RenderPlan {
                rebuild_families: true,
                rebuild_variants: true,
                write_text: false,
            }
        );
    }

    #[test]
    fn typing_does_not_rebuild_options_or_rewrite_text() {
        let mut model = model();
        let mut cache = RenderCache::new();
        cache.plan(&model.view(), "");
        model.update(Msg::TextEdited("abc".into()));
        assert_eq!(cache.plan(&model.view(), "abc"), RenderPlan::default());
    }

    #[test]
    fn family_change_rebuilds_variants_only() {
        let mut model = model();
        let mut cache = RenderCache::new();
        cache.plan(&model.view(), "");
        model.update(Msg::FamilySelected("Inter".into()));
        let plan = cache.plan(&model.view(), "");
        assert!(!plan.rebuild_families);
        assert!(plan.rebuild_variants);
    }

    #[test]
    fn reset_rewrites_text() {
        let mut model = model();
        let mut cache = RenderCache::new();
        model.update(Msg::TextEdited("abc".into()));
        cache.plan(&model.view(), "abc");
        model.update(Msg::Reset);
        assert!(cache.plan(&model.view(), "abc").write_text);
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let model = model();
        let mut cache = RenderCache::new();
        cache.plan(&model.view(), "");
        cache.invalidate();
        let plan = cache.plan(&model.view(), "");
        assert!(plan.rebuild_families && plan.rebuild_variants);
    }

    #[test]
    fn switch_id_is_scoped_to_root() {
        assert_eq!(italic_switch_id("preview"), "preview-italic-switch");
    }
}
