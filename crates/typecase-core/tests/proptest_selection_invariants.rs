//! Property-based invariant tests for the preview model.
//!
//! 1. After a manifest load, family/variant are the manifest's first keys,
//!    whatever was restored from storage
//! 2. Italic toggling never touches family or variant
//! 3. Reset restores defaults and never writes to storage
//! 4. Saving twice equals saving once
//! 5. save → fresh load round-trips all four fields
//! 6. One `@font-face` rule per (family, variant), woff2 only

use proptest::prelude::*;
use typecase_core::manifest::{FontFamily, FontManifest, FontVariant, VariantId};
use typecase_core::prefs::{MemoryStore, PreferenceStore, StorageKeys, StoredPreferences};
use typecase_core::styles::{MemoryStyleHost, font_face_rules, stylesheet_text};
use typecase_core::{Msg, PreviewConfig, PreviewModel, PreviewProgram, Selection};

// ── Strategies ──────────────────────────────────────────────────────────

fn variant_id() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u16..=9).prop_map(|w| format!("{}", w * 100)),
        (1u16..=9).prop_map(|w| format!("{}italic", w * 100)),
        Just("italic".to_owned()),
    ]
}

fn family() -> impl Strategy<Value = FontFamily> {
    (
        "[A-Z][a-z]{1,8}( [A-Z][a-z]{1,5})?",
        prop::collection::btree_map(variant_id(), "/fonts/[a-z]{1,8}\\.woff2", 0..5),
    )
        .prop_map(|(name, variants)| FontFamily {
            name,
            variants: variants
                .into_iter()
                .map(|(id, url)| FontVariant {
                    id: VariantId::new(id),
                    url,
                })
                .collect(),
        })
}

fn manifest() -> impl Strategy<Value = FontManifest> {
    prop::collection::vec(family(), 0..6).prop_map(FontManifest::from_families)
}

fn non_empty_manifest() -> impl Strategy<Value = FontManifest> {
    prop::collection::vec(family(), 1..6).prop_map(FontManifest::from_families)
}

#[derive(Debug, Clone)]
enum Op {
    Family(usize),
    Variant(usize),
    Italic,
    Text(String),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..8).prop_map(Op::Family),
        (0usize..8).prop_map(Op::Variant),
        Just(Op::Italic),
        "[ -~]{0,16}".prop_map(Op::Text),
    ]
}

fn msg_for(op: &Op, manifest: &FontManifest, model: &PreviewModel) -> Msg {
    match op {
        Op::Family(idx) => {
            let name = manifest
                .families()
                .get(*idx)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| format!("missing-{idx}"));
            Msg::FamilySelected(name)
        }
        Op::Variant(idx) => {
            let id = manifest
                .family(&model.selection().family)
                .and_then(|f| f.variants.get(*idx))
                .map(|v| v.id.as_str().to_owned())
                .unwrap_or_default();
            Msg::VariantSelected(id)
        }
        Op::Italic => Msg::ItalicToggled,
        Op::Text(text) => Msg::TextEdited(text.clone()),
    }
}

fn selection() -> impl Strategy<Value = Selection> {
    ("[ -~]{0,24}", "[A-Za-z ]{0,12}", variant_id(), any::<bool>()).prop_map(
        |(text, family, variant, italic)| Selection {
            text,
            family,
            variant,
            italic,
        },
    )
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Defaults after load
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn load_selects_first_keys(m in non_empty_manifest()) {
        let mut model = PreviewModel::new(PreviewConfig::default(), StoredPreferences::default());
        model.update(Msg::ManifestLoaded(m.clone()));
        let first = &m.families()[0];
        prop_assert_eq!(&model.selection().family, &first.name);
        let expected_variant = first
            .variants
            .first()
            .map(|v| v.id.as_str().to_owned())
            .unwrap_or_default();
        prop_assert_eq!(&model.selection().variant, &expected_variant);
        prop_assert!(model.selection().is_consistent(&m));
    }

    #[test]
    fn load_replaces_restored_font(m in non_empty_manifest(), saved in selection()) {
        let restored = StoredPreferences {
            text: Some(saved.text.clone()),
            family: Some(saved.family.clone()),
            variant: Some(saved.variant.clone()),
            italic: Some(saved.italic),
        };
        let mut model = PreviewModel::new(PreviewConfig::default(), restored);
        model.update(Msg::ManifestLoaded(m.clone()));
        let (family, variant) = m.default_selection();
        prop_assert_eq!(&model.selection().family, &family);
        prop_assert_eq!(&model.selection().variant, &variant);
        prop_assert_eq!(&model.selection().text, &saved.text);
        prop_assert_eq!(model.selection().italic, saved.italic);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Italic toggle isolation
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn italic_toggle_only_flips_flag(m in manifest(), ops in prop::collection::vec(op(), 0..20)) {
        let mut model = PreviewModel::new(PreviewConfig::default(), StoredPreferences::default());
        model.update(Msg::ManifestLoaded(m.clone()));
        for op in &ops {
            let msg = msg_for(op, &m, &model);
            model.update(msg);
        }
        let before = model.selection().clone();
        model.update(Msg::ItalicToggled);
        let after = model.selection();
        prop_assert_eq!(&after.family, &before.family);
        prop_assert_eq!(&after.variant, &before.variant);
        prop_assert_eq!(&after.text, &before.text);
        prop_assert_eq!(after.italic, !before.italic);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Reset
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reset_restores_defaults_without_writes(
        m in manifest(),
        ops in prop::collection::vec(op(), 0..20),
    ) {
        let mut program = PreviewProgram::new(
            PreviewConfig::default(),
            MemoryStore::new(),
            MemoryStyleHost::new(),
        );
        program.dispatch(Msg::ManifestLoaded(m.clone()));
        for op in &ops {
            let msg = msg_for(op, &m, program.model());
            program.dispatch(msg);
        }
        program.dispatch(Msg::Reset);
        prop_assert_eq!(program.model().selection(), &Selection::defaults_for(&m));
        prop_assert_eq!(program.store().writes(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4–5. Save idempotence and round-trip
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn save_is_idempotent(s in selection()) {
        let mut once = PreferenceStore::new(MemoryStore::new(), StorageKeys::default());
        once.save(&s).unwrap();
        let mut twice = PreferenceStore::new(MemoryStore::new(), StorageKeys::default());
        twice.save(&s).unwrap();
        twice.save(&s).unwrap();
        prop_assert_eq!(once.backend().entries(), twice.backend().entries());
    }

    #[test]
    fn save_then_fresh_load_round_trips(s in selection()) {
        let mut store = PreferenceStore::new(MemoryStore::new(), StorageKeys::default());
        store.save(&s).unwrap();
        let fresh = PreferenceStore::new(store.backend().clone(), StorageKeys::default());
        let mut restored = Selection::default();
        fresh.load().apply_to(&mut restored);
        prop_assert_eq!(restored, s);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 6. Style generation
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn one_rule_per_face(m in manifest()) {
        let rules = font_face_rules(&m);
        prop_assert_eq!(rules.len(), m.face_count());
        let faces = m
            .families()
            .iter()
            .flat_map(|f| f.variants.iter().map(move |v| (f, v)));
        for (rule, (family, variant)) in rules.iter().zip(faces) {
            prop_assert_eq!(&rule.family, &family.name);
            prop_assert_eq!(&rule.src, &variant.url);
            if variant.id.is_italic() {
                prop_assert_eq!(rule.weight.as_str(), "normal");
                prop_assert_eq!(rule.style, "italic");
            } else {
                prop_assert_eq!(rule.weight.as_str(), variant.id.as_str());
                prop_assert_eq!(rule.style, "normal");
            }
        }
        let sheet = stylesheet_text(&rules);
        prop_assert_eq!(sheet.matches("format('woff2')").count(), rules.len());
    }
}
