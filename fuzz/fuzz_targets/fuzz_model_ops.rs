#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use typecase_core::{
    FontFamily, FontManifest, FontVariant, MemoryStore, MemoryStyleHost, Msg, PreviewConfig,
    PreviewProgram, Selection, VariantId,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Family(u8),
    Variant(u8),
    Italic,
    Text(String),
    Reset,
    Save,
    Reload,
}

#[derive(Debug, Arbitrary)]
struct Input {
    families: Vec<(String, Vec<(String, String)>)>,
    reconcile: bool,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let manifest = FontManifest::from_families(input.families.into_iter().take(16).map(
        |(name, variants)| FontFamily {
            name,
            variants: {
                let mut out: Vec<FontVariant> = Vec::new();
                for (id, url) in variants.into_iter().take(16) {
                    if out.iter().all(|v| v.id.as_str() != id) {
                        out.push(FontVariant {
                            id: VariantId::new(id),
                            url,
                        });
                    }
                }
                out
            },
        },
    ));
    let config = PreviewConfig {
        reconcile_variant_on_family_change: input.reconcile,
        ..PreviewConfig::default()
    };
    let mut program = PreviewProgram::new(config, MemoryStore::new(), MemoryStyleHost::new());
    program.dispatch(Msg::ManifestLoaded(manifest.clone()));

    for op in input.ops.into_iter().take(256) {
        let writes_before = program.store().writes();
        let before = program.model().selection().clone();
        let msg = match op {
            Op::Family(idx) => Msg::FamilySelected(
                manifest
                    .families()
                    .get(usize::from(idx))
                    .map(|f| f.name.clone())
                    .unwrap_or_default(),
            ),
            Op::Variant(idx) => Msg::VariantSelected(
                manifest
                    .family(&before.family)
                    .and_then(|f| f.variants.get(usize::from(idx)))
                    .map(|v| v.id.as_str().to_owned())
                    .unwrap_or_default(),
            ),
            Op::Italic => Msg::ItalicToggled,
            Op::Text(text) => Msg::TextEdited(text),
            Op::Reset => Msg::Reset,
            Op::Save => Msg::Save,
            Op::Reload => Msg::ManifestLoaded(manifest.clone()),
        };
        let is_save = matches!(msg, Msg::Save);
        let is_reset = matches!(msg, Msg::Reset);
        let is_italic = matches!(msg, Msg::ItalicToggled);
        let is_reload = matches!(msg, Msg::ManifestLoaded(_));
        program.dispatch(msg);

        let after = program.model().selection();
        if !is_save {
            assert_eq!(program.store().writes(), writes_before);
        }
        if is_reset {
            assert_eq!(after, &Selection::defaults_for(&manifest));
        }
        if is_reload {
            let (family, variant) = manifest.default_selection();
            assert_eq!(after.family, family);
            assert_eq!(after.variant, variant);
        }
        if is_italic {
            assert_eq!(after.family, before.family);
            assert_eq!(after.variant, before.variant);
            assert_eq!(after.italic, !before.italic);
        }
        assert!(program.styles().host().attached_count() <= 1);
        let _ = program.view();
    }
});
