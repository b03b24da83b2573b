#![no_main]

use libfuzzer_sys::fuzz_target;
use typecase_core::styles::{font_face_rules, stylesheet_text};
use typecase_core::{FontManifest, Selection};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(manifest) = FontManifest::from_json_str(json) else {
        return;
    };

    // Family names are unique, and so are variant ids within a family.
    for (idx, family) in manifest.families().iter().enumerate() {
        assert!(
            manifest.families()[..idx].iter().all(|f| f.name != family.name),
            "duplicate family {}",
            family.name
        );
        for (vidx, variant) in family.variants.iter().enumerate() {
            assert!(family.variants[..vidx].iter().all(|v| v.id != variant.id));
        }
    }

    let defaults = Selection::defaults_for(&manifest);
    assert!(defaults.is_consistent(&manifest));

    let rules = font_face_rules(&manifest);
    assert_eq!(rules.len(), manifest.face_count());
    let sheet = stylesheet_text(&rules);
    assert_eq!(sheet.matches("format('woff2')").count(), rules.len());

    // Re-encoding keeps order and content.
    let encoded = serde_json::to_string(&manifest).expect("manifest serializes");
    let decoded = FontManifest::from_json_str(&encoded).expect("re-encoded manifest parses");
    assert_eq!(decoded, manifest);
});
