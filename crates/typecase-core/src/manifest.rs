#![forbid(unsafe_code)]

//! Font manifest: family → variant → font-file URL.
//!
//! The manifest is a static JSON document of the shape
//!
//! ```json
//! { "Roboto": { "400": "/fonts/Roboto-Regular.woff2", "400italic": "/fonts/Roboto-Italic.woff2" } }
//! ```
//!
//! Key order is significant: the first family, and the first variant of that
//! family, form the default selection. Keys follow JavaScript object property
//! order: integer-like keys come first in ascending numeric order, then every
//! other key in document order. `serde_json` maps do not keep document order
//! without an extra feature, so both levels are deserialized with a
//! hand-written visitor into ordered vectors.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Substring marking a variant identifier as italic.
const ITALIC_MARKER: &str = "italic";

/// Largest integer-like key, `2^32 - 2`.
const MAX_INDEX_KEY: u32 = u32::MAX - 1;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse font manifest JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to fetch font manifest: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, ManifestError>;

/// Identifier of one weight/style instance within a family, e.g. `"700"` or
/// `"400italic"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VariantId(String);

impl VariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier denotes an italic face.
    #[must_use]
    pub fn is_italic(&self) -> bool {
        denotes_italic(&self.0)
    }

    /// Human-readable option label.
    #[must_use]
    pub fn label(&self) -> String {
        variant_label(&self.0)
    }

    /// Value for the CSS `font-weight` descriptor.
    #[must_use]
    pub fn css_weight(&self) -> &str {
        css_weight(&self.0)
    }

    /// Value for the CSS `font-style` descriptor.
    #[must_use]
    pub fn css_style(&self) -> &'static str {
        if self.is_italic() { "italic" } else { "normal" }
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Numeric value of a key that JavaScript treats as an array index: canonical
/// decimal digits (no sign, no leading zero) up to `2^32 - 2`.
#[must_use]
pub fn index_key(key: &str) -> Option<u32> {
    let bytes = key.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    key.parse::<u32>().ok().filter(|&n| n <= MAX_INDEX_KEY)
}

/// Stable reorder into JavaScript property order.
fn sort_js_keys<T>(items: &mut [T], key: impl Fn(&T) -> &str) {
    items.sort_by_key(|item| match index_key(key(item)) {
        Some(n) => (false, n),
        None => (true, 0),
    });
}

/// Whether a raw variant identifier denotes italic.
#[must_use]
pub fn denotes_italic(id: &str) -> bool {
    id.contains(ITALIC_MARKER)
}

/// Label shown in the variant selector for a raw identifier.
#[must_use]
pub fn variant_label(id: &str) -> String {
    if denotes_italic(id) {
        "Italic".to_owned()
    } else {
        format!("Weight {id}")
    }
}

/// CSS weight for a raw identifier. Italic variants render at normal weight.
#[must_use]
pub fn css_weight(id: &str) -> &str {
    if id.is_empty() || denotes_italic(id) {
        "normal"
    } else {
        id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontVariant {
    pub id: VariantId,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFamily {
    pub name: String,
    pub variants: Vec<FontVariant>,
}

impl FontFamily {
    #[must_use]
    pub fn first_variant(&self) -> Option<&FontVariant> {
        self.variants.first()
    }

    #[must_use]
    pub fn variant(&self, id: &str) -> Option<&FontVariant> {
        self.variants.iter().find(|v| v.id.as_str() == id)
    }

    #[must_use]
    pub fn has_variant(&self, id: &str) -> bool {
        self.variant(id).is_some()
    }

    /// Whether at least one variant denotes italic.
    #[must_use]
    pub fn has_italic(&self) -> bool {
        self.variants.iter().any(|v| v.id.is_italic())
    }
}

/// Ordered, immutable mapping of families to their variants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontManifest {
    families: Vec<FontFamily>,
}

impl FontManifest {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            families: Vec::new(),
        }
    }

    /// Build from families in document order. Later duplicates of a family
    /// name replace the earlier entry's variants in place. Both levels are
    /// then put into JavaScript property order.
    #[must_use]
    pub fn from_families(families: impl IntoIterator<Item = FontFamily>) -> Self {
        let mut out = Self::empty();
        for family in families {
            out.upsert(family);
        }
        out.sort_keys();
        out
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.families.len()
    }

    #[must_use]
    pub fn families(&self) -> &[FontFamily] {
        &self.families
    }

    #[must_use]
    pub fn family(&self, name: &str) -> Option<&FontFamily> {
        self.families.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn first_family(&self) -> Option<&FontFamily> {
        self.families.first()
    }

    /// First family key and that family's first variant key. Either is empty
    /// when the manifest (or the family) has no entries.
    #[must_use]
    pub fn default_selection(&self) -> (String, String) {
        match self.first_family() {
            Some(family) => (
                family.name.clone(),
                family
                    .first_variant()
                    .map(|v| v.id.as_str().to_owned())
                    .unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        }
    }

    /// Total number of (family, variant) pairs.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.families.iter().map(|f| f.variants.len()).sum()
    }

    fn sort_keys(&mut self) {
        sort_js_keys(&mut self.families, |f| f.name.as_str());
        for family in &mut self.families {
            sort_js_keys(&mut family.variants, |v| v.id.as_str());
        }
    }

    fn upsert(&mut self, family: FontFamily) {
        match self.families.iter_mut().find(|f| f.name == family.name) {
            Some(existing) => existing.variants = family.variants,
            None => self.families.push(family),
        }
    }
}

// ---------------------------------------------------------------------------
// serde
// ---------------------------------------------------------------------------

struct VariantsVisitor;

impl<'de> Visitor<'de> for VariantsVisitor {
    type Value = Vec<FontVariant>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping variant identifiers to font URLs")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut variants: Vec<FontVariant> = Vec::with_capacity(map.size_hint().unwrap_or(4));
        while let Some((id, url)) = map.next_entry::<String, String>()? {
            match variants.iter_mut().find(|v| v.id.as_str() == id) {
                Some(existing) => existing.url = url,
                None => variants.push(FontVariant {
                    id: VariantId(id),
                    url,
                }),
            }
        }
        Ok(variants)
    }
}

struct Variants(Vec<FontVariant>);

impl<'de> Deserialize<'de> for Variants {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(VariantsVisitor).map(Variants)
    }
}

struct ManifestVisitor;

impl<'de> Visitor<'de> for ManifestVisitor {
    type Value = FontManifest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping font family names to variant objects")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut manifest = FontManifest::empty();
        while let Some((name, Variants(variants))) = map.next_entry::<String, Variants>()? {
            manifest.upsert(FontFamily { name, variants });
        }
        manifest.sort_keys();
        Ok(manifest)
    }
}

impl<'de> Deserialize<'de> for FontManifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ManifestVisitor)
    }
}

struct VariantsRef<'a>(&'a [FontVariant]);

impl Serialize for VariantsRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for v in self.0 {
            map.serialize_entry(v.id.as_str(), &v.url)?;
        }
        map.end()
    }
}

impl Serialize for FontManifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.families.len()))?;
        for family in &self.families {
            map.serialize_entry(&family.name, &VariantsRef(&family.variants))?;
        }
        map.end()
    }
}
