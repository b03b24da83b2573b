#![forbid(unsafe_code)]

//! `@font-face` generation and ownership of the injected style unit.
//!
//! One rule is generated per (family, variant) pair. Italic-denoting variants
//! map to `font-weight: normal; font-style: italic`, everything else uses the
//! identifier literal as weight with `font-style: normal`. Sources are always
//! declared as `woff2`.
//!
//! [`StyleInjector`] holds at most one attached unit. Attaching a new unit
//! detaches the previous one first; dropping the injector detaches whatever
//! is live.

use std::fmt::Write as _;

use tracing::{debug, warn};

use crate::manifest::FontManifest;

/// The only source format emitted.
pub const FONT_FORMAT: &str = "woff2";

/// One generated `@font-face` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFaceRule {
    pub family: String,
    pub weight: String,
    pub style: &'static str,
    pub src: String,
}

impl FontFaceRule {
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut out = String::with_capacity(96 + self.family.len() + self.src.len());
        self.write_css(&mut out);
        out
    }

    fn write_css(&self, out: &mut String) {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "@font-face {{ font-family: '{}'; font-weight: {}; font-style: {}; src: url('{}') format('{FONT_FORMAT}'); }}",
            escape_css_string(&self.family),
            escape_css_token(&self.weight),
            self.style,
            escape_css_string(&self.src),
        );
    }
}

/// Escape a value for use inside a single-quoted CSS string.
#[must_use]
pub fn escape_css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' | '\'' => {
                out.push('\\');
                out.push(ch);
            }
            c if c.is_control() => push_hex_escape(&mut out, c),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a bare descriptor value such as a weight. Letters, digits, `.`,
/// `-`, `_` and non-ASCII text pass through; anything else is escaped so it
/// cannot end the declaration.
#[must_use]
pub fn escape_css_token(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            c if c.is_control() => push_hex_escape(&mut out, c),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') || !c.is_ascii() => {
                out.push(c);
            }
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

fn push_hex_escape(out: &mut String, ch: char) {
    // Trailing space terminates the escape.
    let _ = write!(out, "\\{:x} ", u32::from(ch));
}

/// Rules for every (family, variant) pair, in manifest order.
#[must_use]
pub fn font_face_rules(manifest: &FontManifest) -> Vec<FontFaceRule> {
    let mut rules = Vec::with_capacity(manifest.face_count());
    for family in manifest.families() {
        for variant in &family.variants {
            rules.push(FontFaceRule {
                family: family.name.clone(),
                weight: variant.id.css_weight().to_owned(),
                style: variant.id.css_style(),
                src: variant.url.clone(),
            });
        }
    }
    rules
}

/// Join rules into the text of a single style sheet.
#[must_use]
pub fn stylesheet_text(rules: &[FontFaceRule]) -> String {
    let mut out = String::with_capacity(rules.len() * 128);
    for (idx, rule) in rules.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        rule.write_css(&mut out);
    }
    out
}

/// Where style units get attached (the document, or a recorder in tests).
pub trait StyleHost {
    /// Token identifying one attached unit.
    type Handle;
    type Error: std::fmt::Display;

    fn attach(&mut self, css: &str) -> Result<Self::Handle, Self::Error>;
    fn detach(&mut self, handle: Self::Handle) -> Result<(), Self::Error>;
}

/// Exclusive owner of the injected style unit.
pub struct StyleInjector<H: StyleHost> {
    host: H,
    live: Option<H::Handle>,
    rule_count: usize,
}

impl<H: StyleHost> StyleInjector<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            live: None,
            rule_count: 0,
        }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.live.is_some()
    }

    /// Number of rules in the live unit (0 when detached).
    #[must_use]
    pub const fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Regenerate rules from `manifest` and replace the live unit.
    pub fn inject(&mut self, manifest: &FontManifest) -> Result<usize, H::Error> {
        self.clear();
        let rules = font_face_rules(manifest);
        let css = stylesheet_text(&rules);
        let handle = self.host.attach(&css)?;
        self.live = Some(handle);
        self.rule_count = rules.len();
        debug!(rules = rules.len(), "font faces injected");
        Ok(rules.len())
    }

    /// Detach the live unit, if any.
    pub fn clear(&mut self) {
        self.rule_count = 0;
        let Some(handle) = self.live.take() else {
            return;
        };
        if let Err(err) = self.host.detach(handle) {
            warn!(error = %err, "failed to detach injected font faces");
        }
    }
}

impl<H: StyleHost> Drop for StyleInjector<H> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<H: StyleHost + std::fmt::Debug> std::fmt::Debug for StyleInjector<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleInjector")
            .field("host", &self.host)
            .field("attached", &self.live.is_some())
            .field("rule_count", &self.rule_count)
            .finish()
    }
}

/// Host that keeps attached sheets in memory. Useful headless and in tests.
#[derive(Debug, Default)]
pub struct MemoryStyleHost {
    next_id: u64,
    attached: Vec<(u64, String)>,
    attach_calls: usize,
    detach_calls: usize,
}

impl MemoryStyleHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheets currently attached, oldest first.
    pub fn attached(&self) -> impl Iterator<Item = &str> {
        self.attached.iter().map(|(_, css)| css.as_str())
    }

    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    #[must_use]
    pub const fn attach_calls(&self) -> usize {
        self.attach_calls
    }

    #[must_use]
    pub const fn detach_calls(&self) -> usize {
        self.detach_calls
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("style unit {0} is not attached")]
pub struct UnknownStyleUnit(pub u64);

impl StyleHost for MemoryStyleHost {
    type Handle = u64;
    type Error = UnknownStyleUnit;

    fn attach(&mut self, css: &str) -> Result<u64, UnknownStyleUnit> {
        self.attach_calls += 1;
        self.next_id += 1;
        self.attached.push((self.next_id, css.to_owned()));
        Ok(self.next_id)
    }

    fn detach(&mut self, handle: u64) -> Result<(), UnknownStyleUnit> {
        self.detach_calls += 1;
        let before = self.attached.len();
        self.attached.retain(|(id, _)| *id != handle);
        if self.attached.len() == before {
            return Err(UnknownStyleUnit(handle));
        }
        Ok(())
    }
}

impl<H: StyleHost + ?Sized> StyleHost for &mut H {
    type Handle = H::Handle;
    type Error = H::Error;

    fn attach(&mut self, css: &str) -> Result<Self::Handle, Self::Error> {
        (**self).attach(css)
    }

    fn detach(&mut self, handle: Self::Handle) -> Result<(), Self::Error> {
        (**self).detach(handle)
    }
}
