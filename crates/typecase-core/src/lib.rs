#![forbid(unsafe_code)]

//! Platform-independent core of the typecase font preview widget.
//!
//! A user picks a font family, a variant and an italic toggle, types sample
//! text into an editor styled with that choice, and can save or reset the
//! selection. This crate owns every rule behind that behaviour and none of
//! the browser plumbing:
//!
//! - [`manifest`]: the ordered family → variant → URL mapping.
//! - [`prefs`]: explicit save/load of the four selection fields through a
//!   [`prefs::KeyValueStore`].
//! - [`styles`]: `@font-face` generation and the single-owner
//!   [`styles::StyleInjector`].
//! - [`model`]: `Msg` → `update` → `Cmd` state transitions and the view
//!   description.
//! - [`program`]: the driver that executes commands.
//!
//! The `typecase-web` crate binds these to `fetch`, `localStorage` and the DOM.

pub mod config;
pub mod manifest;
pub mod model;
pub mod prefs;
pub mod program;
pub mod selection;
pub mod styles;

pub use config::{ConfigError, PreviewConfig};
pub use manifest::{FontFamily, FontManifest, FontVariant, ManifestError, VariantId};
pub use model::{Cmd, Msg, PreviewModel, PreviewView, SelectOption};
pub use prefs::{KeyValueStore, MemoryStore, PreferenceStore, StorageError, StorageKeys, StoredPreferences};
pub use program::PreviewProgram;
pub use selection::{EditorStyle, Selection};
pub use styles::{FontFaceRule, MemoryStyleHost, StyleHost, StyleInjector};
