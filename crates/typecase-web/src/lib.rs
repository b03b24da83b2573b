#![forbid(unsafe_code)]

//! Browser frontend for the typecase font preview widget.
//!
//! [`FontPreviewApp`] (wasm32 only) mounts the widget into a host element,
//! fetches the font manifest, persists the selection in `localStorage` and
//! keeps a single `<style>` element of generated `@font-face` rules in
//! `document.head`. All state rules live in `typecase-core`; this crate only
//! translates DOM events into [`typecase_core::Msg`] values and renders
//! [`typecase_core::PreviewView`] back into the DOM.
//!
//! The non-wasm modules hold the pieces that can be exercised on the host.

pub mod logging;
pub mod render;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{FontPreviewApp, HeadStyleHost, LocalStorage};

use thiserror::Error;

/// Failure while building or mutating the widget's DOM.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("no global `window`/`document` available")]
    NoDocument,
    #[error("no element with id `{0}`")]
    MissingRoot(String),
    #[error("unexpected element type for <{0}>")]
    ElementType(&'static str),
    #[error("DOM call failed: {0}")]
    Js(String),
}
