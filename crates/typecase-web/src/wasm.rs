#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the font preview widget.
//!
//! Only compiled on `wasm32` targets.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use js_sys::{Promise, Reflect};
use tracing::{debug, warn};
use typecase_core::manifest::ManifestError;
use typecase_core::prefs::{KeyValueStore, StorageError};
use typecase_core::styles::StyleHost;
use typecase_core::{FontManifest, Msg, PreviewConfig, PreviewProgram, SelectOption};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement, HtmlInputElement,
    HtmlLabelElement, HtmlOptionElement, HtmlSelectElement, HtmlStyleElement,
    HtmlTextAreaElement, Response, Storage,
};

use crate::DomError;
use crate::logging;
use crate::render::{self, RenderCache, class};

fn console_call(method: &str, msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(func) = Reflect::get(&console, &method.into()) else {
        return;
    };
    let Ok(func) = func.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = func.call1(&console, &JsValue::from_str(msg));
}

fn console_log(line: &str) {
    console_call("log", line);
}

fn install_hooks() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!("panic at {}:{}:{}: {info}", loc.file(), loc.line(), loc.column())
            } else {
                format!("panic: {info}")
            };
            console_call("error", &msg);
        }));
        logging::init(console_log, tracing::Level::INFO);
    });
}

fn js_error_string(err: &JsValue) -> String {
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    err.as_string()
        .unwrap_or_else(|| format!("{err:?}"))
}

impl From<JsValue> for DomError {
    fn from(err: JsValue) -> Self {
        Self::Js(js_error_string(&err))
    }
}

// ---------------------------------------------------------------------------
// Storage and style host
// ---------------------------------------------------------------------------

/// [`KeyValueStore`] over `window.localStorage`. Missing storage (private
/// mode, sandboxed iframes) reports [`StorageError::Unavailable`].
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    #[must_use]
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(js_error_string(&e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(js_error_string(&e)))
    }
}

/// [`StyleHost`] that appends `<style>` elements to `document.head`.
#[derive(Debug, Clone)]
pub struct HeadStyleHost {
    document: Document,
}

impl HeadStyleHost {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl StyleHost for HeadStyleHost {
    type Handle = HtmlStyleElement;
    type Error = DomError;

    fn attach(&mut self, css: &str) -> Result<HtmlStyleElement, DomError> {
        let head = self.document.head().ok_or(DomError::NoDocument)?;
        let style: HtmlStyleElement = create(&self.document, "style")?;
        style.set_attribute("type", "text/css")?;
        style.set_attribute("data-typecase", "font-faces")?;
        style.set_text_content(Some(css));
        head.append_child(&style)?;
        Ok(style)
    }

    fn detach(&mut self, handle: HtmlStyleElement) -> Result<(), DomError> {
        handle.remove();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DOM
// ---------------------------------------------------------------------------

fn create<T: JsCast>(document: &Document, tag: &'static str) -> Result<T, DomError> {
    document
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| DomError::ElementType(tag))
}

fn append(parent: &Element, child: &Element) -> Result<(), DomError> {
    parent.append_child(child)?;
    Ok(())
}

struct Dom {
    container: HtmlElement,
    heading: HtmlElement,
    family_select: HtmlSelectElement,
    variant_select: HtmlSelectElement,
    italic_input: HtmlInputElement,
    editor: HtmlTextAreaElement,
    reset_button: HtmlButtonElement,
    save_button: HtmlButtonElement,
}

impl Dom {
    fn build(document: &Document, root: &Element, root_id: &str) -> Result<Self, DomError> {
        let container: HtmlElement = create(document, "div")?;
        container.set_class_name(class::ROOT);

        let heading: HtmlElement = create(document, "div")?;
        heading.set_class_name(class::HEADING);
        append(&container, &heading)?;

        let controls: HtmlElement = create(document, "div")?;
        controls.set_class_name(class::CONTROLS);
        append(&container, &controls)?;

        let family_label: HtmlLabelElement = create(document, "label")?;
        family_label.set_text_content(Some(render::FAMILY_LABEL));
        let family_select: HtmlSelectElement = create(document, "select")?;
        append(&family_label, &family_select)?;
        append(&controls, &family_label)?;

        let variant_label: HtmlLabelElement = create(document, "label")?;
        variant_label.set_text_content(Some(render::VARIANT_LABEL));
        let variant_select: HtmlSelectElement = create(document, "select")?;
        append(&variant_label, &variant_select)?;
        append(&controls, &variant_label)?;

        let switch_id = render::italic_switch_id(root_id);
        let italic_label: HtmlLabelElement = create(document, "label")?;
        italic_label.set_text_content(Some(render::ITALIC_LABEL));
        let italic_input: HtmlInputElement = create(document, "input")?;
        italic_input.set_type("checkbox");
        italic_input.set_id(&switch_id);
        italic_input.set_class_name(class::SWITCH);
        let toggle: HtmlLabelElement = create(document, "label")?;
        toggle.set_html_for(&switch_id);
        toggle.set_class_name(class::TOGGLE_SWITCH);
        append(&italic_label, &italic_input)?;
        append(&italic_label, &toggle)?;
        append(&controls, &italic_label)?;

        let editor: HtmlTextAreaElement = create(document, "textarea")?;
        editor.set_class_name(class::EDITOR);
        append(&container, &editor)?;

        let buttons: HtmlElement = create(document, "div")?;
        buttons.set_class_name(class::BUTTONS);
        let reset_button: HtmlButtonElement = create(document, "button")?;
        reset_button.set_text_content(Some(render::RESET_LABEL));
        let save_button: HtmlButtonElement = create(document, "button")?;
        save_button.set_text_content(Some(render::SAVE_LABEL));
        append(&buttons, &reset_button)?;
        append(&buttons, &save_button)?;
        append(&container, &buttons)?;

        append(root, &container)?;

        Ok(Self {
            container,
            heading,
            family_select,
            variant_select,
            italic_input,
            editor,
            reset_button,
            save_button,
        })
    }
}

fn rebuild_options(select: &HtmlSelectElement, options: &[SelectOption]) -> Result<(), DomError> {
    while let Some(child) = select.first_child() {
        select.remove_child(&child)?;
    }
    for option in options {
        let el = HtmlOptionElement::new_with_text_and_value(&option.label, &option.value)?;
        select.append_child(&el)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

type Program = PreviewProgram<LocalStorage, HeadStyleHost>;

struct Inner {
    program: Program,
    dom: Dom,
    cache: RenderCache,
}

impl Inner {
    fn dispatch(&mut self, msg: Msg) {
        debug!(?msg, "dispatch");
        self.program.dispatch(msg);
        self.render();
    }

    fn render(&mut self) {
        if let Err(err) = self.try_render() {
            warn!(error = %err, "render failed");
            self.cache.invalidate();
        }
    }

    fn try_render(&mut self) -> Result<(), DomError> {
        let view = self.program.view();
        let dom = &self.dom;
        let plan = self.cache.plan(&view, &dom.editor.value());

        dom.heading.set_text_content(Some(&view.heading));
        if plan.rebuild_families {
            rebuild_options(&dom.family_select, &view.family_options)?;
        }
        if plan.rebuild_variants {
            rebuild_options(&dom.variant_select, &view.variant_options)?;
        }
        dom.family_select.set_value(&view.selected_family);
        dom.variant_select.set_value(&view.selected_variant);
        dom.italic_input.set_checked(view.italic_checked);
        dom.italic_input.set_disabled(!view.italic_enabled);
        if plan.write_text {
            dom.editor.set_value(&view.text);
        }
        dom.editor
            .set_attribute("style", &view.editor_style.to_inline_css())?;
        Ok(())
    }
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// Font preview widget mounted into a host element.
///
/// ```js
/// const app = new FontPreviewApp("preview", JSON.stringify({ manifest_url: "/fonts.json" }));
/// await app.start();
/// // ...
/// app.destroy();
/// ```
#[wasm_bindgen]
pub struct FontPreviewApp {
    inner: Rc<RefCell<Inner>>,
    listeners: Vec<Listener>,
    manifest_url: String,
    started: Cell<bool>,
    destroyed: bool,
}

#[wasm_bindgen]
impl FontPreviewApp {
    /// Mount the widget into the element with id `root_id`. `config_json` is
    /// an optional JSON-encoded `PreviewConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(root_id: &str, config_json: Option<String>) -> Result<FontPreviewApp, JsValue> {
        install_hooks();
        let config = match config_json.as_deref() {
            Some(json) => PreviewConfig::from_json_str(json)
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => PreviewConfig::default(),
        };
        Self::mount(root_id, config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Fetch the manifest and apply it. The manifest is retrieved at most
    /// once per widget: the first call resolves to `true` after applying the
    /// result, later calls resolve to `false` without fetching. The promise
    /// never rejects; a failed fetch leaves the controls empty.
    pub fn start(&self) -> Promise {
        if self.started.replace(true) {
            warn!("font preview already started; ignoring");
            return Promise::resolve(&JsValue::FALSE);
        }
        let weak = Rc::downgrade(&self.inner);
        let url = self.manifest_url.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let result = fetch_manifest(&url).await;
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                inner.program.manifest_result(result);
                inner.render();
            }
            Ok(JsValue::TRUE)
        })
    }

    /// Apply a manifest supplied by the host instead of fetching it.
    #[wasm_bindgen(js_name = loadManifestJson)]
    pub fn load_manifest_json(&self, json: &str) -> bool {
        let result = FontManifest::from_json_str(json);
        let ok = result.is_ok();
        let mut inner = self.inner.borrow_mut();
        inner.program.manifest_result(result);
        inner.render();
        ok
    }

    #[wasm_bindgen(js_name = selectedFamily)]
    pub fn selected_family(&self) -> String {
        self.inner.borrow().program.model().selection().family.clone()
    }

    #[wasm_bindgen(js_name = selectedVariant)]
    pub fn selected_variant(&self) -> String {
        self.inner.borrow().program.model().selection().variant.clone()
    }

    pub fn italic(&self) -> bool {
        self.inner.borrow().program.model().selection().italic
    }

    pub fn text(&self) -> String {
        self.inner.borrow().program.model().selection().text.clone()
    }

    #[wasm_bindgen(js_name = stylesheetAttached)]
    pub fn stylesheet_attached(&self) -> bool {
        self.inner.borrow().program.styles().is_attached()
    }

    /// Remove listeners, the widget's DOM and the injected style sheet.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
        let mut inner = self.inner.borrow_mut();
        inner.program.teardown();
        inner.dom.container.remove();
        debug!("font preview destroyed");
    }
}

impl FontPreviewApp {
    fn mount(root_id: &str, config: PreviewConfig) -> Result<Self, DomError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(DomError::NoDocument)?;
        let root = document
            .get_element_by_id(root_id)
            .ok_or_else(|| DomError::MissingRoot(root_id.to_owned()))?;
        let dom = Dom::build(&document, &root, root_id)?;
        let manifest_url = config.manifest_url.clone();
        let program = PreviewProgram::new(config, LocalStorage::new(), HeadStyleHost::new(document));
        let inner = Rc::new(RefCell::new(Inner {
            program,
            dom,
            cache: RenderCache::new(),
        }));
        inner.borrow_mut().render();

        let mut app = Self {
            inner,
            listeners: Vec::new(),
            manifest_url,
            started: Cell::new(false),
            destroyed: false,
        };
        app.wire_events()?;
        Ok(app)
    }

    fn wire_events(&mut self) -> Result<(), DomError> {
        let (family, variant, italic, editor, reset, save) = {
            let inner = self.inner.borrow();
            let dom = &inner.dom;
            (
                dom.family_select.clone(),
                dom.variant_select.clone(),
                dom.italic_input.clone(),
                dom.editor.clone(),
                dom.reset_button.clone(),
                dom.save_button.clone(),
            )
        };

        let source = family.clone();
        self.listen(&family, "change", move || Msg::FamilySelected(source.value()))?;
        let source = variant.clone();
        self.listen(&variant, "change", move || Msg::VariantSelected(source.value()))?;
        self.listen(&italic, "change", || Msg::ItalicToggled)?;
        let source = editor.clone();
        self.listen(&editor, "input", move || Msg::TextEdited(source.value()))?;
        self.listen(&reset, "click", || Msg::Reset)?;
        self.listen(&save, "click", || Msg::Save)?;
        Ok(())
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        to_msg: impl Fn() -> Msg + 'static,
    ) -> Result<(), DomError> {
        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().dispatch(to_msg());
            }
        });
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target: target.clone(),
            event,
            closure,
        });
        Ok(())
    }
}

impl Drop for FontPreviewApp {
    fn drop(&mut self) {
        self.destroy();
    }
}

async fn fetch_manifest(url: &str) -> Result<FontManifest, ManifestError> {
    let fetch_err = |e: JsValue| ManifestError::Fetch(js_error_string(&e));
    let window = web_sys::window().ok_or_else(|| ManifestError::Fetch("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_err)?;
    let response: Response = response.dyn_into().map_err(fetch_err)?;
    if !response.ok() {
        return Err(ManifestError::Fetch(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }
    let body = JsFuture::from(response.text().map_err(fetch_err)?)
        .await
        .map_err(fetch_err)?;
    let body = body
        .as_string()
        .ok_or_else(|| ManifestError::Fetch("response body is not text".into()))?;
    FontManifest::from_json_str(&body)
}
