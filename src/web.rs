//! Browser glue: the help overlay, the pause indicator and keyboard wiring.

use std::{cell::RefCell, rc::Rc};

use anyhow::anyhow;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{Document, HtmlElement, KeyboardEvent};
use winit::keyboard::ModifiersState;

use crate::{
    config::{Params, ViewerConfig},
    context::ViewerContext,
    controls::{help_rows, key_from_dom_code},
    physics::PhysicsEngine,
};

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow!("{e:?}")
}

pub fn document() -> anyhow::Result<Document> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| anyhow!("no document"))
}

fn create_div(document: &Document, class: &str) -> anyhow::Result<HtmlElement> {
    let element = document.create_element("div").map_err(js_err)?;
    element.set_class_name(class);
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| anyhow!("div is not an HtmlElement"))
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> anyhow::Result<()> {
    let style = element.style();
    for (property, value) in styles {
        style.set_property(property, value).map_err(js_err)?;
    }
    Ok(())
}

fn display(shown: bool, layout: &'static str) -> &'static str {
    if shown { layout } else { "none" }
}

/// Top-left corner placement shared by the help menu and the pause text.
const CORNER: [(&str, &str); 5] = [
    ("position", "absolute"),
    ("top", "10px"),
    ("left", "10px"),
    ("color", "white"),
    ("font", "normal 18px Arial"),
];

const HELP_PANEL: [(&str, &str); 11] = [
    ("background-color", "rgba(0, 0, 0, 0.5)"),
    ("padding", "10px"),
    ("border-radius", "10px"),
    ("flex-direction", "row"),
    ("align-items", "center"),
    ("justify-content", "center"),
    ("width", "400px"),
    ("height", "400px"),
    ("overflow", "auto"),
    ("z-index", "1000"),
    ("gap", "20px"),
];

/// DOM elements that mirror viewer state.
pub struct Overlays {
    help: HtmlElement,
    paused: HtmlElement,
}

impl Overlays {
    /// Build the help table and the pause indicator and attach both to the
    /// page body, hidden.
    pub fn new(document: &Document) -> anyhow::Result<Self> {
        let body = document.body().ok_or_else(|| anyhow!("no body"))?;

        let help = create_div(document, "help-overlay")?;
        set_styles(&help, &CORNER)?;
        set_styles(&help, &HELP_PANEL)?;
        let actions = create_div(document, "help-actions")?;
        set_styles(&actions, &[("width", "50%"), ("text-align", "right")])?;
        let keys = create_div(document, "help-keys")?;
        set_styles(&keys, &[("width", "50%"), ("text-align", "left")])?;
        for (action, key) in help_rows() {
            let row = create_div(document, "help-row")?;
            row.set_inner_text(action);
            actions.append_child(&row).map_err(js_err)?;
            let row = create_div(document, "help-row")?;
            row.set_inner_text(key);
            keys.append_child(&row).map_err(js_err)?;
        }
        help.append_child(&actions).map_err(js_err)?;
        help.append_child(&keys).map_err(js_err)?;

        let paused = create_div(document, "pause-indicator")?;
        set_styles(&paused, &CORNER)?;
        paused.set_inner_text("pause");

        body.append_child(&help).map_err(js_err)?;
        body.append_child(&paused).map_err(js_err)?;

        let overlays = Self { help, paused };
        overlays.update(&Params::default())?;
        Ok(overlays)
    }

    pub fn update(&self, params: &Params) -> anyhow::Result<()> {
        set_styles(&self.help, &[("display", display(params.help, "flex"))])?;
        set_styles(&self.paused, &[("display", display(params.paused, "block"))])
    }
}

/// Route `keydown` events of the window to `ctx` and refresh `overlays`
/// after every handled key.
pub fn listen_for_keys<E: PhysicsEngine + 'static>(
    ctx: Rc<RefCell<ViewerContext<E>>>,
    overlays: Rc<Overlays>,
) -> anyhow::Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    let handler = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        let Some(key) = key_from_dom_code(&event.code()) else {
            return;
        };
        let mut modifiers = ModifiersState::empty();
        if event.ctrl_key() {
            modifiers |= ModifiersState::CONTROL;
        }

        let mut ctx = ctx.borrow_mut();
        match ctx.on_key(key, modifiers) {
            Ok(true) => event.prevent_default(),
            Ok(false) => return,
            Err(e) => log::error!("{e:#}"),
        }
        if let Err(e) = overlays.update(&ctx.params) {
            log::warn!("Could not update overlays: {e}");
        }
    });
    window
        .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
        .map_err(js_err)?;
    handler.forget();
    Ok(())
}

/// Stage the scene files and load the first scene in the background, then
/// attach the overlays and keyboard handling to the page.
///
/// The loaded context is handed to `on_ready`, which typically starts the
/// render loop.
pub fn launch<E, F>(config: ViewerConfig, engine: E, on_ready: F)
where
    E: PhysicsEngine + 'static,
    F: FnOnce(Rc<RefCell<ViewerContext<E>>>) + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        let setup = async move {
            let ctx = ViewerContext::init(config, engine).await?;
            let overlays = Rc::new(Overlays::new(&document()?)?);
            let ctx = Rc::new(RefCell::new(ctx));
            listen_for_keys(ctx.clone(), overlays)?;
            anyhow::Ok(ctx)
        };
        match setup.await {
            Ok(ctx) => on_ready(ctx),
            Err(e) => log::error!("Viewer failed to start: {e:#}"),
        }
    });
}
