//! Browser binding: finds the popups on the page, wires the listeners, arms
//! timers, renders the model, and performs the post-login navigation.
//!
//! All callbacks run on the UI thread; the widget sits in a `RefCell` and is
//! never borrowed across a callback boundary.

mod dom;
mod logging;
mod render;
mod storage;

pub use dom::Elements;
pub use storage::BrowserStorage;

use crate::config::WidgetConfig;
use crate::popup::{Popup, UiEvent};
use crate::scheduler::TimerRequest;
use crate::widget::Widget;
use crate::GIT_COMMIT_HASH;
use anyhow::{Context, Result};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, KeyboardEvent, Node};

struct App {
    widget: RefCell<Widget<BrowserStorage>>,
    elements: Elements,
}

/// WASM entry point, called when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = WidgetConfig::load();
    logging::init(config.log_level);

    if let Err(err) = mount(config) {
        error!("popup widget not mounted: {err:#}");
    }
}

fn mount(config: WidgetConfig) -> Result<()> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .context("no document available")?;
    let storage = BrowserStorage::local().context("localStorage is not available")?;
    let elements = Elements::bind(&document, &config)?;

    let app = Rc::new(App {
        widget: RefCell::new(Widget::new(storage, config)),
        elements,
    });
    wire(&app, &document);
    sync(&app);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        build = GIT_COMMIT_HASH,
        "popup widget mounted"
    );
    Ok(())
}

fn wire(app: &Rc<App>, document: &web_sys::Document) {
    let elements = &app.elements;

    if let Some(open) = &elements.open_control {
        listen(app, open, "click", |_, _| Some(UiEvent::OpenClicked));
    }
    for close in &elements.close_controls {
        listen(app, close, "click", |_, _| Some(UiEvent::CloseClicked));
    }
    if let Some(link) = &elements.login_to_signup {
        listen(app, link, "click", |_, _| Some(UiEvent::LoginToSignupClicked));
    }
    if let Some(link) = &elements.signup_to_login {
        listen(app, link, "click", |_, _| Some(UiEvent::SignupToLoginClicked));
    }
    for popup in Popup::ALL {
        if let Some(submit) = elements.submit(popup) {
            listen(app, submit, "click", move |_, _| {
                Some(UiEvent::SubmitClicked(popup))
            });
        }
    }

    listen(app, document, "click", |app, event| {
        let target = event.target()?;
        let inside_popup = target
            .dyn_ref::<Node>()
            .is_some_and(|node| app.elements.inside_popup(node));
        let on_open_control = target
            .dyn_ref::<Element>()
            .is_some_and(|element| app.elements.on_open_control(element));
        Some(UiEvent::DocumentClicked {
            inside_popup,
            on_open_control,
        })
    });

    listen(app, document, "keydown", |_, event| {
        let key = event.dyn_ref::<KeyboardEvent>()?.key();
        (key == "Enter").then_some(UiEvent::EnterPressed)
    });
}

/// Registers a page-lifetime listener that maps DOM events to widget events.
fn listen<F>(app: &Rc<App>, target: &EventTarget, kind: &str, map: F)
where
    F: Fn(&App, &Event) -> Option<UiEvent> + 'static,
{
    let handler_app = Rc::clone(app);
    let callback = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |event: Event| {
        if let Some(ui_event) = map(&handler_app, &event) {
            dispatch(&handler_app, ui_event, &event);
        }
    }));

    if let Err(err) =
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
    {
        error!("failed to register {kind} listener: {err:?}");
    }
    // listeners live as long as the page
    callback.forget();
}

fn dispatch(app: &Rc<App>, ui_event: UiEvent, event: &Event) {
    let outcome = app.widget.borrow_mut().handle(ui_event, &app.elements);

    if outcome.prevent_default {
        event.prevent_default();
    }
    if outcome.stop_propagation {
        event.stop_propagation();
    }
    sync(app);
}

/// Renders the model, arms new timers, and follows a pending navigation.
fn sync(app: &Rc<App>) {
    let (timers, navigation) = {
        let mut widget = app.widget.borrow_mut();
        render::render(&widget, &app.elements);
        (widget.take_timer_requests(), widget.take_navigation())
    };

    for timer in timers {
        arm(app, timer);
    }
    if let Some(destination) = navigation {
        navigate(&destination);
    }
}

fn arm(app: &Rc<App>, timer: TimerRequest) {
    let app = Rc::clone(app);
    Timeout::new(timer.delay_ms, move || {
        let ran = app.widget.borrow_mut().fire(timer.id);
        if ran {
            sync(&app);
        }
    })
    .forget();
}

fn navigate(destination: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = window.location().set_href(destination) {
        error!("navigation to {destination} failed: {err:?}");
    }
}
