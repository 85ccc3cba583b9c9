//! Writes the widget model into the page: popup visibility, the body marker,
//! field errors, and form banners. Rendering replaces whatever the previous
//! pass left behind, so the DOM never holds more than the model does.

use super::dom::{select_all_in, Elements};
use crate::auth::store::KeyValueStore;
use crate::messaging::ScopeMessages;
use crate::popup::Popup;
use crate::widget::Widget;
use tracing::warn;
use web_sys::Element;

const VISIBLE_CLASS: &str = "visible";
const PAGE_ACTIVE_CLASS: &str = "popup-active";
const HAS_ERROR_CLASS: &str = "has-error";
const INPUT_ERROR_CLASS: &str = "input-error";
const FORM_MESSAGE_CLASS: &str = "form-message";

pub fn render<S: KeyValueStore>(widget: &Widget<S>, elements: &Elements) {
    let popups = widget.popups();
    for popup in Popup::ALL {
        let container = elements.popup(popup);
        let _ = container
            .class_list()
            .toggle_with_force(VISIBLE_CLASS, popups.is_visible(popup));
        render_scope(elements, popup, widget.messages().scope(popup));
    }

    let _ = elements
        .body
        .class_list()
        .toggle_with_force(PAGE_ACTIVE_CLASS, popups.page_active());
}

fn render_scope(elements: &Elements, popup: Popup, scope: &ScopeMessages) {
    let container = elements.popup(popup);

    for stale in select_all_in(container, &format!(".{INPUT_ERROR_CLASS}")) {
        stale.remove();
    }
    for input_box in elements.input_boxes(popup) {
        let _ = input_box.class_list().remove_1(HAS_ERROR_CLASS);
    }
    for (field, message) in scope.field_errors() {
        let Some(input_box) = elements.field_box(popup, field) else {
            warn!(?popup, ?field, "no input box for field error");
            continue;
        };
        let _ = input_box.class_list().add_1(HAS_ERROR_CLASS);
        if let Some(error) = text_element(elements, INPUT_ERROR_CLASS, message) {
            let _ = input_box.append_child(&error);
        }
    }

    for stale in select_all_in(container, &format!(".{FORM_MESSAGE_CLASS}")) {
        stale.remove();
    }
    if let Some(message) = scope.form_message() {
        let class = format!("{FORM_MESSAGE_CLASS} {}", message.kind.css_class());
        if let Some(banner) = text_element(elements, &class, &message.text) {
            let _ = container.append_child(&banner);
        }
    }
}

fn text_element(elements: &Elements, class: &str, text: &str) -> Option<Element> {
    let element = elements.document.create_element("div").ok()?;
    element.set_class_name(class);
    element.set_text_content(Some(text));
    Some(element)
}
