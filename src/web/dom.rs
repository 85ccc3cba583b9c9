//! Page element lookup. Popups are required; every control inside them is
//! optional and simply not wired when missing. Form inputs are resolved once
//! per popup from the configured identifiers.

use crate::auth::validation::Field;
use crate::config::{FieldLocator, WidgetConfig};
use crate::popup::Popup;
use crate::widget::FormFields;
use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, Node};

pub struct Elements {
    pub document: Document,
    pub body: HtmlElement,
    pub open_control: Option<Element>,
    pub close_controls: Vec<Element>,
    pub login_to_signup: Option<Element>,
    pub signup_to_login: Option<Element>,
    login: Element,
    signup: Element,
    submits: HashMap<Popup, Element>,
    inputs: HashMap<(Popup, Field), HtmlInputElement>,
    boxes: HashMap<(Popup, Field), Element>,
    open_selector: String,
    input_box_selector: String,
}

impl Elements {
    /// # Errors
    /// Fails when the page has no body or either popup container is missing.
    pub fn bind(document: &Document, config: &WidgetConfig) -> Result<Self> {
        let selectors = &config.selectors;
        let body = document.body().context("document has no body")?;
        let login = select(document, &selectors.login_popup)
            .with_context(|| format!("login popup {} not found", selectors.login_popup))?;
        let signup = select(document, &selectors.signup_popup)
            .with_context(|| format!("signup popup {} not found", selectors.signup_popup))?;

        let mut elements = Self {
            document: document.clone(),
            body,
            open_control: select(document, &selectors.open_control),
            close_controls: select_all(document, &selectors.close_controls),
            login_to_signup: select(document, &selectors.login_to_signup),
            signup_to_login: select(document, &selectors.signup_to_login),
            login,
            signup,
            submits: HashMap::new(),
            inputs: HashMap::new(),
            boxes: HashMap::new(),
            open_selector: selectors.open_control.clone(),
            input_box_selector: selectors.input_box.clone(),
        };

        for popup in Popup::ALL {
            let scope = elements.popup(popup).clone();
            match select_in(&scope, &selectors.submit_control) {
                Some(submit) => {
                    elements.submits.insert(popup, submit);
                }
                None => warn!(?popup, "submit control not found"),
            }

            for &field in fields_for(popup) {
                let Some(input) = resolve_field(&scope, config.fields.for_field(field)) else {
                    warn!(?popup, ?field, "form input not found");
                    continue;
                };
                if let Some(container) = input
                    .closest(&elements.input_box_selector)
                    .ok()
                    .flatten()
                    .or_else(|| input.parent_element())
                {
                    elements.boxes.insert((popup, field), container);
                }
                elements.inputs.insert((popup, field), input);
            }
        }

        Ok(elements)
    }

    pub fn popup(&self, popup: Popup) -> &Element {
        match popup {
            Popup::Login => &self.login,
            Popup::Signup => &self.signup,
        }
    }

    pub fn submit(&self, popup: Popup) -> Option<&Element> {
        self.submits.get(&popup)
    }

    /// The box a field's error is attached to.
    pub fn field_box(&self, popup: Popup, field: Field) -> Option<&Element> {
        self.boxes.get(&(popup, field))
    }

    pub fn input_boxes(&self, popup: Popup) -> Vec<Element> {
        let mut boxes = select_all_in(self.popup(popup), &self.input_box_selector);
        boxes.extend(
            self.boxes
                .iter()
                .filter(|((scope, _), _)| *scope == popup)
                .map(|(_, container)| container.clone()),
        );
        boxes
    }

    /// Whether a click target sits inside a popup's content.
    pub fn inside_popup(&self, target: &Node) -> bool {
        Popup::ALL
            .iter()
            .any(|&popup| self.popup(popup).contains(Some(target)))
    }

    pub fn on_open_control(&self, target: &Element) -> bool {
        target
            .closest(&self.open_selector)
            .ok()
            .flatten()
            .is_some()
    }
}

impl FormFields for Elements {
    fn value(&self, popup: Popup, field: Field) -> String {
        self.inputs
            .get(&(popup, field))
            .map(HtmlInputElement::value)
            .unwrap_or_default()
    }
}

fn fields_for(popup: Popup) -> &'static [Field] {
    match popup {
        Popup::Login => &[Field::Email, Field::Password],
        Popup::Signup => &[Field::Email, Field::Password, Field::ConfirmPassword],
    }
}

fn resolve_field(scope: &Element, locators: &[FieldLocator]) -> Option<HtmlInputElement> {
    locators.iter().find_map(|locator| {
        let element = match locator {
            FieldLocator::Selector(selector) => select_in(scope, selector),
            FieldLocator::PasswordInput(index) => {
                select_all_in(scope, r#"input[type="password"]"#)
                    .into_iter()
                    .nth(*index)
            }
        };
        element.and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    })
}

pub fn select(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

fn select_all(document: &Document, selector: &str) -> Vec<Element> {
    document
        .query_selector_all(selector)
        .map(|list| node_list_elements(&list))
        .unwrap_or_default()
}

pub fn select_in(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub fn select_all_in(root: &Element, selector: &str) -> Vec<Element> {
    root.query_selector_all(selector)
        .map(|list| node_list_elements(&list))
        .unwrap_or_default()
}

fn node_list_elements(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
