//! Dropdown-backed data sources (locales and locations)

pub mod locales;
pub mod locations;

pub use locales::Locales;
pub use locations::Locations;

use minidom::Element;
use serde_json::Value;

use crate::utils::{element, XHTML_NS};

/// An entry of a select
#[derive(Clone, Debug, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    pub fn new<V: Into<String>, T: Into<String>>(value: V, text: T) -> Self {
        Self { value: value.into(), text: text.into() }
    }
}

/// What all selects have in common: a list of options and the currently selected value
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Select {
    selected: String,
    options: Vec<SelectOption>,
}

impl Select {
    pub fn new<S: Into<String>>(selected: S) -> Self {
        Self { selected: selected.into(), options: Vec::new() }
    }

    pub fn selected(&self) -> &str                { &self.selected }
    pub fn options(&self) -> &[SelectOption]      { &self.options }

    pub fn set_selected<S: Into<String>>(&mut self, selected: S) {
        self.selected = selected.into();
    }

    pub(crate) fn set_option_list(&mut self, options: Vec<SelectOption>) {
        self.options = options;
    }

    /// The option that matches the selected value, if any
    pub fn selected_option(&self) -> Option<&SelectOption> {
        self.options.iter().find(|o| o.value == self.selected)
    }

    /// Build a `<select>` element, the selected option being marked as such
    pub fn render(&self) -> Element {
        let mut select = element("select");
        for option in &self.options {
            let mut builder = Element::builder("option", XHTML_NS)
                .attr("value", option.value.as_str());
            if option.value == self.selected {
                builder = builder.attr("selected", "selected");
            }
            let mut el = builder.build();
            el.append_text_node(option.text.as_str());
            select.append_child(el);
        }
        select
    }
}

/// A select that gets its options from an API endpoint
pub trait OptionSource {
    /// The API path of the options
    const PATH: &'static str;

    fn select(&self) -> &Select;
    fn select_mut(&mut self) -> &mut Select;

    /// Replace the options with the ones described in an API response
    fn set_options(&mut self, data: &Value);

    fn render(&self) -> Element {
        self.select().render()
    }
}

/// The records of an API response, which can be either an array, or an object of records
pub(crate) fn records(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(array) => array.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => {
            log::warn!("Expected a list of records, got {}", data);
            Vec::new()
        },
    }
}

/// A record field as a string. Numbers are accepted too.
pub(crate) fn field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
