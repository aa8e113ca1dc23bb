//! The location select, filled from the countries the API has pages for

use serde_json::Value;

use super::{field, records, OptionSource, Select, SelectOption};

/// The countries the API has pages for. Option values are page ids.
///
/// The selection can be configured with an ISO 3166 code before the options are known: it is
/// replaced by the matching page id when the options arrive.
/// Choosing a location does not affect the SDK, the caller has to navigate to the page itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Locations {
    select: Select,
}

impl Locations {
    pub fn new<S: Into<String>>(selected: S) -> Self {
        Self { select: Select::new(selected) }
    }

    /// Change handler: only records the new selection
    pub fn choose<S: Into<String>>(&mut self, value: S) {
        self.select.set_selected(value);
    }
}

impl OptionSource for Locations {
    const PATH: &'static str = "/countries";

    fn select(&self) -> &Select { &self.select }
    fn select_mut(&mut self) -> &mut Select { &mut self.select }

    /// Records look like `{"page_id": 1234, "name_translation": "Nederland", "iso_3166": "NL"}`
    fn set_options(&mut self, data: &Value) {
        let mut options = Vec::new();
        for record in records(data) {
            let page_id = match field(record, "page_id") {
                None => {
                    log::warn!("Ignoring a location without page id: {}", record);
                    continue;
                },
                Some(id) => id,
            };
            let text = field(record, "name_translation").unwrap_or_else(|| page_id.clone());

            if field(record, "iso_3166").as_deref() == Some(self.select.selected()) {
                log::debug!("Location {} is page {}", self.select.selected(), page_id);
                self.select.set_selected(page_id.as_str());
            }
            options.push(SelectOption::new(page_id, text));
        }
        self.select.set_option_list(options);
    }
}
