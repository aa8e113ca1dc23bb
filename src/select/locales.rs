//! The locale select, filled from the languages the API supports

use serde_json::Value;

use super::{field, records, OptionSource, Select, SelectOption};

/// The languages the API can answer in.
///
/// Choosing a locale changes the locale of the whole SDK, see [`Sdk::choose_locale`](crate::sdk::Sdk::choose_locale)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Locales {
    select: Select,
}

impl Locales {
    pub fn new<S: Into<String>>(selected: S) -> Self {
        Self { select: Select::new(selected) }
    }
}

impl OptionSource for Locales {
    const PATH: &'static str = "/languages";

    fn select(&self) -> &Select { &self.select }
    fn select_mut(&mut self) -> &mut Select { &mut self.select }

    /// Records look like `{"iso_639_1": "nl", "name": "Nederlands"}`
    fn set_options(&mut self, data: &Value) {
        let options = records(data).into_iter()
            .filter_map(|record| {
                let value = field(record, "iso_639_1")?;
                let text = field(record, "name").unwrap_or_else(|| value.clone());
                Some(SelectOption::new(value, text))
            })
            .collect();
        self.select.set_option_list(options);
    }
}
