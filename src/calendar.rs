//! Calendars, the leaves of the page tree

use std::sync::Arc;

use minidom::Element;

use crate::configurable::Properties;
use crate::event::ItemEvent;
use crate::item::{ItemBase, ItemId};
use crate::traits::{Renderable, Updatable};
use crate::utils::{clear, element, text_element};

/// A single downloadable calendar.
///
/// Calendars are never fetched on their own: they are created (and updated) from the data
/// embedded in the pages that list them.
#[derive(Debug)]
pub struct Calendar {
    item_id: ItemId,
    base: ItemBase<Calendar>,
}

impl Calendar {
    pub fn new(item_id: ItemId, attributes: Properties) -> Self {
        Self {
            item_id,
            base: ItemBase::new(attributes),
        }
    }

    pub fn item_id(&self) -> &ItemId          { &self.item_id }
    pub fn category(&self) -> Option<&str>    { self.base.str_attr("category") }
    pub fn name(&self) -> Option<&str>        { self.base.str_attr("name") }
    /// The URL of the ICS file
    pub fn url(&self) -> Option<&str>         { self.base.str_attr("url") }
    pub fn is_initialized(&self) -> bool      { self.base.is_initialized() }
    pub fn is_attached(&self) -> bool         { self.base.is_attached() }

    /// `<category> - <name>`
    pub fn heading(&self) -> String {
        format!("{} - {}", self.category().unwrap_or_default(), self.name().unwrap_or_default())
    }

    /// Start running `on_update` whenever this calendar is updated, and run it once right now.
    ///
    /// Only the first call has an effect.
    pub fn init(&mut self) -> &mut Self {
        if self.base.initialized == false {
            self.subscribe(ItemEvent::Updated, Arc::new(|calendar: &mut Calendar| calendar.run_on_update()));
            self.trigger_event(ItemEvent::Updated);
            self.base.initialized = true;
        }
        self
    }
}

impl Updatable for Calendar {
    fn base(&self) -> &ItemBase<Self> { &self.base }
    fn base_mut(&mut self) -> &mut ItemBase<Self> { &mut self.base }
}

impl Renderable for Calendar {
    fn container(&self) -> &Element {
        &self.base.container
    }

    fn render(&mut self) -> &Element {
        let heading = text_element("h1", &self.heading());
        let url = self.url().unwrap_or_default().to_string();

        let mut section = element("section");
        section.append_text_node(url.as_str());
        let mut anchor = text_element("a", "Download ICS file");
        anchor.set_attr("href", url);
        section.append_child(anchor);

        let container = &mut self.base.container;
        clear(container);
        container.append_child(heading);
        container.append_child(section);
        container
    }
}
