//! Pages: named collections of sections, each listing other items

use std::sync::Arc;

use minidom::Element;
use serde::Deserialize;
use serde_json::Value;

use crate::configurable::{extend, Properties};
use crate::event::ItemEvent;
use crate::item::{ItemBase, ItemClass, ItemId};
use crate::traits::{Renderable, Updatable};
use crate::utils::{clear, element, text_element};


/// A named group of item summaries
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PageSection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<ItemSummary>,
}

/// What a page tells about the items it lists
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ItemSummary {
    #[serde(default)]
    pub item_class: ItemClass,
    /// The item data, e.g. `item_id`, `name`, `category`, `url` or `icon`
    #[serde(default)]
    pub item: Properties,
}

impl ItemSummary {
    pub fn item_id(&self) -> Option<ItemId> {
        self.item.get("item_id").and_then(ItemId::from_json)
    }

    fn str_field(&self, key: &str) -> &str {
        self.item.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn name(&self) -> &str      { self.str_field("name") }
    pub fn category(&self) -> &str  { self.str_field("category") }

    pub fn icon(&self) -> Option<&str> {
        self.item.get("icon").and_then(Value::as_str).filter(|icon| icon.is_empty() == false)
    }

    /// `<category> - <name>`
    pub fn title(&self) -> String {
        format!("{} - {}", self.category(), self.name())
    }
}

/// Parse the `page_sections` of an API response
pub fn parse_sections(value: &Value) -> Result<Vec<PageSection>, serde_json::Error> {
    Vec::<PageSection>::deserialize(value)
}



/// A page of the API, which lists other pages and calendars.
///
/// A page loads its own data (see [`Sdk::load_page`](crate::sdk::Sdk::load_page)), and is rebuilt wholesale every time it does.
#[derive(Debug)]
pub struct Page {
    item_id: ItemId,
    page_sections: Vec<PageSection>,
    base: ItemBase<Page>,
}

impl Page {
    pub fn new(item_id: ItemId, attributes: Properties) -> Self {
        let mut page = Self {
            item_id,
            page_sections: Vec::new(),
            base: ItemBase::new(Properties::new()),
        };
        page.merge(&attributes);
        page
    }

    pub fn item_id(&self) -> &ItemId                { &self.item_id }
    pub fn page_sections(&self) -> &[PageSection]   { &self.page_sections }
    pub fn name(&self) -> Option<&str>              { self.base.str_attr("name") }
    pub fn is_initialized(&self) -> bool            { self.base.is_initialized() }
    pub fn is_attached(&self) -> bool               { self.base.is_attached() }

    /// The API path of this page
    pub fn path(&self) -> String {
        format!("/pages/{}", self.item_id)
    }

    /// Start running `on_update` whenever this page is updated while it is attached.
    ///
    /// Only the first call has an effect. Returns `true` in this case, meaning the page data should now be loaded.
    pub fn init(&mut self) -> bool {
        if self.base.initialized {
            return false;
        }

        self.subscribe(ItemEvent::Updated, Arc::new(|page: &mut Page| {
            if page.is_attached() {
                page.run_on_update();
            } else {
                log::debug!("Page {} is not attached, not running its update callback", page.item_id);
            }
        }));
        self.base.initialized = true;
        true
    }

    /// Build the list entry of an item summary
    pub fn render_item(summary: &ItemSummary) -> Element {
        let title = summary.title();
        let item_id = summary.item_id().map(|id| id.to_string()).unwrap_or_default();

        let mut anchor = Element::builder("a", crate::utils::XHTML_NS)
            .attr("href", "#")
            .attr("data-id", item_id)
            .attr("data-item-class", summary.item_class.as_str())
            .attr("title", title.as_str())
            .build();

        if let Some(icon) = summary.icon() {
            let image = Element::builder("img", crate::utils::XHTML_NS)
                .attr("src", icon)
                .attr("alt", format!("{} icon", title))
                .build();
            anchor.append_child(image);
        }
        anchor.append_text_node(summary.name());

        let mut row = element("li");
        row.append_child(anchor);
        row
    }

    /// Build the `<section>` of a page section
    pub fn render_section(section: &PageSection) -> Element {
        let mut list = element("ul");
        for summary in &section.items {
            list.append_child(Self::render_item(summary));
        }

        let mut el = element("section");
        el.append_child(text_element("h1", &section.name));
        el.append_child(list);
        el
    }
}

impl Updatable for Page {
    fn base(&self) -> &ItemBase<Self> { &self.base }
    fn base_mut(&mut self) -> &mut ItemBase<Self> { &mut self.base }

    fn merge(&mut self, data: &Properties) {
        extend(&mut self.base.attributes, [Some(data)]);

        if let Some(sections) = data.get("page_sections") {
            self.page_sections = match parse_sections(sections) {
                Ok(sections) => sections,
                Err(err) => {
                    log::warn!("Page {} has invalid sections: {}", self.item_id, err);
                    Vec::new()
                },
            };
        }
    }
}

impl Renderable for Page {
    fn container(&self) -> &Element {
        &self.base.container
    }

    fn render(&mut self) -> &Element {
        let sections: Vec<Element> = self.page_sections.iter()
            .map(Self::render_section)
            .collect();

        let container = &mut self.base.container;
        clear(container);
        for section in sections {
            container.append_child(section);
        }
        container
    }
}
