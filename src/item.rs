//! Items returned by the API: pages and calendars

use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, Mutex};

use minidom::Element;
use serde_json::Value;

use crate::calendar::Calendar;
use crate::configurable::Properties;
use crate::event::{Listener, Listeners};
use crate::page::Page;
use crate::traits::{Renderable, Updatable};
use crate::utils::{lock, main_container};


/// The identifier of an item. The API sends them either as strings or as numbers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    content: String,
}

impl ItemId {
    /// Read an identifier from a JSON value
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::from(s.as_str())),
            Value::Number(n) => Some(Self { content: n.to_string() }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self { content: s.to_string() }
    }
}
impl From<String> for ItemId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self { content: n.to_string() }
    }
}
impl From<&ItemId> for ItemId {
    fn from(id: &ItemId) -> Self {
        id.clone()
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}



/// The declared class of an item. Anything that is not a page is a calendar, including a missing class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(from = "Option<String>")]
pub enum ItemClass {
    Page,
    Calendar,
}

impl ItemClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemClass::Page => "page",
            ItemClass::Calendar => "calendar",
        }
    }
}

impl Default for ItemClass {
    fn default() -> Self {
        ItemClass::Calendar
    }
}

impl From<&str> for ItemClass {
    fn from(s: &str) -> Self {
        match s {
            "page" => ItemClass::Page,
            _ => ItemClass::Calendar,
        }
    }
}
impl From<String> for ItemClass {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
impl From<Option<String>> for ItemClass {
    fn from(s: Option<String>) -> Self {
        s.map(Self::from).unwrap_or_default()
    }
}

impl Display for ItemClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}



/// A (partial) configuration for an item, see [`Updatable::configure`]
pub struct ItemConfig<T> {
    /// Replaces the callback run when the item is updated
    pub on_update: Option<Listener<T>>,
    /// Merged into the item attributes
    pub attributes: Properties,
}

impl<T> Default for ItemConfig<T> {
    fn default() -> Self {
        Self { on_update: None, attributes: Properties::new() }
    }
}

impl<T> ItemConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_update<F>(mut self, on_update: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(on_update));
        self
    }

    pub fn attribute<S: Into<String>>(mut self, key: S, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}



/// What every item has: a container, an update callback and a set of observers
pub struct ItemBase<T> {
    pub(crate) container: Element,
    pub(crate) on_update: Listener<T>,
    pub(crate) initialized: bool,
    /// Whether the container is currently shown to the user
    pub(crate) attached: bool,
    pub(crate) attributes: Properties,
    pub(crate) listeners: Listeners<T>,
}

impl<T> ItemBase<T>
where
    T: Renderable + 'static,
{
    /// By default, an item renders itself when it is updated
    pub fn new(attributes: Properties) -> Self {
        Self {
            container: main_container(),
            on_update: Arc::new(|item: &mut T| { item.render(); }),
            initialized: false,
            attached: false,
            attributes,
            listeners: Listeners::default(),
        }
    }
}

impl<T> ItemBase<T> {
    pub fn container(&self) -> &Element {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Element {
        &mut self.container
    }

    /// A string attribute, or `None` if it is missing or not a string
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn listeners(&self) -> &Listeners<T> {
        &self.listeners
    }
}

impl<T> Debug for ItemBase<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemBase")
            .field("initialized", &self.initialized)
            .field("attached", &self.attached)
            .field("attributes", &self.attributes)
            .field("listeners", &self.listeners)
            .finish()
    }
}



/// A shared, lockable page. Every holder sees the updates of the others.
pub type PageRef = Arc<Mutex<Page>>;
/// A shared, lockable calendar
pub type CalendarRef = Arc<Mutex<Calendar>>;

/// An entry of the item cache
#[derive(Clone, Debug)]
pub enum Item {
    Page(PageRef),
    Calendar(CalendarRef),
}

/// Returns `page.$property_name()` or `calendar.$property_name()`, depending on what self is
macro_rules! synthetise_common_getter {
    ($property_name:ident, $return_type:ty) => {
        pub fn $property_name(&self) -> $return_type {
            match self {
                Item::Page(p) => lock(p).$property_name().to_owned(),
                Item::Calendar(c) => lock(c).$property_name().to_owned(),
            }
        }
    }
}

/// Calls `page.base_mut().$method_name()` or `calendar.base_mut().$method_name()`
macro_rules! synthetise_common_setter {
    ($method_name:ident) => {
        pub fn $method_name(&self) {
            match self {
                Item::Page(p) => lock(p).base_mut().$method_name(),
                Item::Calendar(c) => lock(c).base_mut().$method_name(),
            }
        }
    }
}

impl Item {
    synthetise_common_getter!(item_id, ItemId);
    synthetise_common_getter!(is_initialized, bool);
    synthetise_common_getter!(is_attached, bool);

    synthetise_common_setter!(attach);
    synthetise_common_setter!(detach);

    pub fn item_class(&self) -> ItemClass {
        match self {
            Item::Page(_) => ItemClass::Page,
            Item::Calendar(_) => ItemClass::Calendar,
        }
    }

    pub fn is_page(&self) -> bool {
        matches!(self, Item::Page(_))
    }

    pub fn is_calendar(&self) -> bool {
        matches!(self, Item::Calendar(_))
    }

    pub fn as_page(&self) -> Option<&PageRef> {
        match self {
            Item::Page(p) => Some(p),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<String> {
        match self {
            Item::Page(p) => lock(p).name().map(str::to_string),
            Item::Calendar(c) => lock(c).name().map(str::to_string),
        }
    }

    /// Merge new data into this item and notify its observers
    pub fn update(&self, data: &Properties) {
        match self {
            Item::Page(p) => lock(p).update(data),
            Item::Calendar(c) => lock(c).update(data),
        }
    }

    /// Gives access to the container of this item
    pub fn with_container<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Element) -> R,
    {
        match self {
            Item::Page(p) => f(lock(p).container()),
            Item::Calendar(c) => f(lock(c).container()),
        }
    }

    /// Whether both entries are the very same object
    pub fn same_as(&self, other: &Item) -> bool {
        match (self, other) {
            (Item::Page(s), Item::Page(o)) => Arc::ptr_eq(s, o),
            (Item::Calendar(s), Item::Calendar(o)) => Arc::ptr_eq(s, o),
            _ => false,
        }
    }
}

impl From<PageRef> for Item {
    fn from(page: PageRef) -> Self {
        Item::Page(page)
    }
}
impl From<CalendarRef> for Item {
    fn from(calendar: CalendarRef) -> Self {
        Item::Calendar(calendar)
    }
}
