//! The SDK facade: owns the item cache, the loader and the selects

use std::collections::VecDeque;
use std::error::Error;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::cache::ItemCache;
use crate::calendar::Calendar;
use crate::config::SdkConfig;
use crate::configurable::as_properties;
use crate::event::ItemEvent;
use crate::item::{CalendarRef, Item, ItemConfig, ItemId, PageRef};
use crate::loader::{LoadError, Loader, LoaderConfig, ReqwestTransport, Transport};
use crate::page::Page;
use crate::select::{Locales, Locations, OptionSource};
use crate::traits::Updatable;
use crate::utils::lock;


struct SdkInner {
    loader: Loader,
    items: Mutex<ItemCache>,
    locales: Arc<Mutex<Locales>>,
    locations: Arc<Mutex<Locations>>,
    /// Page loads that have been requested, but not performed yet
    pending: Mutex<VecDeque<PageRef>>,
}

/// The entry point of this crate.
///
/// This is a cheap handle: clones share the same cache, loader and selects.
#[derive(Clone)]
pub struct Sdk {
    inner: Arc<SdkInner>,
}

impl Sdk {
    /// Create an SDK that talks to the network
    pub fn new(config: SdkConfig) -> Result<Self, Box<dyn Error>> {
        let transport: Option<Arc<dyn Transport>> = match ReqwestTransport::new() {
            Ok(t) => Some(Arc::new(t)),
            Err(err) => {
                log::warn!("Unable to set up an HTTP client, nothing will be loaded: {}", err);
                None
            },
        };
        Self::build(config, transport)
    }

    /// Create an SDK that performs its requests with a custom transport
    pub fn with_transport(config: SdkConfig, transport: Arc<dyn Transport>) -> Result<Self, Box<dyn Error>> {
        Self::build(config, Some(transport))
    }

    fn build(config: SdkConfig, transport: Option<Arc<dyn Transport>>) -> Result<Self, Box<dyn Error>> {
        config.validate()?;

        let inner = SdkInner {
            loader: Loader::new(LoaderConfig::from(&config), transport),
            items: Mutex::new(ItemCache::new()),
            locales: Arc::new(Mutex::new(Locales::new(config.locale.as_str()))),
            locations: Arc::new(Mutex::new(Locations::new(config.location.as_str()))),
            pending: Mutex::new(VecDeque::new()),
        };
        Ok(Self { inner: Arc::new(inner) })
    }

    pub fn loader(&self) -> &Loader {
        &self.inner.loader
    }

    /// Set the API key used for every subsequent call
    pub fn set_api_key(&self, key: &str) {
        let settings = json!({ "api_key": key });
        if let Some(properties) = as_properties(&settings) {
            if let Err(err) = self.inner.loader.configure(properties) {
                log::error!("Unable to set the API key: {}", err);
            }
        }
    }

    pub fn locale(&self) -> String {
        self.inner.loader.locale()
    }

    /// Change the locale. If it actually changes, every initialized page is reloaded.
    pub fn set_locale(&self, locale: &str) {
        if self.inner.loader.locale() == locale {
            return;
        }

        log::info!("Switching locale to {}", locale);
        self.inner.loader.set_locale(locale);
        self.update_pages();
    }

    /// Get a page from the cache, or create it.
    ///
    /// `config` is applied and the page is initialized. The first initialization schedules a load
    /// of the page data, see [`Sdk::settle`].
    ///
    /// Returns `None` if this id is cached as a calendar. The calendar is left untouched.
    pub fn get_page<I: Into<ItemId>>(&self, item_id: I, config: ItemConfig<Page>) -> Option<PageRef> {
        let item_id = item_id.into();

        let page = {
            let mut items = lock(&self.inner.items);
            let existing = items.get(&item_id).cloned();
            match existing {
                Some(Item::Page(page)) => page,
                Some(Item::Calendar(_)) => {
                    log::warn!("Item {} is a calendar, not a page", item_id);
                    return None;
                },
                None => {
                    let page = Arc::new(Mutex::new(Page::new(item_id.clone(), Default::default())));
                    items.insert(Item::Page(page.clone()));
                    page
                },
            }
        };

        let needs_loading = {
            let mut guard = lock(&page);
            guard.configure(config);
            guard.init()
        };
        if needs_loading {
            self.schedule_load(page.clone());
        }

        Some(page)
    }

    /// Get a calendar from the cache.
    ///
    /// Calendars are only known once a page that lists them has been loaded. Returns `None` otherwise.
    pub fn get_calendar<I: Into<ItemId>>(&self, item_id: I, config: ItemConfig<Calendar>) -> Option<CalendarRef> {
        let item_id = item_id.into();

        let calendar = match lock(&self.inner.items).get(&item_id) {
            Some(Item::Calendar(calendar)) => calendar.clone(),
            Some(Item::Page(_)) => {
                log::debug!("Item {} is a page, not a calendar", item_id);
                return None;
            },
            None => {
                log::debug!("Calendar {} is not cached yet", item_id);
                return None;
            },
        };

        {
            let mut guard = lock(&calendar);
            guard.configure(config);
            guard.init();
        }
        Some(calendar)
    }

    /// Get any cached item
    pub fn cached_item<I: Into<ItemId>>(&self, item_id: I) -> Option<Item> {
        lock(&self.inner.items).get(&item_id.into()).cloned()
    }

    /// How many items are cached
    pub fn cached_count(&self) -> usize {
        lock(&self.inner.items).len()
    }

    /// Cache every item listed in a page response.
    ///
    /// New items are created according to their declared class. Items that are cached already are
    /// updated in place.
    pub fn cache_items(&self, page_data: &Value) {
        let to_update = lock(&self.inner.items).absorb(page_data);

        // The cache is released at this point, so that observers are free to use the SDK
        for (item, data) in to_update {
            item.update(&data);
        }
    }

    /// Reload every initialized page (calendars are not reloaded)
    pub fn update_pages(&self) {
        let pages = lock(&self.inner.items).initialized_pages();
        log::debug!("Reloading {} pages", pages.len());
        for page in pages {
            self.schedule_load(page);
        }
    }

    /// Load the data of a page, cache the items it lists, then update the page itself and send
    /// [`ItemEvent::Loaded`].
    pub async fn load_page(&self, page: &PageRef) -> Result<(), LoadError> {
        let path = lock(page).path();
        let data = self.inner.loader.fetch(&path).await?;

        self.cache_items(&data);

        match as_properties(&data) {
            Some(properties) => {
                let mut page = lock(page);
                page.update(properties);
                page.trigger_event(ItemEvent::Loaded);
            },
            None => log::warn!("{} did not return an object, ignoring it", path),
        }
        Ok(())
    }

    /// Queue a page load. It will be performed by the next call to [`Sdk::settle`].
    fn schedule_load(&self, page: PageRef) {
        log::debug!("Scheduling a load of {}", lock(&page).path());
        lock(&self.inner.pending).push_back(page);
    }

    /// How many page loads are waiting for [`Sdk::settle`]
    pub fn pending_loads(&self) -> usize {
        lock(&self.inner.pending).len()
    }

    /// Perform every queued page load, including the ones scheduled in the meantime (e.g. by
    /// observers), in request order. Failures are logged and dropped.
    pub async fn settle(&self) {
        loop {
            let next = lock(&self.inner.pending).pop_front();
            let page = match next {
                None => return,
                Some(page) => page,
            };

            if let Err(err) = self.load_page(&page).await {
                let path = lock(&page).path();
                err.log(&path);
            }
        }
    }

    pub fn locales(&self) -> Arc<Mutex<Locales>> {
        self.inner.locales.clone()
    }

    pub fn locations(&self) -> Arc<Mutex<Locations>> {
        self.inner.locations.clone()
    }

    /// Replace the options of a select with the ones from the API
    pub async fn load_select<S: OptionSource>(&self, select: &Mutex<S>) -> Result<(), LoadError> {
        let data = self.inner.loader.fetch(S::PATH).await?;
        lock(select).set_options(&data);
        Ok(())
    }

    /// Load the locale options, then call `on_loaded`. Failures are logged and dropped.
    pub async fn load_locales<F>(&self, on_loaded: F)
    where
        F: FnOnce(&Locales),
    {
        let locales = self.locales();
        match self.load_select(&locales).await {
            Ok(()) => on_loaded(&lock(&locales)),
            Err(err) => err.log(Locales::PATH),
        }
    }

    /// Load the location options, then call `on_loaded`. Failures are logged and dropped.
    pub async fn load_locations<F>(&self, on_loaded: F)
    where
        F: FnOnce(&Locations),
    {
        let locations = self.locations();
        match self.load_select(&locations).await {
            Ok(()) => on_loaded(&lock(&locations)),
            Err(err) => err.log(Locations::PATH),
        }
    }

    /// Change handler of the locale select: records the selection, and switches the SDK locale
    pub fn choose_locale(&self, locale: &str) {
        lock(&self.inner.locales).select_mut().set_selected(locale);
        self.set_locale(locale);
    }
}
