//! This module provides the item cache: one live object per item id

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::calendar::Calendar;
use crate::configurable::Properties;
use crate::item::{Item, ItemClass, ItemId};
use crate::page::Page;


/// Maps item ids to the items themselves.
///
/// There is at most one object per id. Cached objects are updated in place rather than replaced,
/// so that references handed out earlier stay valid across reloads.
#[derive(Debug, Default)]
pub struct ItemCache {
    items: HashMap<ItemId, Item>,
}

impl ItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn insert(&mut self, item: Item) {
        self.items.insert(item.item_id(), item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every cached page that has been initialized (and is thus expected to hold fresh data)
    pub fn initialized_pages(&self) -> Vec<Arc<Mutex<Page>>> {
        self.items.values()
            .filter_map(Item::as_page)
            .filter(|page| crate::utils::lock(page).is_initialized())
            .cloned()
            .collect()
    }

    /// Walk the sections of a page response: items that are not cached yet are created and
    /// inserted; items that are already cached are returned along with their fresh data, so
    /// that the caller updates them (and notifies their observers) once the cache is released.
    pub fn absorb(&mut self, page_data: &Value) -> Vec<(Item, Properties)> {
        let mut to_update = Vec::new();

        let sections = page_data.get("page_sections").and_then(Value::as_array);
        for section in sections.into_iter().flatten() {
            let summaries = section.get("items").and_then(Value::as_array);
            for summary in summaries.into_iter().flatten() {
                let item_data = match summary.get("item").and_then(Value::as_object) {
                    None => {
                        log::warn!("Ignoring an item summary without data: {}", summary);
                        continue;
                    },
                    Some(data) => data,
                };
                let item_id = match item_data.get("item_id").and_then(ItemId::from_json) {
                    None => {
                        log::warn!("Ignoring an item without id: {}", summary);
                        continue;
                    },
                    Some(id) => id,
                };

                if let Some(existing) = self.items.get(&item_id) {
                    to_update.push((existing.clone(), item_data.clone()));
                    continue;
                }

                let class = summary.get("item_class")
                    .and_then(Value::as_str)
                    .map(ItemClass::from)
                    .unwrap_or(ItemClass::Calendar);
                log::debug!("Caching new {} {}", class, item_id);
                let item = match class {
                    ItemClass::Page => Item::Page(Arc::new(Mutex::new(Page::new(item_id.clone(), item_data.clone())))),
                    ItemClass::Calendar => Item::Calendar(Arc::new(Mutex::new(Calendar::new(item_id.clone(), item_data.clone())))),
                };
                self.items.insert(item_id, item);
            }
        }

        to_update
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(calendar_name: &str) -> Value {
        json!({
            "page_sections": [{
                "name": "Section",
                "items": [
                    {"item_class": "page", "item": {"item_id": 200, "name": "Sub page"}},
                    {"item_class": "calendar", "item": {"item_id": 300, "name": calendar_name}},
                    {"item_class": "calendar", "item": {"name": "no id"}},
                    {"item_class": "calendar"},
                ]
            }]
        })
    }

    #[test]
    fn new_items_are_created_by_class() {
        let mut cache = ItemCache::new();
        let to_update = cache.absorb(&response("Holidays"));
        assert!(to_update.is_empty());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&ItemId::from("200")).unwrap().is_page());
        assert!(cache.get(&ItemId::from("300")).unwrap().is_calendar());
    }

    #[test]
    fn cached_items_are_returned_for_update() {
        let mut cache = ItemCache::new();
        cache.absorb(&response("Holidays"));
        let calendar = cache.get(&ItemId::from("300")).cloned().unwrap();

        let to_update = cache.absorb(&response("Renamed"));
        assert_eq!(cache.len(), 2);
        assert_eq!(to_update.len(), 2);
        let (item, data) = to_update.iter().find(|(item, _)| item.is_calendar()).unwrap();
        assert!(item.same_as(&calendar));
        assert_eq!(data["name"], json!("Renamed"));
    }

    #[test]
    fn missing_sections() {
        let mut cache = ItemCache::new();
        assert!(cache.absorb(&json!({"name": "no sections"})).is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn only_initialized_pages() {
        let mut cache = ItemCache::new();
        cache.absorb(&response("Holidays"));
        assert!(cache.initialized_pages().is_empty());

        let page = cache.get(&ItemId::from("200")).and_then(Item::as_page).cloned().unwrap();
        page.lock().unwrap().init();
        assert_eq!(cache.initialized_pages().len(), 1);
    }
}
