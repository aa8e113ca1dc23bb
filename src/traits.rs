use minidom::Element;

use crate::configurable::{extend, Properties};
use crate::event::{ItemEvent, Listener};
use crate::item::{ItemBase, ItemConfig};

/// Items whose data can change, and that notify their observers when it does
pub trait Updatable: Sized {
    fn base(&self) -> &ItemBase<Self>;
    fn base_mut(&mut self) -> &mut ItemBase<Self>;

    /// Merge `data` into the item attributes, without notifying anyone
    fn merge(&mut self, data: &Properties) {
        extend(&mut self.base_mut().attributes, [Some(data)]);
    }

    /// Merge `data` into the item, then send an [`ItemEvent::Updated`] notification.
    ///
    /// The notification is sent unconditionally, even if nothing has actually changed
    fn update(&mut self, data: &Properties) {
        self.merge(data);
        self.trigger_event(ItemEvent::Updated);
    }

    /// Synchronously call every listener of `event`, in registration order
    fn trigger_event(&mut self, event: ItemEvent) {
        for listener in self.base().listeners.matching(event) {
            listener(self);
        }
    }

    /// Register an observer
    fn subscribe(&mut self, event: ItemEvent, listener: Listener<Self>) {
        self.base_mut().listeners.subscribe(event, listener);
    }

    /// Apply a (partial) configuration. Fields that are absent from `config` are left untouched
    fn configure(&mut self, config: ItemConfig<Self>) -> &mut Self {
        let ItemConfig { on_update, attributes } = config;
        if let Some(on_update) = on_update {
            self.base_mut().on_update = on_update;
        }
        if attributes.is_empty() == false {
            self.merge(&attributes);
        }
        self
    }

    /// Call the current `on_update` callback
    fn run_on_update(&mut self) {
        let on_update = self.base().on_update.clone();
        on_update(self);
    }
}

/// Items that can draw themselves into their container
pub trait Renderable {
    /// The element this item renders into
    fn container(&self) -> &Element;

    /// Replace the content of the container with a rendering of the current data
    fn render(&mut self) -> &Element;
}
