//! Update notifications sent by items to their observers

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// The notifications an item can send
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemEvent {
    /// The item data has changed. May happen any number of times.
    Updated,
    /// A page has finished loading its own data
    Loaded,
}

/// A callback that receives the item that sent the notification
pub type Listener<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// The observers of an item, in registration order
pub struct Listeners<T> {
    entries: Vec<(ItemEvent, Listener<T>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> Debug for Listeners<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let events: Vec<ItemEvent> = self.entries.iter().map(|(event, _)| *event).collect();
        f.debug_struct("Listeners").field("events", &events).finish()
    }
}

impl<T> Listeners<T> {
    pub fn subscribe(&mut self, event: ItemEvent, listener: Listener<T>) {
        self.entries.push((event, listener));
    }

    /// How many listeners are subscribed to `event`
    pub fn count(&self, event: ItemEvent) -> usize {
        self.entries.iter().filter(|(e, _)| *e == event).count()
    }

    /// The listeners of `event`, in the order they must be called
    pub fn matching(&self, event: ItemEvent) -> Vec<Listener<T>> {
        self.entries.iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, listener)| listener.clone())
            .collect()
    }
}
