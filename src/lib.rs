//! This crate provides a client for the SchedJoules calendar API.
//!
//! Everything starts from an [`Sdk`], which owns a [`Loader`] (that performs authenticated requests
//! against the API) and an item cache, that holds exactly one live object per item id. \
//! Items are either [`Page`]s (that list other items, grouped by sections) or [`Calendar`]s (that
//! point to an ICS file). Loading a page also creates or updates every item it lists.
//!
//! Every item renders itself into an XHTML container (see [`Renderable`]), and notifies its observers
//! when its data changes (see [`Updatable`]). \
//! Page loads are queued, and performed when the caller awaits [`Sdk::settle`].
//!
//! The [`select`] module provides the locale and location dropdowns.

pub mod traits;
pub use traits::{Renderable, Updatable};

pub mod configurable;
pub mod config;
pub use config::SdkConfig;

mod item;
pub use item::{CalendarRef, Item, ItemBase, ItemClass, ItemConfig, ItemId, PageRef};
pub mod event;
pub use event::ItemEvent;
pub mod page;
pub use page::Page;
pub mod calendar;
pub use calendar::Calendar;

pub mod loader;
pub use loader::{LoadError, Loader, Transport};
pub mod mock_transport;
pub use mock_transport::MockTransport;

pub mod cache;
pub mod select;
pub use select::{Locales, Locations, OptionSource, Select};

pub mod sdk;
pub use sdk::Sdk;

pub mod utils;
