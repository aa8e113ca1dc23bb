//! Some utility functions

use std::sync::{Mutex, MutexGuard, PoisonError};

use minidom::Element;

/// Namespace of every element built by this crate
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Lock a mutex, even if another thread panicked while holding it
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create an empty XHTML element
pub fn element(name: &str) -> Element {
    Element::builder(name, XHTML_NS).build()
}

/// Create an XHTML element that only contains some text
pub fn text_element(name: &str, text: &str) -> Element {
    let mut el = element(name);
    el.append_text_node(text);
    el
}

/// Build the element that holds the rendering of an item
pub fn main_container() -> Element {
    Element::builder("main", XHTML_NS)
        .attr("role", "main")
        .build()
}

/// Remove every child of an element, keeping its name and attributes
pub fn clear(el: &mut Element) {
    let mut emptied = element(el.name());
    for (name, value) in el.attrs() {
        emptied.set_attr(name.to_string(), value.to_string());
    }
    *el = emptied;
}

/// Add a CSS class to an element
pub fn add_class(el: &mut Element, class: &str) {
    let classes = match el.attr("class") {
        None => class.to_string(),
        Some(existing) if existing.split_whitespace().any(|c| c == class) => return,
        Some(existing) => format!("{} {}", existing, class),
    };
    el.set_attr("class", classes);
}

pub fn has_class(el: &Element, class: &str) -> bool {
    el.attr("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Walks an element tree and returns every element that has the given name
pub fn find_elems<S: AsRef<str>>(root: &Element, searched_name: S) -> Vec<&Element> {
    let searched_name = searched_name.as_ref();
    let mut elems: Vec<&Element> = Vec::new();

    for el in root.children() {
        if el.name() == searched_name {
            elems.push(el);
        }
        elems.extend(find_elems(el, searched_name));
    }
    elems
}

/// Walks an element tree until it finds an element with the given name
pub fn find_elem<S: AsRef<str>>(root: &Element, searched_name: S) -> Option<&Element> {
    let searched_name = searched_name.as_ref();
    if root.name() == searched_name {
        return Some(root);
    }

    for el in root.children() {
        let ret = find_elem(el, searched_name);
        if ret.is_some() {
            return ret;
        }
    }
    None
}

/// Calls `f` on every element with the given name in a tree
pub fn for_each_elem_mut<F>(root: &mut Element, searched_name: &str, f: &mut F)
where
    F: FnMut(&mut Element),
{
    for el in root.children_mut() {
        if el.name() == searched_name {
            f(el);
        }
        for_each_elem_mut(el, searched_name, f);
    }
}

/// Serialize an element tree to markup
pub fn to_markup(el: &Element) -> String {
    let mut buffer: Vec<u8> = Vec::new();
    if let Err(err) = el.write_to(&mut buffer) {
        log::warn!("Unable to serialize a <{}> element: {}", el.name(), err);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
