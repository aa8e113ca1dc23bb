//! Turns a rendered container into something that can be printed in a terminal

use minidom::Element;

use schedjoules::utils::has_class;

/// A link the user can follow
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub item_id: String,
    pub item_class: String,
}

/// What is currently shown
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Screen {
    pub lines: Vec<String>,
    pub links: Vec<Link>,
    /// The item ids of the steps, `None` for the active one
    pub steps: Vec<Option<String>>,
}

impl Screen {
    pub fn from_container(container: &Element) -> Self {
        let mut screen = Self::default();
        for child in container.children() {
            screen.walk(child);
        }
        screen
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn walk(&mut self, el: &Element) {
        match el.name() {
            "h1" => self.lines.push(format!("== {} ==", el.text())),
            "section" => {
                self.lines.push(String::new());
                let text = el.text();
                if text.trim().is_empty() == false {
                    self.lines.push(text.trim().to_string());
                }
                for child in el.children() {
                    self.walk(child);
                }
            },
            "div" if has_class(el, "steps") => self.walk_steps(el),
            "a" => self.walk_anchor(el),
            _ => {
                for child in el.children() {
                    self.walk(child);
                }
            },
        }
    }

    fn walk_anchor(&mut self, anchor: &Element) {
        match anchor.attr("data-id") {
            Some(item_id) => {
                let item_class = anchor.attr("data-item-class").unwrap_or("page");
                self.links.push(Link { item_id: item_id.to_string(), item_class: item_class.to_string() });
                let marker = if item_class == "calendar" { " (calendar)" } else { "" };
                self.lines.push(format!("  [{}] {}{}", self.links.len(), anchor.text(), marker));
            },
            None => {
                let href = anchor.attr("href").unwrap_or_default();
                if has_class(anchor, "calltoaction") {
                    self.lines.push(format!("  >> {} <<  {}", anchor.text(), href));
                } else {
                    self.lines.push(format!("  {}  {}", anchor.text(), href));
                }
            },
        }
    }

    fn walk_steps(&mut self, steps: &Element) {
        let mut dots = Vec::new();
        for (i, step) in steps.children().enumerate() {
            if has_class(step, "active") {
                dots.push(format!("({})", i + 1));
            } else {
                dots.push(format!("{}", i + 1));
            }
            self.steps.push(step.attr("data-id").map(str::to_string));
        }
        self.lines.push(String::new());
        self.lines.push(format!("steps: {}", dots.join(" - ")));
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use schedjoules::utils::{add_class, element, main_container, text_element};

    fn item(id: &str, class: &str, name: &str) -> Element {
        let mut anchor = text_element("a", name);
        anchor.set_attr("href", "#");
        anchor.set_attr("data-id", id);
        anchor.set_attr("data-item-class", class);
        let mut li = element("li");
        li.append_child(anchor);
        li
    }

    #[test]
    fn page_links_are_numbered() {
        let mut list = element("ul");
        list.append_child(item("200", "page", "Sports"));
        list.append_child(item("300", "calendar", "Holidays"));
        let mut section = element("section");
        section.append_child(text_element("h1", "Popular"));
        section.append_child(list);
        let mut container = main_container();
        container.append_child(section);

        let screen = Screen::from_container(&container);
        assert_eq!(screen.links, vec![
            Link { item_id: "200".to_string(), item_class: "page".to_string() },
            Link { item_id: "300".to_string(), item_class: "calendar".to_string() },
        ]);
        assert!(screen.text().contains("== Popular =="));
        assert!(screen.text().contains("[2] Holidays (calendar)"));
    }

    #[test]
    fn download_link_and_steps() {
        let mut anchor = text_element("a", "Download ICS file");
        anchor.set_attr("href", "https://example.com/h.ics");
        add_class(&mut anchor, "calltoaction");
        let mut section = element("section");
        section.append_text_node("https://example.com/h.ics");
        section.append_child(anchor);

        let mut steps = element("div");
        add_class(&mut steps, "steps");
        let mut first = element("a");
        first.set_attr("data-id", "115673");
        let mut last = element("a");
        add_class(&mut last, "active");
        steps.append_child(first);
        steps.append_child(last);

        let mut container = main_container();
        container.append_child(text_element("h1", "Holidays - Netherlands"));
        container.append_child(section);
        container.append_child(steps);

        let screen = Screen::from_container(&container);
        assert!(screen.links.is_empty());
        assert_eq!(screen.steps, vec![Some("115673".to_string()), None]);
        assert!(screen.text().contains(">> Download ICS file <<  https://example.com/h.ics"));
        assert!(screen.text().contains("steps: 1 - (2)"));
    }
}
