//! A terminal browser for the SchedJoules pages.
//!
//! Set `SCHEDJOULES_API_KEY` before running it. The first argument is the page to start from.

mod display;
mod history;

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use minidom::Element;
use schedjoules::utils::{add_class, for_each_elem_mut, lock, to_markup};
use schedjoules::{Calendar, Item, ItemConfig, ItemId, OptionSource, Page, Renderable, Sdk, SdkConfig, Updatable};

use display::Screen;
use history::History;

/// The home page of the SchedJoules API
const START_PAGE: &str = "115673";

const HELP: &str = "\
commands:
  <n>       follow link <n>
  s <n>     go to step <n>
  h         back to the first step
  l [code]  list the languages, or switch to one
  c [n]     list the countries, or go to one
  m         show the markup of the current item
  q         quit";


struct Browser {
    sdk: Sdk,
    history: Arc<Mutex<History>>,
    /// The item whose container is currently shown
    mounted: Option<Item>,
}

impl Browser {
    fn new(sdk: Sdk) -> Self {
        Self {
            sdk,
            history: Arc::new(Mutex::new(History::new())),
            mounted: None,
        }
    }

    fn visit_page(&mut self, item_id: ItemId) {
        lock(&self.history).push(item_id.clone());

        let history = self.history.clone();
        let config = ItemConfig::new().on_update(move |page: &mut Page| {
            page.render();
            let container = page.base_mut().container_mut();
            for_each_elem_mut(container, "a", &mut |anchor: &mut Element| {
                if let Some(class) = anchor.attr("data-item-class").map(str::to_string) {
                    add_class(anchor, &class);
                }
            });
            container.append_child(lock(&history).render_steps());
        });

        match self.sdk.get_page(item_id.clone(), config) {
            Some(page) => self.mount(Item::Page(page)),
            None => {
                log::warn!("{} is not a page", item_id);
                lock(&self.history).pop();
            },
        }
    }

    fn visit_calendar(&mut self, item_id: ItemId) {
        lock(&self.history).push(item_id.clone());

        let history = self.history.clone();
        let config = ItemConfig::new().on_update(move |calendar: &mut Calendar| {
            calendar.render();
            let container = calendar.base_mut().container_mut();
            let mut first = true;
            for_each_elem_mut(container, "a", &mut |anchor: &mut Element| {
                if first {
                    add_class(anchor, "btn");
                    add_class(anchor, "calltoaction");
                    first = false;
                }
            });
            container.append_child(lock(&history).render_steps());
        });

        match self.sdk.get_calendar(item_id.clone(), config) {
            Some(calendar) => self.mount(Item::Calendar(calendar)),
            None => {
                log::warn!("Calendar {} is unknown", item_id);
                lock(&self.history).pop();
            },
        }
    }

    fn visit(&mut self, item_id: ItemId, item_class: &str) {
        if item_class == "calendar" {
            self.visit_calendar(item_id);
        } else {
            self.visit_page(item_id);
        }
    }

    /// Show `item` instead of the current item
    fn mount(&mut self, item: Item) {
        if let Some(previous) = self.mounted.take() {
            previous.detach();
        }
        item.attach();

        // Refresh the steps of items that are already rendered
        match &item {
            Item::Page(page) => lock(page).run_on_update(),
            Item::Calendar(calendar) => lock(calendar).run_on_update(),
        }
        self.mounted = Some(item);
    }

    fn go_to_step(&mut self, item_id: ItemId) {
        lock(&self.history).rewind_to(&item_id);
        let class = self.sdk.cached_item(&item_id)
            .map(|item| item.item_class().as_str())
            .unwrap_or("page");
        self.visit(item_id, class);
    }

    fn screen(&self) -> Screen {
        match &self.mounted {
            Some(item) => item.with_container(Screen::from_container),
            None => Screen::default(),
        }
    }

    fn print(&self) {
        println!("\n{}\n", self.screen().text());
    }

    fn print_markup(&self) {
        if let Some(item) = &self.mounted {
            println!("{}", item.with_container(to_markup));
        }
    }

    fn print_languages(&self) {
        let locales = self.sdk.locales();
        let locales = lock(&locales);
        for option in locales.select().options() {
            let marker = if option.value == locales.select().selected() { "*" } else { " " };
            println!(" {} {:>5}  {}", marker, option.value, option.text);
        }
    }

    fn print_countries(&self) {
        let locations = self.sdk.locations();
        let locations = lock(&locations);
        for (i, option) in locations.select().options().iter().enumerate() {
            let marker = if option.value == locations.select().selected() { "*" } else { " " };
            println!(" {} [{}] {}", marker, i + 1, option.text);
        }
    }

    fn choose_country(&mut self, index: usize) {
        let page_id = {
            let locations = self.sdk.locations();
            let mut locations = lock(&locations);
            let value = match locations.select().options().get(index) {
                None => {
                    println!("There is no country #{}", index + 1);
                    return;
                },
                Some(option) => option.value.clone(),
            };
            locations.choose(value.as_str());
            value
        };

        lock(&self.history).clear();
        self.visit_page(ItemId::from(page_id));
    }

    /// Run a command. Returns `false` when the user wants to quit
    fn run_command(&mut self, command: &str) -> bool {
        let mut words = command.split_whitespace();
        let (verb, arg) = (words.next(), words.next());

        match (verb, arg) {
            (None, _) => {},
            (Some("q"), _) => return false,
            (Some("h"), _) => {
                let home = lock(&self.history).home().cloned();
                if let Some(home) = home {
                    self.go_to_step(home);
                }
            },
            (Some("s"), Some(n)) => {
                let screen = self.screen();
                let step = parse_index(n).and_then(|i| screen.steps.get(i).cloned());
                match step {
                    Some(Some(item_id)) => self.go_to_step(ItemId::from(item_id)),
                    Some(None) => println!("You are already there"),
                    None => println!("There is no step {}", n),
                }
            },
            (Some("l"), None) => self.print_languages(),
            (Some("l"), Some(code)) => self.sdk.choose_locale(code),
            (Some("c"), None) => self.print_countries(),
            (Some("m"), None) => self.print_markup(),
            (Some("c"), Some(n)) => match parse_index(n) {
                Some(i) => self.choose_country(i),
                None => println!("Invalid country number {}", n),
            },
            (Some(n), None) => {
                let screen = self.screen();
                match parse_index(n).and_then(|i| screen.links.get(i)) {
                    Some(link) => self.visit(ItemId::from(link.item_id.as_str()), &link.item_class),
                    None => println!("{}", HELP),
                }
            },
            _ => println!("{}", HELP),
        }
        true
    }
}

/// Parses a 1-based number into an index
fn parse_index(n: &str) -> Option<usize> {
    n.parse::<usize>().ok()?.checked_sub(1)
}


#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let config = match SdkConfig::default().from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {}", err);
            return;
        },
    };
    if config.api_key.is_none() {
        log::warn!("SCHEDJOULES_API_KEY is not set, the API will reject every request");
    }

    let sdk = match Sdk::new(config) {
        Ok(sdk) => sdk,
        Err(err) => {
            log::error!("Unable to start: {}", err);
            return;
        },
    };

    let start = std::env::args().nth(1).unwrap_or_else(|| START_PAGE.to_string());
    let mut browser = Browser::new(sdk.clone());
    browser.visit_page(ItemId::from(start));

    sdk.load_locales(|locales| log::info!("{} languages available", locales.select().options().len())).await;
    sdk.load_locations(|locations| log::info!("{} countries available", locations.select().options().len())).await;
    sdk.settle().await;
    browser.print();
    println!("{}", HELP);

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {},
            Err(err) => {
                log::error!("Unable to read the command: {}", err);
                break;
            },
        }

        if browser.run_command(line.trim()) == false {
            break;
        }
        sdk.settle().await;
        browser.print();
    }
}
