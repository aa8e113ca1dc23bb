//! Navigation history of the demo

use minidom::Element;

use schedjoules::utils::{add_class, element};
use schedjoules::ItemId;

/// The items visited so far, oldest first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    steps: Vec<ItemId>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[ItemId] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn push(&mut self, item_id: ItemId) {
        self.steps.push(item_id);
    }

    pub fn pop(&mut self) -> Option<ItemId> {
        self.steps.pop()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Forget `item_id` and everything that has been visited after it.
    ///
    /// The caller is expected to visit `item_id` again, which pushes it back.
    pub fn rewind_to(&mut self, item_id: &ItemId) {
        if let Some(position) = self.steps.iter().position(|step| step == item_id) {
            self.steps.truncate(position);
        }
    }

    /// The step to go back to, when there is anywhere to go back to
    pub fn home(&self) -> Option<&ItemId> {
        if self.steps.len() > 1 {
            self.steps.first()
        } else {
            None
        }
    }

    /// Build the step dots: the last one is `active`, the others link to their item
    pub fn render_steps(&self) -> Element {
        let mut steps = element("div");
        add_class(&mut steps, "steps");

        let last = self.steps.len().saturating_sub(1);
        for (i, item_id) in self.steps.iter().enumerate() {
            let mut step = element("a");
            add_class(&mut step, "step");
            if i == last {
                add_class(&mut step, "active");
            } else {
                step.set_attr("href", "#");
                step.set_attr("data-id", item_id.to_string());
            }
            steps.append_child(step);
        }
        steps
    }
}
