//! Replays script steps against a search popover

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use typeahead_popover::{EventResponse, FieldState, ListEvent, SearchPopover};
use typeahead_search::FetchOutcome;

use crate::script::Step;

/// A popover plus the simulated text field it is attached to
pub struct Session<W: Write> {
    popover: SearchPopover,
    value: String,
    field: FieldState,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(popover: SearchPopover, out: W) -> Self {
        Self {
            popover,
            value: String::new(),
            field: FieldState::default(),
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run(&mut self, steps: impl IntoIterator<Item = Step>) -> Result<()> {
        for step in steps {
            self.apply(step).await?;
        }
        Ok(())
    }

    pub async fn apply(&mut self, step: Step) -> Result<()> {
        match step {
            Step::Input(value) => {
                self.field = FieldState::caret_at_end(&value);
                let response = self.popover.handle_input(&value);
                let described = self.describe(&response);
                writeln!(self.out, "input {:?} -> {}", value, described)?;
                self.value = value;
            }
            Step::Key(event) => {
                let response = self.popover.handle_key(&event, &self.field);
                if response.select_all {
                    self.field = self.field.select_all();
                }
                let described = self.describe(&response);
                writeln!(self.out, "key {:?} -> {}", event.key, described)?;
            }
            Step::Caret(pos) => {
                self.field = FieldState::caret_at(&self.value, pos);
            }
            Step::Wait(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            Step::ListEscape => {
                let outcome = self.popover.handle_list_event(ListEvent::Escape);
                let described = self.describe(&outcome.response);
                writeln!(self.out, "list escape -> {}", described)?;
            }
            Step::Select(index) => {
                let outcome = self.popover.handle_list_event(ListEvent::Activate(index));
                match outcome.activated {
                    Some(entry) => writeln!(
                        self.out,
                        "open \"{}\" ({})",
                        entry.document.title, entry.document.id
                    )?,
                    None => writeln!(self.out, "no result at {}", index)?,
                }
            }
            Step::More => {
                let props = self.popover.list_props();
                match props.fetch.fetch_more(&props.options) {
                    FetchOutcome::Issued { seq } => {
                        writeln!(self.out, "more -> requested (seq {})", seq)?
                    }
                    FetchOutcome::Skipped => writeln!(self.out, "more -> skipped")?,
                }
            }
            Step::Show => self.show()?,
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        let props = self.popover.list_props();
        writeln!(
            self.out,
            "[{}] query={:?} settled={:?} status={:?}",
            self.popover.state().as_str(),
            self.popover.controller().query(),
            props.options.query,
            props.status
        )?;

        if props.show_loading() {
            writeln!(self.out, "  loading...")?;
        } else if props.show_empty() {
            writeln!(self.out, "  {}", props.empty_message)?;
        }

        for (index, item) in props.items.iter().enumerate() {
            writeln!(self.out, "  {}. {} | {}", index, item.document.title, item.context)?;
        }
        if !props.items.is_empty() && !props.exhausted {
            writeln!(self.out, "  (more available)")?;
        }
        Ok(())
    }

    fn describe(&self, response: &EventResponse) -> String {
        let mut text = self.popover.state().as_str().to_string();
        if response.handled {
            text.push_str(" handled");
        }
        if let Some(focus) = response.focus {
            text.push_str(&format!(" focus={:?}", focus));
        }
        if response.select_all {
            text.push_str(" select-all");
        }
        text
    }
}
