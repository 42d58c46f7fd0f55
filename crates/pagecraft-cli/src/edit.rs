//! The `edit` loop: read line commands, apply them, save on request.

use std::io::{BufRead, Write};

use anyhow::Context;
use serde_json::Value;

use pagecraft_doc::{
    BlockId, BlockPatch, DirStore, EditorError, EditorSession, Page, PageStore, Settings,
};

use crate::command::Command;

/// Drives one session from a line-oriented input.
pub struct Editor<'a, W> {
    session: EditorSession,
    store: &'a DirStore,
    out: W,
}

impl<'a, W: Write> Editor<'a, W> {
    pub fn new(session: EditorSession, store: &'a DirStore, out: W) -> Self {
        Self {
            session,
            store,
            out,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Process commands until `quit` or end of input, then save if dirty.
    ///
    /// A command that fails is reported and skipped; it never ends the loop.
    pub fn run(&mut self, input: impl BufRead) -> anyhow::Result<()> {
        for (n, line) in input.lines().enumerate() {
            let line = line.context("reading commands")?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    writeln!(self.out, "line {}: {e:#}", n + 1)?;
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            if let Err(e) = self.apply(command) {
                tracing::debug!(line = n + 1, error = %e, "command failed");
                writeln!(self.out, "line {}: {e:#}", n + 1)?;
            }
        }
        if self.session.is_dirty() {
            self.save()?;
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Add {
                block_type,
                position,
            } => {
                let id = self.session.add_block(block_type, position)?;
                writeln!(self.out, "added {}", id.short())?;
            }
            Command::Remove(n) => {
                let id = self.block_at(n)?;
                self.session.remove_block(id)?;
            }
            Command::Duplicate(n) => {
                let id = self.block_at(n)?;
                let copy = self.session.duplicate_block(id)?;
                writeln!(self.out, "added {}", copy.short())?;
            }
            Command::Move { from, to } => self.session.reorder_blocks(from, to)?,
            Command::Set { key, value } => {
                let mut settings = Settings::new();
                settings.insert(key, value);
                self.session.update_page_settings(settings)?;
            }
            Command::Title(title) => self.session.set_title(title)?,
            Command::Field {
                index,
                language,
                key,
                value,
            } => self.set_field(index, language, key, value)?,
            Command::Reset(n) => {
                let id = self.block_at(n)?;
                self.session.reset_block(id)?;
            }
            Command::Select(n) => {
                let id = n.map(|n| self.block_at(n)).transpose()?;
                self.session.select(id)?;
            }
            Command::Undo => {
                if !self.session.undo()? {
                    writeln!(self.out, "nothing to undo")?;
                }
            }
            Command::Redo => {
                if !self.session.redo()? {
                    writeln!(self.out, "nothing to redo")?;
                }
            }
            Command::Jump(i) => self.session.jump_to(i)?,
            Command::History => self.print_history()?,
            Command::Show => {
                let selected = self.session.selected();
                print_page(&mut self.out, self.session.page(), selected.as_ref())?;
            }
            Command::Save => self.save()?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn block_at(&self, n: usize) -> Result<BlockId, EditorError> {
        let page = self.session.page();
        page.blocks
            .get(n)
            .map(|b| b.id.clone())
            .ok_or(EditorError::IndexOutOfRange {
                index: n,
                len: page.len(),
            })
    }

    fn set_field(
        &mut self,
        n: usize,
        language: String,
        key: String,
        value: Value,
    ) -> anyhow::Result<()> {
        let id = self.block_at(n)?;
        let mut content = self
            .session
            .page()
            .block(&id)
            .map(|b| b.content.clone())
            .unwrap_or_default();
        content.entry(language).or_default().insert(key, value);
        self.session.update_block(id, BlockPatch::content(content))?;
        Ok(())
    }

    fn save(&mut self) -> anyhow::Result<()> {
        self.store
            .save(self.session.page())
            .with_context(|| format!("saving page {}", self.session.page().id))?;
        self.session.mark_saved();
        writeln!(self.out, "saved {}", self.session.page().id)?;
        Ok(())
    }

    fn print_history(&mut self) -> anyhow::Result<()> {
        for item in self.session.history().summary() {
            let marker = if item.is_current { '*' } else { ' ' };
            writeln!(self.out, "{marker} {:>3}  {}", item.index, item.description)?;
        }
        Ok(())
    }
}

/// One line per block, `>` marking the selection.
pub fn print_page(
    out: &mut impl Write,
    page: &Page,
    selected: Option<&BlockId>,
) -> std::io::Result<()> {
    writeln!(out, "{} ({})", page.title, page.id)?;
    for block in &page.blocks {
        let marker = if Some(&block.id) == selected { '>' } else { ' ' };
        writeln!(
            out,
            "{marker} {:>3}  {:<10} {}",
            block.order,
            block.block_type.as_str(),
            block.id.short()
        )?;
    }
    Ok(())
}
