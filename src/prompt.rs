//! Interactive prompt engine.
//!
//! Every prompt resolves to a [`PromptOutcome`]: the value, an explicit
//! decline (picking "back", answering no), or an abort (Esc, Ctrl-C, EOF).
//! Flows pattern-match on the outcome instead of inspecting error values, so
//! a user abort is ordinary control flow rather than an error that must be
//! caught at every call site.
//!
//! [`TermPrompter`] renders an arrow-key selector on a terminal and falls
//! back to numbered line input when stdin is not a TTY.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Context;
use color_print::cformat;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};

use crate::styling::PROMPT_SYMBOL;

/// Result of one prompt interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome<T> {
    /// The user provided a value.
    Value(T),
    /// The user explicitly declined: picked "back" or answered no.
    Declined,
    /// The user bailed out of the prompt entirely (Esc, Ctrl-C, EOF).
    Aborted,
}

impl<T> PromptOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PromptOutcome<U> {
        match self {
            PromptOutcome::Value(v) => PromptOutcome::Value(f(v)),
            PromptOutcome::Declined => PromptOutcome::Declined,
            PromptOutcome::Aborted => PromptOutcome::Aborted,
        }
    }
}

/// One row of a selection menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub label: String,
    /// Secondary text rendered dimmed after the label.
    pub detail: Option<String>,
}

impl SelectItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    pub fn with_detail(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: Some(detail.into()),
        }
    }
}

/// The prompt operations the lifecycle flows are written against.
///
/// Tests substitute a scripted implementation; the binary uses
/// [`TermPrompter`].
pub trait Prompter {
    /// Single-select. With `allow_back`, a "back" row is offered and picking
    /// it yields `Declined`. The returned index refers to `items`.
    fn select(
        &mut self,
        title: &str,
        items: &[SelectItem],
        allow_back: bool,
    ) -> anyhow::Result<PromptOutcome<usize>>;

    /// Free-text input.
    fn input(&mut self, title: &str, placeholder: &str)
    -> anyhow::Result<PromptOutcome<String>>;

    /// Yes/no question. Yes is `Value(())`, no is `Declined`.
    fn confirm(&mut self, question: &str) -> anyhow::Result<PromptOutcome<()>>;
}

/// Terminal-backed [`Prompter`].
#[derive(Debug, Default)]
pub struct TermPrompter;

impl TermPrompter {
    pub fn new() -> Self {
        Self
    }
}

const BACK_LABEL: &str = "← Back";

/// Rows of the rendered menu: the optional back row plus the caller's items.
enum Row<'a> {
    Back,
    Item(usize, &'a SelectItem),
}

impl Row<'_> {
    fn render(&self, highlighted: bool) -> String {
        let text = match self {
            Row::Back => cformat!("<dim>{BACK_LABEL}</>"),
            Row::Item(_, item) => match &item.detail {
                Some(detail) => cformat!("{}  <dim>{detail}</>", item.label),
                None => item.label.clone(),
            },
        };
        if highlighted {
            cformat!("<cyan>❯ </>{text}")
        } else {
            format!("  {text}")
        }
    }
}

impl Prompter for TermPrompter {
    fn select(
        &mut self,
        title: &str,
        items: &[SelectItem],
        allow_back: bool,
    ) -> anyhow::Result<PromptOutcome<usize>> {
        if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
            return select_plain(title, items, allow_back);
        }
        select_interactive(title, items, allow_back)
    }

    fn input(
        &mut self,
        title: &str,
        placeholder: &str,
    ) -> anyhow::Result<PromptOutcome<String>> {
        let mut err = anstream::stderr();
        if placeholder.is_empty() {
            write!(err, "{} {} ", PROMPT_SYMBOL, title)?;
        } else {
            write!(
                err,
                "{} {} {} ",
                PROMPT_SYMBOL,
                title,
                cformat!("<dim>({placeholder})</>")
            )?;
        }
        err.flush()?;

        match read_line()? {
            Some(line) => Ok(PromptOutcome::Value(line.trim().to_string())),
            None => Ok(PromptOutcome::Aborted),
        }
    }

    fn confirm(&mut self, question: &str) -> anyhow::Result<PromptOutcome<()>> {
        let mut err = anstream::stderr();
        write!(
            err,
            "{} {} {} ",
            PROMPT_SYMBOL,
            question,
            cformat!("<bold>[y/N]</>")
        )?;
        err.flush()?;

        match read_line()? {
            Some(line) if line.trim().eq_ignore_ascii_case("y")
                || line.trim().eq_ignore_ascii_case("yes") =>
            {
                Ok(PromptOutcome::Value(()))
            }
            Some(_) => Ok(PromptOutcome::Declined),
            None => Ok(PromptOutcome::Aborted),
        }
    }
}

/// Read one line from stdin. `None` means EOF.
fn read_line() -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    let bytes = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Numbered-list fallback for non-TTY input (pipes, scripts).
fn select_plain(
    title: &str,
    items: &[SelectItem],
    allow_back: bool,
) -> anyhow::Result<PromptOutcome<usize>> {
    let mut err = anstream::stderr();
    writeln!(err, "{} {}", PROMPT_SYMBOL, title)?;
    for (i, item) in items.iter().enumerate() {
        match &item.detail {
            Some(detail) => writeln!(err, "  {}. {}  {}", i + 1, item.label, detail)?,
            None => writeln!(err, "  {}. {}", i + 1, item.label)?,
        }
    }
    if allow_back {
        writeln!(err, "  b. back")?;
    }
    write!(err, "> ")?;
    err.flush()?;

    let Some(line) = read_line()? else {
        return Ok(PromptOutcome::Aborted);
    };
    let choice = line.trim();
    if choice.is_empty() {
        return Ok(PromptOutcome::Aborted);
    }
    if allow_back && choice.eq_ignore_ascii_case("b") {
        return Ok(PromptOutcome::Declined);
    }
    match choice.parse::<usize>() {
        Ok(n) if n >= 1 && n <= items.len() => Ok(PromptOutcome::Value(n - 1)),
        _ => Ok(PromptOutcome::Aborted),
    }
}

/// Restores the terminal even when a render error unwinds the selector.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("Failed to enter raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stderr(), cursor::Show);
    }
}

fn select_interactive(
    title: &str,
    items: &[SelectItem],
    allow_back: bool,
) -> anyhow::Result<PromptOutcome<usize>> {
    let mut rows: Vec<Row> = Vec::with_capacity(items.len() + 1);
    if allow_back {
        rows.push(Row::Back);
    }
    rows.extend(items.iter().enumerate().map(|(i, item)| Row::Item(i, item)));
    if rows.is_empty() {
        return Ok(PromptOutcome::Declined);
    }

    let guard = RawModeGuard::enable()?;
    execute!(io::stderr(), cursor::Hide)?;

    let mut cursor_row = 0usize;
    draw_menu(title, &rows, cursor_row, true)?;

    let outcome = loop {
        let Event::Key(key) = event::read().context("Failed to read terminal event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                cursor_row = cursor_row.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                cursor_row = (cursor_row + 1).min(rows.len() - 1);
            }
            KeyCode::Enter => {
                break match &rows[cursor_row] {
                    Row::Back => PromptOutcome::Declined,
                    Row::Item(idx, _) => PromptOutcome::Value(*idx),
                };
            }
            KeyCode::Left if allow_back => break PromptOutcome::Declined,
            KeyCode::Esc => break PromptOutcome::Aborted,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                break PromptOutcome::Aborted;
            }
            _ => continue,
        }
        draw_menu(title, &rows, cursor_row, false)?;
    };

    clear_menu(rows.len())?;
    drop(guard);

    // Leave a one-line record of what was chosen.
    let mut err = anstream::stderr();
    match &outcome {
        PromptOutcome::Value(idx) => writeln!(
            err,
            "{} {} {}",
            PROMPT_SYMBOL,
            title,
            cformat!("<dim>{}</>", items[*idx].label)
        )?,
        PromptOutcome::Declined | PromptOutcome::Aborted => {
            writeln!(err, "{} {}", PROMPT_SYMBOL, title)?
        }
    }

    Ok(outcome)
}

fn draw_menu(title: &str, rows: &[Row], cursor_row: usize, first: bool) -> anyhow::Result<()> {
    let mut err = anstream::stderr();
    if !first {
        execute!(err, cursor::MoveUp((rows.len() + 1) as u16))?;
    }
    execute!(err, cursor::MoveToColumn(0))?;
    execute!(
        err,
        terminal::Clear(terminal::ClearType::CurrentLine)
    )?;
    write!(err, "{} {}\r\n", PROMPT_SYMBOL, cformat!("<bold>{title}</>"))?;
    for (i, row) in rows.iter().enumerate() {
        execute!(
            err,
            terminal::Clear(terminal::ClearType::CurrentLine)
        )?;
        write!(err, "{}\r\n", row.render(i == cursor_row))?;
    }
    err.flush()?;
    Ok(())
}

fn clear_menu(row_count: usize) -> anyhow::Result<()> {
    let mut err = io::stderr();
    execute!(err, cursor::MoveUp((row_count + 1) as u16))?;
    execute!(err, cursor::MoveToColumn(0))?;
    execute!(err, terminal::Clear(terminal::ClearType::FromCursorDown))?;
    Ok(())
}
