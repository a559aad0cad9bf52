use std::io;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};

use crate::error::{LedgerError, Result};
use crate::models::{is_marker, FieldKind, Record, FIELDS};
use crate::render::{render_rows, LedgerRow};
use crate::status::Status;
use crate::store::RecordStore;
use crate::tui::{self, CURSOR_CELL_STYLE, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};

const INDEX_WIDTH: u16 = 5;
const STATUS_WIDTH: u16 = 10;
const DETAIL_HEIGHT: u16 = 3;

enum BrowseMode {
    Normal,
    EditCell { field: usize, input: String },
    ConfirmDelete,
    AddForm { step: usize, values: Vec<String> },
}

#[derive(Debug)]
pub enum BrowseAction {
    Continue,
    Close,
    CommitEdit,
    TogglePaid,
    Delete,
    SubmitForm,
}

/// Field indices the add form prompts for. Payment markers are always blank
/// on a new record, so they get no prompt.
fn form_fields() -> Vec<usize> {
    (0..FIELDS.len()).filter(|&i| !is_marker(FIELDS[i].id)).collect()
}

fn column_width(field: usize) -> u16 {
    let def = &FIELDS[field];
    match (def.kind, def.plain_number) {
        _ if def.id == "remarks" || def.id == "paymentDetails" => 24,
        (FieldKind::Number, false) => 14,
        (FieldKind::Number, true) => 8,
        (FieldKind::Date, _) => 12,
        (FieldKind::Text, _) => 16,
    }
}

/// Columns starting at `start` that fit into `width` cells with 1-cell spacing.
fn fit_columns(start: usize, width: u16) -> Vec<usize> {
    let mut cols = Vec::new();
    let mut used = 0u16;
    for field in start..FIELDS.len() {
        let w = column_width(field) + 1;
        if used + w > width && !cols.is_empty() {
            break;
        }
        used += w;
        cols.push(field);
    }
    cols
}

pub struct LedgerBrowser {
    records: Vec<Record>,
    rows: Vec<LedgerRow>,
    today: NaiveDate,
    symbol: String,
    selected: usize,
    column: usize,
    column_offset: usize,
    visible_count: usize,
    mode: BrowseMode,
    status_message: Option<String>,
    pending_edit: Option<(usize, usize, String)>,
    pending_form: Option<Vec<(usize, String)>>,
    table_state: TableState,
}

impl LedgerBrowser {
    pub fn new(records: Vec<Record>, today: NaiveDate, symbol: &str) -> Self {
        let rows = render_rows(&records, today, symbol);
        Self {
            records,
            rows,
            today,
            symbol: symbol.to_string(),
            selected: 0,
            column: 0,
            column_offset: 0,
            visible_count: 20,
            mode: BrowseMode::Normal,
            status_message: None,
            pending_edit: None,
            pending_form: None,
            table_state: TableState::default(),
        }
    }

    /// Rebuild every row from the store.
    pub fn reload(&mut self, store: &RecordStore) -> Result<()> {
        self.today = Local::now().date_naive();
        self.set_records(store.load()?);
        Ok(())
    }

    fn set_records(&mut self, records: Vec<Record>) {
        self.rows = render_rows(&records, self.today, &self.symbol);
        self.records = records;
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }

    pub fn run(&mut self, store: &RecordStore) -> io::Result<()> {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            ratatui::restore();
            hook(info);
        }));

        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal, store);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal, store: &RecordStore) -> io::Result<()> {
        loop {
            terminal.draw(|frame| self.draw_frame(frame))?;

            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }

                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }

                match self.handle_key_event(code) {
                    BrowseAction::Close => break,
                    BrowseAction::Continue => {}
                    action => {
                        if let Err(e) = self.apply(action, store) {
                            self.status_message = Some(format!("Failed: {e}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Carry out a storage action, then re-render everything from the store.
    pub fn apply(&mut self, action: BrowseAction, store: &RecordStore) -> Result<()> {
        let index = self.selected;
        match action {
            BrowseAction::Continue | BrowseAction::Close => return Ok(()),
            BrowseAction::CommitEdit => {
                if let Some((row, field, input)) = self.pending_edit.take() {
                    let def = &FIELDS[field];
                    if store.edit_cell(row, def.id, &input)? {
                        self.status_message = Some(format!("Updated {} on row {}", def.label, row + 1));
                    }
                }
            }
            BrowseAction::TogglePaid => {
                if let Some(paid) = store.toggle_paid(index, Local::now().date_naive())? {
                    let label = if paid { "marked paid" } else { "marked unpaid" };
                    self.status_message = Some(format!("Row {} {label}", index + 1));
                }
            }
            BrowseAction::Delete => {
                if store.delete(index)?.is_some() {
                    self.status_message = Some(format!("Deleted row {}", index + 1));
                }
            }
            BrowseAction::SubmitForm => {
                if let Some(values) = self.pending_form.take() {
                    let inputs = values.iter().map(|(f, v)| (FIELDS[*f].id, v.as_str()));
                    let record = Record::from_form(inputs)?;
                    let new_index = store.append(record)?;
                    self.selected = new_index;
                    self.status_message = Some(format!("Added row {}", new_index + 1));
                }
            }
        }
        self.reload(store)
    }

    /// Draw the ledger into the given frame.
    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let panel_height: u16 = match &self.mode {
            BrowseMode::EditCell { .. } | BrowseMode::AddForm { .. } => 2,
            _ => 0,
        };

        let [title_area, table_area, detail_area, panel_area, status_area, keys_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(DETAIL_HEIGHT),
                Constraint::Length(panel_height),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(Paragraph::new("Receivables Ledger").style(HEADER_STYLE), title_area);

        let header_overhead = 2u16;
        self.visible_count = (table_area.height.saturating_sub(header_overhead) as usize).max(1);

        if self.rows.is_empty() {
            frame.render_widget(
                Paragraph::new("No records yet. Press a to add one.").style(FOOTER_STYLE),
                table_area,
            );
        } else {
            self.draw_table(frame, table_area);
        }

        self.draw_detail(frame, detail_area);

        if panel_height > 0 {
            let lines: Vec<Line> = match &self.mode {
                BrowseMode::EditCell { field, input } => vec![
                    Line::from(format!("  {}: {input}\u{2588}", FIELDS[*field].label)),
                    Line::from(Span::styled(
                        if FIELDS[*field].id == crate::models::COLLECTION_DATE {
                            "    YYYY-MM-DD, or empty to clear"
                        } else {
                            "    numbers are stored as numbers"
                        },
                        Style::default().fg(Color::DarkGray),
                    )),
                ],
                BrowseMode::AddForm { step, values } => {
                    let fields = form_fields();
                    let field = fields[*step];
                    vec![
                        Line::from(format!(
                            "  New record ({}/{}) {}: {}\u{2588}",
                            step + 1,
                            fields.len(),
                            FIELDS[field].label,
                            values[*step]
                        )),
                        Line::from(Span::styled(
                            "    Tab/Enter: next  Shift-Tab: back  Enter on last field: save",
                            Style::default().fg(Color::DarkGray),
                        )),
                    ]
                }
                _ => vec![],
            };
            frame.render_widget(Paragraph::new(lines), panel_area);
        }

        let counts = |s: Status| self.rows.iter().filter(|r| r.status == s).count();
        let mut status = if self.rows.is_empty() {
            "0 records".to_string()
        } else {
            format!(
                "Row {} of {} | Paid: {}  Overdue: {}  Due today: {}",
                self.selected + 1,
                self.rows.len(),
                counts(Status::Paid),
                counts(Status::Overdue),
                counts(Status::DueToday),
            )
        };
        if let Some(ref msg) = self.status_message {
            status.push_str(&format!(" | {msg}"));
        }
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), status_area);

        let keys_widget = match &self.mode {
            BrowseMode::Normal => Paragraph::new(
                "\u{2191}/\u{2193}:row  \u{2190}/\u{2192}:column  e:edit  p:paid  x:delete  a:add  q:quit",
            )
            .style(FOOTER_STYLE),
            BrowseMode::EditCell { .. } => {
                Paragraph::new("Enter=save, Esc=cancel").style(FOOTER_STYLE)
            }
            BrowseMode::ConfirmDelete => Paragraph::new(format!(
                "Delete row {}? (y/n)",
                self.selected + 1
            )),
            BrowseMode::AddForm { .. } => Paragraph::new("Esc=discard").style(FOOTER_STYLE),
        };
        frame.render_widget(keys_widget, keys_area);
    }

    fn draw_table(&mut self, frame: &mut Frame, table_area: ratatui::layout::Rect) {
        let fields_width = table_area.width.saturating_sub(INDEX_WIDTH + STATUS_WIDTH + 2);
        let columns = self.visible_columns(fields_width);

        let rendered_rows: Vec<Row> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut cells = vec![Cell::from((row.index + 1).to_string())];
                for &field in &columns {
                    let text = tui::clip(&row.cells[field], column_width(field) as usize);
                    let cell = Cell::from(text);
                    cells.push(if i == self.selected && field == self.column {
                        cell.style(CURSOR_CELL_STYLE)
                    } else {
                        cell
                    });
                }
                cells.push(Cell::from(row.status.label()));
                Row::new(cells).style(tui::row_style(row.class))
            })
            .collect();

        let mut widths = vec![Constraint::Length(INDEX_WIDTH)];
        widths.extend(columns.iter().map(|&f| Constraint::Length(column_width(f))));
        widths.push(Constraint::Length(STATUS_WIDTH));

        let mut header_cells = vec!["#"];
        header_cells.extend(columns.iter().map(|&f| FIELDS[f].label));
        header_cells.push("Status");

        self.table_state.select(Some(self.selected));
        let table = Table::new(rendered_rows, widths)
            .header(Row::new(header_cells).style(HEADER_STYLE).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);

        frame.render_stateful_widget(table, table_area, &mut self.table_state);
    }

    fn draw_detail(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let Some(record) = self.records.get(self.selected) else {
            return;
        };
        let def = &FIELDS[self.column];
        let label = format!("{}: ", def.label);
        let width = (area.width as usize).saturating_sub(label.len() + 2);
        let wrapped = tui::wrap_lines(&record.raw_text(def.id), width);
        let mut lines: Vec<Line> = Vec::new();
        for (i, text) in wrapped.into_iter().take(DETAIL_HEIGHT as usize).enumerate() {
            let prefix = if i == 0 { label.clone() } else { " ".repeat(label.len()) };
            lines.push(Line::from(vec![
                Span::styled(prefix, HEADER_STYLE),
                Span::raw(text),
            ]));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(label, HEADER_STYLE)));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    /// Columns to show, scrolled so the selected column is visible.
    fn visible_columns(&mut self, width: u16) -> Vec<usize> {
        if self.column < self.column_offset {
            self.column_offset = self.column;
        }
        loop {
            let cols = fit_columns(self.column_offset, width);
            if cols.contains(&self.column) || self.column_offset >= self.column {
                return cols;
            }
            self.column_offset += 1;
        }
    }

    /// Handle a key event. Returns a BrowseAction indicating what the caller should do.
    pub fn handle_key_event(&mut self, code: KeyCode) -> BrowseAction {
        self.status_message = None;

        match &self.mode {
            BrowseMode::Normal => return self.handle_normal_key(code),
            BrowseMode::EditCell { .. } => return self.handle_edit_key(code),
            BrowseMode::ConfirmDelete => {
                self.mode = BrowseMode::Normal;
                if code == KeyCode::Char('y') {
                    return BrowseAction::Delete;
                }
                self.status_message = Some("Delete cancelled".to_string());
            }
            BrowseMode::AddForm { .. } => return self.handle_form_key(code),
        }
        BrowseAction::Continue
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> BrowseAction {
        let has_rows = !self.rows.is_empty();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return BrowseAction::Close,
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::PageDown => {
                self.selected = (self.selected + self.visible_count)
                    .min(self.rows.len().saturating_sub(1));
            }
            KeyCode::PageUp => {
                self.selected = self.selected.saturating_sub(self.visible_count);
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.rows.len().saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => {
                if self.column + 1 < FIELDS.len() {
                    self.column += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.column = self.column.saturating_sub(1);
            }
            KeyCode::Char('e') | KeyCode::Enter if has_rows => {
                let input = self.records[self.selected].raw_text(FIELDS[self.column].id);
                self.mode = BrowseMode::EditCell {
                    field: self.column,
                    input,
                };
            }
            KeyCode::Char('p') if has_rows => return BrowseAction::TogglePaid,
            KeyCode::Char('x') | KeyCode::Delete if has_rows => {
                self.mode = BrowseMode::ConfirmDelete;
            }
            KeyCode::Char('a') => {
                self.mode = BrowseMode::AddForm {
                    step: 0,
                    values: vec![String::new(); form_fields().len()],
                };
            }
            _ => {}
        }
        BrowseAction::Continue
    }

    fn handle_edit_key(&mut self, code: KeyCode) -> BrowseAction {
        match code {
            KeyCode::Char(c) => {
                if let BrowseMode::EditCell { input, .. } = &mut self.mode {
                    input.push(c);
                }
            }
            KeyCode::Backspace => {
                if let BrowseMode::EditCell { input, .. } = &mut self.mode {
                    input.pop();
                }
            }
            KeyCode::Enter => {
                let mode = std::mem::replace(&mut self.mode, BrowseMode::Normal);
                if let BrowseMode::EditCell { field, input } = mode {
                    self.pending_edit = Some((self.selected, field, input));
                    return BrowseAction::CommitEdit;
                }
            }
            KeyCode::Esc => self.mode = BrowseMode::Normal,
            _ => {}
        }
        BrowseAction::Continue
    }

    fn handle_form_key(&mut self, code: KeyCode) -> BrowseAction {
        let last = form_fields().len() - 1;
        let BrowseMode::AddForm { step, values } = &mut self.mode else {
            return BrowseAction::Continue;
        };
        match code {
            KeyCode::Char(c) => values[*step].push(c),
            KeyCode::Backspace => {
                values[*step].pop();
            }
            KeyCode::Tab | KeyCode::Down => *step = (*step + 1).min(last),
            KeyCode::BackTab | KeyCode::Up => *step = step.saturating_sub(1),
            KeyCode::Enter if *step < last => *step += 1,
            KeyCode::Enter => {
                // Bad input keeps the form open with its values.
                let fields = form_fields();
                let inputs = fields
                    .iter()
                    .zip(values.iter())
                    .map(|(&f, v)| (FIELDS[f].id, v.as_str()));
                if let Err(e) = Record::from_form(inputs) {
                    if let LedgerError::InvalidNumber { field, .. } = &e {
                        if let Some(pos) =
                            fields.iter().position(|&f| FIELDS[f].id == field.as_str())
                        {
                            *step = pos;
                        }
                    }
                    self.status_message = Some(format!("Failed: {e}"));
                    return BrowseAction::Continue;
                }
                let mode = std::mem::replace(&mut self.mode, BrowseMode::Normal);
                if let BrowseMode::AddForm { values, .. } = mode {
                    self.pending_form = Some(form_fields().into_iter().zip(values).collect());
                    return BrowseAction::SubmitForm;
                }
            }
            KeyCode::Esc => self.mode = BrowseMode::Normal,
            _ => {}
        }
        BrowseAction::Continue
    }
}
