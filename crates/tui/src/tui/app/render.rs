use std::cmp::min;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
};
use ratatui::Frame;

use crate::core::column::BuiltinColumn;
use crate::core::schema::CustomFieldType;
use crate::tui::constants::APP_VERSION;
use crate::tui::filters::{BuilderStage, FilterBuilder};
use crate::tui::forms::{FieldFocus, FieldTab, TaskFormFocus};
use crate::tui::helpers::{
    accent_title, build_help_lines, centered_rect, custom_cell_text, format_datetime,
    header_label, inset_rect, BG_ACCENT, BG_BASE, BG_PANEL, FG_ACCENT,
};

use super::{App, ConfirmChoice, DeleteTarget, InputMode};

const BUILTIN_LABELS: [(BuiltinColumn, &str); 5] = [
    (BuiltinColumn::Id, "#"),
    (BuiltinColumn::Title, "Title"),
    (BuiltinColumn::Priority, "Priority"),
    (BuiltinColumn::Status, "Status"),
    (BuiltinColumn::CreatedAt, "Created"),
];

impl App {
    pub(crate) fn draw(&mut self, f: &mut Frame<'_>) {
        let size = f.size();
        f.render_widget(Clear, size);
        f.render_widget(Block::default().style(Style::default().bg(BG_BASE)), size);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_filter_bar(f, chunks[1]);
        self.draw_table(f, chunks[2]);
        self.draw_footer(f, chunks[3]);

        match self.input_mode {
            InputMode::Search | InputMode::Command | InputMode::SetValue => {
                self.draw_input_overlay(f, size)
            }
            InputMode::Filter => self.draw_filter_overlay(f, size),
            InputMode::Chips => self.draw_chips_overlay(f, size),
            InputMode::TaskForm => self.draw_task_form(f, size),
            InputMode::FieldEditor => self.draw_field_editor(f, size),
            InputMode::Help => self.draw_help_overlay(f, size),
            InputMode::ConfirmDelete => self.draw_confirm_overlay(f, size),
            InputMode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let left = Line::from(vec![
            Span::styled(
                format!(" taskgrid v{APP_VERSION} "),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("— {} tasks", self.board.store().len())),
            Span::raw("  "),
            Span::styled(
                format!("💾 {}", self.location),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        f.render_widget(
            Paragraph::new(left).style(Style::default().bg(BG_BASE)),
            cols[0],
        );

        let right = Line::from(vec![Span::styled(
            format!("sort {} ", self.board.sort_rules().summary()),
            Style::default().fg(Color::DarkGray),
        )]);
        f.render_widget(
            Paragraph::new(right)
                .alignment(Alignment::Right)
                .style(Style::default().bg(BG_BASE)),
            cols[1],
        );
    }

    fn draw_filter_bar(&self, f: &mut Frame<'_>, area: Rect) {
        let rules = self.board.filters().rules();
        let line = if rules.is_empty() {
            Line::from(vec![Span::styled(
                "No filters • / search titles • f add a filter",
                Style::default().fg(Color::DarkGray),
            )])
        } else {
            let mut spans = Vec::with_capacity(rules.len() * 2);
            for rule in rules {
                spans.push(Span::styled(
                    format!(" {} ✕ ", rule.summary()),
                    Style::default()
                        .fg(Color::Yellow)
                        .bg(BG_ACCENT)
                        .add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                "c manage",
                Style::default().fg(Color::DarkGray),
            ));
            Line::from(spans)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("Filters"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        f.render_widget(Paragraph::new(line).block(block), area);
    }

    fn draw_table(&mut self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));

        if self.snapshot.rows.is_empty() {
            let inner = block.inner(area);
            f.render_widget(block, area);
            let lines = vec![
                Line::from(vec![Span::styled(
                    if self.board.filters().is_empty() {
                        "No tasks yet"
                    } else {
                        "No tasks match the active filters"
                    },
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )]),
                Line::default(),
                Line::from(vec![Span::styled(
                    "Press 'a' to add a task or 'c' to review filters.",
                    Style::default().fg(Color::Gray),
                )]),
            ];
            let content = centered_rect(inner.width.min(60), 3, inner);
            f.render_widget(
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .style(Style::default().bg(BG_PANEL)),
                content,
            );
            return;
        }

        let sort = self.board.sort_rules();
        let schema = self.board.schema();
        let focus_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

        let mut header_cells = vec![Cell::from("")];
        let labels = BUILTIN_LABELS
            .iter()
            .map(|(column, label)| (column.as_str().to_string(), label.to_string()))
            .chain(
                schema
                    .fields()
                    .iter()
                    .map(|field| (field.name.clone(), field.name.clone())),
            );
        for (idx, (column, label)) in labels.enumerate() {
            let cell = Cell::from(header_label(&label, &column, sort));
            header_cells.push(if idx == self.header_cursor {
                cell.style(focus_style)
            } else {
                cell
            });
        }
        let header = Row::new(header_cells).style(Style::default().add_modifier(Modifier::BOLD));

        let store = self.board.store();
        let rows: Vec<Row> = self
            .snapshot
            .rows
            .iter()
            .map(|task| {
                let mut cells = vec![
                    Cell::from(if store.is_selected(task.id) { "[x]" } else { "[ ]" }),
                    Cell::from(task.id.to_string()),
                    Cell::from(task.title.clone()),
                    Cell::from(task.priority.as_str()),
                    Cell::from(task.status.as_str()),
                    Cell::from(format_datetime(&task.created_at)),
                ];
                cells.extend(
                    schema
                        .fields()
                        .iter()
                        .map(|field| Cell::from(custom_cell_text(schema, field, task))),
                );
                Row::new(cells)
            })
            .collect();

        let mut widths = vec![
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(13),
            Constraint::Length(16),
        ];
        widths.extend(schema.fields().iter().map(|_| Constraint::Length(14)));

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .bg(BG_ACCENT)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.style())])
        } else {
            Line::from(vec![Span::raw("Ready")])
        };
        f.render_widget(Paragraph::new(status_line), lines[0]);

        let selected = self.board.store().selection().len();
        let mut spans = vec![
            Span::styled(
                format!(
                    "Page {} of {}",
                    self.snapshot.page, self.snapshot.total_pages
                ),
                Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    " • {} matching • {} per page",
                    self.snapshot.total_matches, self.snapshot.page_size
                ),
                Style::default().fg(Color::Gray),
            ),
        ];
        if selected > 0 {
            spans.push(Span::styled(
                format!(" • {selected} selected"),
                Style::default().fg(Color::Yellow),
            ));
        }
        let hint = match self.input_mode {
            InputMode::Normal => {
                "   n/p page • z size • [ ] column • s sort • a add • e edit • x delete • h help"
            }
            InputMode::ConfirmDelete => "   ←/→ choose • Enter confirm • Esc cancel",
            _ => "   Esc to close",
        };
        spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
        f.render_widget(Paragraph::new(Line::from(spans)), lines[1]);
    }

    fn draw_input_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(10), 80);
        let extra_height = match self.input_mode {
            InputMode::Command => self.suggestions.len().min(6) as u16 + 1,
            _ => 0,
        };
        let popup_area = centered_rect(width, 3 + extra_height, area);
        f.render_widget(Clear, popup_area);

        let title = match self.input_mode {
            InputMode::Search => String::from("🔍 Search titles"),
            InputMode::Command => String::from("⌨️ Command"),
            InputMode::SetValue => match &self.value_target {
                Some((id, field)) => format!("✏️ {} on task {id}", field.name),
                None => String::from("✏️ Value"),
            },
            _ => String::from("Input"),
        };
        let inner = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(popup_area);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(&title))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let input_area = input_block.inner(inner[0]);
        f.render_widget(
            Paragraph::new(self.input.as_str()).block(input_block),
            inner[0],
        );
        let column = u16::try_from(self.input.cursor_column()).unwrap_or(u16::MAX);
        f.set_cursor(
            input_area.x + column.min(input_area.width.saturating_sub(1)),
            input_area.y,
        );

        if self.input_mode == InputMode::Command && !self.suggestions.is_empty() {
            let lines: Vec<Line> = self
                .suggestions
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let style = if i == self.suggestion_index {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default()
                    };
                    Line::from(vec![
                        Span::styled(s.fill.as_str(), style.add_modifier(Modifier::BOLD)),
                        Span::raw("  "),
                        Span::styled(s.label.as_str(), Style::default().fg(Color::DarkGray)),
                    ])
                })
                .collect();
            f.render_widget(
                Paragraph::new(lines).style(Style::default().bg(BG_PANEL)),
                inner[1],
            );
        }
    }

    fn draw_filter_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let Some(builder) = self.filter_builder.as_ref() else {
            return;
        };

        let width = min(area.width.saturating_sub(10), 60);
        let height = min(area.height.saturating_sub(4), 16);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let column_name = builder
            .current_column()
            .map(|column| column.column.as_str())
            .unwrap_or("");
        let title = match builder.stage {
            BuilderStage::Column => String::from("🔍 Filter — column"),
            BuilderStage::Value => format!("🔍 Filter — {column_name}"),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(&title))
            .border_style(Style::default().fg(Color::Yellow))
            .style(Style::default().bg(BG_PANEL));

        if builder.wants_text() {
            let inner = block.inner(popup_area);
            f.render_widget(block, popup_area);
            let lines = vec![
                Line::from(vec![Span::styled(
                    "Type a value and press Enter",
                    Style::default().fg(Color::DarkGray),
                )]),
                Line::default(),
                Line::from(vec![Span::styled(
                    format!("> {}", builder.value.as_str()),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )]),
            ];
            f.render_widget(Paragraph::new(lines), inset_rect(inner, 1));
            return;
        }

        let (items, selected) = filter_items(builder);
        let mut state = ListState::default();
        state.select(Some(selected));
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        f.render_stateful_widget(list, popup_area, &mut state);
    }

    fn draw_chips_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let rules = self.board.filters().rules();
        let width = min(area.width.saturating_sub(10), 60);
        let height = min(rules.len() as u16 + 4, area.height.saturating_sub(2)).max(5);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = rules
            .iter()
            .map(|rule| ListItem::new(rule.summary()))
            .collect();
        let mut state = ListState::default();
        if !rules.is_empty() {
            state.select(Some(self.chips.index.min(rules.len() - 1)));
        }
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(accent_title("Active filters — x remove • C remove all"))
                    .border_style(Style::default().fg(Color::Yellow))
                    .style(Style::default().bg(BG_PANEL)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        f.render_stateful_widget(list, popup_area, &mut state);
    }

    fn draw_task_form(&self, f: &mut Frame<'_>, area: Rect) {
        let Some(form) = self.task_form.as_ref() else {
            return;
        };
        let width = min(area.width.saturating_sub(10), 70);
        let popup_area = centered_rect(width, 9, area);
        f.render_widget(Clear, popup_area);

        let title = match form.editing {
            Some(id) => format!("✏️ Edit task {id}"),
            None => String::from("✚ New task"),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(&title))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let rows = vec![
            form_row(
                "Title",
                form.title.as_str().to_string(),
                form.focus == TaskFormFocus::Title,
            ),
            form_row(
                "Priority",
                format!("◀ {} ▶", form.priority),
                form.focus == TaskFormFocus::Priority,
            ),
            form_row(
                "Status",
                format!("◀ {} ▶", form.status),
                form.focus == TaskFormFocus::Status,
            ),
        ];
        let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(10)]).column_spacing(2);
        f.render_widget(table, inset_rect(inner, 1));
    }

    fn draw_field_editor(&self, f: &mut Frame<'_>, area: Rect) {
        let form = &self.field_form;
        let width = min(area.width.saturating_sub(10), 70);
        let height = min(area.height.saturating_sub(2), 14);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("🧩 Custom fields"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(inner);

        let tabs = Tabs::new(vec![Line::from("Add field"), Line::from("Remove fields")])
            .select(match form.tab {
                FieldTab::Add => 0,
                FieldTab::Remove => 1,
            })
            .highlight_style(
                Style::default()
                    .fg(Color::Green)
                    .bg(BG_ACCENT)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, chunks[0]);

        match form.tab {
            FieldTab::Add => {
                let default_text = if form.field_type == CustomFieldType::Checkbox {
                    String::from(if form.default_checked { "[x]" } else { "[ ]" })
                } else {
                    form.default_text.as_str().to_string()
                };
                let rows = vec![
                    form_row(
                        "Name",
                        form.name.as_str().to_string(),
                        form.focus == FieldFocus::Name,
                    ),
                    form_row(
                        "Type",
                        format!("◀ {} ▶", form.field_type),
                        form.focus == FieldFocus::Type,
                    ),
                    form_row(
                        "Description",
                        form.description.as_str().to_string(),
                        form.focus == FieldFocus::Description,
                    ),
                    form_row("Default", default_text, form.focus == FieldFocus::Default),
                ];
                let table =
                    Table::new(rows, [Constraint::Length(12), Constraint::Min(10)]).column_spacing(2);
                f.render_widget(table, inset_rect(chunks[1], 1));
            }
            FieldTab::Remove => {
                let schema = self.board.schema();
                let items: Vec<ListItem> = if schema.fields().is_empty() {
                    vec![ListItem::new("(no custom fields)")]
                } else {
                    schema
                        .fields()
                        .iter()
                        .map(|field| {
                            let mark = if schema.is_selected(&field.id) { 'x' } else { ' ' };
                            ListItem::new(format!("[{mark}] {} ({})", field.name, field.field_type))
                        })
                        .collect()
                };
                let mut state = ListState::default();
                if !schema.fields().is_empty() {
                    state.select(Some(form.remove_index.min(schema.fields().len() - 1)));
                }
                let list = List::new(items)
                    .highlight_style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                    .highlight_symbol("▶ ");
                f.render_stateful_widget(list, chunks[1], &mut state);
            }
        }
    }

    fn draw_help_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = build_help_lines();
        let width = min(area.width.saturating_sub(10), 80);
        let height = min(lines.len() as u16 + 4, area.height.saturating_sub(2)).max(10);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("⌨️ Keyboard Reference"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        if inner.width < 3 || inner.height < 3 {
            return;
        }

        let help_lines: Vec<Line> = lines
            .into_iter()
            .map(|(combo, desc)| {
                Line::from(vec![
                    Span::styled(format!("{combo:<16}"), Style::default().fg(Color::Cyan)),
                    Span::raw(desc),
                ])
            })
            .collect();
        f.render_widget(
            Paragraph::new(help_lines)
                .wrap(Wrap { trim: true })
                .style(Style::default().bg(BG_PANEL)),
            inset_rect(inner, 1),
        );
    }

    fn draw_confirm_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(20), 60).max(40);
        let popup_area = centered_rect(width, 8, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("🗑 Confirm Deletion"))
            .border_style(Style::default().fg(Color::Red))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let question = match &self.delete_target {
            Some(DeleteTarget::Task { title, .. }) => format!("Delete '{title}'?"),
            Some(DeleteTarget::Selected(count)) => format!("Delete {count} selected task(s)?"),
            None => String::from("Delete?"),
        };

        let yes_style = if self.confirm_choice == ConfirmChoice::Yes {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red)
        };
        let no_style = if self.confirm_choice == ConfirmChoice::No {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let lines = vec![
            Line::from(vec![Span::styled(
                "This action cannot be undone.",
                Style::default().fg(Color::Red),
            )]),
            Line::from(vec![Span::styled(question, Style::default().fg(Color::White))]),
            Line::default(),
            Line::from(vec![
                Span::styled("  Yes  ", yes_style),
                Span::raw("    "),
                Span::styled("  No  ", no_style),
            ]),
        ];

        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Center)
                .style(Style::default().bg(BG_PANEL)),
            inset_rect(inner, 1),
        );
    }
}

/// Builder rows for the current stage plus the highlighted index.
fn filter_items(builder: &FilterBuilder) -> (Vec<ListItem<'static>>, usize) {
    match builder.stage {
        BuilderStage::Column => {
            let items = builder
                .columns
                .iter()
                .map(|column| ListItem::new(format!("{}  ({})", column.column, column.kind.as_str())))
                .collect();
            (items, builder.column_index)
        }
        BuilderStage::Value => {
            let items = builder.options().into_iter().map(ListItem::new).collect();
            (items, builder.option_index)
        }
    }
}

fn form_row(label: &'static str, value: String, focused: bool) -> Row<'static> {
    let value_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .bg(BG_ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Row::new(vec![
        Cell::from(label).style(Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD)),
        Cell::from(value).style(value_style),
    ])
    .height(2)
}
