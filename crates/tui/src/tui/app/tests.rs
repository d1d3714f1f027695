use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use rstest::rstest;

use super::{App, InputMode};
use crate::core::schema::{CustomFieldType, FieldDraft, SchemaRegistry};
use crate::core::sort::SortRules;
use crate::core::storage::{MemoryStorage, TASKS_KEY};
use crate::core::Board;
use crate::model::{FieldValue, Status, TaskDraft};
use crate::tui::constants::STATUS_FIELD_EDITOR;
use crate::tui::helpers::{centered_rect, custom_cell_text, header_label};

fn empty_app() -> App {
    let storage = MemoryStorage::new().with_entry(TASKS_KEY, "[]");
    App::new(Board::open(Box::new(storage)), String::from("memory"))
}

fn seeded_app() -> App {
    App::new(
        Board::open(Box::new(MemoryStorage::new())),
        String::from("memory"),
    )
}

fn press(app: &mut App, code: KeyCode) {
    app.on_key(KeyEvent::new(code, KeyModifiers::NONE))
        .expect("key handled");
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch));
    }
}

fn status_text(app: &App) -> String {
    app.status
        .as_ref()
        .map(|status| status.text.clone())
        .unwrap_or_default()
}

#[test]
fn centered_rect_keeps_within_bounds() {
    let area = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };
    let rect = centered_rect(40, 10, area);
    assert!(rect.x >= area.x);
    assert!(rect.y >= area.y);
    assert_eq!(rect.width, 40);
    assert_eq!(rect.height, 10);
}

#[test]
fn header_label_marks_sort_direction_and_rank() {
    let mut sort = SortRules::default();
    assert_eq!(header_label("#", "id", &sort), "# ▼");

    sort.toggle("title");
    assert_eq!(header_label("Title", "title", &sort), "Title ▲");

    sort.toggle("status");
    assert_eq!(header_label("Title", "title", &sort), "Title ▲1");
    assert_eq!(header_label("Status", "status", &sort), "Status ▲2");
    assert_eq!(header_label("Priority", "priority", &sort), "Priority");
}

#[test]
fn custom_cells_fall_back_to_defaults() {
    let mut schema = SchemaRegistry::default();
    let flag = schema
        .add(&FieldDraft::new("Reviewed", CustomFieldType::Checkbox).with_default_checked(false))
        .expect("checkbox field");
    let note = schema
        .add(&FieldDraft::new("Note", CustomFieldType::Text))
        .expect("text field");
    let mut task = TaskDraft::new("Write docs").into_task(1, chrono::Utc::now());

    assert_eq!(custom_cell_text(&schema, &flag, &task), "[ ]");
    assert_eq!(custom_cell_text(&schema, &note, &task), "N/A");

    task.custom_fields
        .insert("Reviewed".into(), FieldValue::Checkbox(true));
    task.custom_fields
        .insert("Note".into(), FieldValue::Text("ship it".into()));
    assert_eq!(custom_cell_text(&schema, &flag, &task), "[x]");
    assert_eq!(custom_cell_text(&schema, &note, &task), "ship it");
}

#[rstest]
#[case('h', InputMode::Help)]
#[case('/', InputMode::Search)]
#[case('f', InputMode::Filter)]
#[case('a', InputMode::TaskForm)]
#[case('m', InputMode::FieldEditor)]
#[case(':', InputMode::Command)]
fn normal_keys_open_their_mode(#[case] key: char, #[case] mode: InputMode) {
    let mut app = empty_app();
    press(&mut app, KeyCode::Char(key));
    assert_eq!(app.input_mode, mode);

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.input_mode, InputMode::Normal);
}

#[test]
fn task_form_creates_a_task() {
    let mut app = empty_app();
    press(&mut app, KeyCode::Char('a'));
    assert_eq!(app.input_mode, InputMode::TaskForm);

    type_text(&mut app, "Write docs");
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Right);
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.board.store().len(), 1);
    let task = &app.snapshot.rows[0];
    assert_eq!(task.title, "Write docs");
    assert_eq!(task.status, Status::InProgress);
    assert!(status_text(&app).contains("Created task 1"));
}

#[test]
fn blank_title_keeps_form_open() {
    let mut app = empty_app();
    press(&mut app, KeyCode::Char('a'));
    type_text(&mut app, "   ");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.input_mode, InputMode::TaskForm);
    assert!(app.board.store().is_empty());
}

#[test]
fn edit_form_updates_selected_task() {
    let mut app = empty_app();
    app.board.add_task(TaskDraft::new("Old title"));
    app.refresh();

    press(&mut app, KeyCode::Char('e'));
    for _ in 0.."Old title".len() {
        press(&mut app, KeyCode::Backspace);
    }
    type_text(&mut app, "New title");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.board.task(1).map(|t| t.title.as_str()), Some("New title"));
    assert!(status_text(&app).contains("Updated task 1"));
}

#[test]
fn invalid_field_input_is_a_silent_no_op() {
    let mut app = empty_app();
    press(&mut app, KeyCode::Char('m'));
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.input_mode, InputMode::FieldEditor);
    assert!(app.board.schema().fields().is_empty());
    assert!(status_text(&app).contains(STATUS_FIELD_EDITOR));

    type_text(&mut app, "status");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.input_mode, InputMode::FieldEditor);
    assert!(app.board.schema().fields().is_empty());
}

#[test]
fn checkbox_field_toggles_from_the_table() {
    let mut app = empty_app();
    app.board.add_task(TaskDraft::new("Ship release"));
    app.refresh();

    press(&mut app, KeyCode::Char('m'));
    type_text(&mut app, "Reviewed");
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.input_mode, InputMode::Normal);
    let field = app.board.schema().field("Reviewed").expect("field added");
    assert_eq!(field.field_type, CustomFieldType::Checkbox);
    assert_eq!(field.default_value, Some(FieldValue::Checkbox(false)));

    press(&mut app, KeyCode::Char('['));
    assert_eq!(app.focused_column().as_deref(), Some("Reviewed"));
    press(&mut app, KeyCode::Char('t'));

    let task = app.board.task(1).expect("task");
    assert_eq!(task.custom_value("Reviewed"), Some(&FieldValue::Checkbox(true)));
}

#[test]
fn number_values_are_typed_on_entry() {
    let mut app = empty_app();
    app.board.add_task(TaskDraft::new("Estimate"));
    app.board
        .add_field(&FieldDraft::new("Points", CustomFieldType::Number))
        .expect("field");
    app.refresh();

    press(&mut app, KeyCode::Char('['));
    press(&mut app, KeyCode::Char('t'));
    assert_eq!(app.input_mode, InputMode::SetValue);
    type_text(&mut app, "5");
    press(&mut app, KeyCode::Enter);

    let task = app.board.task(1).expect("task");
    assert_eq!(task.custom_value("Points"), Some(&FieldValue::Number(5.0)));
}

#[test]
fn removing_fields_uses_the_selection() {
    let mut app = empty_app();
    app.board
        .add_field(&FieldDraft::new("Owner", CustomFieldType::Text))
        .expect("field");
    app.board
        .add_field(&FieldDraft::new("Points", CustomFieldType::Number))
        .expect("field");
    app.refresh();

    press(&mut app, KeyCode::Char('m'));
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Enter);

    let names: Vec<&str> = app
        .board
        .schema()
        .fields()
        .iter()
        .map(|field| field.name.as_str())
        .collect();
    assert_eq!(names, vec!["Owner"]);
    assert_eq!(app.input_mode, InputMode::Normal);
}

#[test]
fn search_then_clear_chips() {
    let mut app = seeded_app();
    press(&mut app, KeyCode::Char('/'));
    type_text(&mut app, "rotate");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.snapshot.total_matches, 1);
    assert_eq!(app.snapshot.rows[0].title, "Rotate database credentials");

    press(&mut app, KeyCode::Char('c'));
    assert_eq!(app.input_mode, InputMode::Chips);
    press(&mut app, KeyCode::Char('C'));
    assert!(app.board.filters().is_empty());
    assert_eq!(app.snapshot.total_matches, 24);
}

#[test]
fn filter_builder_applies_enum_choice() {
    let mut app = seeded_app();
    press(&mut app, KeyCode::Char('f'));
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.board.filters().summary().as_deref(), Some("status: Completed"));
    assert_eq!(app.snapshot.total_matches, 6);
    assert!(app
        .snapshot
        .rows
        .iter()
        .all(|task| task.status == Status::Completed));
}

#[test]
fn header_cursor_drives_sorting() {
    let mut app = seeded_app();
    assert_eq!(app.snapshot.rows[0].id, 24);

    press(&mut app, KeyCode::Char(']'));
    press(&mut app, KeyCode::Char('s'));
    assert_eq!(app.board.sort_rules().summary(), "title:asc");
    assert_eq!(app.snapshot.rows[0].title, "Archive stale support tickets");

    press(&mut app, KeyCode::Char('s'));
    press(&mut app, KeyCode::Char('s'));
    assert!(app.board.sort_rules().is_default());
}

#[test]
fn paging_keys_move_between_pages() {
    let mut app = seeded_app();
    assert_eq!(app.snapshot.total_pages, 3);

    press(&mut app, KeyCode::Char('n'));
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.snapshot.page, 3);
    assert_eq!(app.snapshot.rows.len(), 4);

    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.snapshot.page, 3);

    press(&mut app, KeyCode::Char('z'));
    assert_eq!(app.snapshot.page_size, 20);
    assert_eq!(app.snapshot.page, 2);

    press(&mut app, KeyCode::Char('p'));
    assert_eq!(app.snapshot.page, 1);
}

#[test]
fn delete_requires_confirmation() {
    let mut app = empty_app();
    app.board.add_task(TaskDraft::new("Keep me"));
    app.refresh();

    press(&mut app, KeyCode::Char('x'));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.board.store().len(), 1);

    press(&mut app, KeyCode::Char('x'));
    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Enter);
    assert!(app.board.store().is_empty());
    assert!(status_text(&app).contains("Deleted task 1"));
}

#[test]
fn bulk_delete_removes_selected_rows() {
    let mut app = empty_app();
    for title in ["one", "two", "three"] {
        app.board.add_task(TaskDraft::new(title));
    }
    app.refresh();

    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Char('D'));
    assert_eq!(app.input_mode, InputMode::ConfirmDelete);
    press(&mut app, KeyCode::Char('y'));

    let titles: Vec<&str> = app
        .board
        .store()
        .tasks()
        .iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(titles, vec!["one"]);
}

#[test]
fn command_palette_sets_page_size_and_page() {
    let mut app = seeded_app();
    press(&mut app, KeyCode::Char(':'));
    type_text(&mut app, "size 20");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.snapshot.page_size, 20);
    assert_eq!(app.input_mode, InputMode::Normal);

    press(&mut app, KeyCode::Char(':'));
    type_text(&mut app, "page 2");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.snapshot.page, 2);

    press(&mut app, KeyCode::Char(':'));
    type_text(&mut app, "bogus");
    press(&mut app, KeyCode::Enter);
    assert!(status_text(&app).contains("Unknown command: bogus"));
}

#[test]
fn command_palette_adds_tasks() {
    let mut app = empty_app();
    press(&mut app, KeyCode::Char(':'));
    type_text(&mut app, "add Buy milk");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.board.store().len(), 1);
    assert_eq!(app.snapshot.rows[0].title, "Buy milk");
}

#[test]
fn quit_keys_stop_the_loop() {
    let mut app = empty_app();
    app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
        .expect("key handled");
    assert!(app.should_quit());

    let mut app = empty_app();
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
}

#[test]
fn draws_every_overlay_without_panicking() {
    let mut app = seeded_app();
    app.board
        .add_field(&FieldDraft::new("Reviewed", CustomFieldType::Checkbox))
        .expect("field");
    app.refresh();
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");

    for key in ['h', '/', 'f', 'a', 'm', 'x', ':'] {
        press(&mut app, KeyCode::Char(key));
        terminal.draw(|f| app.draw(f)).expect("draw");
        press(&mut app, KeyCode::Esc);
    }
    terminal.draw(|f| app.draw(f)).expect("draw");
    assert_eq!(app.input_mode, InputMode::Normal);
}
