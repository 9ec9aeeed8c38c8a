use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::error;

use super::helpers::{button_style, centered_rect, notice_style, surface_error};
use crate::controller::{FormController, Notice};
use crate::form::BookField;

/// Footer space reserved for the shortcut legend.
const FOOTER_HEIGHT: u16 = 3;
/// Share of the width given to the form column; the list takes the rest.
const FORM_WIDTH_PERCENT: u16 = 45;
const APP_TITLE: &str = "Library Management System";

/// The three form buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Add,
    Update,
    Delete,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::Add => "Add Book",
            Action::Update => "Update Book",
            Action::Delete => "Delete Book",
        }
    }

    fn color(self) -> Color {
        match self {
            Action::Add => Color::Green,
            Action::Update => Color::Rgb(124, 252, 0),
            Action::Delete => Color::Red,
        }
    }
}

/// Which widget receives typed keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Focus {
    Field(BookField),
    Button(Action),
    List,
}

/// Tab order: the four inputs, the three buttons, then the list.
const FOCUS_ORDER: [Focus; 8] = [
    Focus::Field(BookField::Title),
    Focus::Field(BookField::Author),
    Focus::Field(BookField::Genre),
    Focus::Field(BookField::Year),
    Focus::Button(Action::Add),
    Focus::Button(Action::Update),
    Focus::Button(Action::Delete),
    Focus::List,
];

impl Focus {
    fn position(self) -> usize {
        FOCUS_ORDER
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0)
    }

    fn next(self) -> Self {
        FOCUS_ORDER[(self.position() + 1) % FOCUS_ORDER.len()]
    }

    fn previous(self) -> Self {
        FOCUS_ORDER[(self.position() + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len()]
    }
}

/// Either the form is live or a modal dialog is waiting to be dismissed.
enum Mode {
    Editing,
    Dialog(Notice),
}

/// Terminal front-end state. Book data and field text live in the
/// controller; this struct only adds focus and the open dialog.
pub struct App {
    controller: FormController,
    focus: Focus,
    mode: Mode,
}

impl App {
    /// Wrap a controller whose list has already been refreshed.
    pub fn new(controller: FormController) -> Self {
        Self {
            controller,
            focus: Focus::Field(BookField::Title),
            mode: Mode::Editing,
        }
    }

    /// Top-level key dispatcher. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Editing);

        self.mode = match mode {
            Mode::Editing => self.handle_editing_key(code, &mut exit),
            Mode::Dialog(notice) => Self::handle_dialog_key(code, notice),
        };
        exit
    }

    /// Run a button's action from a global shortcut. Ignored while a dialog
    /// is open, matching a modal window.
    pub fn trigger(&mut self, action: Action) {
        if matches!(self.mode, Mode::Editing) {
            self.mode = self.perform(action);
        }
    }

    fn handle_editing_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Esc => *exit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            _ => match self.focus {
                Focus::Field(field) => match code {
                    KeyCode::Enter => self.focus = self.focus.next(),
                    KeyCode::Backspace => self.controller.form_mut().backspace(field),
                    KeyCode::Char(ch) => {
                        self.controller.form_mut().push_char(field, ch);
                    }
                    _ => {}
                },
                Focus::Button(action) => {
                    if matches!(code, KeyCode::Enter | KeyCode::Char(' ')) {
                        return self.perform(action);
                    }
                }
                Focus::List => match code {
                    KeyCode::Up => self.move_selection(-1),
                    KeyCode::Down => self.move_selection(1),
                    KeyCode::Home => self.select_edge(false),
                    KeyCode::End => self.select_edge(true),
                    KeyCode::Delete => return self.perform(Action::Delete),
                    _ => {}
                },
            },
        }
        Mode::Editing
    }

    fn handle_dialog_key(code: KeyCode, notice: Notice) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Mode::Editing,
            _ => Mode::Dialog(notice),
        }
    }

    /// Run one action against the store and turn the outcome into a dialog.
    /// Storage failures abort the action but keep the app running.
    fn perform(&mut self, action: Action) -> Mode {
        let outcome = match action {
            Action::Add => self.controller.add(),
            Action::Update => self.controller.update(),
            Action::Delete => self.controller.delete(),
        };

        match outcome {
            Ok(notice) => Mode::Dialog(notice),
            Err(err) => {
                error!(action = action.label(), error = %format!("{err:#}"), "action failed");
                Mode::Dialog(Notice::error(surface_error(&err)))
            }
        }
    }

    /// Step the list selection and load the row into the fields. With nothing
    /// selected, Down starts at the top and Up at the bottom.
    fn move_selection(&mut self, offset: isize) {
        let len = self.controller.books().len();
        if len == 0 {
            return;
        }
        let next = match self.controller.selected() {
            Some(current) => current
                .saturating_add_signed(offset)
                .min(len - 1),
            None if offset >= 0 => 0,
            None => len - 1,
        };
        self.controller.select(Some(next));
    }

    fn select_edge(&mut self, last: bool) {
        let len = self.controller.books().len();
        if len > 0 {
            self.controller
                .select(Some(if last { len - 1 } else { 0 }));
        }
    }

    /// Main render routine invoked every tick.
    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let outer = Block::default()
            .title(APP_TITLE)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL);
        frame.render_widget(outer.clone(), area);
        let inner = outer.inner(area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
            .split(inner);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(FORM_WIDTH_PERCENT),
                Constraint::Percentage(100 - FORM_WIDTH_PERCENT),
            ])
            .split(rows[0]);

        self.draw_form(frame, columns[0]);
        self.draw_book_list(frame, columns[1]);
        self.draw_footer(frame, rows[1]);

        if let Mode::Dialog(notice) = &self.mode {
            Self::draw_dialog(frame, area, notice);
        }
    }

    /// Four labeled inputs stacked above the three buttons.
    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(BookField::ALL.len() as u16 + 2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        let block = Block::default().title("Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), sections[0]);
        let inner = block.inner(sections[0]);

        let form = self.controller.form();
        let lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|&field| {
                let style = if self.focus == Focus::Field(field) {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{}: ", field.label())),
                    Span::styled(form.value(field).to_string(), style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        if let Focus::Field(field) = self.focus {
            let row = BookField::ALL
                .iter()
                .position(|candidate| *candidate == field)
                .unwrap_or(0) as u16;
            let prefix = u16::try_from(field.label().chars().count() + 2).unwrap_or(u16::MAX);
            let typed = u16::try_from(form.value_len(field)).unwrap_or(u16::MAX);
            let cursor_x = inner
                .x
                .saturating_add(prefix)
                .saturating_add(typed)
                .min(inner.right().saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y + row));
        }

        for (slot, action) in [Action::Add, Action::Update, Action::Delete]
            .into_iter()
            .enumerate()
        {
            let focused = self.focus == Focus::Button(action);
            let button = Paragraph::new(action.label())
                .alignment(Alignment::Center)
                .style(button_style(action.color(), focused))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(action.color())),
                );
            frame.render_widget(button, sections[slot + 1]);
        }
    }

    /// One line per stored book, highlighting the current selection.
    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focus == Focus::List {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(format!("Books ({})", self.controller.books().len()))
            .borders(Borders::ALL)
            .border_style(border_style);

        let items: Vec<ListItem> = self
            .controller
            .books()
            .iter()
            .map(|book| ListItem::new(book.to_string()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(self.controller.selected());
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let context = match (&self.mode, self.focus) {
            (Mode::Dialog(_), _) => vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Dismiss"),
            ],
            (_, Focus::Field(_)) => vec![
                Span::styled("[Type]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Next field"),
            ],
            (_, Focus::Button(_)) => vec![
                Span::styled("[Enter/Space]", key_style),
                Span::raw(" Press"),
            ],
            (_, Focus::List) => vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Del]", key_style),
                Span::raw(" Delete"),
            ],
        };

        let shortcuts = Line::from(vec![
            Span::styled("[Tab]", key_style),
            Span::raw(" Focus   "),
            Span::styled("[Ctrl+A/U/D]", key_style),
            Span::raw(" Add/Update/Delete   "),
            Span::styled("[Esc]", key_style),
            Span::raw(" Quit"),
        ]);

        let block = Block::default().borders(Borders::TOP);
        let paragraph = Paragraph::new(vec![Line::from(context), shortcuts])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_dialog(frame: &mut Frame, area: Rect, notice: &Notice) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let style = notice_style(notice.kind);
        let block = Block::default()
            .title(Span::styled(notice.title.clone(), style.add_modifier(Modifier::BOLD)))
            .borders(Borders::ALL)
            .border_style(style);

        let lines = vec![
            Line::from(notice.message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to dismiss",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::NoticeKind;
    use crate::db::BookStore;
    use crate::form::BookForm;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;

    fn app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let store = BookStore::new(dir.path().join("library.db"));
        store.ensure_schema().unwrap();
        let mut controller = FormController::new(store);
        controller.refresh().unwrap();
        (dir, App::new(controller))
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn fill_form(app: &mut App, title: &str, author: &str, genre: &str, year: &str) {
        *app.controller.form_mut() = BookForm::default();
        app.focus = Focus::Field(BookField::Title);
        for value in [title, author, genre, year] {
            type_text(app, value);
            app.handle_key(KeyCode::Enter);
        }
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn dialog(app: &App) -> Option<&Notice> {
        match &app.mode {
            Mode::Dialog(notice) => Some(notice),
            Mode::Editing => None,
        }
    }

    #[test]
    fn focus_cycles_through_every_widget() {
        let mut focus = Focus::Field(BookField::Title);
        for _ in 0..FOCUS_ORDER.len() {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Field(BookField::Title));
        assert_eq!(focus.previous(), Focus::List);
    }

    #[test]
    fn typing_and_add_button_create_a_book() {
        let (_dir, mut app) = app();
        fill_form(&mut app, "Dune", "Frank Herbert", "Sci-Fi", "1965");

        assert_eq!(app.focus, Focus::Button(Action::Add));
        app.handle_key(KeyCode::Enter);

        let notice = dialog(&app).unwrap();
        assert_eq!(notice.message, "Book added successfully!");
        assert_eq!(app.controller.books().len(), 1);

        app.handle_key(KeyCode::Enter);
        assert!(dialog(&app).is_none());
    }

    #[test]
    fn dialog_swallows_keys_until_dismissed() {
        let (_dir, mut app) = app();
        app.trigger(Action::Add);
        assert_eq!(dialog(&app).unwrap().kind, NoticeKind::Warning);

        app.handle_key(KeyCode::Char('x'));
        app.trigger(Action::Delete);
        assert_eq!(dialog(&app).unwrap().title, "Input Error");
        assert_eq!(app.controller.form().title, "");

        assert!(!app.handle_key(KeyCode::Esc));
        assert!(dialog(&app).is_none());
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn list_navigation_loads_fields_and_delete_key_removes() {
        let (_dir, mut app) = app();
        fill_form(&mut app, "Dune", "Frank Herbert", "Sci-Fi", "1965");
        app.trigger(Action::Add);
        app.handle_key(KeyCode::Enter);
        fill_form(&mut app, "Emma", "Jane Austen", "Novel", "1815");
        app.trigger(Action::Add);
        app.handle_key(KeyCode::Enter);

        app.focus = Focus::List;
        app.handle_key(KeyCode::Down);
        assert_eq!(app.controller.selected(), Some(0));
        assert_eq!(app.controller.form().title, "Dune");

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.controller.selected(), Some(1));
        assert_eq!(app.controller.form().author, "Jane Austen");

        app.handle_key(KeyCode::Home);
        assert_eq!(app.controller.selected(), Some(0));

        app.handle_key(KeyCode::Delete);
        assert_eq!(dialog(&app).unwrap().message, "Book deleted successfully!");
        assert_eq!(app.controller.books().len(), 1);
        assert_eq!(app.controller.books()[0].title, "Emma");
    }

    #[test]
    fn update_shortcut_edits_selected_book() {
        let (_dir, mut app) = app();
        fill_form(&mut app, "Dune", "Frank Herbert", "Sci-Fi", "1965");
        app.trigger(Action::Add);
        app.handle_key(KeyCode::Enter);

        app.focus = Focus::List;
        app.handle_key(KeyCode::End);
        app.focus = Focus::Field(BookField::Author);
        for _ in 0.."Frank Herbert".len() {
            app.handle_key(KeyCode::Backspace);
        }
        type_text(&mut app, "F. Herbert");
        app.trigger(Action::Update);

        assert_eq!(dialog(&app).unwrap().message, "Book updated successfully!");
        assert_eq!(app.controller.books()[0].id, 1);
        assert_eq!(app.controller.books()[0].author, "F. Herbert");
    }

    #[test]
    fn storage_error_becomes_dialog() {
        let dir = TempDir::new().unwrap();
        let controller = FormController::new(BookStore::new(dir.path().join("library.db")));
        let mut app = App::new(controller);
        fill_form(&mut app, "Dune", "Frank Herbert", "Sci-Fi", "1965");

        app.trigger(Action::Add);

        let notice = dialog(&app).unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.title, "Storage Error");
        assert!(!notice.message.is_empty());
    }

    #[test]
    fn screen_shows_form_buttons_and_rows() {
        let (_dir, mut app) = app();
        fill_form(&mut app, "Dune", "Frank Herbert", "Sci-Fi", "1965");
        app.trigger(Action::Add);

        let screen = render(&app);
        assert!(screen.contains(APP_TITLE));
        assert!(screen.contains("Success"));

        app.handle_key(KeyCode::Enter);
        let screen = render(&app);
        for label in ["Title of The Book: Dune", "Author Name:", "Category:", "Published Year:"] {
            assert!(screen.contains(label), "missing {label}");
        }
        for button in ["Add Book", "Update Book", "Delete Book"] {
            assert!(screen.contains(button), "missing {button}");
        }
        assert!(screen.contains("(1, Dune, Frank Herbert, Sci-Fi, 1965)"));
    }

    #[test]
    fn very_long_field_keeps_cursor_inside_form() {
        let (_dir, mut app) = app();
        app.controller.form_mut().title = "x".repeat(usize::from(u16::MAX) - 5);
        app.focus = Focus::Field(BookField::Title);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 100 * FORM_WIDTH_PERCENT / 100);
    }
}
