use chrono::Local;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use itertools::Itertools;
use log::{debug, info};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Flex, Layout, Margin, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Cell, Clear, HighlightSpacing, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Table, TableState,
    },
};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::app::poller::{Command, PollerEvent};
use crate::app::state::AppState;
use crate::app::watchlist::validate_ticker;
use crate::config::{ERROR_POPUP_DURATION_MS, INFO_TEXT, ITEM_HEIGHT, PALETTES, POLL_DURATION_MS};
use crate::render::TIMEFRAMES;
use crate::ui::TableColors;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    MinMcap,
    Oversold,
    Overbought,
}

impl Field {
    fn title(self) -> &'static str {
        match self {
            Field::MinMcap => "Min Market Cap (B)",
            Field::Oversold => "Oversold Limit",
            Field::Overbought => "Overbought Limit",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum InputMode {
    Normal,
    AddTicker,
    ConfirmRemove(String),
    Edit(Field),
}

pub struct TuiApp {
    state: AppState,
    table_state: TableState,
    scroll_state: ScrollbarState,
    colors: TableColors,
    color_index: usize,
    mode: InputMode,
    input: String,
    error_popup_timer: Option<Instant>,
    commands: mpsc::UnboundedSender<Command>,
    min_mcap: watch::Sender<f64>,
}

impl TuiApp {
    pub fn new(
        state: AppState,
        commands: mpsc::UnboundedSender<Command>,
        min_mcap: watch::Sender<f64>,
    ) -> Self {
        Self {
            state,
            table_state: TableState::default(),
            scroll_state: ScrollbarState::new(0),
            colors: TableColors::new(&PALETTES[0]),
            color_index: 0,
            mode: InputMode::Normal,
            input: String::new(),
            error_popup_timer: None,
            commands,
            min_mcap,
        }
    }

    pub fn run(
        mut self,
        mut terminal: DefaultTerminal,
        mut rx: mpsc::UnboundedReceiver<PollerEvent>,
    ) -> Result<()> {
        loop {
            // Drain updates
            while let Ok(event) = rx.try_recv() {
                self.apply_event(event);
            }

            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(Duration::from_millis(POLL_DURATION_MS))? {
                // Drain ALL events, not just one
                while event::poll(Duration::from_millis(0))? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key) {
                                return Ok(());
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn apply_event(&mut self, event: PollerEvent) {
        self.state.on_event(event, Local::now());
        self.sync_selection();
    }

    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode.clone() {
            InputMode::Normal => return self.handle_normal_key(key),
            InputMode::AddTicker => match key.code {
                KeyCode::Esc => self.close_popup(),
                KeyCode::Backspace => {
                    let _ = self.input.pop();
                }
                KeyCode::Enter => {
                    // Empty input never reaches the network
                    if let Some(ticker) = validate_ticker(&self.input) {
                        info!("Adding {}", ticker);
                        self.send(Command::Add(ticker));
                    }
                    self.close_popup();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
            InputMode::ConfirmRemove(ticker) => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter) {
                    info!("Removing {}", ticker);
                    self.send(Command::Remove(ticker));
                }
                self.close_popup();
            }
            InputMode::Edit(field) => match key.code {
                KeyCode::Esc => self.close_popup(),
                KeyCode::Backspace => {
                    let _ = self.input.pop();
                }
                KeyCode::Enter => {
                    self.submit_field(field);
                    self.close_popup();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
        }
        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('j') | KeyCode::Down => self.next_row(),
            KeyCode::Char('k') | KeyCode::Up => self.previous_row(),
            KeyCode::Char('c') => self.next_color(),
            KeyCode::Char('C') => self.previous_color(),
            KeyCode::Char('r') => {
                // Disabled while a scan is requested or in flight
                if self.state.request_refresh() {
                    self.send(Command::Refresh);
                }
            }
            KeyCode::Char('a') => self.open_popup(InputMode::AddTicker, String::new()),
            KeyCode::Char('x') | KeyCode::Delete => {
                match self.selected_ticker() {
                    Some(ticker) if !ticker.is_empty() => {
                        self.open_popup(InputMode::ConfirmRemove(ticker), String::new());
                    }
                    Some(_) => debug!("Selected row has no ticker, nothing to remove"),
                    None => {}
                }
            }
            KeyCode::Char('m') => {
                let current = self.state.thresholds().min_mcap.to_string();
                self.open_popup(InputMode::Edit(Field::MinMcap), current);
            }
            KeyCode::Char('o') => {
                let current = self.state.thresholds().oversold_limit.to_string();
                self.open_popup(InputMode::Edit(Field::Oversold), current);
            }
            KeyCode::Char('b') => {
                let current = self.state.thresholds().overbought_limit.to_string();
                self.open_popup(InputMode::Edit(Field::Overbought), current);
            }
            _ => {}
        }
        false
    }

    fn submit_field(&mut self, field: Field) {
        let Ok(value) = self.input.trim().parse::<f64>() else {
            debug!("Rejected {:?} input {:?}", field, self.input);
            self.error_popup_timer = Some(Instant::now());
            return;
        };
        match field {
            Field::MinMcap => {
                self.state.set_min_mcap(value);
                self.min_mcap.send_replace(value);
            }
            Field::Oversold => self.state.set_oversold_limit(value),
            Field::Overbought => self.state.set_overbought_limit(value),
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("Poller gone, command dropped");
        }
    }

    fn open_popup(&mut self, mode: InputMode, input: String) {
        self.mode = mode;
        self.input = input;
    }

    fn close_popup(&mut self) {
        self.mode = InputMode::Normal;
        self.input.clear();
    }

    fn selected_ticker(&self) -> Option<String> {
        self.table_state
            .selected()
            .and_then(|i| self.state.rows().get(i))
            .map(|row| row.ticker.clone())
    }

    fn sync_selection(&mut self) {
        let len = self.state.rows().len();
        let selected = match self.table_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
        self.scroll_state = self
            .scroll_state
            .content_length(len.saturating_sub(1) * ITEM_HEIGHT)
            .position(selected.unwrap_or(0) * ITEM_HEIGHT);
    }

    fn next_row(&mut self) {
        let len = self.state.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i * ITEM_HEIGHT);
    }

    fn previous_row(&mut self) {
        let i = match self.table_state.selected() {
            Some(0) => 0,
            Some(i) => i - 1,
            None => 0,
        };
        self.table_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i * ITEM_HEIGHT);
    }

    fn next_color(&mut self) {
        self.color_index = (self.color_index + 1) % PALETTES.len();
    }

    fn previous_color(&mut self) {
        let count = PALETTES.len();
        self.color_index = (self.color_index + count - 1) % count;
    }

    fn set_colors(&mut self) {
        self.colors = TableColors::new(&PALETTES[self.color_index]);
    }

    fn draw(&mut self, frame: &mut Frame) {
        let vertical = &Layout::vertical([Constraint::Min(5), Constraint::Length(7)]);
        let rects = vertical.split(frame.area());
        self.set_colors();
        self.render_table(frame, rects[0]);
        self.render_scrollbar(frame, rects[0]);
        self.render_footer(frame, rects[1]);

        match &self.mode {
            InputMode::Normal => {}
            InputMode::AddTicker => self.render_popup(frame, "Add Ticker", self.input.clone()),
            InputMode::ConfirmRemove(ticker) => {
                self.render_popup(frame, "Confirm", format!("Remove {ticker}? (y/n)"))
            }
            InputMode::Edit(field) => self.render_popup(frame, field.title(), self.input.clone()),
        }

        if let Some(error_popup_timer) = self.error_popup_timer {
            if error_popup_timer.elapsed().as_millis() > ERROR_POPUP_DURATION_MS.into() {
                self.error_popup_timer = None;
            } else {
                self.render_popup(frame, "Error", "Invalid number".to_string());
            }
        }
    }

    fn render_popup(&self, frame: &mut Frame, title: &str, message: String) {
        let area = self.popup_area(frame.area(), 50, 20);
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(message)
            .block(
                Block::bordered()
                    .title(title.to_string())
                    .border_style(Style::new().fg(self.colors.footer_border_color)),
            )
            .style(Style::new().fg(self.colors.row_fg).bg(self.colors.buffer_bg))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn popup_area(&self, area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
        let [area] = vertical.areas(area);
        let [area] = horizontal.areas(area);
        area
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let header_style = Style::default()
            .fg(self.colors.header_fg)
            .bg(self.colors.header_bg);
        let selected_row_style = Style::default()
            .add_modifier(Modifier::REVERSED)
            .fg(self.colors.selected_row_style_fg);

        let header: Row<'_> = ["Coin".to_string(), "Price".to_string(), "Market Cap".to_string()]
            .into_iter()
            .chain(TIMEFRAMES.iter().map(|tf| format!("RSI {tf}")))
            .map(Cell::from)
            .collect::<Row>()
            .style(header_style);

        let rows = self.state.rows().iter().enumerate().map(|(i, r)| {
            let bg = if i % 2 == 0 {
                self.colors.normal_row_color
            } else {
                self.colors.alt_row_color
            };

            let mut cells = vec![
                Cell::from(r.symbol.clone()).style(Style::new().add_modifier(Modifier::BOLD)),
                Cell::from(r.price.clone()),
                Cell::from(r.market_cap.clone()),
            ];
            cells.extend(r.rsi.iter().map(|rsi| {
                Cell::from(rsi.text.clone()).style(Style::new().fg(self.colors.rsi_color(rsi.class)))
            }));

            Row::new(cells).style(Style::new().fg(self.colors.row_fg).bg(bg))
        });

        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
                Constraint::Fill(1),
            ],
        )
        .header(header)
        .row_highlight_style(selected_row_style)
        .highlight_spacing(HighlightSpacing::Always)
        .bg(self.colors.buffer_bg);

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_scrollbar(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_stateful_widget(
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.scroll_state,
        );
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let refresh_style = if self.state.refresh_enabled() {
            Style::new().fg(self.colors.footer_border_color).bold()
        } else {
            Style::new().fg(self.colors.disabled_fg)
        };
        let thresholds = self.state.thresholds();
        let chart = self
            .table_state
            .selected()
            .and_then(|i| self.state.rows().get(i))
            .map(|row| row.chart_url.clone())
            .unwrap_or_default();

        let lines = vec![
            Line::from(vec![
                Span::styled(format!("[{}]", self.state.refresh_label()), refresh_style),
                Span::raw(" "),
                Span::raw(self.state.status().to_string()),
            ]),
            Line::from(format!(
                "Min Mcap: {}B | Oversold <= {} | Overbought >= {}",
                thresholds.min_mcap, thresholds.oversold_limit, thresholds.overbought_limit
            )),
            Line::from(
                [self.state.notice(Local::now()).unwrap_or_default(), chart.as_str()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .join(" | "),
            ),
            Line::from(INFO_TEXT.iter().join(" | ")),
        ];

        let info_footer = Paragraph::new(lines)
            .style(
                Style::new()
                    .fg(self.colors.row_fg)
                    .bg(self.colors.buffer_bg),
            )
            .centered()
            .block(
                Block::bordered()
                    .border_type(BorderType::Double)
                    .border_style(Style::new().fg(self.colors.footer_border_color)),
            );
        frame.render_widget(info_footer, area);
    }
}
