// src/tui/mod.rs
use crate::core::ledger::PortfolioSnapshot;
use crate::types::{Quote, Side, UiEvent};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::{io, time::Duration};
use tokio::sync::mpsc;
use tracing::error;

const MAX_LINES: usize = 50;

/// Fire-and-forget sender for dashboard events. A disabled feed drops
/// everything, which is what headless runs and tests use.
#[derive(Clone, Default)]
pub struct UiFeed {
    tx: Option<mpsc::Sender<UiEvent>>,
}

impl UiFeed {
    pub fn new(tx: mpsc::Sender<UiEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, event: UiEvent) {
        let Some(tx) = &self.tx else { return };
        match tx.try_send(event) {
            Ok(_) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {}
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("UI Channel closed! Interface is likely dead.");
            }
        }
    }
}

pub struct App {
    pub title: String,
    pub quotes: Vec<Quote>,
    pub books: BTreeMap<String, PortfolioSnapshot>,
    pub trades: Vec<String>,
    pub logs: Vec<String>,
}

impl App {
    pub fn new(title: String) -> Self {
        Self {
            title,
            quotes: Vec::new(),
            books: BTreeMap::new(),
            trades: Vec::new(),
            logs: Vec::new(),
        }
    }

    pub fn on_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Quotes(quotes) => {
                self.quotes = quotes;
            }
            UiEvent::Portfolio { book, snapshot } => {
                self.books.insert(book, snapshot);
            }
            UiEvent::Trade(t) => {
                let msg = format!(
                    "{} {:?} {} {} x{} @ ${:.2}",
                    t.timestamp.format("%H:%M:%S"),
                    t.origin,
                    t.action,
                    t.symbol,
                    t.quantity,
                    t.price
                );
                push_bounded(&mut self.trades, msg);
            }
            UiEvent::Recommendation(rec) => {
                let msg = format!(
                    "AI {:?} {} x{}: {}",
                    rec.action,
                    rec.symbol.as_deref().unwrap_or("-"),
                    rec.quantity,
                    rec.reasoning
                );
                push_bounded(&mut self.logs, msg);
            }
            UiEvent::Log(msg) => push_bounded(&mut self.logs, msg),
        }
    }
}

fn push_bounded(lines: &mut Vec<String>, line: String) {
    lines.push(line);
    if lines.len() > MAX_LINES {
        lines.remove(0);
    }
}

/// Runs the dashboard until the user presses `q`.
pub async fn run(mut rx: mpsc::Receiver<UiEvent>, title: String) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(title);

    loop {
        terminal.draw(|f| ui(f, &app))?;

        // crossterm polling blocks; keep it off the async workers
        let key = tokio::task::block_in_place(|| -> io::Result<Option<KeyCode>> {
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    return Ok(Some(key.code));
                }
            }
            Ok(None)
        })?;
        if let Some(KeyCode::Char('q')) = key {
            break;
        }

        while let Ok(event) = rx.try_recv() {
            app.on_event(event);
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

fn pnl_style(pnl: Decimal) -> Style {
    if pnl.is_sign_negative() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}

fn ui(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(8),
                Constraint::Length(8),
            ]
            .as_ref(),
        )
        .split(f.size());

    let mut header = Vec::new();
    if app.books.is_empty() {
        header.push(Line::from("Waiting for data..."));
    }
    for (book, snap) in &app.books {
        header.push(Line::from(vec![
            Span::styled(
                format!("{:<6}", book),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | Value: "),
            Span::styled(
                format!("${:.2}", snap.total_value),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" | Cash: ${:.2} | P&L: ", snap.cash)),
            Span::styled(format!("${:.2}", snap.pnl), pnl_style(snap.pnl)),
            Span::raw(format!(" | Positions: {}", snap.positions.len())),
        ]));
    }
    let header = Paragraph::new(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(app.title.as_str()),
    );
    f.render_widget(header, chunks[0]);

    let quotes: Vec<ListItem> = app
        .quotes
        .iter()
        .map(|q| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<6}", q.symbol),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" ${:>9.2} ", q.price)),
                Span::styled(
                    format!("{:>8.2} ({:.2}%)", q.change, q.change_pct),
                    pnl_style(q.change),
                ),
                Span::raw(format!("  Vol: {:>10}  RSI: {:>5.1}", q.volume, q.rsi)),
            ]))
        })
        .collect();
    let quotes_list = List::new(quotes).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Live Market Data"),
    );
    f.render_widget(quotes_list, chunks[1]);

    let trades: Vec<ListItem> = app
        .trades
        .iter()
        .rev()
        .map(|s| {
            let color = if s.contains(&Side::Buy.to_string()) {
                Color::Green
            } else {
                Color::Red
            };
            ListItem::new(Line::from(Span::styled(
                s,
                Style::default().fg(color),
            )))
        })
        .collect();
    let trades_list =
        List::new(trades).block(Block::default().borders(Borders::ALL).title("Trades"));
    f.render_widget(trades_list, chunks[2]);

    let logs: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .map(|s| ListItem::new(Line::from(Span::raw(s))))
        .collect();

    let logs_list =
        List::new(logs).block(Block::default().borders(Borders::ALL).title("System Logs"));
    f.render_widget(logs_list, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::Ledger;
    use crate::types::Recommendation;

    #[test]
    fn app_tracks_books_and_bounds_logs() {
        let mut app = App::new("test".into());
        let snap = Ledger::new(Decimal::from(100)).unwrap().snapshot();
        app.on_event(UiEvent::Portfolio {
            book: "human".into(),
            snapshot: snap.clone(),
        });
        assert_eq!(app.books.get("human"), Some(&snap));

        for i in 0..(MAX_LINES + 5) {
            app.on_event(UiEvent::Log(format!("line {}", i)));
        }
        app.on_event(UiEvent::Recommendation(Recommendation::hold("heuristic", "flat")));
        assert_eq!(app.logs.len(), MAX_LINES);
        assert!(app.logs.last().unwrap().contains("flat"));
    }

    #[tokio::test]
    async fn feed_drops_when_disabled_and_delivers_when_enabled() {
        UiFeed::disabled().send(UiEvent::Log("ignored".into()));

        let (tx, mut rx) = mpsc::channel(1);
        let feed = UiFeed::new(tx);
        feed.send(UiEvent::Log("first".into()));
        // Channel full: dropped silently.
        feed.send(UiEvent::Log("second".into()));

        match rx.recv().await {
            Some(UiEvent::Log(msg)) => assert_eq!(msg, "first"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }
}
