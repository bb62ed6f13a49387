//! UI rendering using ratatui
//!
//! Draws a read-only view of the session:
//! - NotStarted: title and how to play
//! - Playing: clock, score, level, letter pool, word in progress, feedback
//! - Won / Lost: final score and accepted words

use crate::app::{Phase, Session};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

/// Render the screen matching the session phase
pub fn render(frame: &mut Frame, session: &Session) {
    match session.phase() {
        Phase::NotStarted => render_title(frame, session),
        Phase::Playing => render_game(frame, session),
        Phase::Won | Phase::Lost => render_game_over(frame, session),
    }
}

/// Render the title screen
fn render_title(frame: &mut Frame, session: &Session) {
    let area = frame.area();
    let rules = session.rules();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Logo
            Constraint::Min(6),    // How to play
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(area);

    let logo = r#"
__        _____  ____  ____  ____  _   _ ____  _   _
\ \      / / _ \|  _ \|  _ \|  _ \| | | / ___|| | | |
 \ \ /\ / / | | | |_) | | | | |_) | | | \___ \| |_| |
  \ V  V /| |_| |  _ <| |_| |  _ <| |_| |___) |  _  |
   \_/\_/  \___/|_| \_\____/|_| \_\\___/|____/|_| |_|
"#;
    let logo_widget = Paragraph::new(logo)
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center);
    frame.render_widget(logo_widget, layout[0]);

    let milestones = rules
        .level_milestones
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let lines = vec![
        Line::from("Type letters from the pool to build words."),
        Line::from(format!(
            "{} seconds on the clock; every word adds time.",
            rules.starting_time
        )),
        Line::from("Longer words earn more points."),
        Line::from(format!(
            "New letters after {} words. Find {} words to win.",
            milestones, rules.win_threshold
        )),
    ];
    let help = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(help, layout[1]);

    let footer = Paragraph::new("Enter Start  Esc Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[2]);
}

/// Render the in-game screen
fn render_game(frame: &mut Frame, session: &Session) {
    let area = frame.area();
    let layout = game_layout(area);

    render_header(frame, layout[0], session);

    let body = body_layout(layout[1]);
    render_play_area(frame, body[0], session);
    render_word_list(frame, body[1], session);

    let footer = Paragraph::new("A-Z/Click Pick  Backspace Undo  Tab Clear  Enter Submit  Esc Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[2]);
}

/// Header, body and footer rows of the game screen
fn game_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header: score, clock, level
            Constraint::Min(8),    // Pool + word + feedback
            Constraint::Length(2), // Footer
        ])
        .split(area)
}

/// Play area and accepted-words panel
fn body_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(30),    // Play area
            Constraint::Length(22), // Accepted words
        ])
        .split(area)
}

/// Rows of the play area
fn play_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Level-up banner
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Pool
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Word
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Feedback
            Constraint::Min(0),
        ])
        .split(area)
}

/// Where the pool letters are drawn: one cell per letter, one blank between,
/// centred in `row`.
fn pool_rect(row: Rect, slots: usize) -> Rect {
    let width = (slots * 2).saturating_sub(1);
    let width = u16::try_from(width).unwrap_or(u16::MAX).min(row.width);
    let x = row.x + (row.width - width) / 2;
    Rect::new(x, row.y, width, row.height)
}

/// Pool slot drawn at terminal cell (`column`, `row`), if any.
///
/// `area` is the full terminal area the game screen was rendered into.
pub fn pool_slot_at(area: Rect, session: &Session, column: u16, row: u16) -> Option<usize> {
    if session.phase() != Phase::Playing {
        return None;
    }
    let play = body_layout(game_layout(area)[1])[0];
    let pool = pool_rect(play_layout(play)[2], session.pool().len());
    if row != pool.y || column < pool.x || column >= pool.x + pool.width {
        return None;
    }
    let offset = usize::from(column - pool.x);
    // Odd offsets are the blanks between letters
    if offset % 2 == 1 {
        return None;
    }
    let index = offset / 2;
    (index < session.pool().len()).then_some(index)
}

/// Render the header: score | clock | level
fn render_header(frame: &mut Frame, area: Rect, session: &Session) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14), // Score
            Constraint::Min(10),    // Clock
            Constraint::Length(14), // Level
        ])
        .split(inner);

    let score = Paragraph::new(format!("{} pts", session.points()))
        .style(Style::default().fg(Color::Blue).bold())
        .alignment(Alignment::Left);
    frame.render_widget(score, header_layout[0]);

    let mut clock = vec![Span::styled(
        format_timer(session.time_remaining()),
        Style::default().fg(timer_color(session.time_remaining())).bold(),
    )];
    if let Some(bonus) = session.time_bonus() {
        clock.push(Span::styled(
            format!("  +{}s", bonus),
            Style::default().fg(Color::Green).bold(),
        ));
    }
    let clock = Paragraph::new(Line::from(clock)).alignment(Alignment::Center);
    frame.render_widget(clock, header_layout[1]);

    let level = Paragraph::new(format!("Level {}", session.level()))
        .style(Style::default().fg(Color::Magenta).bold())
        .alignment(Alignment::Right);
    frame.render_widget(level, header_layout[2]);
}

/// Render the letter pool, current word and feedback
fn render_play_area(frame: &mut Frame, area: Rect, session: &Session) {
    let layout = play_layout(area);

    if session.level_up_visible() {
        let banner = Paragraph::new("Level Up! New letters added!")
            .style(Style::default().fg(Color::Green).bold())
            .alignment(Alignment::Center);
        frame.render_widget(banner, layout[0]);
    }

    let pool = Paragraph::new(pool_line(session));
    frame.render_widget(pool, pool_rect(layout[2], session.pool().len()));

    let word = Paragraph::new(format!("> {}_", session.current_word()))
        .style(Style::default().fg(Color::White).bold())
        .alignment(Alignment::Center);
    frame.render_widget(word, layout[4]);

    let (feedback, color) = if session.is_submitting() {
        ("Checking...".to_string(), Color::Yellow)
    } else if let Some(error) = session.error() {
        (error.to_string(), Color::Red)
    } else {
        (String::new(), Color::White)
    };
    let feedback = Paragraph::new(feedback)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    frame.render_widget(feedback, layout[6]);
}

/// Pool slots as styled spans; consumed slots are dimmed, the latest pick highlighted
fn pool_line(session: &Session) -> Line<'static> {
    let mut spans = Vec::with_capacity(session.pool().len() * 2);
    for (i, slot) in session.pool().iter().enumerate() {
        let style = if session.last_selected() == Some(i) {
            Style::default().fg(Color::Yellow).bold()
        } else if slot.consumed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan).bold()
        };
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(slot.letter.to_string(), style));
    }
    Line::from(spans)
}

/// Render the accepted words (right panel)
fn render_word_list(frame: &mut Frame, area: Rect, session: &Session) {
    let items: Vec<ListItem> = session
        .words()
        .iter()
        .rev()
        .map(|record| {
            ListItem::new(format!("{} +{}", record.word, record.points))
                .style(Style::default().fg(Color::Green))
        })
        .collect();

    let title = format!(
        "Words {}/{}",
        session.words().len(),
        session.rules().win_threshold
    );
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title),
    );
    frame.render_widget(list, area);
}

/// Render the win / loss summary
fn render_game_over(frame: &mut Frame, session: &Session) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Final score
            Constraint::Length(1), // Spacer
            Constraint::Min(3),    // Words
            Constraint::Length(1), // Instructions
        ])
        .split(area);

    let (title, color) = match session.phase() {
        Phase::Won => ("You Win!", Color::Green),
        _ => ("Game Over!", Color::Red),
    };
    let title = Paragraph::new(title)
        .style(Style::default().fg(color).bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, layout[0]);

    let score = Paragraph::new(format!(
        "Final Score: {} points (level {})",
        session.points(),
        session.level()
    ))
    .style(Style::default().fg(Color::Yellow).bold())
    .alignment(Alignment::Center);
    frame.render_widget(score, layout[2]);

    let words = session
        .words()
        .iter()
        .map(|w| w.word.as_str())
        .collect::<Vec<_>>()
        .join("  ");
    let words = Paragraph::new(words)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(words, layout[4]);

    let instructions = Paragraph::new("Enter Play again  Esc Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(instructions, layout[5]);
}

/// Format the timer display
fn format_timer(seconds: u32) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{}:{:02}", mins, secs)
}

fn timer_color(seconds: u32) -> Color {
    if seconds < 10 {
        Color::Red
    } else {
        Color::Blue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;
    use crate::game::scoring::FibonacciScoring;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(30), "0:30");
        assert_eq!(format_timer(75), "1:15");
        assert_eq!(format_timer(0), "0:00");
    }

    #[test]
    fn test_timer_turns_red_under_ten_seconds() {
        assert_eq!(timer_color(10), Color::Blue);
        assert_eq!(timer_color(9), Color::Red);
    }

    #[test]
    fn test_playing_screen_shows_pool_and_word() {
        let mut session = Session::with_seed(Rules::default(), Arc::new(FibonacciScoring), 3);
        session
            .start_with_letters("CATDOGSUNE".chars().collect())
            .unwrap();
        session.select_letter_char('C').unwrap();
        session.select_letter_char('A').unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, &session)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("C A T D O G S U N E"));
        assert!(text.contains("> CA_"));
        assert!(text.contains("0:30"));
        assert!(text.contains("Level 1"));
    }

    #[test]
    fn test_clicks_map_to_drawn_slots() {
        let mut session = Session::with_seed(Rules::default(), Arc::new(FibonacciScoring), 3);
        session
            .start_with_letters("AABCDEFGHI".chars().collect())
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, &session)).unwrap();
        let area = Rect::new(0, 0, 80, 20);
        let buffer = terminal.backend().buffer();

        let mut hits = Vec::new();
        for y in 0..area.height {
            for x in 0..area.width {
                if let Some(index) = pool_slot_at(area, &session, x, y) {
                    let cell = buffer.cell((x, y)).unwrap();
                    assert_eq!(cell.symbol(), session.pool()[index].letter.to_string());
                    hits.push(index);
                }
            }
        }
        assert_eq!(hits, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_clicks_ignored_outside_play() {
        let session = Session::with_seed(Rules::default(), Arc::new(FibonacciScoring), 3);
        let area = Rect::new(0, 0, 80, 20);
        for x in 0..area.width {
            for y in 0..area.height {
                assert_eq!(pool_slot_at(area, &session, x, y), None);
            }
        }
    }

    #[test]
    fn test_game_over_screen() {
        let mut session = Session::with_seed(Rules::default(), Arc::new(FibonacciScoring), 3);
        session.start().unwrap();
        for _ in 0..30 {
            session.tick().unwrap();
        }

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, &session)).unwrap();
        assert!(buffer_text(&terminal).contains("Game Over!"));
    }
}
