// Front panel for the deck binary: the LCD contents up top, the track
// catalog below, key help at the bottom. The panel only renders state; all
// behavior lives in the handlers and the playback loop.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use crate::player::catalog::Catalog;
use crate::player::transport::Transport;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    lcd_lines: &[String],
    catalog: &Catalog,
    transport: &Transport,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // lcd
            Constraint::Min(6),    // track list
            Constraint::Length(3), // key help
        ])
        .split(area);

    draw_lcd(frame, sections[0], lcd_lines);
    draw_tracks(frame, sections[1], catalog, transport);
    draw_help(frame, sections[2]);
}

fn draw_lcd(frame: &mut Frame, area: Rect, lcd_lines: &[String]) {
    let text: Vec<Line> = lcd_lines.iter().map(|l| Line::from(l.as_str())).collect();
    let widget = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("LCD"));
    frame.render_widget(widget, area);
}

fn draw_tracks(frame: &mut Frame, area: Rect, catalog: &Catalog, transport: &Transport) {
    let items: Vec<ListItem> = catalog
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let marker = if i == transport.cur_index { '>' } else { ' ' };
            let item = ListItem::new(format!("{marker} {:2}  {}", i + 1, track.name));
            if i == transport.cur_index {
                item.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();
    let widget = List::new(items).block(Block::default().borders(Borders::ALL).title("Tracks"));
    frame.render_widget(widget, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("1 prev   2 stop   3 play/pause   4 next   esc quit")
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}
