use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn keybind(key: &'static str, pad: usize, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(desc),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Esc", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        keybind("Ctrl-G", 6, "Generate response"),
        keybind("Ctrl-Y", 6, "Copy response to clipboard"),
        keybind("Ctrl-L", 6, "Clear response"),
        keybind("Tab", 9, "Switch between email and tone"),
        keybind("F1", 10, "Show/hide this help"),
        Line::from(""),
        Line::from("Email:"),
        keybind("Enter", 7, "New line"),
        keybind("Backspace", 3, "Delete last character"),
        Line::from(""),
        Line::from("Tone:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("←/→", Style::default().fg(Color::Magenta)),
            Span::raw(" or "),
            Span::styled("↑/↓", Style::default().fg(Color::Magenta)),
            Span::raw("  Change tone"),
        ]),
        keybind("Enter", 7, "Generate response"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
