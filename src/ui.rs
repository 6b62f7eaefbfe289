use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::catalog::FeatureId;
use crate::controller::{Panel, SelectionState};
use crate::detail::{DetailContent, DetailPanelRenderer};
use crate::map::{draw_ring, PlacedMarker};
use crate::marker::MarkerStyle;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

/// Split the screen into map, side panel and status bar
fn layout(area: Rect) -> (Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map + panel
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[0]);

    (cols[0], cols[1], rows[1])
}

/// Area inside the map border for a terminal of the given size
pub fn map_inner(area: Rect) -> Rect {
    let (map, _, _) = layout(area);
    Block::default().borders(Borders::ALL).inner(map)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let (map, panel, status) = layout(frame.area());

    render_map(frame, app, map);
    render_panel(frame, app, panel);
    render_status_bar(frame, app, status);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let title = &app.controller.detail().meta().title;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let viewport = app.controller.viewport();
    let mut canvas = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    app.map_renderer.render(&mut canvas, viewport);

    let mut halo = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    if let SelectionState::Selected(id) = app.controller.selection() {
        if let Some(feature) = app.controller.catalog().and_then(|c| c.get(id)) {
            let (px, py) = viewport.project(feature.coordinate.lon, feature.coordinate.lat);
            draw_ring(&mut halo, px, py, 7);
        }
    }

    let status = if app.controller.is_loaded() {
        None
    } else {
        Some("Lade Veranstaltungsorte ...")
    };

    frame.render_widget(
        MapWidget {
            canvas,
            halo,
            markers: app.placed_markers(),
            focus: app.focus,
            status,
        },
        inner,
    );
}

/// Braille boundary with venue labels overlaid
struct MapWidget {
    canvas: BrailleCanvas,
    halo: BrailleCanvas,
    markers: Vec<PlacedMarker>,
    focus: Option<FeatureId>,
    status: Option<&'static str>,
}

impl MapWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        let rows = canvas.rows().min(area.height as usize);
        let cols = canvas.cols().min(area.width as usize);
        for row in 0..rows {
            for col in 0..cols {
                if let Some(ch) = canvas.glyph(col, row) {
                    buf[(area.x + col as u16, area.y + row as u16)]
                        .set_char(ch)
                        .set_fg(color);
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.canvas, Color::Cyan, area, buf);
        Self::render_layer(&self.halo, Color::Red, area, buf);

        for marker in &self.markers {
            if marker.row >= area.height || marker.col >= area.width {
                continue;
            }

            let mut style = match marker.style {
                MarkerStyle::Default => Style::default().fg(Color::Black).bg(Color::Yellow),
                MarkerStyle::Selected => Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            };
            if self.focus == Some(marker.id) {
                style = style.add_modifier(Modifier::UNDERLINED);
            }

            let x = area.x + marker.col;
            let y = area.y + marker.row;
            for (i, ch) in marker.label.chars().enumerate() {
                let px = x + i as u16;
                if px < area.x + area.width {
                    buf[(px, y)].set_char(ch).set_style(style);
                }
            }
        }

        if let Some(text) = self.status {
            let line = Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)));
            buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(1));
        }
    }
}

fn render_panel(frame: &mut Frame, app: &App, area: Rect) {
    let detail = app.controller.detail();
    let (title, lines) = match (app.panel(), detail.content()) {
        (Panel::Details, Some(content)) => (" Details ", detail_lines(content, detail)),
        (Panel::Details, None) => (" Details ", Vec::new()),
        (Panel::About, _) => (" Über ", about_lines(&app.controller.config().site_name)),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, Style::default().fg(Color::Cyan)));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((detail.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn about_lines(site_name: &str) -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    vec![
        Line::from(Span::styled(site_name.to_string(), heading)),
        Line::default(),
        Line::from("Alle Veranstaltungsorte der Kulturnacht auf einer Karte."),
        Line::from("Wähle eine Nummer auf der Karte, um das Programm des Ortes zu sehen."),
        Line::default(),
        Line::from(Span::styled(
            "Maus: Klick wählt, Ziehen verschiebt, Rad zoomt",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Tab/Shift-Tab: Ort fokussieren, Enter: öffnen",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn detail_lines(content: &DetailContent, detail: &DetailPanelRenderer) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let label = Style::default().fg(Color::Green);
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(
            format!(" {} ", content.badge),
            Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            content.venue_name.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        content.event_title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if !content.tags.is_empty() {
        lines.push(Line::from(Span::styled(content.tags.clone(), dim)));
    }
    lines.push(Line::default());

    match detail.image() {
        Some(image) => {
            lines.push(Line::from(Span::styled(
                format!("[Bild: {} ({} Bytes)]", image.data.alt, image.data.bytes.len()),
                Style::default().fg(Color::Magenta),
            )));
            lines.push(Line::from(Span::styled(image.caption.clone(), dim)));
        }
        None if detail.pending_image().is_some() => {
            lines.push(Line::from(Span::styled("[Bild wird geladen ...]", dim)));
        }
        None => {}
    }

    for address in &content.address {
        lines.push(Line::from(address.clone()));
    }
    lines.push(Line::default());

    for block in &content.descriptions {
        if let Some(language) = block.language {
            lines.push(Line::from(Span::styled(language.label(), label)));
        }
        lines.push(Line::from(block.text.clone()));
        lines.push(Line::default());
    }

    lines.push(Line::from(vec![
        Span::styled("Öffnungszeiten: ", label),
        Span::raw(content.opening_hours.clone()),
    ]));

    if let Some(activity) = &content.activity {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(activity.title.clone(), label)));
        lines.push(Line::from(activity.time.clone()));
    }

    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(content.link.label.clone(), Style::default().fg(Color::Cyan)),
        Span::styled(format!(" <{}>", content.link.url), dim),
    ]));

    let meta = detail.meta();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(format!("og:title {}", meta.og_title), dim)));
    lines.push(Line::from(Span::styled(format!("og:url   {}", meta.og_url), dim)));

    lines
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;

    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            app.controller.current_path().to_string(),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw(" "),
        Span::styled(
            if settings.show_boundary { "[B]oundary " } else { "[b]oundary " },
            Style::default().fg(if settings.show_boundary {
                Color::Green
            } else {
                Color::DarkGray
            }),
        ),
        Span::styled(
            if settings.show_markers { "[M]arkers " } else { "[m]arkers " },
            Style::default().fg(if settings.show_markers { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];

    if let Some(title) = app.hovered_title() {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(title.to_string(), Style::default().fg(Color::White)));
    }

    spans.push(Span::styled(
        " | hjkl:pan +/-:zoom tab:focus [/]:back/fwd r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
