use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::SetTitle;
use ratatui::DefaultTerminal;
use tracing::{info, warn};

use kulturnacht_map::app::App;
use kulturnacht_map::config::{Args, MapConfig};
use kulturnacht_map::data;
use kulturnacht_map::fetch::{Source, SourceImageLoader};
use kulturnacht_map::history::Traversal;
use kulturnacht_map::logging;
use kulturnacht_map::tasks::{spawn_catalog_load, AppEvent, PoolImageRequester};
use kulturnacht_map::ui;

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init(&args.log_dir)?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &args);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for selecting, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the hover tooltip
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Click selects, click and drag pans
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Keyboard selection
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => app.focus_prev(),
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),
        KeyCode::Enter => app.activate_focus(),

        // History
        KeyCode::Char('[') | KeyCode::Backspace => app.navigate(Traversal::Back),
        KeyCode::Char(']') => app.navigate(Traversal::Forward),

        // Side panel scrolling
        KeyCode::PageDown => app.scroll_panel(5),
        KeyCode::PageUp => app.scroll_panel(-5),

        // Layer toggles
        KeyCode::Char('b') | KeyCode::Char('B') => app.map_renderer.toggle_boundary(),
        KeyCode::Char('m') | KeyCode::Char('M') => app.map_renderer.toggle_markers(),

        // Reset view
        KeyCode::Char('r') | KeyCode::Char('0') => app.controller.reset_view(),

        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, args: &Args) -> Result<()> {
    let config = MapConfig::from_args(args);
    let source = Source::parse(&args.dataset, None);
    let loader = SourceImageLoader::new(source.base_dir().map(|p| p.to_path_buf()));

    let (tx, rx) = mpsc::channel();
    let requester = PoolImageRequester::new(Arc::new(loader), tx.clone());

    let size = terminal.size()?;
    let mut app = App::new(config, &args.path, requester, size.width, size.height);

    if let Some(path) = &args.boundary {
        if let Err(e) = data::load_boundary(&mut app.map_renderer, path) {
            warn!(path = %path.display(), error = %e, "boundary not loaded");
        }
    }

    info!(dataset = %source.location(), path = %args.path, "starting");
    spawn_catalog_load(source, tx);

    let mut title = String::new();

    // Main loop
    loop {
        drain_events(&mut app, &rx);

        let meta_title = &app.controller.detail().meta().title;
        if *meta_title != title {
            title = meta_title.clone();
            let _ = execute!(std::io::stdout(), SetTitle(&title));
        }

        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        handle_key(&mut app, key.code, key.modifiers);
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Apply finished background work in arrival order
fn drain_events(app: &mut App, rx: &Receiver<AppEvent>) {
    while let Ok(event) = rx.try_recv() {
        app.handle_event(event);
    }
}
