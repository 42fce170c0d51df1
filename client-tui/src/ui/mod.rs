pub mod input;
pub mod theme;
pub mod view;

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;
use crate::config;
use board::Bounds;
use input::AppAction;
use theme::Theme;
use view::BoardView;

pub async fn run(app: App) -> anyhow::Result<()> {
    let theme = match config::theme_path() {
        Some(path) => Theme::load(&path)?,
        None => Theme::default(),
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &app, &theme).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &App,
    theme: &Theme,
) -> anyhow::Result<()> {
    let mut term_events = EventStream::new();

    // Frame interval caps the redraw rate; terminal events wake the loop
    // immediately through select!.
    let mut frame_tick = tokio::time::interval(Duration::from_millis(config::frame_interval_ms()));
    let started = Instant::now();

    loop {
        let term_event = tokio::select! {
            biased;

            maybe_event = term_events.next() => {
                match maybe_event {
                    Some(Ok(event)) => Some(event),
                    Some(Err(error)) => {
                        tracing::warn!(%error, "terminal event error");
                        None
                    }
                    None => None,
                }
            }

            _ = frame_tick.tick() => None,
        };

        if let Some(event) = &term_event {
            if matches!(input::handle_event(app, event), AppAction::Quit) {
                return Ok(());
            }
        }

        // advance animations on the shared clock, then apply all pending
        // board updates in one pass
        app.ctx.anim.tick(started.elapsed().as_secs_f64() * 1000.0);
        app.board.flush();

        terminal.draw(|frame| {
            let area = frame.area();
            if let Some(layout) = view::screen_layout(area) {
                app.board.set_bounds(Bounds::new(
                    layout.rect.x as f64,
                    layout.rect.y as f64,
                    layout.rect.width as f64,
                    layout.rect.height as f64,
                ));
            }
            frame.render_widget(
                BoardView {
                    scene: &app.ctx.scene.borrow(),
                    board: &app.board,
                    theme,
                },
                area,
            );
        })?;
    }
}
