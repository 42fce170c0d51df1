use chess::PieceColor;
use clap::Parser;
use client_tui::{app::App, config, ui};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Animated drag-and-drop chessboard for the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Starting position notation.
    #[arg(long, default_value = chess::INITIAL_FEN)]
    fen: String,

    /// Draw the board from black's side.
    #[arg(long)]
    black: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Tracing goes to rolling files; the terminal belongs to the board.
    let log_dir = config::log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "groundtty");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("groundtty starting up");

    let orientation = if args.black {
        PieceColor::Black
    } else {
        PieceColor::White
    };
    let app = App::new(&args.fen, orientation)?;
    ui::run(app).await?;

    tracing::info!("groundtty shutting down");
    Ok(())
}
