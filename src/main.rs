#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::io::{self, Write, stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use donorform::capability::{DirectoryPhotoCapture, LineQrDecoder};
use donorform::config::Config;
use donorform::form::FormController;
use donorform::sink::{CollectingSink, TracingSink};
use donorform::tui::{App, AppError};

/// How long in-flight provider work may run once the form has closed.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_path = donorform::logging::init().map_err(AppError::from)?;
    let config = Config::load().map_err(AppError::from)?;
    tracing::info!(log = %log_path.display(), ?config, "starting");

    let photo = DirectoryPhotoCapture::new(
        config.photo_dir().map_err(AppError::from)?,
        config.camera_timeout(),
    );
    let qr = LineQrDecoder::new(config.scanner_device());
    let controller = FormController::mounted((TracingSink, CollectingSink::default()))
        .with_reset_after_submit(config.reset_after_submit);
    let mut app = App::new(
        controller,
        Arc::new(photo),
        Arc::new(qr),
        config.scan_debounce(),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = runtime.block_on(app.run(&mut terminal));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    let restore_result = restore_terminal();
    result?;
    restore_result?;

    print_submitted(&app)?;
    tracing::info!(count = app.submitted().len(), "exiting");
    Ok(())
}

/// Writes each submitted record to stdout as one JSON line.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn print_submitted(app: &App) -> Result<(), AppError> {
    let mut out = stdout().lock();
    for record in app.submitted() {
        serde_json::to_writer(&mut out, record)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn restore_terminal() -> Result<(), io::Error> {
    let raw_result = disable_raw_mode();
    let screen_result = execute!(stdout(), LeaveAlternateScreen);
    raw_result.and(screen_result)
}
