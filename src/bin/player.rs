// WAV deck: scans the media directory, wires the debounce handlers onto
// the IRQ dispatch thread, streams tracks into the cpal FIFOs from a
// playback thread, and runs the front panel in the foreground.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use pulsedeck::board::IrqLine;
use pulsedeck::config;
use pulsedeck::hosted::{IrqRuntime, KeyButtons, LcdModel, TickTimer, probe_sample_rate, start_audio};
use pulsedeck::panel;
use pulsedeck::player::catalog::Catalog;
use pulsedeck::player::display::DisplayWriter;
use pulsedeck::player::fsdiag;
use pulsedeck::player::{Deck, DeckDevices};
use pulsedeck::sim::FixedSwitches;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let media_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config = config::load(&media_dir).unwrap_or_default();

    // a failed scan degrades to an empty catalog, same as an unmountable card
    let catalog = match Catalog::scan(&media_dir) {
        Ok(catalog) => catalog,
        Err(err) => {
            fsdiag::report("mount", &err);
            Catalog::default()
        }
    };
    catalog.print_listing();

    let rate = probe_sample_rate(&catalog);
    let audio = start_audio(rate, config.fifo_depth)?;

    let mut irq = IrqRuntime::new(64);
    let buttons = Arc::new(KeyButtons::new(irq.sender()));
    let timer = Arc::new(TickTimer::spawn(
        Duration::from_millis(config.debounce_ms),
        irq.sender(),
    ));
    let lcd = Arc::new(LcdModel::new());

    let deck = Arc::new(Deck::new(
        catalog,
        DisplayWriter::new(lcd.clone()),
        DeckDevices {
            buttons: buttons.clone(),
            timer,
            switches: Arc::new(FixedSwitches(config.mode_switches)),
            audio: audio.fifo.clone(),
        },
    ));
    deck.startup();

    let edge_deck = deck.clone();
    irq.register(IrqLine::ButtonEdge, Box::new(move || edge_deck.on_button_edge()));
    let tick_deck = deck.clone();
    irq.register(IrqLine::TimerTick, Box::new(move || tick_deck.on_timer_tick()));
    let _irq_thread = irq.spawn();

    let playback_deck = deck.clone();
    let _playback_thread = std::thread::spawn(move || {
        if let Err(e) = playback_deck.run() {
            eprintln!("playback loop error: {}", e);
        }
    });

    terminal::enable_raw_mode()?;
    // Real press/release detection where the terminal supports it; the
    // expiry fallback below covers the rest.
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = Duration::from_millis(33);
    loop {
        let lcd_lines = lcd.lines();
        let transport = deck.shared().snapshot();
        term.draw(|frame| {
            panel::render(frame, frame.area(), &lcd_lines, deck.catalog(), &transport);
        })?;

        buttons.expire_held(Duration::from_millis(600));

        if crossterm::event::poll(tick_rate)? {
            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                if key.code == crossterm::event::KeyCode::Esc {
                    drop(term);
                    return Ok(());
                }
                buttons.handle_key(&key);
            }
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags
        );
        let _ = terminal::disable_raw_mode();
    }
}
