use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use crossterm::event::{Event, KeyCode, KeyModifiers};
use ratatui::layout::Rect as CellRect;
use ratatui::style::{Color, Style};
use tracing::Level;

use win_chooser::controller::{ClickPolicy, InputEvent};
use win_chooser::desktop::Desktop;
use win_chooser::drivers::OutputDriver;
use win_chooser::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use win_chooser::drivers::keyboard::KeyboardNormalizer;
use win_chooser::drivers::mouse::PointerTracker;
use win_chooser::event_loop::{ControlFlow, EventLoop};
use win_chooser::geometry::Rect;
use win_chooser::keybindings::{Bindings, parse_key, parse_modifier};
use win_chooser::layout::Grid;
use win_chooser::switcher::{SwitchEvent, Switcher};
use win_chooser::tracing_sub;
use win_chooser::ui::{Scene, StatusBar, TuiThumbnailFactory, render_desktop, render_scene};

const AFTER_HELP: &str = indoc::indoc! {"
    While the switcher is open:
      action key        next window (with Shift: previous)
      h j k l, arrows   move to the nearest thumbnail in that direction
      Esc               close without switching
      release modifier  switch to the highlighted window

    While closed: n opens a window, x closes the top one, q quits.
"};

const TITLES: [&str; 8] = [
    "editor", "shell", "browser", "mail", "music", "notes", "monitor", "chat",
];

#[derive(Parser, Debug)]
#[command(
    name = "win-chooser",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keyboard-driven window switcher over a simulated desktop",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Modifier that must be held: shift, ctrl, alt, super, hyper or meta.
    #[arg(long, default_value = "alt")]
    modifier: String,

    /// Key that opens the switcher and cycles while the modifier is held.
    #[arg(long, default_value = "tab")]
    action: String,

    /// What clicking a thumbnail does while the switcher is open.
    #[arg(long, value_enum, default_value_t = ClickArg::Preview)]
    click: ClickArg,

    /// Windows mapped at startup.
    #[arg(long, default_value_t = 6)]
    windows: usize,

    /// Open or close a random window every N milliseconds.
    #[arg(long, value_name = "MS")]
    churn_ms: Option<u64>,

    /// Write logs here; without it logging stays off so the screen is not
    /// garbled.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[arg(long, default_value_t = Level::DEBUG)]
    log_level: Level,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ClickArg {
    Preview,
    Commit,
}

impl From<ClickArg> for ClickPolicy {
    fn from(arg: ClickArg) -> Self {
        match arg {
            ClickArg::Preview => ClickPolicy::Preview,
            ClickArg::Commit => ClickPolicy::Commit,
        }
    }
}

impl Cli {
    fn bindings(&self) -> io::Result<Bindings> {
        let invalid = |err| io::Error::new(io::ErrorKind::InvalidInput, err);
        let modifier = parse_modifier(&self.modifier).map_err(invalid)?;
        let action = parse_key(&self.action).map_err(invalid)?;
        Ok(Bindings::with_defaults(modifier, action))
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let bindings = cli.bindings()?;
    if let Some(path) = &cli.log_file {
        tracing_sub::init(cli.log_level, Some(path.as_path()))?;
    }

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let result = run(&cli, bindings, &mut output);
    output.exit()?;
    result
}

fn run(cli: &Cli, bindings: Bindings, output: &mut ConsoleOutputDriver) -> io::Result<()> {
    let (width, height) = crossterm::terminal::size()?;
    let desktop = Desktop::new(screen_for(width, height));
    for n in 0..cli.windows {
        desktop.open(title_for(n));
    }
    desktop.take_notifications();

    let scene = Scene::new();
    let mut switcher = Switcher::new(
        desktop.clone(),
        TuiThumbnailFactory::new(scene.clone(), desktop.clone()),
        Box::new(Grid::new(1)),
        bindings,
        cli.click.into(),
    );
    let mut keyboard = KeyboardNormalizer::new(output.keyboard_enhanced());
    let mut pointer = PointerTracker::new();
    let mut churn = cli.churn_ms.map(|ms| Churn::new(Duration::from_millis(ms)));
    let mut opened = cli.windows;
    let activation = switcher.controller().bindings().activation().display();

    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), Duration::from_millis(16));
    event_loop.run(|_driver, event| {
        let Some(event) = event else {
            if let Some(churn) = churn.as_mut()
                && churn.due()
            {
                churn.step(&desktop, &mut opened);
            }
            pump_notifications(&desktop, &mut switcher);
            draw(output, &switcher, &scene, &desktop, &activation, keyboard.reports_releases())?;
            return Ok(ControlFlow::Continue);
        };

        match event {
            Event::Key(key) => {
                for input in keyboard.normalize(key) {
                    let consumed = switcher.dispatch(&SwitchEvent::Input(input));
                    pump_notifications(&desktop, &mut switcher);
                    if consumed || switcher.is_active() {
                        continue;
                    }
                    if let InputEvent::KeyPress { code, modifiers } = input
                        && let ControlFlow::Quit = idle_key(&desktop, code, modifiers, &mut opened)
                    {
                        return Ok(ControlFlow::Quit);
                    }
                }
            }
            Event::Mouse(mouse) => {
                if let Some(input) = pointer.translate(switcher.registry(), mouse) {
                    switcher.dispatch(&SwitchEvent::Input(input));
                    pump_notifications(&desktop, &mut switcher);
                }
            }
            Event::Resize(width, height) => {
                desktop.set_screens(vec![screen_for(width, height)]);
                if switcher.registry().is_visible() {
                    switcher.registry_mut().resync();
                }
            }
            _ => {}
        }
        Ok(ControlFlow::Continue)
    })
}

/// Feeds queued window-system notifications to the switcher, oldest first.
fn pump_notifications(desktop: &Desktop, switcher: &mut Switcher<Desktop, TuiThumbnailFactory>) {
    loop {
        let pending = desktop.take_notifications();
        if pending.is_empty() {
            break;
        }
        switcher.dispatch_all(pending.into_iter().map(SwitchEvent::from));
    }
}

/// Demo keys, only reached while the switcher is closed.
fn idle_key(desktop: &Desktop, code: KeyCode, modifiers: KeyModifiers, opened: &mut usize) -> ControlFlow {
    match code {
        KeyCode::Char('q') => return ControlFlow::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return ControlFlow::Quit,
        KeyCode::Char('n') => {
            desktop.open(title_for(*opened));
            *opened += 1;
        }
        KeyCode::Char('x') => {
            desktop.close_top();
        }
        _ => {}
    }
    ControlFlow::Continue
}

fn draw(
    output: &mut ConsoleOutputDriver,
    switcher: &Switcher<Desktop, TuiThumbnailFactory>,
    scene: &Scene,
    desktop: &Desktop,
    activation: &str,
    reports_releases: bool,
) -> io::Result<()> {
    let registry = switcher.registry();
    let mut status = StatusBar::new();
    status.set_style(Style::default().fg(Color::Black).bg(Color::Gray));
    if switcher.is_active() {
        let hint = if reports_releases {
            "release modifier to switch, esc cancels"
        } else {
            "release modifier and press any key to switch, esc cancels"
        };
        status.set_left(format!(" {hint}"));
    } else {
        status.set_left(format!(" {activation} switch | n new | x close | q quit"));
    }
    status.set_right(format!("{} windows ", desktop.len()));

    output.draw(|mut frame| {
        let area = frame.area();
        if area.height == 0 {
            return;
        }
        let main = CellRect {
            height: area.height - 1,
            ..area
        };
        let bar = CellRect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };
        if registry.is_visible() {
            render_scene(&mut frame, scene, desktop, registry.windows());
        } else {
            render_desktop(&mut frame, main, desktop);
        }
        status.render(&mut frame, bar);
    })
}

fn screen_for(width: u16, height: u16) -> Rect {
    Rect::new(0, 0, u32::from(width), u32::from(height.saturating_sub(1)))
}

fn title_for(n: usize) -> String {
    let base = TITLES[n % TITLES.len()];
    match n / TITLES.len() {
        0 => base.to_string(),
        round => format!("{base} {}", round + 1),
    }
}

/// Periodic random open/close, seeded from the clock.
struct Churn {
    every: Duration,
    last: Instant,
    state: u64,
}

impl Churn {
    fn new(every: Duration) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
            ^ 0xA5A5_A5A5_1234_5678;
        Self {
            every,
            last: Instant::now(),
            state: seed,
        }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn due(&mut self) -> bool {
        if self.last.elapsed() < self.every {
            return false;
        }
        self.last = Instant::now();
        true
    }

    fn step(&mut self, desktop: &Desktop, opened: &mut usize) {
        let windows = desktop.windows();
        if windows.len() < 2 || self.next() % 2 == 0 {
            desktop.open(title_for(*opened));
            *opened += 1;
        } else {
            let victim = windows[self.next() as usize % windows.len()].id;
            desktop.close(victim);
        }
    }
}
