use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use crossterm::event::{KeyCode, KeyModifiers, ModifierKeyCode};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use win_chooser::controller::{ClickPolicy, InputEvent};
use win_chooser::desktop::Desktop;
use win_chooser::geometry::Rect;
use win_chooser::keybindings::Bindings;
use win_chooser::layout::Grid;
use win_chooser::switcher::{SwitchEvent, Switcher};
use win_chooser::ui::{Scene, TuiThumbnailFactory, UiFrame, render_scene};

const DIRECTION_KEYS: [KeyCode; 4] = [KeyCode::Left, KeyCode::Right, KeyCode::Up, KeyCode::Down];

#[derive(Parser, Debug)]
#[command(
    name = "switch-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Drives the switcher through random window churn and navigation"
)]
struct BenchCli {
    /// Number of random operations to run.
    #[arg(short = 'n', long = "iterations", default_value_t = 20_000)]
    iterations: u64,

    /// Windows mapped before the run starts.
    #[arg(short = 'w', long = "windows", default_value_t = 24)]
    windows: usize,

    /// Render the scene into an offscreen buffer every N operations (0 disables).
    #[arg(short = 'r', long = "render-every", default_value_t = 10)]
    render_every: u64,

    /// Fixed seed for repeatable runs; defaults to the clock.
    #[arg(long)]
    seed: Option<u64>,
}

struct BenchConfig {
    iterations: u64,
    windows: usize,
    render_every: u64,
    seed: u64,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=10_000_000).contains(&cli.iterations) {
            return Err("iterations must be between 1 and 10000000".to_string());
        }
        if cli.windows > 4_096 {
            return Err("windows must be at most 4096".to_string());
        }
        let seed = cli.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
                ^ 0xA5A5_A5A5_1234_5678
        });
        Ok(Self {
            iterations: cli.iterations,
            windows: cli.windows,
            render_every: cli.render_every,
            seed,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let stats = run_benchmark(&config)?;
    println!("{}", stats.final_report(&config));
    Ok(())
}

type BenchSwitcher = Switcher<Desktop, TuiThumbnailFactory>;

fn run_benchmark(config: &BenchConfig) -> io::Result<BenchStats> {
    let screen = Rect::new(0, 0, 200, 60);
    let desktop = Desktop::new(screen);
    let mut rng = Lcg::new(config.seed);
    let mut opened = 0usize;
    for _ in 0..config.windows {
        desktop.open(format!("window {opened}"));
        opened += 1;
    }
    desktop.take_notifications();

    let scene = Scene::new();
    let mut switcher: BenchSwitcher = Switcher::new(
        desktop.clone(),
        TuiThumbnailFactory::new(scene.clone(), desktop.clone()),
        Box::new(Grid::default()),
        Bindings::default(),
        ClickPolicy::Preview,
    );
    let mut terminal = Terminal::new(TestBackend::new(screen.width as u16, screen.height as u16))
        .map_err(|err| io::Error::other(format!("{err:?}")))?;

    let mut stats = BenchStats::new();
    let mods = KeyModifiers::SUPER;
    timed(&mut stats.activate, || {
        switcher.dispatch(&InputEvent::press(KeyCode::Tab, mods).into());
    });

    for step in 0..config.iterations {
        match rng.next() % 10 {
            0..=2 => {
                let windows = desktop.windows();
                match rng.next() % 3 {
                    0 => {
                        desktop.open(format!("window {opened}"));
                        opened += 1;
                    }
                    1 if !windows.is_empty() => {
                        desktop.close(windows[rng.next() as usize % windows.len()].id);
                    }
                    _ if !windows.is_empty() => {
                        desktop.raise(windows[rng.next() as usize % windows.len()].id);
                    }
                    _ => {}
                }
                timed(&mut stats.resync, || pump(&desktop, &mut switcher));
            }
            3..=5 => timed(&mut stats.cycle, || {
                switcher.dispatch(&InputEvent::press(KeyCode::Tab, mods).into());
            }),
            6 | 7 => {
                let key = DIRECTION_KEYS[rng.next() as usize % DIRECTION_KEYS.len()];
                timed(&mut stats.directional, || {
                    switcher.dispatch(&InputEvent::press(key, mods).into());
                });
            }
            8 => {
                let windows = switcher.registry().windows().to_vec();
                if !windows.is_empty() {
                    let target = windows[rng.next() as usize % windows.len()];
                    timed(&mut stats.click, || {
                        switcher.dispatch(&InputEvent::Click(target).into());
                    });
                    pump(&desktop, &mut switcher);
                }
            }
            _ => {
                let modifier = KeyCode::Modifier(ModifierKeyCode::LeftSuper);
                timed(&mut stats.commit, || {
                    switcher.dispatch(&InputEvent::release(modifier, KeyModifiers::NONE).into());
                    pump(&desktop, &mut switcher);
                    switcher.dispatch(&InputEvent::press(KeyCode::Tab, mods).into());
                });
            }
        }

        if config.render_every > 0 && step % config.render_every == 0 {
            let start = Instant::now();
            terminal
                .draw(|frame| {
                    let mut ui = UiFrame::new(frame);
                    render_scene(&mut ui, &scene, &desktop, switcher.registry().windows());
                })
                .map_err(|err| io::Error::other(format!("{err:?}")))?;
            stats.render.record(start.elapsed());
        }
        stats.peak_windows = stats.peak_windows.max(desktop.len());
    }

    stats.final_windows = desktop.len();
    stats.activations = desktop.activations().len();
    stats.mark_completed();
    Ok(stats)
}

fn pump(desktop: &Desktop, switcher: &mut BenchSwitcher) {
    let pending = desktop.take_notifications();
    switcher.dispatch_all(pending.into_iter().map(SwitchEvent::from));
}

fn timed(op: &mut OpStats, f: impl FnOnce()) {
    let start = Instant::now();
    f();
    op.record(start.elapsed());
}

struct OpStats {
    count: u64,
    total: Duration,
    fastest: Duration,
    slowest: Duration,
}

impl OpStats {
    fn new() -> Self {
        Self {
            count: 0,
            total: Duration::ZERO,
            fastest: Duration::MAX,
            slowest: Duration::ZERO,
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.count = self.count.saturating_add(1);
        self.total += elapsed;
        if elapsed < self.fastest {
            self.fastest = elapsed;
        }
        if elapsed > self.slowest {
            self.slowest = elapsed;
        }
    }

    fn average_us(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total.as_secs_f64() / self.count as f64 * 1_000_000.0
    }

    fn fastest_us(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.fastest.as_secs_f64() * 1_000_000.0
    }

    fn slowest_us(&self) -> f64 {
        self.slowest.as_secs_f64() * 1_000_000.0
    }

    fn line(&self, name: &str) -> String {
        format!(
            "{name:<12} {count:>8} ops | avg {avg:>9.2} us | best {best:>8.2} us | worst {worst:>9.2} us",
            count = self.count,
            avg = self.average_us(),
            best = self.fastest_us(),
            worst = self.slowest_us(),
        )
    }
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    activate: OpStats,
    resync: OpStats,
    cycle: OpStats,
    directional: OpStats,
    click: OpStats,
    commit: OpStats,
    render: OpStats,
    peak_windows: usize,
    final_windows: usize,
    activations: usize,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            activate: OpStats::new(),
            resync: OpStats::new(),
            cycle: OpStats::new(),
            directional: OpStats::new(),
            click: OpStats::new(),
            commit: OpStats::new(),
            render: OpStats::new(),
            peak_windows: 0,
            final_windows: 0,
            activations: 0,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        indoc::formatdoc!(
            r#"
            Switch bench completed {iterations} operations in {elapsed:.3}s (seed {seed:#x}).
            Windows: {initial} initial | {peak} peak | {final_windows} final | {activations} activations
            {activate}
            {resync}
            {cycle}
            {directional}
            {click}
            {commit}
            {render}
            "#,
            iterations = config.iterations,
            elapsed = self.elapsed().as_secs_f64(),
            seed = config.seed,
            initial = config.windows,
            peak = self.peak_windows,
            final_windows = self.final_windows,
            activations = self.activations,
            activate = self.activate.line("activate"),
            resync = self.resync.line("resync"),
            cycle = self.cycle.line("cycle"),
            directional = self.directional.line("directional"),
            click = self.click.line("click"),
            commit = self.commit.line("commit"),
            render = self.render.line("render"),
        )
    }
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(iterations: u64, windows: usize) -> BenchCli {
        BenchCli {
            iterations,
            windows,
            render_every: 5,
            seed: Some(7),
        }
    }

    #[test]
    fn config_rejects_out_of_range_values() {
        assert!(BenchConfig::try_from(&cli(0, 4)).is_err());
        assert!(BenchConfig::try_from(&cli(10, 5_000)).is_err());
        assert!(BenchConfig::try_from(&cli(10, 4)).is_ok());
    }

    #[test]
    fn short_run_keeps_registry_in_sync() {
        let config = BenchConfig::try_from(&cli(500, 6)).unwrap();
        let stats = run_benchmark(&config).unwrap();
        assert_eq!(stats.activate.count, 1);
        assert!(stats.render.count > 0);
        let report = stats.final_report(&config);
        assert!(report.contains("500 operations"));
        assert!(report.contains("seed 0x7"));
    }
}
