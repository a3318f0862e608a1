//! Terminal HUD for the KNOB Radio appliance.
//!
//! Polls the appliance's REST API and renders the now-playing snapshot,
//! the schedule, and upstream connection state in the console. Meant for
//! the studio machine where a browser would be overkill.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, Stdout, Write};
use std::process;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use ureq::http;
use ureq::{Agent, Body};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const TICK_RATE: Duration = Duration::from_millis(250);
const POLL_INTERVAL: Duration = Duration::from_millis(2500);

fn main() -> Result<()> {
    // Restore the terminal even when the draw loop panics
    std::panic::set_hook(Box::new(|panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        eprintln!("\n\nApplication panicked: {:?}", panic_info);
        eprintln!("Terminal has been restored.");
    }));

    init_tracing();
    let options = resolve_options()?;
    info!(
        base_url = %options.base_url,
        timeout_ms = options.timeout.as_millis(),
        "Starting HUD client"
    );

    let client = RestClient::new(&options.base_url, options.timeout);
    let app = App::new(client);

    if let Err(err) = run_app(app) {
        eprintln!("HUD exited with error: {err}");
    }

    Ok(())
}

struct AppOptions {
    base_url: String,
    timeout: Duration,
}

fn resolve_options() -> Result<AppOptions> {
    let mut args = env::args().skip(1);
    let mut cli_base: Option<String> = None;
    let mut cli_timeout: Option<u64> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--base-url" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--base-url requires a value"))?;
                cli_base = Some(value);
            }
            "--timeout-ms" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--timeout-ms requires a value"))?;
                let millis: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid value for --timeout-ms: {value}"))?;
                cli_timeout = Some(millis);
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => bail!("Unknown argument: {other}. Use --help."),
        }
    }

    let base = cli_base
        .or_else(|| env::var("KNOB_HUD_BASE_URL").ok())
        .unwrap_or_else(default_base_url);
    let timeout_ms = cli_timeout
        .or_else(|| {
            env::var("KNOB_HUD_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .unwrap_or_else(|| DEFAULT_TIMEOUT.as_millis() as u64);

    Ok(AppOptions {
        base_url: base,
        timeout: Duration::from_millis(timeout_ms.max(1)),
    })
}

/// API base from the shared configuration
fn default_base_url() -> String {
    let config = knobconfig::get_config();
    format!(
        "http://{}:{}/api/nowplaying",
        config.get_base_url(),
        config.get_http_port()
    )
}

fn print_usage() {
    println!("Usage: knobhud [--base-url <url>] [--timeout-ms <ms>]");
    println!("Environment:");
    println!("  KNOB_HUD_BASE_URL    API base (default: from the shared config)");
    println!(
        "  KNOB_HUD_TIMEOUT_MS  HTTP timeout in milliseconds (default {})",
        DEFAULT_TIMEOUT.as_millis()
    );
    println!("  KNOB_HUD_LOG_FILE    Append tracing logs to this file instead of stderr");
    println!("  RUST_LOG             Tracing filter (e.g. knobhud=debug,ureq=debug)");
}

fn init_tracing() {
    let writer = log_writer();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .try_init();
}

fn log_writer() -> BoxMakeWriter {
    if let Ok(path) = env::var("KNOB_HUD_LOG_FILE") {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                let shared = SharedLogWriter::new(file);
                return BoxMakeWriter::new(move || shared.clone());
            }
            Err(err) => {
                eprintln!("Cannot open {path} for tracing logs: {err}. Falling back to stderr");
            }
        }
    }
    BoxMakeWriter::new(io::stderr)
}

#[derive(Clone)]
struct SharedLogWriter {
    inner: Arc<Mutex<File>>,
}

impl SharedLogWriter {
    fn new(file: File) -> Self {
        Self {
            inner: Arc::new(Mutex::new(file)),
        }
    }
}

impl Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|err| io::Error::other(err.to_string()))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|err| io::Error::other(err.to_string()))?;
        guard.flush()
    }
}

// ============================================================================
// REST DTOs
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
struct NowPlayingClient {
    artist: Option<String>,
    title: Option<String>,
    station: Option<String>,
    scheduled_station: Option<String>,
    next_station: Option<String>,
    next_change_fmt: Option<String>,
    listeners: Option<u64>,
    listener_peak: Option<u64>,
    bitrate: Option<u64>,
    samplerate: Option<u64>,
    time: String,
    icecast_connected: bool,
    liquidsoap_connected: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ScheduleEntryClient {
    start_fmt: String,
    end_fmt: String,
    station: String,
    kind: String,
}

#[derive(Serialize)]
struct SetStationBody<'a> {
    name: &'a str,
}

// ============================================================================
// REST client
// ============================================================================

struct RestClient {
    base_url: String,
    agent: Agent,
}

impl RestClient {
    fn new(base_url: &str, timeout: Duration) -> Self {
        let mut builder = Agent::config_builder();
        builder = builder.timeout_global(Some(timeout));
        builder = builder.http_status_as_error(false);
        let config = builder.build();
        let agent: Agent = config.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn now_playing(&self) -> Result<NowPlayingClient> {
        self.get_json("now-playing")
    }

    fn schedule(&self) -> Result<Vec<ScheduleEntryClient>> {
        self.get_json("schedule")
    }

    fn stations(&self) -> Result<Vec<String>> {
        self.get_json("stations")
    }

    fn set_station(&self, name: &str) -> Result<()> {
        let url = format!("{}/station", self.base_url);
        let body = serde_json::to_vec(&SetStationBody { name })?;
        let response = self
            .agent
            .post(&url)
            .header("content-type", "application/json")
            .send(body);
        Self::handle_response(response)?;
        Ok(())
    }

    fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.agent.get(&url).call();
        let mut response = Self::handle_response(response)?;
        let text = response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("Failed reading JSON from {url}"))?;
        let value = serde_json::from_str(&text)
            .with_context(|| format!("Failed parsing JSON from {url}"))?;
        Ok(value)
    }

    fn handle_response(
        response: std::result::Result<http::Response<Body>, ureq::Error>,
    ) -> Result<http::Response<Body>> {
        match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    Ok(resp)
                } else {
                    bail!("Server answered {status}")
                }
            }
            Err(err) => Err(anyhow!(err)).context("HTTP request failed"),
        }
    }
}

// ============================================================================
// App
// ============================================================================

struct App {
    client: RestClient,
    now_playing: Option<NowPlayingClient>,
    schedule: Vec<ScheduleEntryClient>,
    stations: Vec<String>,
    server_reachable: bool,
    status_line: String,
    last_poll: Option<Instant>,
}

impl App {
    fn new(client: RestClient) -> Self {
        Self {
            client,
            now_playing: None,
            schedule: Vec::new(),
            stations: Vec::new(),
            server_reachable: false,
            status_line: "q/Esc: quit   s: next station   r: refresh".to_string(),
            last_poll: None,
        }
    }

    fn refresh(&mut self) {
        match self.client.now_playing() {
            Ok(np) => {
                self.now_playing = Some(np);
                self.server_reachable = true;
            }
            Err(err) => {
                warn!(error = %err, "now-playing poll failed");
                self.server_reachable = false;
            }
        }

        if self.schedule.is_empty() {
            if let Ok(schedule) = self.client.schedule() {
                self.schedule = schedule;
            }
        }
        if self.stations.is_empty() {
            if let Ok(stations) = self.client.stations() {
                self.stations = stations;
            }
        }

        self.last_poll = Some(Instant::now());
    }

    fn on_tick(&mut self) {
        let due = match self.last_poll {
            None => true,
            Some(t) => t.elapsed() >= POLL_INTERVAL,
        };
        if due {
            self.refresh();
        }
    }

    /// Returns true when the app should exit
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('s') => self.switch_to_next_station(),
            _ => {}
        }
        false
    }

    /// Cycles the live station through the schedule's station list
    fn switch_to_next_station(&mut self) {
        if self.stations.is_empty() {
            self.status_line = "No stations known yet".to_string();
            return;
        }

        let current = self
            .now_playing
            .as_ref()
            .and_then(|np| np.station.as_deref());
        let index = current
            .and_then(|c| self.stations.iter().position(|s| s == c))
            .map(|i| (i + 1) % self.stations.len())
            .unwrap_or(0);
        let target = self.stations[index].clone();

        match self.client.set_station(&target) {
            Ok(()) => {
                self.status_line = format!("Switched to {}", target);
                self.refresh();
            }
            Err(err) => {
                self.status_line = format!("Switch failed: {}", err);
            }
        }
    }

    fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),
                Constraint::Length(4),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .split(f.size());

        f.render_widget(self.now_playing_panel(), chunks[0]);
        f.render_widget(self.connections_panel(), chunks[1]);
        f.render_widget(self.schedule_panel(), chunks[2]);

        let status = Paragraph::new(self.status_line.as_str()).style(Style::default().fg(Color::DarkGray));
        f.render_widget(status, chunks[3]);
    }

    fn now_playing_panel(&self) -> Paragraph<'_> {
        let mut lines: Vec<Line<'_>> = Vec::new();

        match &self.now_playing {
            Some(np) => {
                let track = match (np.artist.as_deref(), np.title.as_deref()) {
                    (Some(artist), Some(title)) => format!("{} - {}", artist, title),
                    (None, Some(title)) => title.to_string(),
                    _ => "No track info".to_string(),
                };
                lines.push(Line::from(Span::styled(
                    track,
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));

                if let Some(station) = np.station.as_deref() {
                    lines.push(Line::from(format!("Station  : {}", station)));
                }
                if let Some(scheduled) = np.scheduled_station.as_deref() {
                    lines.push(Line::from(format!("Scheduled: {}", scheduled)));
                }
                if let (Some(next), Some(at)) =
                    (np.next_station.as_deref(), np.next_change_fmt.as_deref())
                {
                    lines.push(Line::from(format!("Up next  : {} at {}", next, at)));
                }
                if let Some(listeners) = np.listeners {
                    lines.push(Line::from(format!(
                        "Listeners: {} (peak {})",
                        listeners,
                        np.listener_peak.unwrap_or(0)
                    )));
                }
                if let Some(bitrate) = np.bitrate {
                    lines.push(Line::from(format!(
                        "Stream   : {} kbps / {} Hz",
                        bitrate,
                        np.samplerate.unwrap_or(0)
                    )));
                }
                lines.push(Line::from(Span::styled(
                    format!("Time     : {}", np.time),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            None => {
                lines.push(Line::from("(waiting for first poll...)"));
            }
        }

        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Now Playing "))
    }

    fn connections_panel(&self) -> Paragraph<'_> {
        let dot = |up: bool| {
            if up {
                Span::styled("up", Style::default().fg(Color::Green))
            } else {
                Span::styled("DOWN", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            }
        };

        let (icecast, liquidsoap) = match &self.now_playing {
            Some(np) => (np.icecast_connected, np.liquidsoap_connected),
            None => (false, false),
        };

        let lines = vec![
            Line::from(vec![
                Span::raw("Server     : "),
                dot(self.server_reachable),
            ]),
            Line::from(vec![
                Span::raw("Icecast    : "),
                dot(icecast),
                Span::raw("   Liquidsoap : "),
                dot(liquidsoap),
            ]),
        ];

        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Connections "))
    }

    fn schedule_panel(&self) -> List<'_> {
        let scheduled = self
            .now_playing
            .as_ref()
            .and_then(|np| np.scheduled_station.as_deref());

        let items: Vec<ListItem<'_>> = self
            .schedule
            .iter()
            .map(|slot| {
                let line = format!(
                    "{:>5} - {:<5}  {:<16} [{}]",
                    slot.start_fmt, slot.end_fmt, slot.station, slot.kind
                );
                let style = if Some(slot.station.as_str()) == scheduled {
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(line).style(style)
            })
            .collect();

        List::new(items).block(Block::default().borders(Borders::ALL).title(" Schedule "))
    }
}

// ============================================================================
// Terminal plumbing
// ============================================================================

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn run_app(mut app: App) -> Result<()> {
    let terminal = setup_terminal()?;
    let mut guard = TerminalGuard { terminal };
    let mut last_tick = Instant::now();

    app.refresh();

    loop {
        guard.terminal.draw(|f| app.draw(f))?;

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if app.handle_key(key.code) {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
