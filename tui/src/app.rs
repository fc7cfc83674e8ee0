//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize)
//! - GenerationSession for submitting and watching jobs
//! - DisplayState for rendering
//! - WaveformRenderer driven by frame deltas
//!
//! Submissions run on their own task. Their outcomes and the poll loop's
//! updates arrive on channels drained once per frame, so all state changes
//! happen on the frame loop's task and a slow service never stalls input.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use studio_core::palette::{self, Preset};
use studio_core::{
    GenerationRequest, GenerationSession, HttpGenerationService, JobClient, JobId, JobUpdate,
    StudioConfig, SubmissionError, WaveformRenderer,
};

use crate::display::{DisplayState, NotifyLevel, Phase};
use crate::theme;
use crate::widgets::WaveformView;

/// Target ~10 FPS, the waveform's own tick rate
const FRAME_DURATION: Duration = Duration::from_millis(100);

/// Color selection: a preset, or a raw hex from configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ColorChoice {
    Preset(Preset),
    Custom(palette::Color),
}

impl ColorChoice {
    /// Resolve through the palette; colors that match a preset select it
    fn from_config(value: &str) -> Self {
        let color = palette::resolve_or_hex(value).unwrap_or_else(|_| Preset::default().color());
        Preset::ALL
            .into_iter()
            .find(|preset| preset.color() == color)
            .map_or(Self::Custom(color), Self::Preset)
    }

    fn color(self) -> palette::Color {
        match self {
            Self::Preset(preset) => preset.color(),
            Self::Custom(color) => color,
        }
    }

    fn label(self) -> String {
        match self {
            Self::Preset(preset) => preset.name().to_string(),
            Self::Custom(color) => color.to_hex(),
        }
    }

    /// Tab order: custom colors join the cycle at the default preset
    fn next(self) -> Preset {
        match self {
            Self::Preset(preset) => preset.next(),
            Self::Custom(_) => Preset::default(),
        }
    }
}

/// A submission finished on its own task
struct SubmitOutcome {
    topic: String,
    result: Result<JobId, SubmissionError>,
}

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Job Integration ===
    /// Owns the single live watch
    session: GenerationSession<HttpGenerationService>,
    /// Handed to each watch's observer
    updates_tx: mpsc::UnboundedSender<JobUpdate>,
    /// Drained once per frame
    updates_rx: mpsc::UnboundedReceiver<JobUpdate>,
    /// Handed to each submission task
    submit_tx: mpsc::UnboundedSender<SubmitOutcome>,
    /// Drained once per frame
    submit_rx: mpsc::UnboundedReceiver<SubmitOutcome>,
    /// Submission in flight, aborted on quit
    pending_submit: Option<JoinHandle<()>>,
    /// Display state derived from updates
    display: DisplayState,

    // === Visuals ===
    /// Bar animation
    waveform: WaveformRenderer,
    /// Selected waveform color
    color: ColorChoice,

    // === Input State ===
    /// Topic being typed
    input_buffer: String,

    // === Misc State ===
    /// Service the app talks to, for the status bar
    base_url: String,
    /// Last frame time (for animations)
    last_frame: Instant,
}

impl App {
    /// Create a new App from resolved configuration
    pub fn new(config: &StudioConfig) -> anyhow::Result<Self> {
        let service = HttpGenerationService::from_config(&config.service)?;
        let client = JobClient::new(service).with_options(config.watch_options());
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (submit_tx, submit_rx) = mpsc::unbounded_channel();

        let color = ColorChoice::from_config(&config.color);
        let mut waveform = WaveformRenderer::new().with_tick_interval(config.tick_interval);
        waveform.set_color_value(color.color());

        Ok(Self {
            running: true,
            session: GenerationSession::new(client),
            updates_tx,
            updates_rx,
            submit_tx,
            submit_rx,
            pending_submit: None,
            display: DisplayState::new(),
            waveform,
            color,
            input_buffer: String::new(),
            base_url: config.service.base_url.clone(),
            last_frame: Instant::now(),
        })
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                        None => self.running = false,
                    }
                }

                // Frame tick
                () = tokio::time::sleep(Duration::from_millis(16)) => {}
            }

            self.process_submissions();
            self.process_job_updates();
            self.update();
            self.render(terminal)?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < FRAME_DURATION {
                tokio::time::sleep(FRAME_DURATION - elapsed).await;
            }
        }

        self.quit();
        Ok(())
    }

    /// Start watching jobs the service accepted
    fn process_submissions(&mut self) {
        while let Ok(outcome) = self.submit_rx.try_recv() {
            self.pending_submit = None;
            match outcome.result {
                Ok(job_id) => {
                    tracing::info!(job_id = %job_id, topic = %outcome.topic, "Watching new job");
                    let tx = self.updates_tx.clone();
                    self.session.resume(job_id.clone(), move |update| {
                        let _ = tx.send(update);
                    });
                    self.display.submitted(job_id, outcome.topic);
                }
                Err(e) => {
                    self.display.submission_failed(&e);
                    // Offer the topic again unless the user started a new one
                    if self.input_buffer.is_empty() {
                        self.input_buffer = outcome.topic;
                    }
                }
            }
        }
    }

    /// Apply all pending poll loop updates
    fn process_job_updates(&mut self) {
        while let Ok(update) = self.updates_rx.try_recv() {
            let job_id = update.job_id().clone();
            if !self.display.apply_update(update) {
                tracing::debug!(job_id = %job_id, "Dropped update for a replaced job");
            }
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: event::KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),

            // Submit topic
            KeyCode::Enter => self.submit(),

            // Cycle color presets
            KeyCode::Tab => {
                let preset = self.color.next();
                self.color = ColorChoice::Preset(preset);
                self.waveform.set_color(preset.name());
            }

            // Play/stop the finished result
            KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if !self.display.toggle_playback() && self.display.phase != Phase::Completed {
                    self.display.notify_error("Nothing to play yet".to_string());
                }
            }

            // Typing
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.clear_stale_error();
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.clear_stale_error();
            }

            _ => {}
        }
    }

    /// Editing the topic dismisses an input error, but not a job failure
    fn clear_stale_error(&mut self) {
        let is_error = self
            .display
            .notification
            .as_ref()
            .is_some_and(|n| n.level == NotifyLevel::Error);
        if is_error && self.display.phase != Phase::Failed {
            self.display.clear_notification();
        }
    }

    fn quit(&mut self) {
        if let Some(task) = self.pending_submit.take() {
            task.abort();
        }
        self.session.cancel();
        self.running = false;
    }

    /// Submit the typed topic on a separate task, replacing any job being watched
    fn submit(&mut self) {
        if !self.display.can_submit() {
            return;
        }

        let request = match GenerationRequest::new(self.input_buffer.as_str(), self.color.color())
        {
            Ok(request) => request,
            Err(e) => {
                self.display.notify_error(e.to_string());
                return;
            }
        };

        // The old job's queued updates are dropped by ID once the new one shows
        self.session.cancel();
        self.display.begin_submission();
        self.input_buffer.clear();

        let client = self.session.client().clone();
        let tx = self.submit_tx.clone();
        self.pending_submit = Some(tokio::spawn(async move {
            let result = client.submit(&request).await;
            let _ = tx.send(SubmitOutcome {
                topic: request.topic().to_string(),
                result,
            });
        }));
    }

    /// Update animations and state
    fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;

        self.waveform.set_playing(self.display.waveform_playing());
        self.waveform.update(delta);
    }

    /// Render the UI
    fn render(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let [title, input, job, waveform, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    " Podcast Studio ",
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", self.base_url),
                    Style::default().fg(theme::DIM_GRAY),
                ),
            ])),
            title,
        );

        self.draw_input(frame, input);
        self.draw_job(frame, job);
        self.draw_waveform(frame, waveform);
        self.draw_status(frame, status);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let color = theme::terminal_color(self.color.color());
        let block = Block::bordered()
            .title(" Topic ")
            .title_bottom(Line::from(vec![
                Span::raw(" color: "),
                Span::styled(self.color.label(), Style::default().fg(color)),
                Span::styled(" (Tab) ", Style::default().fg(theme::DIM_GRAY)),
            ]))
            .border_style(Style::default().fg(theme::DIM_GRAY));

        let text = format!("{}_", self.input_buffer);
        let width = usize::from(area.width.saturating_sub(2));
        // Keep the cursor end visible
        let skip = text.chars().count().saturating_sub(width);
        let visible: String = text.chars().skip(skip).collect();

        frame.render_widget(
            Paragraph::new(visible)
                .style(Style::default().fg(theme::INPUT_GREEN))
                .block(block),
            area,
        );
    }

    fn draw_job(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title(" Job ")
            .border_style(Style::default().fg(theme::DIM_GRAY));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header, gauge, result] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let Some(job) = self.display.job.as_ref() else {
            let hint = if self.display.phase == Phase::Submitting {
                "Submitting..."
            } else {
                "Type a topic and press Enter"
            };
            frame.render_widget(
                Paragraph::new(hint).style(Style::default().fg(theme::DIM_GRAY)),
                header,
            );
            return;
        };

        let status_style = Style::default().fg(theme::status_color(&job.status));
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    format!("{} {}", job.status.icon(), job.status.label()),
                    status_style,
                ),
                Span::styled(
                    format!("  {}  ", job.job_id),
                    Style::default().fg(theme::DIM_GRAY),
                ),
                Span::raw(job.topic.as_str()),
            ])),
            header,
        );

        frame.render_widget(
            Gauge::default()
                .gauge_style(status_style)
                .percent(job.progress_percent()),
            gauge,
        );

        let mut refs = Vec::new();
        if let Some(ref audio) = job.audio_url {
            refs.push(format!("audio {audio}"));
        }
        if let Some(ref video) = job.video_url {
            refs.push(format!("video {video}"));
        }
        if !refs.is_empty() {
            let playing = if self.display.result_playing {
                "  [playing]"
            } else {
                ""
            };
            frame.render_widget(
                Paragraph::new(format!("{}{playing}", refs.join("  ")))
                    .style(Style::default().fg(theme::SUCCESS_GREEN)),
                result,
            );
        }
    }

    fn draw_waveform(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title(" Waveform ")
            .border_style(Style::default().fg(theme::DIM_GRAY));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let color = theme::terminal_color(self.waveform.color());
        frame.render_widget(WaveformView::new(self.waveform.bars(), color), inner);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let line = match self.display.notification {
            Some(ref n) => {
                let color = match n.level {
                    NotifyLevel::Info => theme::SUCCESS_GREEN,
                    NotifyLevel::Error => theme::ERROR_RED,
                };
                Line::styled(format!(" {}", n.message), Style::default().fg(color))
            }
            None => Line::styled(
                " Enter submit | Tab color | Ctrl-P play | Esc quit",
                Style::default().fg(theme::DIM_GRAY),
            ),
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_choice_from_config() {
        assert_eq!(
            ColorChoice::from_config("Pink"),
            ColorChoice::Preset(Preset::Pink)
        );
        assert_eq!(
            ColorChoice::from_config("#112233"),
            ColorChoice::Custom(palette::Color::rgb(0x11, 0x22, 0x33))
        );
        assert_eq!(
            ColorChoice::from_config("mauve"),
            ColorChoice::Preset(Preset::default())
        );
        assert_eq!(
            ColorChoice::from_config("#12"),
            ColorChoice::Preset(Preset::default())
        );
    }

    #[test]
    fn test_color_choice_cycles() {
        let custom = ColorChoice::Custom(palette::Color::rgb(1, 2, 3));
        assert_eq!(custom.label(), "#010203");
        assert_eq!(custom.next(), Preset::default());
        assert_eq!(ColorChoice::Preset(Preset::Green).next(), Preset::Green.next());
    }

    fn key(code: KeyCode) -> event::KeyEvent {
        event::KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> event::KeyEvent {
        event::KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn app_for(base_url: &str) -> App {
        let mut config = StudioConfig::default();
        config.service.base_url = base_url.to_string();
        App::new(&config).unwrap()
    }

    /// Accepts connections and never answers
    async fn silent_service() -> (String, JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        (url, server)
    }

    #[test]
    fn test_topics_starting_with_p_are_typed() {
        let mut app = app_for("http://localhost:8000");
        type_text(&mut app, "planets");
        assert_eq!(app.input_buffer, "planets");
        assert_eq!(app.display.notification, None);
    }

    #[test]
    fn test_ctrl_p_without_result() {
        let mut app = app_for("http://localhost:8000");
        app.handle_key(ctrl('p'));
        assert!(app.input_buffer.is_empty());
        assert!(!app.display.result_playing);
        assert_eq!(
            app.display.notification.as_ref().map(|n| n.message.as_str()),
            Some("Nothing to play yet")
        );
    }

    #[tokio::test]
    async fn test_submit_returns_while_service_is_silent() {
        let (url, server) = silent_service().await;
        let mut app = app_for(&url);
        type_text(&mut app, "Deep Sea");

        let started = Instant::now();
        app.handle_key(key(KeyCode::Enter));
        assert!(started.elapsed() < Duration::from_secs(1));

        assert_eq!(app.display.phase, Phase::Submitting);
        assert!(app.pending_submit.is_some());
        assert!(app.input_buffer.is_empty());

        app.update();
        assert!(app.waveform.is_playing());

        // Quit is still honoured mid-submission
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.running);
        assert!(app.pending_submit.is_none());
        server.abort();
    }

    #[tokio::test]
    async fn test_accepted_submission_starts_watch() {
        let (url, server) = silent_service().await;
        let mut app = app_for(&url);
        app.display.begin_submission();

        app.submit_tx
            .send(SubmitOutcome {
                topic: "Deep Sea".to_string(),
                result: Ok(JobId::new("job-7")),
            })
            .unwrap();
        app.process_submissions();

        assert_eq!(app.display.phase, Phase::Watching);
        assert_eq!(app.session.active_job(), Some(&JobId::new("job-7")));
        app.quit();
        server.abort();
    }

    #[tokio::test]
    async fn test_rejected_submission_restores_topic() {
        let mut app = app_for("http://localhost:8000");
        app.display.begin_submission();

        app.submit_tx
            .send(SubmitOutcome {
                topic: "Deep Sea".to_string(),
                result: Err(SubmissionError::from(studio_core::ApiError::Status {
                    url: "http://localhost:8000/api/podcast".to_string(),
                    status: 422,
                    body: "topic required".to_string(),
                })),
            })
            .unwrap();
        app.process_submissions();

        assert_eq!(app.display.phase, Phase::Failed);
        assert_eq!(app.input_buffer, "Deep Sea");
        assert!(app.session.active_job().is_none());
    }
}
