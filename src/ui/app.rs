use std::io;
use std::path::PathBuf;

use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{enable_raw_mode, EnterAlternateScreen},
};
use futures::StreamExt;
use tokio::sync::watch;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use super::prompt::{Prompt, PromptKind};
use super::terminal_guard::TerminalGuard;
use crate::config::{save_master_dir, save_user_profile, Config};
use crate::scheduler::{
    Annotation, CaptureScheduler, SessionError, SessionSettings, StatusLevel, StatusMessage,
};
use crate::session::SessionState;

/// Comment recorded when the application closes a running session
const EXIT_COMMENT: &str = "Application closed";

/// Terminal control surface for one [`CaptureScheduler`]
pub struct App {
    scheduler: CaptureScheduler,
    config: Config,
    config_file: PathBuf,
    settings: SessionSettings,
    prompt: Option<Prompt>,
    confirm_quit: bool,
    notice: Option<String>,
    /// Status updates since the notice was set hide it
    notice_status: watch::Receiver<StatusMessage>,
    should_quit: bool,
}

impl App {
    pub fn new(
        scheduler: CaptureScheduler,
        config: Config,
        config_file: PathBuf,
        settings: SessionSettings,
    ) -> Self {
        let notice_status = scheduler.subscribe_status();
        Self {
            scheduler,
            config,
            config_file,
            settings,
            prompt: None,
            confirm_quit: false,
            notice: None,
            notice_status,
            should_quit: false,
        }
    }

    pub fn scheduler(&self) -> &CaptureScheduler {
        &self.scheduler
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn is_confirming_quit(&self) -> bool {
        self.confirm_quit
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut guard = TerminalGuard::new();
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal).await;

        // Never leave a worker behind, whatever ended the loop.
        if self.scheduler.state().is_active() {
            if let Err(e) = self.scheduler.shutdown(Annotation::comment(EXIT_COMMENT)).await {
                tracing::error!(error = %e, "Failed to stop session on exit");
            }
        }
        self.scheduler.wait_stopped().await;

        guard.cleanup()?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        let mut state_rx = self.scheduler.subscribe_state();
        let mut status_rx = self.scheduler.subscribe_status();

        loop {
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                // Redraw when the worker changes state or status
                Ok(()) = state_rx.changed() => {}
                Ok(()) = status_rx.changed() => self.notice = None,
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        if self.confirm_quit {
            return self.handle_quit_confirmation(key).await;
        }
        if self.prompt.is_some() {
            return self.handle_prompt_key(key).await;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.request_quit();
            return Ok(());
        }

        let state = self.scheduler.state();
        let idle = state == SessionState::Stopped && !self.scheduler.is_stopping();
        match key.code {
            KeyCode::Char('s') if idle => self.open(Prompt::transition(PromptKind::Start)),
            KeyCode::Char('p') if state == SessionState::Running => {
                self.open(Prompt::transition(PromptKind::Pause))
            }
            KeyCode::Char('p') if state == SessionState::Paused => {
                self.open(Prompt::transition(PromptKind::Resume))
            }
            KeyCode::Char('x') if state.is_active() && !self.scheduler.is_stopping() => {
                self.open(Prompt::transition(PromptKind::Stop))
            }
            KeyCode::Char('d') if idle => {
                let current = self
                    .settings
                    .destination
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.open(Prompt::new(PromptKind::Destination, &current));
            }
            KeyCode::Char('n') if idle => {
                let current = self.config.user_name.clone();
                self.open(Prompt::new(PromptKind::UserName, &current));
            }
            KeyCode::Char('c') if idle => {
                let current = self.config.company.clone();
                self.open(Prompt::new(PromptKind::Company, &current));
            }
            KeyCode::Char('l') if idle => {
                self.settings.quality = self.settings.quality.next();
            }
            KeyCode::Char('q') => self.request_quit(),
            _ => {}
        }
        Ok(())
    }

    fn set_notice(&mut self, notice: Option<String>) {
        self.notice_status.borrow_and_update();
        self.notice = notice;
    }

    fn open(&mut self, prompt: Prompt) {
        self.set_notice(None);
        self.prompt = Some(prompt);
    }

    fn request_quit(&mut self) {
        if self.scheduler.state().is_active() {
            self.confirm_quit = true;
        } else {
            self.should_quit = true;
        }
    }

    async fn handle_quit_confirmation(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.confirm_quit = false;
                let result = self
                    .scheduler
                    .shutdown(Annotation::comment(EXIT_COMMENT))
                    .await;
                self.report(result);
                self.should_quit = true;
            }
            KeyCode::Char('n') | KeyCode::Esc => self.confirm_quit = false,
            _ => {}
        }
        Ok(())
    }

    async fn handle_prompt_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                if let Some(prompt) = self.prompt.take() {
                    // Esc resolves to a cancelled annotation
                    let answer = (key.code == KeyCode::Enter).then(|| prompt.answer());
                    self.submit(prompt.kind, Annotation::from(answer)).await;
                }
                return Ok(());
            }
            _ => {}
        }

        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => prompt.input.delete_to_start(),
            KeyCode::Char('w') if ctrl => prompt.input.delete_word(),
            KeyCode::Char(c) if !ctrl => prompt.input.insert_char(c),
            KeyCode::Backspace => prompt.input.delete_char(),
            KeyCode::Delete => prompt.input.delete_forward(),
            KeyCode::Left => prompt.input.move_left(),
            KeyCode::Right => prompt.input.move_right(),
            KeyCode::Home => prompt.input.move_start(),
            KeyCode::End => prompt.input.move_end(),
            _ => {}
        }
        Ok(())
    }

    async fn submit(&mut self, kind: PromptKind, note: Annotation) {
        if kind.is_transition() {
            let result = match kind {
                PromptKind::Start => self.scheduler.start(self.settings.clone(), note).await,
                PromptKind::Pause => self.scheduler.pause(note).await,
                PromptKind::Resume => self.scheduler.resume(note).await,
                _ => self.scheduler.stop(note).await,
            };
            self.report(result);
            return;
        }

        let Annotation::Comment(answer) = note else {
            return;
        };
        if let Err(e) = self.apply_setting(kind, answer) {
            tracing::warn!(error = %e, "Failed to save settings");
            self.set_notice(Some(format!("Could not save settings: {e}")));
        }
    }

    fn apply_setting(&mut self, kind: PromptKind, answer: String) -> anyhow::Result<()> {
        match kind {
            PromptKind::Destination => {
                if answer.is_empty() {
                    return Ok(());
                }
                let dir = PathBuf::from(answer);
                std::fs::create_dir_all(&dir)?;
                save_master_dir(&self.config_file, &dir)?;
                self.config.master_dir = Some(dir.clone());
                self.settings.destination = Some(dir);
            }
            PromptKind::UserName | PromptKind::Company => {
                if kind == PromptKind::UserName {
                    self.config.user_name = answer;
                } else {
                    self.config.company = answer;
                }
                save_user_profile(&self.config_file, &self.config.user_name, &self.config.company)?;
                self.settings.metadata.name = self.config.user_name.clone();
                self.settings.metadata.company = self.config.company.clone();
            }
            _ => {}
        }
        Ok(())
    }

    fn report(&mut self, result: Result<SessionState, SessionError>) {
        self.set_notice(match result {
            Ok(_) => None,
            Err(SessionError::UserCancelled) => Some("Cancelled.".to_string()),
            Err(e) => Some(e.to_string()),
        });
    }

    pub fn draw(&self, f: &mut Frame) {
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),    // Session details
                Constraint::Length(3), // Status
                Constraint::Length(1), // Key hints
            ])
            .split(area);

        self.draw_details(f, chunks[0]);
        self.draw_status(f, chunks[1]);
        self.draw_hints(f, chunks[2]);

        if let Some(prompt) = &self.prompt {
            draw_prompt(f, area, prompt);
        } else if self.confirm_quit {
            draw_confirm_quit(f, area);
        }
    }

    fn draw_details(&self, f: &mut Frame, area: Rect) {
        let label = Style::default().fg(Color::DarkGray);
        let state = self.scheduler.state();
        let state_text = if self.scheduler.is_stopping() {
            "Stopping".to_string()
        } else {
            state.display_name().to_string()
        };
        let state_color = match state {
            SessionState::Running => Color::Green,
            SessionState::Paused => Color::Yellow,
            SessionState::Stopped => Color::Gray,
        };
        let destination = self
            .settings
            .destination
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string());
        let archive_every = self
            .settings
            .archive_every
            .map(|d| format!("every {}s", d.as_secs()))
            .unwrap_or_else(|| "on pause/stop".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("State:       ", label),
                Span::styled(
                    state_text,
                    Style::default().fg(state_color).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Support:     ", label),
                Span::raw(format!("{} ({})", self.config.user_name, self.config.company)),
            ]),
            Line::from(vec![
                Span::styled("Description: ", label),
                Span::raw(self.settings.metadata.description.clone()),
            ]),
            Line::from(vec![
                Span::styled("Capture:     ", label),
                Span::raw(format!(
                    "every {}s, {} quality, archive {}",
                    self.settings.interval.as_secs(),
                    self.settings.quality.display_name(),
                    archive_every
                )),
            ]),
            Line::from(vec![
                Span::styled("Save to:     ", label),
                Span::raw(destination),
            ]),
        ];

        let block = Block::default()
            .title(" screenlog ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        f.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let status = self.scheduler.status();
        let notice = self
            .notice
            .as_ref()
            .filter(|_| !self.notice_status.has_changed().unwrap_or(true));
        let (text, color) = match notice {
            Some(notice) => (notice.clone(), Color::Yellow),
            None => {
                let color = match status.level {
                    StatusLevel::Info => Color::White,
                    StatusLevel::Warning => Color::Yellow,
                    StatusLevel::Error => Color::Red,
                };
                (status.text, color)
            }
        };
        let block = Block::default().title(" Status ").borders(Borders::ALL);
        f.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(color))
                .block(block),
            area,
        );
    }

    fn draw_hints(&self, f: &mut Frame, area: Rect) {
        let hints = match self.scheduler.state() {
            SessionState::Stopped => "s start  d folder  n name  c company  l quality  q quit",
            SessionState::Running => "p pause  x stop  q quit",
            SessionState::Paused => "p resume  x stop  q quit",
        };
        f.render_widget(
            Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_prompt(f: &mut Frame, area: Rect, prompt: &Prompt) {
    let dialog = centered(area, 60, 5);
    f.render_widget(Clear, dialog);

    let block = Block::default()
        .title(prompt.kind.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(dialog);
    f.render_widget(block, dialog);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    prompt.input.render(rows[0], f.buffer_mut(), Style::default());
    f.render_widget(
        Paragraph::new("Enter confirm  Esc cancel").style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );
}

fn draw_confirm_quit(f: &mut Frame, area: Rect) {
    let dialog = centered(area, 50, 4);
    f.render_widget(Clear, dialog);
    let block = Block::default()
        .title(" Quit ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    f.render_widget(
        Paragraph::new("A session is in progress. Stop it and quit? (y/n)").block(block),
        dialog,
    );
}
