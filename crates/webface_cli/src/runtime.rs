use std::io::{self, BufRead};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};
use webface::{ChatSession, HostOps, InboundSignal, RequestId, SubmitOutcome, SurfaceSnapshot};
use webface_api::{ApiError, BackendResponse};

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::render::{surface_notices, write_line, SharedWriter};

#[derive(Debug)]
pub enum LoopEvent {
    Input(String),
    Completed {
        request_id: RequestId,
        result: Result<BackendResponse, ApiError>,
    },
    InputClosed,
}

/// Forwards stdin lines to the event loop, then reports end of input.
pub fn spawn_stdin_reader(events: Sender<LoopEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("webface-stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if events.send(LoopEvent::Input(line)).is_err() {
                            return;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "stdin read failed");
                        break;
                    }
                }
            }
            let _ = events.send(LoopEvent::InputClosed);
        })
}

/// Single-threaded driver: every input line, backend completion and timer
/// expiry is applied to the session on this loop, one at a time.
pub struct EventLoop<H: HostOps> {
    session: ChatSession,
    host: H,
    events: Receiver<LoopEvent>,
    out: SharedWriter,
    surface: SurfaceSnapshot,
    input_closed: bool,
    should_exit: bool,
}

impl<H: HostOps> EventLoop<H> {
    pub fn new(
        session: ChatSession,
        host: H,
        events: Receiver<LoopEvent>,
        out: SharedWriter,
    ) -> Self {
        let surface = session.surface();
        Self {
            session,
            host,
            events,
            out,
            surface,
            input_closed: false,
            should_exit: false,
        }
    }

    /// Starts the session and blocks until `/quit`, or until input has ended
    /// and no request or forum delivery is outstanding.
    pub fn run(&mut self) {
        self.start();

        while !self.should_exit {
            let event = match self.session.time_until_next_timer() {
                Some(wait) => match self.events.recv_timeout(wait) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.events.recv() {
                    Ok(event) => Some(event),
                    Err(_) => break,
                },
            };
            self.step(event);
        }
        info!("event loop finished");
    }

    /// Starts the session against this loop's host.
    pub fn start(&mut self) {
        self.session.start(&mut self.host);
        self.render_surface();
    }

    /// Applies one event (or none, after a timer wait) and fires due timers.
    pub fn step(&mut self, event: Option<LoopEvent>) {
        match event {
            Some(LoopEvent::Input(line)) => self.handle_line(&line),
            Some(LoopEvent::Completed { request_id, result }) => {
                self.session
                    .on_backend_completed(request_id, result, &mut self.host);
            }
            Some(LoopEvent::InputClosed) => {
                debug!("input closed");
                self.input_closed = true;
            }
            None => {}
        }

        self.session.advance(&mut self.host);
        self.render_surface();

        if self.input_closed && self.is_idle() {
            self.should_exit = true;
        }
    }

    fn handle_line(&mut self, line: &str) {
        let Some(command) = parse_slash_command(line) else {
            if self.session.submit_text(line, &mut self.host) == SubmitOutcome::Busy {
                write_line(&self.out, "(still waiting for the previous reply; message not sent)");
            }
            return;
        };

        match command {
            SlashCommand::Help => write_line(&self.out, HELP_TEXT),
            SlashCommand::Clear => self.session.clear_history(&mut self.host),
            SlashCommand::Theme => {
                self.session.toggle_theme(&mut self.host);
            }
            SlashCommand::Close => {
                if self.session.overlay().is_none() {
                    write_line(&self.out, "(no page is open)");
                }
                self.session
                    .on_signal(InboundSignal::parse("close"), &mut self.host);
            }
            SlashCommand::Quit => self.should_exit = true,
            SlashCommand::Unknown(command) => {
                write_line(&self.out, &format!("Unknown command: {command}"));
            }
        }
    }

    fn render_surface(&mut self) {
        let next = self.session.surface();
        for notice in surface_notices(&self.surface, &next) {
            write_line(&self.out, &notice);
        }
        self.surface = next;
    }

    fn is_idle(&self) -> bool {
        self.session.pending_requests() == 0 && self.session.delivery().in_flight() == 0
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
