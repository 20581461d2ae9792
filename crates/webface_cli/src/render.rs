//! Line-oriented rendering of the message log and surface changes.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;
use webface::{ChatSession, LogEvent, Message, SubscriptionId, SurfaceSnapshot};

pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn shared_writer(writer: impl Write + Send + 'static) -> SharedWriter {
    Arc::new(Mutex::new(Box::new(writer)))
}

pub fn stdout_writer() -> SharedWriter {
    shared_writer(io::stdout())
}

pub fn write_line(out: &SharedWriter, line: &str) {
    let mut out = lock_unpoisoned(out);
    if let Err(error) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        warn!(%error, "failed to write to terminal");
    }
}

pub fn write_prompt(out: &SharedWriter) {
    let mut out = lock_unpoisoned(out);
    if let Err(error) = write!(out, "> ").and_then(|()| out.flush()) {
        warn!(%error, "failed to write prompt");
    }
}

/// `[Y] You 12:04:51 hello`
pub fn format_message(message: &Message) -> String {
    let at = message.timestamp;
    format!(
        "[{}] {} {:02}:{:02}:{:02} {}",
        message.avatar(),
        message.role,
        at.hour(),
        at.minute(),
        at.second(),
        message.text
    )
}

/// Prints every appended message and clear as it happens.
pub fn attach(session: &mut ChatSession, out: SharedWriter) -> SubscriptionId {
    session.subscribe(move |event| match event {
        LogEvent::Appended(message) => write_line(&out, &format_message(message)),
        LogEvent::Cleared => write_line(&out, "-- history cleared --"),
    })
}

/// Notices for the cosmetic state that changed between two snapshots.
pub fn surface_notices(previous: &SurfaceSnapshot, next: &SurfaceSnapshot) -> Vec<String> {
    let mut notices = Vec::new();

    if !previous.busy && next.busy {
        notices.push("... sending".to_string());
    }

    match (previous.stretch_active, next.stretch_active) {
        (false, true) => notices.push("~ the chat window stretches ~".to_string()),
        (true, false) => notices.push("~ the chat window snaps back ~".to_string()),
        _ => {}
    }

    if previous.font_target != next.font_target {
        match next.font_target {
            Some(target) => notices.push(format!("~ the letters of {target} start to crawl ~")),
            None => notices.push("~ the letters settle ~".to_string()),
        }
    }

    if previous.theme != next.theme {
        notices.push(format!("theme: {}", next.theme.as_str()));
    }

    notices
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
