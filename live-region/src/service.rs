/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Async driver for a [`LiveRegion`].
//!
//! [`Announcer::spawn`] moves a region into its own tokio task.  The task
//! serializes every command and timer wake-up through one `select!` loop,
//! so the region is only ever stepped by one caller at a time and needs no
//! lock:
//!
//! ```text
//!  Announcer (Clone) ──mpsc──► actor task ──► LiveRegion::announce / clear / message
//!                                  │
//!                                  └── sleep_until(next_wakeup) ──► LiveRegion::perform_work
//! ```
//!
//! Dropping the last [`Announcer`] stops the task; anything still queued is
//! abandoned, exactly like [`LiveRegion::clear`].

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::Profile;
use crate::message::{AnnounceOptions, Politeness};
use crate::region::{AnnounceError, Announcement, LiveRegion, Sink};
use crate::text::{extract_text, TextSource};

enum Command {
    Announce {
        text: String,
        options: AnnounceOptions,
        reply: oneshot::Sender<Result<Announcement, AnnounceError>>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    Message {
        politeness: Politeness,
        reply: oneshot::Sender<Result<String, AnnounceError>>,
    },
}

/// Handle to a live region running on its own tokio task.
#[derive(Debug, Clone)]
pub struct Announcer {
    commands: mpsc::UnboundedSender<Command>,
}

impl Announcer {
    /// Start a region writing to `sink`, timed by `profile`.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn spawn<S>(sink: S, profile: &Profile) -> (Self, JoinHandle<()>)
    where
        S: Sink + Send + 'static,
    {
        let region = LiveRegion::new(sink, profile, Instant::now());
        let (commands, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(region, rx));

        info!(profile = %profile.name, "announcer started");
        (Self { commands }, task)
    }

    /// Queue `text`; see [`LiveRegion::announce`].
    pub async fn announce(
        &self,
        text: impl Into<String>,
        options: AnnounceOptions,
    ) -> Result<Announcement, AnnounceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Announce {
            text: text.into(),
            options,
            reply,
        })?;
        rx.await.map_err(|_| AnnounceError::RegionClosed)?
    }

    /// Queue the text extracted from `source`.
    pub async fn announce_from_element<T: TextSource + ?Sized>(
        &self,
        source: &T,
        options: AnnounceOptions,
    ) -> Result<Announcement, AnnounceError> {
        let text = extract_text(source);
        self.announce(text, options).await
    }

    /// Abandon everything pending; see [`LiveRegion::clear`].
    pub async fn clear(&self) -> Result<(), AnnounceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Clear { reply })?;
        rx.await.map_err(|_| AnnounceError::RegionClosed)
    }

    /// Current text of the `politeness` surface.
    pub async fn message(&self, politeness: Politeness) -> Result<String, AnnounceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Message { politeness, reply })?;
        rx.await.map_err(|_| AnnounceError::RegionClosed)?
    }

    fn send(&self, command: Command) -> Result<(), AnnounceError> {
        self.commands
            .send(command)
            .map_err(|_| AnnounceError::RegionClosed)
    }
}

// ── Actor loop ────────────────────────────────────────────────────────────────

async fn run<S: Sink>(mut region: LiveRegion<S>, mut commands: mpsc::UnboundedReceiver<Command>) {
    loop {
        let wakeup = region.next_wakeup();

        tokio::select! {
            // Commands first: an announce that arrives together with a timer
            // is queued before the step runs.
            biased;

            command = commands.recv() => match command {
                Some(command) => handle(&mut region, command),
                None => break,
            },

            () = sleep_until_opt(wakeup) => {
                if let Err(e) = region.perform_work(Instant::now()) {
                    warn!(error = %e, "scheduled announcement failed");
                }
            }
        }
    }

    let abandoned = region.pending();
    if abandoned > 0 {
        warn!(abandoned, "announcer stopped with pending announcements");
    } else {
        info!("announcer stopped");
    }
}

fn handle<S: Sink>(region: &mut LiveRegion<S>, command: Command) {
    match command {
        Command::Announce {
            text,
            options,
            reply,
        } => {
            let result = region.announce(&text, options, Instant::now());
            if reply.send(result).is_err() {
                debug!("announce caller went away before the reply");
            }
        }
        Command::Clear { reply } => {
            region.clear();
            let _ = reply.send(());
        }
        Command::Message { politeness, reply } => {
            let _ = reply.send(region.message(politeness).map_err(AnnounceError::from));
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
