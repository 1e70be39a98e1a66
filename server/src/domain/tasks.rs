//! In-process task queue and background jobs
//!
//! Request handlers enqueue follow-up work (featured speaker refresh,
//! confirmation mail) and return immediately. A single worker drains the
//! queue; on shutdown it finishes everything already queued before exiting.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::announcements::AnnouncementService;
use super::speakers::SpeakerService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Recompute the featured speaker announcement after a session was added
    SetFeaturedSpeaker {
        speaker_key: String,
        conference_key: String,
    },
    /// Mail the organizer a summary of a newly created conference
    SendConfirmationEmail {
        email: String,
        conference_info: String,
    },
}

impl Task {
    fn name(&self) -> &'static str {
        match self {
            Self::SetFeaturedSpeaker { .. } => "set_featured_speaker",
            Self::SendConfirmationEmail { .. } => "send_confirmation_email",
        }
    }
}

/// Sending half of the task queue
#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::Sender<Task>,
}

impl TaskQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Task>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Queue a task without waiting. A full queue or a stopped worker drops
    /// the task with a warning; returns whether it was queued.
    pub fn enqueue(&self, task: Task) -> bool {
        let name = task.name();
        match self.tx.try_send(task) {
            Ok(()) => {
                tracing::debug!(task = name, "Task queued");
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(task = name, "Task queue full, dropping task");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(task = name, "Task queue closed, dropping task");
                false
            }
        }
    }
}

/// Start the queue worker
pub fn start_task_worker(
    mut rx: mpsc::Receiver<Task>,
    speakers: Arc<SpeakerService>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        rx.close();
                        let mut drained = 0usize;
                        while let Some(task) = rx.recv().await {
                            run_task(&speakers, task).await;
                            drained += 1;
                        }
                        tracing::debug!(drained, "Task worker shutting down");
                        break;
                    }
                }
                task = rx.recv() => match task {
                    Some(task) => run_task(&speakers, task).await,
                    None => break,
                },
            }
        }
    })
}

async fn run_task(speakers: &SpeakerService, task: Task) {
    match task {
        Task::SetFeaturedSpeaker {
            speaker_key,
            conference_key,
        } => {
            if let Err(e) = speakers
                .set_featured_speaker(&speaker_key, &conference_key)
                .await
            {
                tracing::warn!(
                    speaker_key = %speaker_key,
                    conference_key = %conference_key,
                    error = %e,
                    "Featured speaker update failed"
                );
            }
        }
        Task::SendConfirmationEmail {
            email,
            conference_info,
        } => {
            tracing::info!(
                to = %email,
                subject = "You created a new Conference!",
                body = %format!("Hi, you have created a following conference:\r\n\r\n{}", conference_info),
                "Confirmation email"
            );
        }
    }
}

/// Periodically refresh the nearly-sold-out announcement
pub fn start_announcement_task(
    announcements: Arc<AnnouncementService>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::debug!("Announcement task shutting down");
                        break;
                    }
                }
                _ = interval.tick() => {
                    if let Err(e) = announcements.refresh().await {
                        tracing::warn!(error = %e, "Announcement refresh failed");
                    }
                }
            }
        }
    })
}
