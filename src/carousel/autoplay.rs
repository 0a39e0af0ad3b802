//! Autoplay driver: advances a shared `Carousel` on a fixed interval.
//!
//! Manual navigation goes through the same task so the timer phase can be
//! reset on every jump.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::model::{Carousel, CarouselSnapshot};
use crate::error::CarouselError;

/// Broadcast channel capacity for slide transitions.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

enum Command {
    GoTo {
        index: usize,
        reply: oneshot::Sender<Result<CarouselSnapshot, CarouselError>>,
    },
    Pause,
    Resume,
}

/// Handle to a running autoplay task. Dropping it stops the task.
pub struct AutoplayHandle {
    carousel: Arc<RwLock<Carousel>>,
    commands: mpsc::UnboundedSender<Command>,
    tx: broadcast::Sender<CarouselSnapshot>,
    task: JoinHandle<()>,
}

/// Start auto-advancing `carousel` every `interval`.
pub fn spawn_autoplay(carousel: Carousel, interval: Duration) -> AutoplayHandle {
    let carousel = Arc::new(RwLock::new(carousel));
    let (tx, _rx) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
    let (commands, rx) = mpsc::unbounded_channel();
    let first_deadline = Instant::now() + interval;

    let task = tokio::spawn(run(
        Arc::clone(&carousel),
        interval,
        first_deadline,
        rx,
        tx.clone(),
    ));
    info!(interval_ms = interval.as_millis() as u64, "Carousel autoplay started");

    AutoplayHandle {
        carousel,
        commands,
        tx,
        task,
    }
}

impl AutoplayHandle {
    /// Subscribe to slide transitions (automatic and manual).
    pub fn subscribe(&self) -> broadcast::Receiver<CarouselSnapshot> {
        self.tx.subscribe()
    }

    /// Current frame.
    pub async fn snapshot(&self) -> CarouselSnapshot {
        self.carousel.read().await.snapshot()
    }

    /// Jump to `index` and restart the interval from now.
    pub async fn go_to_slide(&self, index: usize) -> Result<CarouselSnapshot, CarouselError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::GoTo { index, reply })
            .map_err(|_| CarouselError::Stopped)?;
        rx.await.map_err(|_| CarouselError::Stopped)?
    }

    /// Suspend automatic advances. Manual navigation keeps working.
    pub fn pause(&self) {
        let _ = self.commands.send(Command::Pause);
    }

    /// Resume automatic advances; the next one is a full interval away.
    pub fn resume(&self) {
        let _ = self.commands.send(Command::Resume);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the task.
    pub fn stop(self) {
        // Drop does the work.
    }
}

impl Drop for AutoplayHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    carousel: Arc<RwLock<Carousel>>,
    interval: Duration,
    mut deadline: Instant,
    mut rx: mpsc::UnboundedReceiver<Command>,
    tx: broadcast::Sender<CarouselSnapshot>,
) {
    let mut paused = false;

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline), if !paused => {
                let snapshot = {
                    let mut carousel = carousel.write().await;
                    carousel.advance();
                    carousel.snapshot()
                };
                debug!(index = snapshot.active_index, "Carousel auto-advanced");
                // Ok if nobody is listening
                let _ = tx.send(snapshot);
                deadline = Instant::now() + interval;
            }
            cmd = rx.recv() => match cmd {
                Some(Command::GoTo { index, reply }) => {
                    let result = {
                        let mut carousel = carousel.write().await;
                        carousel.go_to_slide(index).map(|()| carousel.snapshot())
                    };
                    if let Ok(snapshot) = &result {
                        debug!(index, "Carousel jumped");
                        let _ = tx.send(snapshot.clone());
                        deadline = Instant::now() + interval;
                    }
                    let _ = reply.send(result);
                }
                Some(Command::Pause) => paused = true,
                Some(Command::Resume) => {
                    if paused {
                        paused = false;
                        deadline = Instant::now() + interval;
                    }
                }
                None => break,
            },
        }
    }

    debug!("Carousel autoplay stopped");
}
