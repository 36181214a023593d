use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

pub enum AppEvent {
    /// One display refresh, carrying the time since the previous one.
    Tick(Duration),
    Line(String),
    /// Input closed.
    Eof,
}

/// Host-side frame pump: a ticker thread standing in for the display refresh
/// and a reader thread forwarding stdin lines.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        let ticker = tx.clone();
        thread::spawn(move || {
            let mut last = Instant::now();
            loop {
                thread::sleep(tick_rate);
                let now = Instant::now();
                if ticker.send(AppEvent::Tick(now - last)).is_err() {
                    return;
                }
                last = now;
            }
        });

        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(AppEvent::Line(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(AppEvent::Eof);
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
