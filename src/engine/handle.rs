use std::io;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use tracing::warn;

use super::thread::spawn_engine_thread;
use super::types::{EngineCmd, EventCallback, ObserverToken, PlaybackEngine};

/// Handle to the audio thread. Dropping it stops playback and joins the thread.
pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    next_token: u64,
    join: Option<JoinHandle<()>>,
}

impl RodioEngine {
    /// Spawn the audio thread. `http` is used to fetch remote media.
    pub fn new(http: Client) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let join = spawn_engine_thread(rx, tx.clone(), http)?;

        Ok(Self {
            tx,
            next_token: 0,
            join: Some(join),
        })
    }

    fn send(&self, cmd: EngineCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is gone; command dropped");
        }
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, url: &Url) {
        self.send(EngineCmd::Load(url.clone()));
    }

    fn play(&mut self) {
        self.send(EngineCmd::Play);
    }

    fn pause(&mut self) {
        self.send(EngineCmd::Pause);
    }

    fn seek(&mut self, fraction: f64) {
        self.send(EngineCmd::Seek(fraction));
    }

    fn observe(&mut self, interval: Duration, callback: EventCallback) -> ObserverToken {
        self.next_token += 1;
        let token = ObserverToken(self.next_token);
        self.send(EngineCmd::Observe {
            token,
            interval,
            callback,
        });
        token
    }

    fn remove_observer(&mut self, token: ObserverToken) {
        self.send(EngineCmd::RemoveObserver(token));
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        let _ = self.tx.send(EngineCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}
