use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use super::source::{create_sink, fetch_media, seek_target};
use super::state::{LoadState, TickState};
use super::types::{EngineCmd, EngineEvent, EventCallback, ObserverToken};

/// How often the thread wakes up to report progress and detect the end.
const TICK: Duration = Duration::from_millis(100);

struct Observer {
    token: ObserverToken,
    interval: Duration,
    callback: EventCallback,
}

impl Observer {
    fn emit(&self, event: EngineEvent) {
        (self.callback)(event);
    }
}

struct Media {
    sink: Sink,
    duration: Option<Duration>,
    tick: TickState,
}

/// Deliver a failure now, or hold it for the next observer.
fn report_failure(observer: Option<&Observer>, load: &mut LoadState, reason: String) {
    match observer {
        Some(o) => o.emit(EngineEvent::Failed(reason)),
        None => load.defer_failure(reason),
    }
}

pub(super) fn spawn_engine_thread(
    rx: Receiver<EngineCmd>,
    tx: Sender<EngineCmd>,
    http: Client,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("encore-audio".to_string())
        .spawn(move || run(rx, tx, http))
}

fn open_stream() -> Option<OutputStream> {
    match OutputStreamBuilder::open_default_stream() {
        Ok(mut stream) => {
            // rodio logs to stderr when OutputStream is dropped. That's noisy for a TUI app.
            stream.log_on_drop(false);
            Some(stream)
        }
        Err(e) => {
            error!("no audio output device: {e}");
            None
        }
    }
}

fn run(rx: Receiver<EngineCmd>, tx: Sender<EngineCmd>, http: Client) {
    let stream = open_stream();

    let mut media: Option<Media> = None;
    let mut observer: Option<Observer> = None;
    let mut load = LoadState::default();

    loop {
        match rx.recv_timeout(TICK) {
            Ok(cmd) => match cmd {
                EngineCmd::Load(url) => {
                    if let Some(m) = media.take() {
                        m.sink.stop();
                    }
                    let generation = load.begin_load();

                    let worker_tx = tx.clone();
                    let http = http.clone();
                    debug!(%url, generation, "loading media");
                    let spawned = thread::Builder::new()
                        .name("encore-fetch".to_string())
                        .spawn(move || {
                            let result = fetch_media(&http, &url);
                            let _ = worker_tx.send(EngineCmd::Fetched { generation, result });
                        });
                    if let Err(e) = spawned {
                        // Delivered through the queue so it lands after the new observer.
                        let _ = tx.send(EngineCmd::Fetched {
                            generation,
                            result: Err(format!("failed to start fetch: {e}")),
                        });
                    }
                }

                EngineCmd::Fetched { generation, result } => {
                    if !load.accepts(generation) {
                        debug!(generation, "dropping stale media");
                        continue;
                    }

                    let loaded = result.and_then(|bytes| match &stream {
                        Some(s) => create_sink(s, bytes),
                        None => Err("no audio output device".to_string()),
                    });
                    match loaded {
                        Ok((sink, duration)) => {
                            if load.want_playing() {
                                sink.play();
                            }
                            media = Some(Media {
                                sink,
                                duration,
                                tick: TickState::default(),
                            });
                        }
                        Err(msg) => {
                            warn!("media unavailable: {msg}");
                            report_failure(observer.as_ref(), &mut load, msg);
                        }
                    }
                }

                EngineCmd::Play => {
                    load.set_playing(true);
                    if let Some(m) = &media {
                        m.sink.play();
                    }
                }

                EngineCmd::Pause => {
                    load.set_playing(false);
                    if let Some(m) = &media {
                        m.sink.pause();
                    }
                }

                EngineCmd::Seek(fraction) => {
                    let Some(m) = &media else {
                        continue;
                    };
                    match seek_target(m.duration, fraction) {
                        Some(target) => {
                            if let Err(e) = m.sink.try_seek(target) {
                                warn!("seek to {target:?} failed: {e}");
                            }
                        }
                        None => debug!("seek ignored: duration unknown"),
                    }
                }

                EngineCmd::Observe {
                    token,
                    interval,
                    callback,
                } => {
                    let o = Observer {
                        token,
                        interval,
                        callback,
                    };
                    if let Some(reason) = load.take_failure() {
                        o.emit(EngineEvent::Failed(reason));
                    }
                    if let Some(m) = media.as_mut() {
                        m.tick.reset_interval();
                    }
                    observer = Some(o);
                }

                EngineCmd::RemoveObserver(token) => {
                    if observer.as_ref().is_some_and(|o| o.token == token) {
                        observer = None;
                    }
                }

                EngineCmd::Quit => {
                    if let Some(m) = media.take() {
                        m.sink.stop();
                    }
                    break;
                }
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let (Some(m), Some(o)) = (media.as_mut(), observer.as_ref()) else {
            continue;
        };
        let event = m.tick.advance(
            load.want_playing(),
            m.sink.empty(),
            Instant::now(),
            o.interval,
            m.sink.get_pos(),
            m.duration,
        );
        if let Some(event) = event {
            o.emit(event);
        }
    }
}
