//! In-memory connector for fetcher and pipeline tests.

use std::future;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ChannelError, Result};
use crate::transport::session::{ConnectionSignal, connection_watch};
use crate::transport::{
    Challenge, ChallengeResponder, ConnectionWatch, Connector, FileChannel, RemoteSession,
    SshConfig,
};

/// What the mock remote does.
#[derive(Debug, Clone)]
pub(crate) enum Behavior {
    Succeed(Vec<u8>),
    OpenFails,
    ReadFails,
    LostDuringRead,
    ReadHangs,
    ConnectHangs,
    InteractiveUnavailable,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    connects: AtomicUsize,
    session_closes: AtomicUsize,
    channel_closes: AtomicUsize,
    read_paths: Mutex<Vec<String>>,
    challenge_answers: Mutex<Vec<String>>,
}

impl Counters {
    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn session_closes(&self) -> usize {
        self.session_closes.load(Ordering::SeqCst)
    }

    pub(crate) fn channel_closes(&self) -> usize {
        self.channel_closes.load(Ordering::SeqCst)
    }

    pub(crate) fn read_paths(&self) -> Vec<String> {
        self.read_paths.lock().unwrap().clone()
    }

    pub(crate) fn challenge_answers(&self) -> Vec<String> {
        self.challenge_answers.lock().unwrap().clone()
    }
}

pub(crate) struct MockConnector {
    behavior: Behavior,
    counters: Arc<Counters>,
}

impl MockConnector {
    pub(crate) fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            counters: Arc::new(Counters::default()),
        }
    }

    pub(crate) fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }
}

impl Connector for MockConnector {
    type Session = MockSession;

    async fn connect(
        &self,
        _config: &SshConfig,
        responder: &dyn ChallengeResponder,
    ) -> Result<MockSession> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);

        let challenge = Challenge {
            prompt: "Password: ".to_string(),
            echo: false,
        };
        match self.behavior {
            Behavior::ConnectHangs => future::pending::<()>().await,
            Behavior::InteractiveUnavailable => {
                responder.answer(&challenge)?;
            }
            _ => {
                if let Ok(answer) = responder.answer(&challenge) {
                    self.counters.challenge_answers.lock().unwrap().push(answer);
                }
            }
        }

        let (signal, watch) = connection_watch();
        Ok(MockSession {
            behavior: self.behavior.clone(),
            counters: self.counters.clone(),
            signal: Arc::new(signal),
            watch,
        })
    }
}

pub(crate) struct MockSession {
    behavior: Behavior,
    counters: Arc<Counters>,
    signal: Arc<ConnectionSignal>,
    watch: ConnectionWatch,
}

impl RemoteSession for MockSession {
    type Channel = MockChannel;

    fn watch(&self) -> ConnectionWatch {
        self.watch.clone()
    }

    async fn open_file_channel(&mut self) -> Result<MockChannel> {
        if let Behavior::OpenFails = self.behavior {
            return Err(ChannelError::OpenFailed("subsystem request rejected".into()).into());
        }
        Ok(MockChannel {
            behavior: self.behavior.clone(),
            counters: self.counters.clone(),
            signal: self.signal.clone(),
        })
    }

    async fn close(self) -> Result<()> {
        self.counters.session_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct MockChannel {
    behavior: Behavior,
    counters: Arc<Counters>,
    signal: Arc<ConnectionSignal>,
}

impl FileChannel for MockChannel {
    async fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        self.counters.read_paths.lock().unwrap().push(path.to_string());
        match &self.behavior {
            Behavior::Succeed(data) => Ok(data.clone()),
            Behavior::ReadFails => Err(ChannelError::ReadFailed {
                path: path.to_string(),
                message: "No such file".into(),
            }
            .into()),
            Behavior::LostDuringRead => {
                self.signal.lost("connection reset by peer");
                future::pending().await
            }
            _ => future::pending().await,
        }
    }

    async fn close(self) -> Result<()> {
        self.counters.channel_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
