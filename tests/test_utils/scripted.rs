//! Connector whose failures are scripted by the test.

use std::{
    io::{self, Write},
    sync::Arc,
};

use logentries::{ConnectionError, Connector};
use parking_lot::Mutex;

use super::shared_buffer::SharedBuf;

/// Failure plan shared between a test and its connector.
#[derive(Default)]
pub struct Script {
    /// Number of upcoming connection attempts to refuse.
    pub refuse_connects: usize,
    /// Number of upcoming frame writes to fail.
    pub fail_writes: usize,
    /// Number of upcoming flushes to fail.
    pub fail_flushes: usize,
    /// Successful connection attempts so far.
    pub connects: usize,
    /// Refused connection attempts so far.
    pub refused: usize,
}

/// In-memory connector writing every frame into a [`SharedBuf`].
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    pub script: Arc<Mutex<Script>>,
    pub sink: SharedBuf,
}

#[allow(dead_code)]
impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_connects(&self, count: usize) {
        self.script.lock().refuse_connects = count;
    }

    pub fn fail_writes(&self, count: usize) {
        self.script.lock().fail_writes = count;
    }

    pub fn fail_flushes(&self, count: usize) {
        self.script.lock().fail_flushes = count;
    }

    pub fn connects(&self) -> usize {
        self.script.lock().connects
    }

    pub fn refused(&self) -> usize {
        self.script.lock().refused
    }
}

impl Connector for ScriptedConnector {
    type Stream = ScriptedStream;

    fn connect(&mut self) -> Result<ScriptedStream, ConnectionError> {
        let mut script = self.script.lock();
        if script.refuse_connects > 0 {
            script.refuse_connects -= 1;
            script.refused += 1;
            return Err(ConnectionError::Connect {
                endpoint: self.endpoint(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        }
        script.connects += 1;
        Ok(ScriptedStream {
            script: Arc::clone(&self.script),
            sink: self.sink.clone(),
        })
    }

    fn endpoint(&self) -> String {
        "scripted:0".into()
    }
}

pub struct ScriptedStream {
    script: Arc<Mutex<Script>>,
    sink: SharedBuf,
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        {
            let mut script = self.script.lock();
            if script.fail_writes > 0 {
                script.fail_writes -= 1;
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
        }
        self.sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut script = self.script.lock();
        if script.fail_flushes > 0 {
            script.fail_flushes -= 1;
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        Ok(())
    }
}
