//! TCP Transport Terminal
//!
//! Built-in terminal variant that opens a plain TCP connection to the host.
//! Screen decoding for the protocol tag happens elsewhere; this type only
//! owns the transport lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::{SessionId, Terminal};
use crate::error::{Error, Result};

/// Terminal session over an unencrypted TCP stream
#[derive(Debug)]
pub struct TcpTerminal {
    id: SessionId,
    protocol: String,
    connect_timeout: Duration,
    stream: Mutex<Option<TcpStream>>,
    connected: AtomicBool,
}

impl TcpTerminal {
    pub fn new(protocol: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            id: SessionId::new(),
            protocol: protocol.into(),
            connect_timeout,
            stream: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Terminal for TcpTerminal {
    fn id(&self) -> SessionId {
        self.id
    }

    fn protocol_type(&self) -> &str {
        &self.protocol
    }

    async fn connect(&self, address: &str, port: u16, use_encryption: bool) -> Result<()> {
        if use_encryption {
            return Err(Error::EncryptionUnsupported {
                protocol: self.protocol.clone(),
            });
        }

        let target = format!("{}:{}", address, port);
        debug!("Session {} opening {} to {}", self.id, self.protocol, target);

        let stream = match timeout(self.connect_timeout, TcpStream::connect((address, port))).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(Error::ConnectionFailed {
                    host: target,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(Error::ConnectionFailed {
                    host: target,
                    reason: format!("timed out after {:?}", self.connect_timeout),
                })
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Session {} could not disable Nagle: {}", self.id, e);
        }

        *self.stream.lock().await = Some(stream);
        self.connected.store(true, Ordering::SeqCst);
        info!("Session {} connected to {}", self.id, target);
        Ok(())
    }

    async fn disconnect(&self) {
        let stream = self.stream.lock().await.take();
        self.connected.store(false, Ordering::SeqCst);

        if let Some(mut stream) = stream {
            if let Err(e) = stream.shutdown().await {
                debug!("Session {} shutdown error ignored: {}", self.id, e);
            }
            info!("Session {} disconnected", self.id);
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
