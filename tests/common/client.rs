//! Test relay client.
//!
//! A buffered JSON-line client that can send commands under its assigned
//! nickname and assert on received frames.

#![allow(dead_code)]

use std::time::Duration;

use anyhow::Context as _;
use jrc_proto::{Command, Frame, NEW_USER};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A test client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    /// Nickname currently held, updated on rename.
    pub nick: String,
}

impl TestClient {
    /// Connect and consume the `NEWUSER` greeting that assigns a nickname.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();

        let mut client = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            nick: String::new(),
        };

        let greeting = client.recv().await.context("no greeting")?;
        match greeting {
            Frame::Command(frame) if frame.src == NEW_USER => match frame.command {
                Command::Nick { update } => client.nick = update,
                other => anyhow::bail!("greeting was not a nick command: {other:?}"),
            },
            other => anyhow::bail!("unexpected greeting: {other:?}"),
        }

        Ok(client)
    }

    /// Send a raw line (terminator appended when missing).
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Send a command under the current nickname.
    pub async fn send(&mut self, command: Command) -> anyhow::Result<()> {
        let frame = Frame::command(self.nick.clone(), command);
        self.send_raw(&frame.to_json()?).await
    }

    /// Receive a single frame.
    pub async fn recv(&mut self) -> anyhow::Result<Frame> {
        self.recv_timeout(Duration::from_secs(15)).await
    }

    /// Receive a frame with a timeout. EOF is an error here; use
    /// [`TestClient::recv_eof`] when the connection is expected to close.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Frame> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        Frame::parse(line.trim_end()).map_err(|e| anyhow::anyhow!("parse error: {e}"))
    }

    /// Assert the peer closes the connection without further frames.
    pub async fn recv_eof(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(15), self.reader.read_line(&mut line)).await??;
        if n != 0 {
            anyhow::bail!("expected EOF, got: {line:?}");
        }
        Ok(())
    }

    /// Receive frames until the predicate matches, returning everything
    /// seen. Broker pings are answered along the way so long waits do not
    /// get this client evicted.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<Frame>>
    where
        F: FnMut(&Frame) -> bool,
    {
        let mut frames = Vec::new();
        loop {
            let frame = self.recv().await?;
            if let Frame::Command(command_frame) = &frame {
                if let Command::Ping { msg } = &command_frame.command {
                    let pong = Command::Pong { msg: msg.clone() };
                    self.send(pong).await?;
                    continue;
                }
            }
            let done = predicate(&frame);
            frames.push(frame);
            if done {
                return Ok(frames);
            }
        }
    }

    /// Receive the next frame that is not a broker ping (pings are
    /// answered transparently).
    pub async fn recv_frame(&mut self) -> anyhow::Result<Frame> {
        let mut frames = self.recv_until(|_| true).await?;
        frames.pop().context("no frame received")
    }

    /// Join a channel.
    pub async fn join(&mut self, channel: &str) -> anyhow::Result<()> {
        self.send(Command::Join {
            channels: vec![channel.to_string()],
        })
        .await
    }

    /// Join a channel and consume its announcement + names burst.
    pub async fn join_and_drain(&mut self, channel: &str) -> anyhow::Result<()> {
        self.join(channel).await?;
        // join announcement, then names chunks ending with the empty
        // terminator.
        self.recv_until(|frame| {
            matches!(
                frame,
                Frame::Reply(reply) if matches!(
                    &reply.reply,
                    jrc_proto::Reply::Names { names, .. } if names.is_empty()
                )
            )
        })
        .await?;
        Ok(())
    }

    /// Send a message to targets.
    pub async fn msg(&mut self, targets: &[&str], text: &str) -> anyhow::Result<()> {
        self.send(Command::Msg {
            targets: targets.iter().map(|t| t.to_string()).collect(),
            msg: text.to_string(),
        })
        .await
    }

    /// Send quit.
    pub async fn quit(&mut self, reason: &str) -> anyhow::Result<()> {
        self.send(Command::Quit {
            msg: reason.to_string(),
        })
        .await
    }
}
