//! IPC client

use frontdesk_api::{Command, Event, Request, Response, ResponsePayload, ResponseResult};
use std::collections::VecDeque;
use std::path::Path;
use tokio::io::BufReader;
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tracing::trace;

use crate::{codec, IpcError, IpcResult};

/// Anything the service writes to a client
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Incoming {
    Response(Response),
    Event(Event),
}

/// Connection to frontdeskd
pub struct IpcClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    next_request_id: u64,
    /// Events that arrived while waiting for a response
    pending_events: VecDeque<Event>,
}

impl IpcClient {
    pub async fn connect(socket_path: impl AsRef<Path>) -> IpcResult<Self> {
        let stream = UnixStream::connect(socket_path).await?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            next_request_id: 1,
            pending_events: VecDeque::new(),
        })
    }

    /// Send a command and wait for its response
    pub async fn send(&mut self, command: Command) -> IpcResult<Response> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        codec::write_message(&mut self.writer, &Request::new(request_id, command)).await?;

        loop {
            match codec::read_message::<_, Incoming>(&mut self.reader).await? {
                Incoming::Response(response) if response.request_id == request_id => {
                    return Ok(response);
                }
                Incoming::Response(stale) => {
                    trace!(request_id = stale.request_id, "Discarding stale response");
                }
                Incoming::Event(event) => self.pending_events.push_back(event),
            }
        }
    }

    /// Send a command and unwrap a successful payload
    pub async fn call(&mut self, command: Command) -> IpcResult<ResponsePayload> {
        match self.send(command).await?.result {
            ResponseResult::Ok(payload) => Ok(payload),
            ResponseResult::Err(e) => Err(IpcError::Rejected(e.message)),
        }
    }

    /// Subscribe and turn this connection into an event stream
    pub async fn subscribe(mut self) -> IpcResult<EventStream> {
        self.call(Command::SubscribeEvents).await?;

        Ok(EventStream {
            reader: self.reader,
            pending: self.pending_events,
            _writer: self.writer,
        })
    }
}

/// Stream of events from frontdeskd
pub struct EventStream {
    reader: BufReader<OwnedReadHalf>,
    pending: VecDeque<Event>,
    // Dropping the write half would half-close the socket.
    _writer: OwnedWriteHalf,
}

impl EventStream {
    /// Wait for the next event
    pub async fn next(&mut self) -> IpcResult<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(event);
        }

        loop {
            match codec::read_message::<_, Incoming>(&mut self.reader).await? {
                Incoming::Event(event) => return Ok(event),
                Incoming::Response(_) => continue,
            }
        }
    }
}
