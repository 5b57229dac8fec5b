//! IPC server
//!
//! One listener task accepts connections. Each connection gets a reader task
//! that forwards decoded requests to the service and a writer task that
//! drains that client's responses and, once it has subscribed, the event
//! broadcast.

use frontdesk_api::{ClientInfo, ClientRole, Event, Request, Response};
use frontdesk_util::ClientId;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::{codec, IpcError, IpcResult};

/// Capacity of the event broadcast; slow subscribers drop older events
const EVENT_CAPACITY: usize = 100;

/// Message from the server to the service loop
#[derive(Debug)]
pub enum ServerMessage {
    Request {
        client_id: ClientId,
        request: Request,
    },
    ClientConnected {
        client_id: ClientId,
        info: ClientInfo,
    },
    ClientDisconnected {
        client_id: ClientId,
    },
}

struct ClientHandle {
    info: ClientInfo,
    response_tx: mpsc::UnboundedSender<String>,
    subscribed: bool,
}

type ClientTable = Arc<RwLock<HashMap<ClientId, ClientHandle>>>;

pub struct IpcServer {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    clients: ClientTable,
    event_tx: broadcast::Sender<Event>,
    message_tx: mpsc::UnboundedSender<ServerMessage>,
    message_rx: Mutex<Option<mpsc::UnboundedReceiver<ServerMessage>>>,
}

impl IpcServer {
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            listener: None,
            clients: Arc::new(RwLock::new(HashMap::new())),
            event_tx,
            message_tx,
            message_rx: Mutex::new(Some(message_rx)),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Bind the socket, replacing any stale one left by a previous run
    pub async fn bind(&mut self) -> IpcResult<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }
        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        std::fs::set_permissions(&self.socket_path, std::fs::Permissions::from_mode(0o660))?;

        info!(path = %self.socket_path.display(), "IPC server listening");
        self.listener = Some(listener);
        Ok(())
    }

    /// Hand the service its end of the request channel. Only the first call
    /// gets it.
    pub async fn take_message_receiver(&self) -> Option<mpsc::UnboundedReceiver<ServerMessage>> {
        self.message_rx.lock().await.take()
    }

    /// Accept connections until the listener fails
    pub async fn run(&self) -> IpcResult<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| IpcError::NotBound(self.socket_path.display().to_string()))?;
        let own_uid = nix::unistd::getuid().as_raw();

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let uid = peer_uid(&stream);
                    let role = role_for_peer(uid, own_uid);

                    let mut info = ClientInfo::new(role);
                    if let Some(uid) = uid {
                        info = info.with_uid(uid);
                    }

                    self.attach(stream, info).await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    async fn attach(&self, stream: UnixStream, info: ClientInfo) {
        let client_id = info.client_id.clone();
        let (read_half, write_half) = stream.into_split();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = oneshot::channel();

        self.clients.write().await.insert(
            client_id.clone(),
            ClientHandle {
                info: info.clone(),
                response_tx,
                subscribed: false,
            },
        );

        debug!(client_id = %client_id, role = ?info.role, "Connection attached");
        let _ = self.message_tx.send(ServerMessage::ClientConnected {
            client_id: client_id.clone(),
            info,
        });

        tokio::spawn(read_requests(
            read_half,
            client_id.clone(),
            self.message_tx.clone(),
            closed_tx,
        ));
        tokio::spawn(write_outgoing(
            write_half,
            client_id,
            response_rx,
            closed_rx,
            self.event_tx.subscribe(),
            self.clients.clone(),
            self.message_tx.clone(),
        ));
    }

    /// Queue a response for one client. A vanished client is not an error.
    pub async fn send_response(&self, client_id: &ClientId, response: Response) -> IpcResult<()> {
        let line = codec::encode_line(&response)?;

        let clients = self.clients.read().await;
        if let Some(handle) = clients.get(client_id) {
            handle
                .response_tx
                .send(line)
                .map_err(|_| IpcError::ConnectionClosed)?;
        }
        Ok(())
    }

    /// Turn event delivery on or off for one client
    pub async fn set_subscribed(&self, client_id: &ClientId, subscribed: bool) {
        if let Some(handle) = self.clients.write().await.get_mut(client_id) {
            handle.subscribed = subscribed;
            debug!(client_id = %client_id, subscribed, "Subscription changed");
        }
    }

    /// Broadcast an event to all subscribed clients
    pub fn broadcast_event(&self, event: Event) {
        let _ = self.event_tx.send(event);
    }

    pub async fn client_info(&self, client_id: &ClientId) -> Option<ClientInfo> {
        self.clients
            .read()
            .await
            .get(client_id)
            .map(|h| h.info.clone())
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Remove the socket file
    pub fn shutdown(&self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn read_requests(
    read_half: OwnedReadHalf,
    client_id: ClientId,
    message_tx: mpsc::UnboundedSender<ServerMessage>,
    closed_tx: oneshot::Sender<()>,
) {
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        match codec::read_line(&mut reader, &mut line).await {
            Ok(Some(())) => match codec::decode_line::<Request>(&line) {
                Ok(request) => {
                    let _ = message_tx.send(ServerMessage::Request {
                        client_id: client_id.clone(),
                        request,
                    });
                }
                Err(e) => {
                    warn!(client_id = %client_id, error = %e, "Invalid request");
                }
            },
            Ok(None) => {
                debug!(client_id = %client_id, "Client disconnected (EOF)");
                break;
            }
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "Read error");
                break;
            }
        }
    }

    // Tells the writer to stop; it would otherwise idle on the broadcast.
    let _ = closed_tx.send(());
}

async fn write_outgoing(
    mut writer: OwnedWriteHalf,
    client_id: ClientId,
    mut response_rx: mpsc::UnboundedReceiver<String>,
    mut closed_rx: oneshot::Receiver<()>,
    mut event_rx: broadcast::Receiver<Event>,
    clients: ClientTable,
    message_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    use tokio::io::AsyncWriteExt;

    loop {
        tokio::select! {
            _ = &mut closed_rx => {
                // Flush whatever was already queued before letting go.
                while let Ok(line) = response_rx.try_recv() {
                    if writer.write_all(line.as_bytes()).await.is_err() {
                        break;
                    }
                }
                break;
            }

            response = response_rx.recv() => {
                let Some(line) = response else { break };
                if let Err(e) = writer.write_all(line.as_bytes()).await {
                    debug!(client_id = %client_id, error = %e, "Write error");
                    break;
                }
            }

            event = event_rx.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(
                            client_id = %client_id,
                            skipped,
                            "Subscriber lagging, events dropped"
                        );
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                let subscribed = clients
                    .read()
                    .await
                    .get(&client_id)
                    .is_some_and(|h| h.subscribed);
                if !subscribed {
                    continue;
                }

                if let Err(e) = codec::write_message(&mut writer, &event).await {
                    debug!(client_id = %client_id, error = %e, "Event write error");
                    break;
                }
            }
        }
    }

    clients.write().await.remove(&client_id);
    let _ = message_tx.send(ServerMessage::ClientDisconnected { client_id });
}

/// Root and the service's own user may administer; other local users drive
/// the board; unidentified peers only watch.
pub fn role_for_peer(peer_uid: Option<u32>, own_uid: u32) -> ClientRole {
    match peer_uid {
        Some(0) => ClientRole::Admin,
        Some(uid) if uid == own_uid => ClientRole::Admin,
        Some(_) => ClientRole::Shell,
        None => ClientRole::Observer,
    }
}

fn peer_uid(stream: &UnixStream) -> Option<u32> {
    use std::os::unix::io::AsFd;

    nix::sys::socket::getsockopt(&stream.as_fd(), nix::sys::socket::sockopt::PeerCredentials)
        .ok()
        .map(|cred| cred.uid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IpcClient;
    use frontdesk_api::{Command, EventPayload, ResponsePayload, ResponseResult};
    use tempfile::tempdir;

    #[test]
    fn test_roles_from_peer_uid() {
        assert_eq!(role_for_peer(Some(0), 1000), ClientRole::Admin);
        assert_eq!(role_for_peer(Some(1000), 1000), ClientRole::Admin);
        assert_eq!(role_for_peer(Some(1001), 1000), ClientRole::Shell);
        assert_eq!(role_for_peer(None, 1000), ClientRole::Observer);
    }

    #[tokio::test]
    async fn test_bind_creates_socket() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("nested").join("test.sock");

        let mut server = IpcServer::new(&socket_path);
        server.bind().await.unwrap();
        assert!(socket_path.exists());

        drop(server);
        assert!(!socket_path.exists());
    }

    #[tokio::test]
    async fn test_run_requires_bind() {
        let dir = tempdir().unwrap();
        let server = IpcServer::new(dir.path().join("test.sock"));
        assert!(matches!(server.run().await, Err(IpcError::NotBound(_))));
    }

    #[tokio::test]
    async fn test_request_response_and_events() {
        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let mut server = IpcServer::new(&socket_path);
        server.bind().await.unwrap();
        let server = Arc::new(server);
        let mut messages = server.take_message_receiver().await.unwrap();
        assert!(server.take_message_receiver().await.is_none());

        let accept = server.clone();
        tokio::spawn(async move { accept.run().await });

        // Minimal service loop: answer pings, honour subscriptions.
        let service = server.clone();
        tokio::spawn(async move {
            while let Some(message) = messages.recv().await {
                let ServerMessage::Request { client_id, request } = message else {
                    continue;
                };
                let payload = match request.command {
                    Command::SubscribeEvents => {
                        service.set_subscribed(&client_id, true).await;
                        ResponsePayload::Subscribed {
                            client_id: client_id.clone(),
                        }
                    }
                    _ => ResponsePayload::Pong,
                };
                let response = Response::success(request.request_id, payload);
                service.send_response(&client_id, response).await.unwrap();
            }
        });

        let mut client = IpcClient::connect(&socket_path).await.unwrap();
        let response = client.send(Command::Ping).await.unwrap();
        assert_eq!(response.request_id, 1);
        assert!(matches!(response.result, ResponseResult::Ok(ResponsePayload::Pong)));
        assert_eq!(server.client_count().await, 1);

        let mut events = client.subscribe().await.unwrap();
        server.broadcast_event(Event::new(EventPayload::Shutdown));

        let event = events.next().await.unwrap();
        assert!(matches!(event.payload, EventPayload::Shutdown));
    }

    #[tokio::test]
    async fn test_closed_clients_are_dropped_from_table() {
        use std::time::Duration;
        use tokio::time::timeout;

        let dir = tempdir().unwrap();
        let socket_path = dir.path().join("test.sock");

        let mut server = IpcServer::new(&socket_path);
        server.bind().await.unwrap();
        let server = Arc::new(server);
        let mut messages = server.take_message_receiver().await.unwrap();

        let accept = server.clone();
        tokio::spawn(async move { accept.run().await });

        let mut clients = Vec::new();
        for _ in 0..3 {
            clients.push(IpcClient::connect(&socket_path).await.unwrap());
            let message = timeout(Duration::from_secs(5), messages.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(message, ServerMessage::ClientConnected { .. }));
        }
        assert_eq!(server.client_count().await, 3);

        // None of them subscribed, so no event will ever wake their writers.
        drop(clients);

        let mut disconnected = 0;
        while disconnected < 3 {
            let message = timeout(Duration::from_secs(5), messages.recv())
                .await
                .unwrap()
                .unwrap();
            if matches!(message, ServerMessage::ClientDisconnected { .. }) {
                disconnected += 1;
            }
        }
        assert_eq!(server.client_count().await, 0);
    }
}
