use std::{fs, io::ErrorKind, os::unix::fs::FileTypeExt, path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{UnixListener, UnixStream},
    signal::unix::{SignalKind, signal},
    sync::{Mutex, mpsc},
};
use validator::Validate;

use crate::{
    config::ServerConfig,
    protocol::{CageView, ClientRequest, DinosaurView, ServerReply, error_body, parse_client_request},
    warden::{Warden, WardenError},
};

enum ExitReason {
    SocketMessage,
    Signal(&'static str),
}

pub async fn run(config: &ServerConfig, warden: Arc<Mutex<Warden>>) -> Result<()> {
    prepare_socket_path(&config.socket_path)?;
    let listener = UnixListener::bind(&config.socket_path).with_context(|| {
        format!("unable to bind socket {}", config.socket_path.display())
    })?;

    let mut sigint =
        signal(SignalKind::interrupt()).context("unable to listen for SIGINT (Ctrl+C)")?;
    let mut sigterm = signal(SignalKind::terminate()).context("unable to listen for SIGTERM")?;
    let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel::<()>();

    tracing::info!(
        target: "server",
        socket_path = %config.socket_path.display(),
        "facility listening on unix socket (NDJSON)"
    );

    let exit_reason = loop {
        tokio::select! {
            _ = sigint.recv() => break ExitReason::Signal("SIGINT"),
            _ = sigterm.recv() => break ExitReason::Signal("SIGTERM"),
            Some(()) = shutdown_rx.recv() => break ExitReason::SocketMessage,
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, _)) => {
                        let warden = Arc::clone(&warden);
                        let shutdown = shutdown_tx.clone();
                        tokio::spawn(async move {
                            if let Err(err) = handle_client(stream, warden, shutdown).await {
                                tracing::warn!(
                                    target: "server",
                                    error = %format!("{err:#}"),
                                    "client handling failed"
                                );
                            }
                        });
                    }
                    Err(err) => tracing::warn!(target: "server", error = %err, "accept failed"),
                }
            }
        }
    };

    cleanup_socket_path(&config.socket_path)?;
    match exit_reason {
        ExitReason::SocketMessage => {
            tracing::info!(target: "server", "facility stopped: received exit message");
        }
        ExitReason::Signal(signal_name) => {
            tracing::info!(target: "server", signal = signal_name, "facility stopped on signal");
        }
    }

    Ok(())
}

async fn handle_client(
    stream: UnixStream,
    warden: Arc<Mutex<Warden>>,
    shutdown_tx: mpsc::UnboundedSender<()>,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match parse_client_request(line) {
            Ok(ClientRequest::Exit) => {
                let _ = shutdown_tx.send(());
                return Ok(());
            }
            Ok(request) => dispatch(&warden, request).await,
            Err(err) => ServerReply::invalid_request(err.to_string()),
        };

        let mut encoded = serde_json::to_vec(&reply).context("unable to encode reply")?;
        encoded.push(b'\n');
        write_half.write_all(&encoded).await?;
    }

    Ok(())
}

async fn dispatch(warden: &Arc<Mutex<Warden>>, request: ClientRequest) -> ServerReply {
    match request {
        ClientRequest::CreateCage(request) => {
            if let Err(err) = request.validate() {
                return ServerReply::invalid_request(err.to_string());
            }
            let mut warden = warden.lock().await;
            match warden.create_cage(request.capacity, request.power_status) {
                Ok(cage) => ServerReply::Cage {
                    cage: CageView::from_records(&cage, &[]),
                },
                Err(err) => reply_error(&err),
            }
        }
        ClientRequest::GetCage(request) => {
            let warden = warden.lock().await;
            match warden.cage(&request.cage_id) {
                Ok((cage, occupants)) => ServerReply::Cage {
                    cage: CageView::from_records(&cage, &occupants),
                },
                Err(err) => reply_error(&err),
            }
        }
        ClientRequest::ListCages(request) => {
            let warden = warden.lock().await;
            let cages = warden
                .cages(&request.filtered_power_status)
                .iter()
                .map(|(cage, occupants)| CageView::from_records(cage, occupants))
                .collect();
            ServerReply::Cages { cages }
        }
        ClientRequest::SetCagePower(request) => {
            let mut warden = warden.lock().await;
            match warden.set_cage_power(&request.cage_id, request.power_status) {
                Ok((cage, occupants)) => ServerReply::Cage {
                    cage: CageView::from_records(&cage, &occupants),
                },
                Err(err) => reply_error(&err),
            }
        }
        ClientRequest::DeleteCage(request) => {
            let mut warden = warden.lock().await;
            match warden.delete_cage(&request.cage_id) {
                Ok(()) => ServerReply::CageDeleted,
                Err(err) => reply_error(&err),
            }
        }
        ClientRequest::AddDinosaur(request) => {
            if let Err(err) = request.validate() {
                return ServerReply::invalid_request(err.to_string());
            }
            let mut warden = warden.lock().await;
            match warden.admit_dinosaur(&request.name, &request.species, &request.cage_id) {
                Ok(dinosaur) => ServerReply::Dinosaur {
                    dinosaur: DinosaurView::from_record(&dinosaur),
                },
                Err(err) => reply_error(&err),
            }
        }
        ClientRequest::GetDinosaur(request) => {
            let warden = warden.lock().await;
            match warden.dinosaur(&request.dinosaur_id) {
                Ok(dinosaur) => ServerReply::Dinosaur {
                    dinosaur: DinosaurView::from_record(&dinosaur),
                },
                Err(err) => reply_error(&err),
            }
        }
        ClientRequest::ListDinosaurs(request) => {
            let warden = warden.lock().await;
            let dinosaurs = warden
                .dinosaurs(&request.filtered_species)
                .iter()
                .map(DinosaurView::from_record)
                .collect();
            ServerReply::Dinosaurs { dinosaurs }
        }
        ClientRequest::MoveDinosaur(request) => {
            let mut warden = warden.lock().await;
            match warden.move_dinosaur(&request.dinosaur_id, &request.cage_id) {
                Ok(dinosaur) => ServerReply::Dinosaur {
                    dinosaur: DinosaurView::from_record(&dinosaur),
                },
                Err(err) => reply_error(&err),
            }
        }
        ClientRequest::RemoveDinosaur(request) => {
            let mut warden = warden.lock().await;
            match warden.remove_dinosaur(&request.dinosaur_id) {
                Ok(()) => ServerReply::DinosaurRemoved,
                Err(err) => reply_error(&err),
            }
        }
        ClientRequest::Exit => ServerReply::invalid_request("exit is handled per connection"),
    }
}

fn reply_error(err: &WardenError) -> ServerReply {
    ServerReply::Error {
        error: error_body(err),
    }
}

fn prepare_socket_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create {}", parent.display()))?;
    }

    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            if metadata.file_type().is_socket() || metadata.is_file() {
                fs::remove_file(path)
                    .with_context(|| format!("unable to remove stale socket {}", path.display()))?;
            } else {
                bail!(
                    "socket path exists but is not removable as file/socket: {}",
                    path.display()
                );
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("unable to inspect {}", path.display()));
        }
    }

    Ok(())
}

fn cleanup_socket_path(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("unable to remove {}", path.display())),
    }
}
