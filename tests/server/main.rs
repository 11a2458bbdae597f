use std::{path::Path, sync::Arc, time::Duration};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    sync::Mutex,
    time::{sleep, timeout},
};
use uuid::Uuid;

use paddock::{config::ServerConfig, server, warden::Warden};

async fn connect_with_retry(path: &Path) -> UnixStream {
    for _ in 0..200 {
        match UnixStream::connect(path).await {
            Ok(stream) => return stream,
            Err(_) => sleep(Duration::from_millis(10)).await,
        }
    }
    panic!("server did not come up on {}", path.display());
}

async fn next_reply(
    lines: &mut tokio::io::Lines<BufReader<tokio::net::unix::OwnedReadHalf>>,
) -> serde_json::Value {
    let line = timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("reply should arrive in time")
        .expect("socket read should succeed")
        .expect("connection should stay open");
    serde_json::from_str(&line).expect("reply should be json")
}

#[tokio::test]
async fn given_running_server_when_driving_the_protocol_then_replies_match() {
    let socket_path =
        std::env::temp_dir().join(format!("paddock-server-test-{}.sock", Uuid::now_v7()));
    let config = ServerConfig {
        socket_path: socket_path.clone(),
    };
    let warden = Arc::new(Mutex::new(Warden::new()));
    let server_task = tokio::spawn(async move { server::run(&config, warden).await });

    let stream = connect_with_retry(&socket_path).await;
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    write_half
        .write_all(b"{\"type\":\"create_cage\",\"capacity\":2,\"power_status\":\"ACTIVE\"}\n")
        .await
        .expect("request should be written");
    let reply = next_reply(&mut lines).await;
    assert_eq!(reply["type"], "cage");
    assert_eq!(reply["cage"]["capacity"], 2);
    assert_eq!(reply["cage"]["current_count"], 0);
    let cage_id = reply["cage"]["id"]
        .as_str()
        .expect("cage id should be a string")
        .to_string();

    let add = format!(
        "{{\"type\":\"add_dinosaur\",\"name\":\"Littlefoot\",\"species\":\"Brachiosaurus\",\"cage_id\":\"{cage_id}\"}}\n"
    );
    write_half
        .write_all(add.as_bytes())
        .await
        .expect("request should be written");
    let reply = next_reply(&mut lines).await;
    assert_eq!(reply["type"], "dinosaur");
    assert_eq!(reply["dinosaur"]["species"], "Brachiosaurus");
    assert_eq!(reply["dinosaur"]["type"], "HERBIVORE");
    assert_eq!(reply["dinosaur"]["cage_id"], cage_id.as_str());

    let add_carnivore = format!(
        "{{\"type\":\"add_dinosaur\",\"name\":\"Rexy\",\"species\":\"Tyrannosaurus\",\"cage_id\":\"{cage_id}\"}}\n"
    );
    write_half
        .write_all(add_carnivore.as_bytes())
        .await
        .expect("request should be written");
    let reply = next_reply(&mut lines).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["error"]["code"], "herbivore_carnivore_conflict");

    write_half
        .write_all(b"not json at all\n")
        .await
        .expect("request should be written");
    let reply = next_reply(&mut lines).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["error"]["code"], "invalid_request");

    write_half
        .write_all(b"{\"type\":\"exit\"}\n")
        .await
        .expect("request should be written");

    let run_result = timeout(Duration::from_secs(5), server_task)
        .await
        .expect("server should stop after exit")
        .expect("server task should join");
    run_result.expect("server should stop cleanly");
    assert!(!socket_path.exists(), "socket should be cleaned up");
}

#[tokio::test]
async fn given_deletion_of_occupied_cage_then_conflict_code_is_returned() {
    let socket_path =
        std::env::temp_dir().join(format!("paddock-server-test-{}.sock", Uuid::now_v7()));
    let config = ServerConfig {
        socket_path: socket_path.clone(),
    };
    let warden = Arc::new(Mutex::new(Warden::new()));
    let server_task = tokio::spawn(async move { server::run(&config, warden).await });

    let stream = connect_with_retry(&socket_path).await;
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    write_half
        .write_all(b"{\"type\":\"create_cage\",\"capacity\":1,\"power_status\":\"ACTIVE\"}\n")
        .await
        .expect("request should be written");
    let reply = next_reply(&mut lines).await;
    let cage_id = reply["cage"]["id"]
        .as_str()
        .expect("cage id should be a string")
        .to_string();

    let add = format!(
        "{{\"type\":\"add_dinosaur\",\"name\":\"Blue\",\"species\":\"Velociraptor\",\"cage_id\":\"{cage_id}\"}}\n"
    );
    write_half
        .write_all(add.as_bytes())
        .await
        .expect("request should be written");
    let reply = next_reply(&mut lines).await;
    assert_eq!(reply["type"], "dinosaur");
    let dinosaur_id = reply["dinosaur"]["id"]
        .as_str()
        .expect("dinosaur id should be a string")
        .to_string();

    let delete = format!("{{\"type\":\"delete_cage\",\"cage_id\":\"{cage_id}\"}}\n");
    write_half
        .write_all(delete.as_bytes())
        .await
        .expect("request should be written");
    let reply = next_reply(&mut lines).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["error"]["code"], "cage_occupied");

    let remove = format!("{{\"type\":\"remove_dinosaur\",\"dinosaur_id\":\"{dinosaur_id}\"}}\n");
    write_half
        .write_all(remove.as_bytes())
        .await
        .expect("request should be written");
    let reply = next_reply(&mut lines).await;
    assert_eq!(reply["type"], "dinosaur_removed");

    let delete = format!("{{\"type\":\"delete_cage\",\"cage_id\":\"{cage_id}\"}}\n");
    write_half
        .write_all(delete.as_bytes())
        .await
        .expect("request should be written");
    let reply = next_reply(&mut lines).await;
    assert_eq!(reply["type"], "cage_deleted");

    write_half
        .write_all(b"{\"type\":\"exit\"}\n")
        .await
        .expect("request should be written");
    let run_result = timeout(Duration::from_secs(5), server_task)
        .await
        .expect("server should stop after exit")
        .expect("server task should join");
    run_result.expect("server should stop cleanly");
}
