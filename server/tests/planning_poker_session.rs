use std::{collections::BTreeMap, net::SocketAddr, sync::Arc, time::Duration};

use comms::{
    command::{
        ClearVotesCommand, CreateRoomCommand, GetActiveRoomsCommand, JoinRoomCommand,
        KickUserCommand, QuitCommand, RevealVotesCommand, UserCommand, VoteCommand,
    },
    event::{self, Event},
    transport::{
        self,
        client::{CommandWriter, EventStream},
    },
};
use poker_server::{coordinator::RoomCoordinator, registry::SessionRegistry};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::broadcast,
    task::JoinHandle,
};
use tokio_stream::StreamExt;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

struct TestServer {
    addr: SocketAddr,
    coordinator: Arc<RoomCoordinator>,
    quit_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let coordinator = Arc::new(RoomCoordinator::new(SessionRegistry::new()));
        let (quit_tx, quit_rx) = broadcast::channel(1);
        let handle = tokio::spawn(poker_server::serve(listener, coordinator.clone(), quit_rx));

        TestServer {
            addr,
            coordinator,
            quit_tx,
            handle,
        }
    }

    async fn stop(self) {
        self.quit_tx.send(()).unwrap();
        tokio::time::timeout(EVENT_TIMEOUT, self.handle)
            .await
            .expect("server did not shut down")
            .unwrap();
    }
}

struct TestClient {
    id: String,
    events: EventStream,
    commands: CommandWriter,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        Self::from_stream(TcpStream::connect(addr).await.unwrap()).await
    }

    async fn from_stream(stream: TcpStream) -> Self {
        let (mut events, commands) = transport::client::split_tcp_stream(stream);

        let id = match next_event(&mut events).await {
            Event::Connected(event::ConnectedReplyEvent { participant_id }) => participant_id,
            other => panic!("expected a connected event, got {:?}", other),
        };

        TestClient {
            id,
            events,
            commands,
        }
    }

    async fn send(&mut self, command: UserCommand) {
        self.commands.write(&command).await.unwrap();
    }

    /// Read until the server closes the stream, panics on timeout
    async fn expect_closed(&mut self) {
        loop {
            let item = tokio::time::timeout(EVENT_TIMEOUT, self.events.next())
                .await
                .expect("session did not close");
            if item.is_none() {
                return;
            }
        }
    }

    async fn next(&mut self) -> Event {
        next_event(&mut self.events).await
    }

    /// Skip events until one matches, panics on timeout
    async fn expect<F: Fn(&Event) -> bool>(&mut self, predicate: F) -> Event {
        loop {
            let event = self.next().await;
            if predicate(&event) {
                return event;
            }
        }
    }
}

async fn next_event(events: &mut EventStream) -> Event {
    tokio::time::timeout(EVENT_TIMEOUT, events.next())
        .await
        .expect("timed out waiting for an event")
        .expect("server closed the connection")
        .expect("could not parse event")
}

fn create(room: &str) -> UserCommand {
    UserCommand::CreateRoom(CreateRoomCommand { room: room.into() })
}

fn join(room: &str) -> UserCommand {
    UserCommand::JoinRoom(JoinRoomCommand { room: room.into() })
}

fn vote(room: &str, vote: &str) -> UserCommand {
    UserCommand::Vote(VoteCommand {
        room: room.into(),
        vote: vote.into(),
    })
}

#[tokio::test]
async fn test_create_join_vote_reveal_clear() {
    let server = TestServer::start().await;
    let mut p1 = TestClient::connect(server.addr).await;
    let mut p2 = TestClient::connect(server.addr).await;
    assert_ne!(p1.id, p2.id);

    p1.send(create("sprint1")).await;
    assert_eq!(
        p1.next().await,
        Event::RoomCreated(event::RoomCreatedReplyEvent {
            room: "sprint1".into()
        })
    );
    p1.expect(|e| matches!(e, Event::UserList(_))).await;

    p2.send(join("sprint1")).await;
    assert_eq!(
        p2.expect(|e| matches!(e, Event::JoinRoomResult(_))).await,
        Event::JoinRoomResult(event::JoinRoomReplyEvent {
            room: "sprint1".into(),
            success: true,
            error: None,
        })
    );
    match p1.next().await {
        Event::UserJoined(notice) => assert_eq!(notice.user_id, p2.id),
        other => panic!("expected user joined, got {:?}", other),
    }
    p1.expect(|e| matches!(e, Event::UserList(_))).await;

    p1.send(vote("sprint1", "5")).await;
    p2.send(vote("sprint1", "8")).await;
    p1.expect(|e| matches!(e, Event::NewVote(n) if n.user_id == p2.id))
        .await;

    p1.send(UserCommand::RevealVotes(RevealVotesCommand {
        room: "sprint1".into(),
    }))
    .await;
    let expected = Event::VotesRevealed(event::VotesRevealedBroadcastEvent {
        room: "sprint1".into(),
        votes: BTreeMap::from([(p1.id.clone(), "5".into()), (p2.id.clone(), "8".into())]),
    });
    assert_eq!(
        p1.expect(|e| matches!(e, Event::VotesRevealed(_))).await,
        expected
    );
    assert_eq!(
        p2.expect(|e| matches!(e, Event::VotesRevealed(_))).await,
        expected
    );

    // a non admin can not clear
    p2.send(UserCommand::ClearVotes(ClearVotesCommand {
        room: "sprint1".into(),
    }))
    .await;
    assert_eq!(p2.next().await, Event::error("Only the admin can clear votes"));

    p1.send(UserCommand::ClearVotes(ClearVotesCommand {
        room: "sprint1".into(),
    }))
    .await;
    p2.expect(|e| matches!(e, Event::VotesCleared(_))).await;

    server.stop().await;
}

#[tokio::test]
async fn test_admin_disconnect_hands_over_and_last_leave_deletes_room() {
    let server = TestServer::start().await;
    let mut a = TestClient::connect(server.addr).await;
    let mut b = TestClient::connect(server.addr).await;

    a.send(create("retro")).await;
    a.expect(|e| matches!(e, Event::UserList(_))).await;
    b.send(join("retro")).await;
    b.expect(|e| matches!(e, Event::JoinRoomResult(_))).await;

    drop(a);

    assert_eq!(
        b.expect(|e| matches!(e, Event::AdminAssigned(_))).await,
        Event::AdminAssigned(event::AdminAssignedBroadcastEvent {
            room: "retro".into(),
            user_id: b.id.clone(),
        })
    );
    assert_eq!(
        b.next().await,
        Event::UserCount(event::UserCountBroadcastEvent {
            room: "retro".into(),
            count: 1,
        })
    );
    assert_eq!(
        b.next().await,
        Event::UserList(event::UserListBroadcastEvent {
            room: "retro".into(),
            users: vec![b.id.clone()],
        })
    );

    b.send(UserCommand::Quit(QuitCommand)).await;
    b.expect_closed().await;

    let mut c = TestClient::connect(server.addr).await;
    c.send(UserCommand::GetActiveRooms(GetActiveRoomsCommand))
        .await;
    assert_eq!(
        c.next().await,
        Event::ActiveRooms(event::ActiveRoomsReplyEvent { rooms: vec![] })
    );
    assert!(server
        .coordinator
        .inspect(|registry| registry.list_room_ids())
        .await
        .is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_cleans_up_every_session() {
    let server = TestServer::start().await;
    let mut admin = TestClient::connect(server.addr).await;
    let mut guest = TestClient::connect(server.addr).await;

    admin.send(create("standup")).await;
    admin.expect(|e| matches!(e, Event::UserList(_))).await;
    guest.send(join("standup")).await;
    guest
        .expect(|e| matches!(e, Event::JoinRoomResult(_)))
        .await;

    let coordinator = server.coordinator.clone();
    server.stop().await;

    assert!(coordinator
        .inspect(|registry| registry.list_room_ids())
        .await
        .is_empty());
    // cleanup already ran for both, a second disconnect does nothing
    assert!(!coordinator.disconnect(&admin.id).await);
    assert!(!coordinator.disconnect(&guest.id).await);

    admin.expect_closed().await;
    guest.expect_closed().await;
}

#[tokio::test]
async fn test_kicked_participant_is_notified_and_removed() {
    let server = TestServer::start().await;
    let mut admin = TestClient::connect(server.addr).await;
    let mut guest = TestClient::connect(server.addr).await;

    admin.send(create("x")).await;
    admin.expect(|e| matches!(e, Event::UserList(_))).await;
    guest.send(join("x")).await;
    guest
        .expect(|e| matches!(e, Event::JoinRoomResult(_)))
        .await;

    admin
        .send(UserCommand::KickUser(KickUserCommand {
            room: "x".into(),
            user_id: admin.id.clone(),
        }))
        .await;
    admin
        .expect(|e| *e == Event::error("Admin cannot kick itself"))
        .await;

    admin
        .send(UserCommand::KickUser(KickUserCommand {
            room: "x".into(),
            user_id: guest.id.clone(),
        }))
        .await;
    assert_eq!(
        guest.next().await,
        Event::Kicked(event::KickedReplyEvent {
            room: "x".into(),
            message: "You have been kicked from the room".into(),
        })
    );
    assert_eq!(
        admin.expect(|e| matches!(e, Event::UserList(_))).await,
        Event::UserList(event::UserListBroadcastEvent {
            room: "x".into(),
            users: vec![admin.id.clone()],
        })
    );

    // the kicked participant is no longer a voter
    guest.send(vote("x", "3")).await;
    assert_eq!(guest.next().await, Event::error("You are not in this room"));

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_frame_is_answered_and_session_continues() {
    let server = TestServer::start().await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(b"{\"_ct\":\"dance\"}\r\n").await.unwrap();
    let mut client = TestClient::from_stream(stream).await;

    assert_eq!(client.next().await, Event::error("Invalid command"));

    client.send(create("ok")).await;
    assert_eq!(
        client.next().await,
        Event::RoomCreated(event::RoomCreatedReplyEvent { room: "ok".into() })
    );

    server.stop().await;
}
