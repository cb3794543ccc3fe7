//! Room-based WebSocket chat server.
//!
//! Clients connect to `/ws/chat/{room}` and receive the room's recent history,
//! presence notifications and every chat message posted to the room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin banter-server
//! cargo run --bin banter-server -- --host 0.0.0.0 --port 3000 \
//!     --principals config/principals.example.json --data-dir ./data
//! ```

use std::{path::PathBuf, sync::Arc};

use banter_server::{
    domain::{AuthStrategy, Authenticator, MessageStore},
    infrastructure::{
        auth::{PrincipalDirectory, QueryTokenStrategy, SessionCookieStrategy},
        message_pusher::BroadcastEngine,
        repository::{FileMessageStore, InMemoryMessageStore, InMemoryRoomRegistry},
    },
    ui::Server,
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, GetHistoryUseCase, GetRoomsUseCase,
        SendMessageUseCase,
    },
};
use banter_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "banter-server")]
#[command(about = "Room-based WebSocket chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Number of recent messages replayed to a joining session
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u16).range(1..))]
    history_limit: u16,

    /// Capacity of each session's outbound queue
    #[arg(long, default_value = "256", value_parser = clap::value_parser!(u16).range(1..))]
    outbound_buffer: u16,

    /// JSON file describing known principals and their credentials
    #[arg(long)]
    principals: Option<PathBuf>,

    /// Directory for persisted messages (in memory when omitted)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Clock, principal directory and message store
    // 2. Room registry and broadcast engine
    // 3. Authenticator
    // 4. UseCases
    // 5. Server

    // 1. Clock, principal directory and message store
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let directory = match &args.principals {
        Some(path) => match PrincipalDirectory::load(path).await {
            Ok(directory) => directory,
            Err(e) => {
                tracing::error!("Failed to load principals from {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No principals file given; every connection will be refused");
            PrincipalDirectory::default()
        }
    };
    tracing::info!("{} bearer token(s) known", directory.token_count());
    let directory = Arc::new(directory);

    let store: Arc<dyn MessageStore> = match &args.data_dir {
        Some(dir) => match FileMessageStore::open(dir, clock.clone()).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!("Failed to open message store at {}: {}", dir.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("Messages are kept in memory only");
            Arc::new(InMemoryMessageStore::new(clock.clone()))
        }
    };

    // 2. Room registry and broadcast engine
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let message_pusher = Arc::new(BroadcastEngine::new(registry.clone()));

    // 3. Authenticator: bearer token first, then the server-side session cookie
    let strategies: Vec<Arc<dyn AuthStrategy>> = vec![
        Arc::new(QueryTokenStrategy::new(directory.clone())),
        Arc::new(SessionCookieStrategy::new(directory)),
    ];
    let authenticator = Arc::new(Authenticator::new(strategies));

    // 4. UseCases
    let history_limit = usize::from(args.history_limit);
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        authenticator.clone(),
        registry.clone(),
        store.clone(),
        message_pusher.clone(),
        clock.clone(),
        history_limit,
        usize::from(args.outbound_buffer),
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        clock,
    ));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(store.clone(), message_pusher));
    let get_history_usecase = Arc::new(GetHistoryUseCase::new(store, history_limit));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(registry));

    // 5. Create and run the server
    let server = Server::new(
        connect_session_usecase,
        disconnect_session_usecase,
        send_message_usecase,
        get_history_usecase,
        get_rooms_usecase,
        authenticator,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
