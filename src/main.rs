use std::error::Error;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use duelboard::config::AppConfig;
use duelboard::engine::board::Board;
use duelboard::engine::types::{SessionError, Side, Square};
use duelboard::server::cleanup::spawn_cleanup;
use duelboard::server::router::create_router;
use duelboard::server::state::ServerState;
use duelboard::session::platform;
use duelboard::session::render::RenderSink;
use duelboard::session::{Mode, RuntimeOptions, Session, SessionEvent, SessionInit, SessionRuntime};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Handle --health-check flag for Docker HEALTHCHECK (works in scratch image).
    if std::env::args().any(|a| a == "--health-check") {
        match health_check().await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Health check failed: {e}");
                std::process::exit(1);
            }
        }
    }

    // Initialize tracing (structured logging).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duelboard=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("serve") {
        serve(config).await
    } else {
        play(config, &args).await
    }
}

/// Run the authoritative server.
async fn serve(config: AppConfig) -> Result<(), Box<dyn Error>> {
    let bind_addr = config.bind_addr();
    let state = ServerState::new(config);
    let _cleanup = spawn_cleanup(state.clone());
    let app = create_router(state);

    tracing::info!(
        "duelboard v{} serving on {bind_addr}",
        env!("CARGO_PKG_VERSION")
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Play one game in the terminal.
async fn play(config: AppConfig, args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut init = SessionInit::generate(config.game_type);
    if let Some(id) = flag(args, "--game") {
        init.game_id = id;
    }
    if let Some(id) = flag(args, "--player") {
        init.player_id = id;
    }

    let vs_bot = config.vs_bot || args.iter().any(|a| a == "--bot");
    let url = flag(args, "--url").unwrap_or_else(|| config.server_url.clone());

    println!("game {} ({}), player {}", init.game_id, init.variant, init.player_id);
    println!("enter squares as `e2` or `6 4`, `resign` or `quit`");

    let session = Session::new(
        init,
        Box::new(TerminalSink),
        platform::detect(config.platform),
    );
    let mut runtime = SessionRuntime::new(session, RuntimeOptions::from_config(&config));
    spawn_input(runtime.events());

    if vs_bot {
        runtime.start_local(Mode::VsBot, Side::White);
    } else {
        runtime.start_remote(&url).await;
    }

    let session = runtime.run().await;
    for line in session.history().notation_lines() {
        println!("{line}");
    }
    Ok(())
}

fn flag(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1).cloned())
}

/// Forward stdin lines into the session queue.
fn spawn_input(events: mpsc::UnboundedSender<SessionEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let parsed = parse_input(&line);
            if parsed.is_empty() && !line.trim().is_empty() {
                eprintln!("?? {}", line.trim());
            }
            for event in parsed {
                if events.send(event).is_err() {
                    return;
                }
            }
        }
        let _ = events.send(SessionEvent::Exit);
    });
}

/// One input line → session events. `e2 e4` selects and moves in one go.
fn parse_input(line: &str) -> Vec<SessionEvent> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "" => return Vec::new(),
        "quit" | "exit" | "q" => return vec![SessionEvent::Exit],
        "resign" => return vec![SessionEvent::Resign],
        _ => {}
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    // Numeric form: "row col".
    if let [row, col] = tokens.as_slice()
        && let (Ok(row), Ok(col)) = (row.parse::<i32>(), col.parse::<i32>())
    {
        return vec![SessionEvent::SquareClicked { row, col }];
    }

    let squares: Option<Vec<Square>> = tokens.iter().map(|t| Square::from_algebraic(t)).collect();
    squares
        .unwrap_or_default()
        .into_iter()
        .map(|sq| SessionEvent::SquareClicked {
            row: sq.row() as i32,
            col: sq.col() as i32,
        })
        .collect()
}

/// Render sink that prints to the terminal.
struct TerminalSink;

impl RenderSink for TerminalSink {
    fn on_board_changed(&mut self, board: &Board) {
        println!("\n{}", board.board_string());
    }

    fn on_status_changed(&mut self, status: &str) {
        println!(">> {status}");
    }

    fn on_selection_changed(&mut self, selected: Option<Square>, destinations: &[Square]) {
        if let Some(sq) = selected {
            let dests: Vec<String> = destinations.iter().map(|d| d.to_algebraic()).collect();
            println!("selected {sq}: {}", dests.join(" "));
        }
    }

    fn on_game_over(&mut self, winner: Option<Side>) {
        match winner {
            Some(side) => println!("game over, {side} wins"),
            None => println!("game over, draw"),
        }
    }

    fn on_notice(&mut self, notice: &SessionError) {
        eprintln!("!! {notice}");
    }
}

/// Lightweight health check: send raw HTTP/1.1 request and check for 200 OK.
async fn health_check() -> Result<(), Box<dyn Error>> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "5002".to_string());
    let mut stream = tokio::net::TcpStream::connect(format!("127.0.0.1:{port}")).await?;
    let request =
        format!("GET /health HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\nConnection: close\r\n\r\n");
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    stream.write_all(request.as_bytes()).await?;
    let mut buf = vec![0u8; 1024];
    let n = stream.read(&mut buf).await?;
    let response = String::from_utf8_lossy(&buf[..n]);
    if response.starts_with("HTTP/1.1 200") {
        Ok(())
    } else {
        Err(format!(
            "Unexpected response: {}",
            response.lines().next().unwrap_or("")
        )
        .into())
    }
}
