use actix::Actor;
use anyhow::Context as _;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use connect6_client::board::{Board, Cell, Player, BOARD_SIZE};
use connect6_client::env::Settings;
use connect6_client::session::GameSession;
use connect6_client::session_actor::message::{
    AttemptMove, GetView, RequestNewGame, RequestResign, Shutdown,
};
use connect6_client::session_actor::SessionActor;
use connect6_client::LoggerManager;

#[derive(Parser)]
#[command(
    name = "connect6 client",
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
struct Args {
    /// Game identifier to join, as handed out by the lobby
    game_id: String,

    /// Websocket endpoint, overrides the config file
    #[arg(long)]
    server: Option<String>,
}

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::new().context("failed to load configuration")?;
    let _logger = LoggerManager::setup(&settings);

    let ws_url = args
        .server
        .unwrap_or_else(|| settings.server.ws_url.clone());
    info!("joining game {} at {}", args.game_id, ws_url);

    let addr = SessionActor::new(ws_url, args.game_id).start();

    println!("commands: <row>,<col> | show | new | resign | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "quit" | "q" => break,
            "show" | "s" => {
                let view = addr.send(GetView).await?;
                render(&view);
            }
            "new" | "n" => addr.do_send(RequestNewGame),
            "resign" => addr.do_send(RequestResign),
            _ => match parse_move(line) {
                Some((row, col)) => addr.do_send(AttemptMove { row, col }),
                None => println!("unrecognized command: {}", line),
            },
        }
    }

    addr.send(Shutdown).await?;
    Ok(())
}

fn parse_move(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.splitn(2, |c| c == ',' || c == ' ');
    let row = parts.next()?.trim().parse().ok()?;
    let col = parts.next()?.trim().parse().ok()?;
    if row < BOARD_SIZE && col < BOARD_SIZE {
        Some((row, col))
    } else {
        None
    }
}

fn render(session: &GameSession) {
    match session.seat {
        Some(seat) => println!("you are: {}", seat),
        None => println!("waiting for the server..."),
    }
    if let Some(current) = session.current_player {
        println!("current player: {}", current);
    }
    if session.finished {
        println!("game is finished");
    }
    if let Some(info) = &session.info_message {
        println!("info: {}", info);
    }
    if let Some(error) = &session.error_message {
        println!("error: {}", error);
    }
    print_board(&session.board);
}

fn print_board(board: &Board) {
    for row in 0..BOARD_SIZE {
        let mut line = String::with_capacity(BOARD_SIZE);
        for col in 0..BOARD_SIZE {
            line.push(match board.get(row, col) {
                Cell::Empty => '.',
                Cell::Stone(Player::One) => 'X',
                Cell::Stone(Player::Two) => 'O',
            });
        }
        println!("{}", line);
    }
}
