#[derive(Debug, Clone)]
pub enum UsiCommand {
    Usi,
    IsReady,
    UsiNewGame,
    Position(Vec<String>),
    Go(Vec<String>),
    Perft(usize),
    Benchmark(u32),
    SetOption(Vec<String>),
    Stop,
    PonderHit,
    GameOver(Option<String>),
    Quit,
    Unknown(String),
}

#[derive(Default, Debug, Clone)]
pub struct GoParams {
    pub btime: Option<u64>,
    pub wtime: Option<u64>,
    pub binc: Option<u64>,
    pub winc: Option<u64>,
    /// Byoyomi: a fixed per-move allowance once the main clock runs out,
    /// USI's alternative to an increment.
    pub byoyomi: Option<u64>,
    pub movetime: Option<u64>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub mate: Option<u32>,
    pub ponder: bool,
    pub infinite: bool,
    pub searchmoves: Vec<String>,
}

#[inline]
fn parse_next<T: std::str::FromStr>(parts: &[&str], i: usize) -> Option<T> {
    parts.get(i + 1).and_then(|v| v.parse::<T>().ok())
}

#[must_use]
pub fn parse_go_params(parts: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < parts.len() {
        let consumed = match parts[i] {
            "btime" => { params.btime = parse_next(parts, i); 2 }
            "wtime" => { params.wtime = parse_next(parts, i); 2 }
            "binc" => { params.binc = parse_next(parts, i); 2 }
            "winc" => { params.winc = parse_next(parts, i); 2 }
            "byoyomi" => { params.byoyomi = parse_next(parts, i); 2 }
            "movetime" => { params.movetime = parse_next(parts, i); 2 }
            "nodes" => { params.nodes = parse_next(parts, i); 2 }
            "depth" => { params.depth = parse_next(parts, i); 2 }
            "mate" => { params.mate = parse_next(parts, i); 2 }
            "ponder" => { params.ponder = true; 1 }
            "infinite" => { params.infinite = true; 1 }
            "searchmoves" => {
                let mut j = i + 1;
                while j < parts.len() && !is_go_keyword(parts[j]) {
                    params.searchmoves.push(parts[j].to_string());
                    j += 1;
                }
                j - i
            }
            _ => 1,
        };
        i += consumed;
    }
    params
}

fn is_go_keyword(token: &str) -> bool {
    matches!(
        token,
        "btime" | "wtime" | "binc" | "winc" | "byoyomi" | "movetime" | "nodes" | "depth"
            | "mate" | "ponder" | "infinite" | "searchmoves"
    )
}

#[must_use]
pub fn parse_usi_command(line: &str) -> Option<UsiCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.is_empty() {
        return None;
    }

    let owned_parts = || parts.iter().map(|p| (*p).to_string()).collect::<Vec<String>>();

    let cmd = match parts[0] {
        "usi" => UsiCommand::Usi,
        "isready" => UsiCommand::IsReady,
        "usinewgame" => UsiCommand::UsiNewGame,
        "position" => UsiCommand::Position(owned_parts()),
        "go" => UsiCommand::Go(owned_parts()),
        "perft" => {
            let depth = parts.get(1).and_then(|v| v.parse::<usize>().ok()).unwrap_or(1);
            UsiCommand::Perft(depth)
        }
        "bench" | "benchmark" => {
            let depth = parts.get(1).and_then(|v| v.parse::<u32>().ok()).unwrap_or(crate::bench::DEFAULT_DEPTH);
            UsiCommand::Benchmark(depth)
        }
        "setoption" => UsiCommand::SetOption(owned_parts()),
        "stop" => UsiCommand::Stop,
        "ponderhit" => UsiCommand::PonderHit,
        "gameover" => UsiCommand::GameOver(parts.get(1).map(|v| (*v).to_string())),
        "quit" => UsiCommand::Quit,
        _ => UsiCommand::Unknown(trimmed.to_string()),
    };

    Some(cmd)
}
