use crate::board::{SearchParams, SearchState, DEFAULT_TT_MB};

/// Print a USI spin option.
fn print_spin(
    name: &str,
    default: impl std::fmt::Display,
    min: impl std::fmt::Display,
    max: impl std::fmt::Display,
) {
    println!("option name {name} type spin default {default} min {min} max {max}");
}

/// Print a USI check option.
fn print_check(name: &str, default: bool) {
    println!(
        "option name {name} type check default {}",
        if default { "true" } else { "false" }
    );
}

fn print_string(name: &str, default: &str) {
    println!("option name {name} type string default {default}");
}

pub enum UsiOptionAction {
    ReinitHash(usize),
    SetThreads(usize),
    LoadEvalFile(String),
}

pub struct UsiOptions {
    pub hash_mb: usize,
    pub threads: usize,
    pub default_max_nodes: u64,
    pub move_overhead_ms: u64,
    pub soft_time_percent: u64,
    pub hard_time_percent: u64,
    pub multi_pv: u32,
    pub ponder: bool,
    pub eval_file: String,
}

impl UsiOptions {
    #[must_use]
    pub fn new(hash_mb: usize) -> Self {
        UsiOptions {
            hash_mb,
            threads: 1,
            default_max_nodes: 0,
            move_overhead_ms: 50,
            soft_time_percent: 70,
            hard_time_percent: 90,
            multi_pv: 1,
            ponder: false,
            eval_file: String::new(),
        }
    }

    pub fn print(&self, params: &SearchParams) {
        println!("id name shogi-engine");
        println!("id author the shogi-engine contributors");

        // Engine options
        print_spin("USI_Hash", self.hash_mb, 1, 65536);
        print_check("USI_Ponder", self.ponder);
        print_spin("Threads", self.threads, 1, 256);
        print_spin("Move Overhead", self.move_overhead_ms, 0, 1000);
        print_spin("Soft Time Percent", self.soft_time_percent, 1, 100);
        print_spin("Hard Time Percent", self.hard_time_percent, 1, 100);
        print_spin("Max Nodes", self.default_max_nodes, 0_u64, u64::MAX);
        print_spin("MultiPV", self.multi_pv, 1, 64);
        print_string("EvalFile", if self.eval_file.is_empty() { "<empty>" } else { &self.eval_file });

        // Tunable search parameters for SPSA
        print_spin("RFPMargin", params.rfp_margin, 50, 300);
        print_spin("NullMoveReduction", params.null_reduction, 1, 5);
        print_spin("NullMoveMinDepth", params.null_min_depth, 2, 6);
        print_spin("LMRMinDepth", params.lmr_min_depth, 2, 6);
        print_spin("LMRMinMove", params.lmr_min_move, 1, 8);
        print_spin("DeltaMargin", params.delta_margin, 50, 400);

        println!("usiok");
    }

    pub fn apply_setoption(
        &mut self,
        name: &str,
        value: Option<&str>,
        state: &mut SearchState,
    ) -> Option<UsiOptionAction> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "usi_hash" | "hash" => {
                let mb = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(DEFAULT_TT_MB)
                    .max(1);
                if mb != self.hash_mb {
                    self.hash_mb = mb;
                    return Some(UsiOptionAction::ReinitHash(mb));
                }
            }
            "usi_ponder" | "ponder" => {
                if let Some(v) = value {
                    self.ponder = matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1");
                }
            }
            "threads" => {
                let threads = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, 256);
                if threads != self.threads {
                    self.threads = threads;
                    return Some(UsiOptionAction::SetThreads(threads));
                }
            }
            "move overhead" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.move_overhead_ms = v;
                }
            }
            "soft time percent" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.soft_time_percent = v.clamp(1, 100);
                }
            }
            "hard time percent" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.hard_time_percent = v.clamp(1, 100);
                }
            }
            "max nodes" | "nodes" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.default_max_nodes = v;
                }
            }
            "multipv" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    self.multi_pv = v.clamp(1, 64);
                }
            }
            "evalfile" => {
                if let Some(v) = value {
                    self.eval_file = v.to_string();
                    return Some(UsiOptionAction::LoadEvalFile(v.to_string()));
                }
            }
            // Tunable search parameters for SPSA
            "rfpmargin" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().rfp_margin = v.clamp(50, 300);
                }
            }
            "nullmovereduction" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().null_reduction = v.clamp(1, 5);
                }
            }
            "nullmovemindepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().null_min_depth = v.clamp(2, 6);
                }
            }
            "lmrmindepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().lmr_min_depth = v.clamp(2, 6);
                }
            }
            "lmrminmove" => {
                if let Some(v) = value.and_then(|v| v.parse::<usize>().ok()) {
                    state.params_mut().lmr_min_move = v.clamp(1, 8);
                }
            }
            "deltamargin" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().delta_margin = v.clamp(50, 400);
                }
            }
            _ => {}
        }
        None
    }
}

#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.is_empty() || parts[0] != "setoption" {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some((name, value))
}
