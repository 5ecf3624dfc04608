/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    marker::PhantomData,
    ops::Neg,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use arrayvec::ArrayVec;
use uci_parser::{UciInfo, UciResponse};

use crate::{
    see, tune, Evaluator, HistoryTable, KillerTable, Move, MovePicker, PieceKind, Position,
    ProbeResult, Score, TTable, TTableEntry,
};

/// Maximum depth that can be searched.
pub const MAX_DEPTH: u8 = 127;

/// The level of logging to print during a search.
///
/// Chosen at compile time through a marker type, so silent searches (perft
/// comparisons, tests) carry no logging branches at all.
pub trait LogLevel {
    /// Print standard search reports (per-depth progress, final bestmove).
    const INFO: bool;

    /// Print additional diagnostics.
    const DEBUG: bool;
}

/// Print nothing.
pub struct LogNone;
impl LogLevel for LogNone {
    const INFO: bool = false;
    const DEBUG: bool = false;
}

/// Print progress reports and the final bestmove.
pub struct LogInfo;
impl LogLevel for LogInfo {
    const INFO: bool = true;
    const DEBUG: bool = false;
}

/// Print progress reports plus extra diagnostics.
pub struct LogDebug;
impl LogLevel for LogDebug {
    const INFO: bool = true;
    const DEBUG: bool = true;
}

/// A marker trait for the types of nodes encountered during search.
trait NodeType {
    /// Is this node the first searched?
    const ROOT: bool;

    /// Is this node on the principal variation?
    const PV: bool;
}

/// First node searched.
struct RootNode;
impl NodeType for RootNode {
    const ROOT: bool = true;
    const PV: bool = true;
}

/// A node on the principal variation, searched with a full window.
struct PvNode;
impl NodeType for PvNode {
    const ROOT: bool = false;
    const PV: bool = true;
}

/// A node not on the principal variation, searched with a null window.
struct NonPvNode;
impl NodeType for NonPvNode {
    const ROOT: bool = false;
    const PV: bool = false;
}

/// Represents the best sequence of moves found during a search.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalVariation(ArrayVec<Move, { MAX_DEPTH as usize }>);

impl PrincipalVariation {
    /// Clears the moves of `self`.
    #[inline(always)]
    fn clear(&mut self) {
        self.0.clear();
    }

    /// Replace the contents of `self` with `mv` followed by the contents of `other`.
    #[inline(always)]
    fn extend(&mut self, mv: Move, other: &Self) {
        self.clear();
        self.0.push(mv);
        self.0.try_extend_from_slice(&other.0).unwrap_or_else(|err| {
            panic!("{err}: PV exceeded capacity {MAX_DEPTH} pushing {mv} and {:?}", other.0)
        });
    }

    /// The first move of this PV, if any.
    #[inline(always)]
    pub fn first(&self) -> Option<Move> {
        self.0.first().copied()
    }

    /// The moves of this PV, in playing order from the root.
    #[inline(always)]
    pub fn moves(&self) -> &[Move] {
        &self.0
    }
}

impl fmt::Display for PrincipalVariation {
    /// Space-separated coordinate moves, root move first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut moves = self.0.iter();
        if let Some(first) = moves.next() {
            write!(f, "{first}")?;
            for mv in moves {
                write!(f, " {mv}")?;
            }
        }
        Ok(())
    }
}

/// Bounds within an alpha-beta search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    /// Lower bound: we are guaranteed a score that is AT LEAST `alpha`.
    ///
    /// If no move can raise `alpha`, we are said to have "failed low."
    pub alpha: Score,

    /// Upper bound: our opponent is guaranteed a score that is AT MOST `beta`.
    ///
    /// If a move scores higher than `beta`, we "fail high" and the branch is
    /// pruned, as the opponent can avoid this position altogether.
    pub beta: Score,
}

impl SearchBounds {
    /// Create a new [`SearchBounds`] from the provided `alpha` and `beta`.
    #[inline(always)]
    pub const fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }

    /// Create a "null window" just above `alpha`.
    #[inline(always)]
    fn null_alpha(self) -> Self {
        Self::new(self.alpha, self.alpha + 1)
    }

    /// Create a "null window" just below `beta`.
    #[inline(always)]
    fn null_beta(self) -> Self {
        Self::new(self.beta - 1, self.beta)
    }
}

impl Neg for SearchBounds {
    type Output = Self;
    /// Negating [`SearchBounds`] swaps and negates both bounds.
    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self {
            alpha: -self.beta,
            beta: -self.alpha,
        }
    }
}

impl Default for SearchBounds {
    /// Default [`SearchBounds`] are `(-infinity, infinity)`.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Score::ALPHA, Score::BETA)
    }
}

/// The result of a search: the best move found and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search, or `None` if the root has no
    /// legal moves.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made.
    pub score: Score,

    /// The deepest fully-completed iteration.
    pub depth: u8,

    /// Principal variation of the final completed iteration.
    pub pv: PrincipalVariation,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: Score::ALPHA,
            depth: 1,
            pv: PrincipalVariation::default(),
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    pub max_depth: u8,

    /// Start time of the search.
    pub starttime: Instant,

    /// Soft limit on search time.
    ///
    /// If an iteration concludes past this point, the search stops rather
    /// than start a deeper iteration it probably cannot finish.
    pub soft_timeout: Duration,

    /// Hard limit on search time.
    ///
    /// If this limit is exceeded at *any* point, the search unwinds as soon
    /// as possible, discarding the partial iteration.
    pub hard_timeout: Duration,
}

impl SearchConfig {
    /// A config that searches for at most `movetime`.
    #[inline(always)]
    pub fn with_movetime(movetime: Duration) -> Self {
        Self {
            soft_timeout: movetime,
            hard_timeout: movetime,
            ..Default::default()
        }
    }

    /// A config that searches to at most `max_depth` plies.
    #[inline(always)]
    pub fn with_depth(max_depth: u8) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }
}

impl Default for SearchConfig {
    /// A default [`SearchConfig`] will permit an "infinite" search.
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            starttime: Instant::now(),
            soft_timeout: Duration::MAX,
            hard_timeout: Duration::MAX,
        }
    }
}

/// Executes a search on a chess position.
///
/// One instance runs one search: it owns the per-search state (node counter,
/// killer table, repetition stack) and borrows the state that outlives a
/// search (transposition table, history table).
pub struct Search<'a, Log> {
    /// Number of nodes searched.
    nodes: u64,

    /// An atomic flag to determine if the search should be cancelled at any time.
    ///
    /// If this is ever `false`, the search must exit as soon as possible.
    is_searching: Arc<AtomicBool>,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Zobrist keys of every position on the path from the start of the game
    /// to the current node, for repetition detection.
    prev_keys: Vec<u64>,

    /// Transposition table used to cache information during search.
    ttable: &'a mut TTable,

    /// Storage for quiet moves that caused beta cutoffs, by (from, to) square.
    history: &'a mut HistoryTable,

    /// Killer moves, two per ply.
    killers: KillerTable,

    /// First move of the previous iteration's PV, given an ordering bonus at
    /// the root of the next iteration.
    prev_pv_move: Option<Move>,

    /// Marker for the level of logging to print.
    log: PhantomData<Log>,
}

impl<'a, Log: LogLevel> Search<'a, Log> {
    /// Construct a new [`Search`] instance to execute.
    ///
    /// `prev_keys` holds the Zobrist keys of the game so far (positions
    /// before the one being searched), so in-game repetitions are seen.
    #[inline(always)]
    pub fn new(
        is_searching: Arc<AtomicBool>,
        config: SearchConfig,
        prev_keys: Vec<u64>,
        ttable: &'a mut TTable,
        history: &'a mut HistoryTable,
    ) -> Self {
        Self {
            nodes: 0,
            is_searching,
            config,
            prev_keys,
            ttable,
            history,
            killers: KillerTable::default(),
            prev_pv_move: None,
            log: PhantomData,
        }
    }

    /// Start the search on the supplied [`Position`], returning a [`SearchResult`].
    ///
    /// The position is mutated in place by make/unmake during the search and
    /// restored before returning.
    pub fn start(mut self, position: &mut Position) -> SearchResult {
        if Log::DEBUG {
            self.send_string(format!("Starting search on {:?}", position.to_fen()));
        }

        self.ttable.new_search();

        let result = self.iterative_deepening(position);

        // Search has ended; send bestmove
        if Log::INFO {
            self.send_response(UciResponse::BestMove {
                bestmove: result.bestmove.map(|mv| mv.to_string()),
                ponder: None,
            });
        }

        // Search has concluded; alert other thread(s) that we are no longer searching
        self.is_searching.store(false, Ordering::Relaxed);

        result
    }

    /// Sends a [`UciResponse`] to `stdout`.
    #[inline(always)]
    fn send_response<T: fmt::Display>(&self, response: UciResponse<T>) {
        println!("{response}");
    }

    /// Helper to send a `string` info message to `stdout`.
    #[inline(always)]
    fn send_string<T: fmt::Display>(&self, string: T) {
        self.send_response(UciResponse::info_string(string));
    }

    /// Sends the progress report for a completed iteration: depth, elapsed
    /// milliseconds, node count, nodes per second, and the PV.
    #[inline(always)]
    fn send_end_of_search_info(&self, result: &SearchResult) {
        let elapsed = self.config.starttime.elapsed();

        self.send_response(UciResponse::info(
            UciInfo::new()
                .depth(result.depth)
                .time(elapsed.as_millis())
                .nodes(self.nodes)
                .nps((self.nodes as f32 / elapsed.as_secs_f32()).trunc())
                .score(result.score.into_uci())
                .pv(result.pv.moves().iter().map(|mv| mv.to_string())),
        ));
    }

    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening)
    /// on the search's position.
    ///
    /// Runs a full-window root search at depth 1, 2, 3, ... until the soft
    /// deadline passes, the stop flag is cleared, the depth limit is hit, or
    /// a forced mate is found. The result of the deepest *completed*
    /// iteration is returned; a partially-searched deeper iteration is
    /// discarded.
    fn iterative_deepening(&mut self, position: &mut Position) -> SearchResult {
        // Initialize `bestmove` to the first legal move available, so there
        // is always something sensible to play if time runs out instantly.
        let mut result = SearchResult {
            bestmove: position.get_legal_moves().first().copied(),
            ..Default::default()
        };

        let mut depth = 1;

        while self.config.starttime.elapsed() < self.config.soft_timeout
            && self.is_searching.load(Ordering::Relaxed)
            && depth <= self.config.max_depth
        {
            let mut pv = PrincipalVariation::default();
            let score =
                self.negamax::<RootNode>(position, depth, 0, SearchBounds::default(), &mut pv, false);

            // A cancelled iteration cannot be trusted; fall back to the
            // previous one.
            if self.search_cancelled() {
                if Log::DEBUG {
                    self.send_string(format!(
                        "Search cancelled during depth {depth}; using result from depth {}",
                        result.depth
                    ));
                }
                break;
            }

            result.depth = depth;
            result.score = score;
            result.pv = pv;

            // Prefer the PV move; fall back to the TT if the PV is empty
            result.bestmove = result
                .pv
                .first()
                .or_else(|| self.ttable.get(&position.key()).and_then(|e| e.bestmove));

            // Seed the next iteration's root ordering
            self.prev_pv_move = result.bestmove;

            if Log::INFO {
                self.send_end_of_search_info(&result);
            }

            // A forced mate cannot be improved by searching deeper
            if result.score.is_mate() {
                break;
            }

            depth += 1;
        }

        result.nodes = self.nodes;
        result
    }

    /// Primary location of search logic: [negamax](https://www.chessprogramming.org/Negamax)
    /// with alpha-beta pruning and [principal variation search](https://www.chessprogramming.org/Principal_Variation_Search).
    fn negamax<Node: NodeType>(
        &mut self,
        position: &mut Position,
        depth: u8,
        ply: i32,
        mut bounds: SearchBounds,
        pv: &mut PrincipalVariation,
        is_nullmove_child: bool,
    ) -> Score {
        self.nodes += 1;

        if self.search_cancelled() {
            return bounds.alpha;
        }

        // Declare a local principal variation for the children of this node.
        let mut local_pv = PrincipalVariation::default();
        pv.clear();

        // Drawn positions need no searching
        if !Node::ROOT
            && (position.can_draw_by_fifty()
                || position.has_insufficient_material()
                || position.is_repetition(&self.prev_keys))
        {
            return Score::DRAW;
        }

        // If this position was already searched deeply enough, its stored
        // score may end the node outright. Never in PV nodes.
        if !Node::PV {
            if let ProbeResult::Cutoff(score) =
                self.ttable.probe(position.key(), depth, ply, bounds)
            {
                return score;
            }
        }

        // At the horizon, resolve tactics before trusting the evaluation
        if depth == 0 {
            return self.quiescence(position, ply, bounds);
        }

        let moves = position.get_legal_moves();

        // No legal moves is either checkmate or stalemate
        if moves.is_empty() {
            return if position.is_in_check() {
                Score::mated_in(ply)
            } else {
                Score::DRAW
            };
        }

        // Null move pruning: if giving the opponent a free extra move still
        // fails high, our position is strong enough to prune. Unsound in
        // check and near zugzwang (little non-pawn material), and never two
        // in a row.
        if !Node::PV
            && !is_nullmove_child
            && depth >= tune::min_nmp_depth!()
            && !position.is_in_check()
            && position.non_pawn_material(position.side_to_move()) >= tune::nmp_material_threshold!()
        {
            let undo = position.make_nullmove();
            let nmp_depth = depth - 1 - tune::nmp_reduction!();

            let score = -self.negamax::<NonPvNode>(
                position,
                nmp_depth,
                ply + 1,
                -bounds.null_beta(),
                &mut local_pv,
                true,
            );

            position.unmake_nullmove(&undo);

            if score >= bounds.beta {
                return bounds.beta;
            }
        }

        // Order moves so the most promising are searched first
        let tt_move = self.ttable.get(&position.key()).and_then(|e| e.bestmove);
        let prev_pv_move = if Node::ROOT { self.prev_pv_move } else { None };
        let picker = MovePicker::new(moves, |mv| {
            self.score_move(position, mv, tt_move, prev_pv_move, ply)
        });

        let original_alpha = bounds.alpha;
        let mut best = Score::ALPHA;
        let mut bestmove = None;
        let parent_key = position.key().inner();

        for (i, (mv, _)) in picker.enumerate() {
            if self.search_cancelled() {
                break;
            }

            let undo = position.make_move(mv);
            self.prev_keys.push(parent_key);

            let new_depth = depth - 1;
            let mut score = Score::ALPHA;

            // Principal Variation Search: the first move of a PV node gets
            // the full window. Every other move gets a null window; if one
            // lands strictly inside (alpha, beta), our ordering was wrong
            // about it and a full-window re-search is needed.
            let full_window_first = Node::PV && i == 0;

            if !full_window_first {
                score = -self.negamax::<NonPvNode>(
                    position,
                    new_depth,
                    ply + 1,
                    -bounds.null_alpha(),
                    &mut local_pv,
                    false,
                );
            }

            if Node::PV && (i == 0 || (score > bounds.alpha && score < bounds.beta)) {
                score = -self.negamax::<PvNode>(
                    position,
                    new_depth,
                    ply + 1,
                    -bounds,
                    &mut local_pv,
                    false,
                );
            }

            self.prev_keys.pop();
            position.unmake_move(mv, &undo);

            if score > best {
                best = score;

                // This move raised alpha: it is our new best line
                if score > bounds.alpha {
                    bounds.alpha = score;
                    bestmove = Some(mv);

                    if Node::PV {
                        pv.extend(mv, &local_pv);
                    }
                }

                // Fail high: the opponent will avoid this node altogether
                if score >= bounds.beta {
                    if !mv.is_capture() {
                        self.killers.insert(ply, mv);
                        self.history.update(mv, depth);
                    }
                    break;
                }
            }
        }

        // Store the result for future encounters of this position, unless
        // the node was cut short by cancellation.
        if !self.search_cancelled() {
            self.ttable.store(TTableEntry::new(
                position.key(),
                bestmove,
                best,
                SearchBounds::new(original_alpha, bounds.beta),
                depth,
                ply,
                self.ttable.age(),
            ));
        }

        best
    }

    /// [Quiescence search](https://www.chessprogramming.org/Quiescence_Search):
    /// extends the search through captures and promotions until the position
    /// is quiet, so the evaluation is never taken mid-exchange.
    fn quiescence(&mut self, position: &mut Position, ply: i32, mut bounds: SearchBounds) -> Score {
        self.nodes += 1;

        if self.search_cancelled() {
            return bounds.alpha;
        }

        // Mate cannot be detected from a captures-only move list, so check
        // for it directly when in check.
        if position.is_in_check() && !position.has_legal_moves() {
            return Score::mated_in(ply);
        }

        // The stand-pat score: we are not forced to capture, so the static
        // evaluation is a lower bound on this node's score.
        let stand_pat = Evaluator::new(position).eval_for(position.side_to_move());
        if stand_pat >= bounds.beta {
            return bounds.beta;
        }
        if stand_pat > bounds.alpha {
            bounds.alpha = stand_pat;
        }

        let captures = position.get_legal_captures();
        let picker = MovePicker::new(captures, |mv| {
            self.score_move(position, mv, None, None, ply)
        });

        for (mv, _) in picker {
            if self.search_cancelled() {
                break;
            }

            // Skip exchanges too losing to restore the balance
            if see(position, mv) + bounds.alpha.inner() < 0 {
                continue;
            }

            let undo = position.make_move(mv);
            let score = -self.quiescence(position, ply + 1, -bounds);
            position.unmake_move(mv, &undo);

            if score >= bounds.beta {
                return bounds.beta;
            }
            if score > bounds.alpha {
                bounds.alpha = score;
            }
        }

        bounds.alpha
    }

    /// Applies the ordering score to `mv`: transposition move, previous root
    /// PV move, MVV-LVA with an SEE demotion for losing captures,
    /// promotions, killers, then history. Contributions are additive.
    fn score_move(
        &self,
        position: &Position,
        mv: Move,
        tt_move: Option<Move>,
        prev_pv_move: Option<Move>,
        ply: i32,
    ) -> i32 {
        let mut score = 0;

        if tt_move == Some(mv) {
            score += tune::hash_move_bonus!();
        }

        if prev_pv_move == Some(mv) {
            score += tune::root_pv_bonus!();
        }

        if mv.is_capture() {
            let victim = if mv.is_en_passant() {
                PieceKind::Pawn.value()
            } else {
                position
                    .piece_at(mv.to())
                    .map(|piece| piece.kind().value())
                    .unwrap_or_default()
            };
            let attacker = position
                .piece_at(mv.from())
                .map(|piece| piece.kind().value())
                .unwrap_or_default();

            // Most valuable victim, least valuable attacker
            score += tune::capture_bonus!() + victim * 10 - attacker;

            // Captures that lose material go below everything constructive
            if see(position, mv) < 0 {
                score -= tune::losing_capture_penalty!();
            }
        }

        if mv.is_promotion() {
            score += tune::promotion_bonus!();
        }

        if self.killers.contains(ply, mv) {
            score += tune::killer_bonus!();
        }

        if mv.is_quiet() {
            score += self.history.get(mv).min(tune::max_history_bonus!());
        }

        score
    }

    /// Checks if we've exceeded any conditions that would warrant the search to end.
    #[inline(always)]
    fn search_cancelled(&self) -> bool {
        // Condition 1: We've exceeded the hard limit of our allotted search time
        self.config.starttime.elapsed() >= self.config.hard_timeout ||
        // Condition 2: The search was stopped by an external factor, like a stop command
        !self.is_searching.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FEN_KIWIPETE, FEN_STARTPOS};

    fn run_search(fen: &str, config: SearchConfig) -> SearchResult {
        let is_searching = Arc::new(AtomicBool::new(true));
        let mut position: Position = fen.parse().unwrap();

        let mut ttable = TTable::default();
        let mut history = HistoryTable::default();
        Search::<LogNone>::new(is_searching, config, Vec::new(), &mut ttable, &mut history)
            .start(&mut position)
    }

    fn ensure_is_mate_in(fen: &str, config: SearchConfig, moves: i32) -> SearchResult {
        let result = run_search(fen, config);
        assert!(
            result.score.is_mate(),
            "Search on {fen:?} produced result that is not mate.\nResult: {result:#?}"
        );
        assert_eq!(
            result.score.moves_to_mate(),
            moves,
            "Search on {fen:?} produced result not mate in {moves}.\nResult: {result:#?}"
        );
        result
    }

    #[test]
    fn test_white_mate_in_1() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let config = SearchConfig::with_depth(2);

        let res = ensure_is_mate_in(fen, config, 1);
        assert_eq!(res.bestmove.unwrap(), "b6a7");
    }

    #[test]
    fn test_mate_in_1_found_at_depth_1() {
        // From the side to move, a mate one ply away scores MATE - 1
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(1));

        assert_eq!(res.score, Score::MATE - 1);
        assert_eq!(res.bestmove.unwrap(), "b6a7");
    }

    #[test]
    fn test_black_mated_in_1() {
        let fen = "1k6/8/KQ6/2Q5/8/8/8/8 b - - 0 1";
        let config = SearchConfig::with_depth(3);

        ensure_is_mate_in(fen, config, -1);
    }

    #[test]
    fn test_mate_in_2_with_playable_pv() {
        // The back rank is defended once, so the mate costs the queen:
        // Qe8+ Rxe8 Rxe8#
        let fen = "r5k1/5ppp/8/8/8/8/4QPPP/4R1K1 w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(4));

        assert!(res.score.is_mate(), "expected mate, got {:?}", res.score);
        assert!(res.score >= Score::MATE - 3);
        assert_eq!(res.score.moves_to_mate(), 2);
        assert_eq!(res.pv.moves().len(), 3, "PV: {}", res.pv);

        // The PV must be playable from the root
        let mut position: Position = fen.parse().unwrap();
        for mv in res.pv.moves() {
            let legal = position.get_legal_moves();
            assert!(legal.contains(mv), "PV move {mv} illegal on {position:?}");
            position.make_move(*mv);
        }
        assert!(position.is_checkmate());
    }

    #[test]
    fn test_stalemate_scores_zero() {
        let fen = "k7/8/KQ6/8/8/8/8/8 b - - 0 1";
        let res = run_search(fen, SearchConfig::default());

        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Score::DRAW);
    }

    #[test]
    fn test_obvious_capture_promote() {
        // Pawn should take the queen and promote to a queen
        let fen = "3q1n2/4P3/8/8/8/8/k7/7K w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(1));

        assert_eq!(res.bestmove.unwrap(), "e7d8q");
    }

    #[test]
    fn test_quick_search_finds_move() {
        // If *any* legal move is available, it should be found, regardless
        // of how little time was given.
        let config = SearchConfig::with_movetime(Duration::ZERO);
        let res = run_search(FEN_STARTPOS, config);
        assert!(res.bestmove.is_some());
    }

    #[test]
    fn test_back_rank_mate_found_with_depth_to_spare() {
        // Ra8 is an immediate back-rank mate; the search must stop on it
        // rather than deepen further
        let fen = "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1";
        let res = run_search(fen, SearchConfig::with_depth(10));
        assert!(res.score.is_mate());
        assert!(res.score >= Score::MATE - 3);
        assert_eq!(res.bestmove.unwrap(), "a1a8");
    }

    #[test]
    fn test_repetition_is_draw() {
        // Shuffling kings: with the game history pinned, searching the same
        // position again must see the repetition
        let mut position: Position = "4k3/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let history = vec![position.key().inner()];

        let is_searching = Arc::new(AtomicBool::new(true));
        let mut ttable = TTable::default();
        let mut history_table = HistoryTable::default();

        let res = Search::<LogNone>::new(
            is_searching,
            SearchConfig::with_depth(4),
            history,
            &mut ttable,
            &mut history_table,
        )
        .start(&mut position);

        // Insufficient material anyway; every line is a draw
        assert_eq!(res.score, Score::DRAW);
    }

    #[test]
    fn test_position_restored_after_search() {
        let fen = FEN_KIWIPETE;
        let is_searching = Arc::new(AtomicBool::new(true));
        let mut position: Position = fen.parse().unwrap();

        let mut ttable = TTable::default();
        let mut history = HistoryTable::default();
        Search::<LogNone>::new(
            is_searching,
            SearchConfig::with_depth(4),
            Vec::new(),
            &mut ttable,
            &mut history,
        )
        .start(&mut position);

        assert_eq!(position.to_fen(), fen);
        position.assert_consistent();
    }
}
