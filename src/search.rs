//! Permutation search over the letters a clue leaves open.
//!
//! Every [`ClueCandidate`] is an independent branch. A branch assigns the still
//! unknown cipher letters to the still free plain letters in lexicographic
//! order and accepts a key when the whole decrypted ciphertext consists of
//! dictionary words.
//!
//! Two observations keep this tractable:
//!
//! - Only cipher letters that occur in the ciphertext change the decode. Keys
//!   that differ only on absent letters decrypt identically, so a branch
//!   enumerates assignments of the present letters and completes each key with
//!   [`KeyMap::fill_remaining`].
//! - Once every letter of a ciphertext word is assigned, the decoded word must
//!   be in the dictionary. The branch is walked depth first and a subtree is
//!   skipped as soon as one of its words fails. This removes keys, never
//!   valid decodes.
//!
//! Branches run on a bounded [`rayon`] pool. In first-found mode the first
//! valid decode is written to a set-once slot and every other branch is asked
//! to stop; which branch wins is not deterministic under parallel execution.
//! In collect-all mode every valid decode is returned, sorted, so sequential
//! and parallel runs give the same list.
//!
//! # Examples
//!
//! ```
//! use monocrack::clue::clue_candidates;
//! use monocrack::dictionary::Dictionary;
//! use monocrack::search::{SearchConfig, SearchCoordinator, SearchStatus};
//!
//! let ciphertext = "VIRFW EIXYW VD UUAVW JWVDU QJAMUSW";
//! let dictionary = Dictionary::parse_from_str("mucho\ngusto\nme\nllamo\nromel\nbrawlio");
//! let candidates = clue_candidates(ciphertext, "brawlio");
//!
//! let mut coordinator = SearchCoordinator::new(ciphertext, &dictionary, SearchConfig::default());
//! let outcome = coordinator.run(&candidates)?;
//!
//! assert_eq!(outcome.status, SearchStatus::Found);
//! assert_eq!(outcome.best().unwrap().plaintext, "MUCHO GUSTO ME LLAMO ROMEL BRAWLIO");
//! # Ok::<(), monocrack::errors::CrackError>(())
//! ```

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;

use instant::Instant;
use log::{debug, info, warn};
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::alphabet::{letter_to_pos, pos_to_letter, ALPHABET_SIZE};
use crate::clue::ClueCandidate;
use crate::dictionary::Dictionary;
use crate::errors::CrackError;
use crate::key_map::KeyMap;

// How many search nodes to visit between wall-clock checks
const BUDGET_CHECK_MASK: u64 = 0xFF;

/// Lifecycle of a [`SearchCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Created, nothing dispatched yet.
    Idle,
    /// Branches are running.
    Dispatched,
    /// At least one dictionary-valid decode was found.
    Found,
    /// Every branch ran to completion without a valid decode.
    Exhausted,
    /// The time budget expired before the search space was covered.
    Aborted,
}

/// How a search run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    /// A valid decode was found (in collect-all mode: the whole space was covered
    /// and at least one decode was found).
    Found,

    /// No key decrypts the ciphertext into dictionary words. This is an ordinary
    /// answer, not an error.
    Exhausted,

    /// The time budget expired. Contains the elapsed time. Any decodes found
    /// before expiry are still returned.
    TimedOut { elapsed: Duration },
}

/// Knobs for a search run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Run branches on a worker pool (ignored on wasm32, which has no threads).
    pub parallel: bool,
    /// Worker count; `None` uses the available hardware parallelism.
    pub threads: Option<usize>,
    /// Wall-clock limit; `None` searches until done.
    pub time_limit: Option<Duration>,
    /// Return every valid decode instead of stopping at the first.
    pub collect_all: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            time_limit: None,
            collect_all: false,
        }
    }
}

/// A dictionary-valid decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cracked {
    pub plaintext: String,
    /// Complete key that produced `plaintext`.
    pub key: KeyMap,
    /// Ciphertext token that was read as the clue.
    pub token: String,
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    /// Valid decodes: at most one in first-found mode; sorted by plaintext and
    /// de-duplicated in collect-all mode.
    pub results: Vec<Cracked>,
    /// Number of branches dispatched.
    pub branches: usize,
    /// Partial assignments visited across all branches.
    pub nodes_visited: u64,
    /// Complete keys checked against the dictionary.
    pub keys_checked: u64,
}

impl SearchOutcome {
    /// The first (or only) decode.
    #[must_use]
    pub fn best(&self) -> Option<&Cracked> {
        self.results.first()
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        !self.results.is_empty()
    }
}

/// Simple helper to enforce an optional wall-clock limit.
struct TimeBudget {
    start: Instant,
    limit: Option<Duration>,
}

impl TimeBudget {
    fn new(limit: Option<Duration>) -> Self {
        Self { start: Instant::now(), limit }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.start.elapsed() >= limit)
    }
}

/// Ciphertext facts every branch needs, computed once.
struct PreparedText {
    /// Distinct alphanumeric runs made only of letters, as alphabet positions.
    words: Vec<Vec<u8>>,
    /// Bitset of the cipher letters occurring anywhere in the text.
    present: u32,
}

impl PreparedText {
    fn new(ciphertext: &str) -> Self {
        let mut words: Vec<Vec<u8>> = Vec::new();
        for run in ciphertext.split(|c: char| !c.is_ascii_alphanumeric()) {
            // runs with digits are only checked on the full decode
            let Some(word) = run.chars().map(letter_to_pos).collect::<Option<Vec<u8>>>() else {
                continue;
            };
            if !word.is_empty() && !words.contains(&word) {
                words.push(word);
            }
        }

        let present = ciphertext
            .chars()
            .filter_map(letter_to_pos)
            .fold(0u32, |bits, c| bits | (1 << c));

        Self { words, present }
    }
}

/// The order in which one branch assigns letters, and which words become
/// checkable at each depth.
struct BranchPlan {
    /// Unknown cipher letters, in assignment order.
    order: Vec<u8>,
    /// `checks[d]`: indices of words whose letters are all known once `d`
    /// letters of `order` are assigned.
    checks: Vec<Vec<usize>>,
}

impl BranchPlan {
    fn new(text: &PreparedText, key: &KeyMap) -> Self {
        let unknown = |c: u8| !key.is_cipher_used(c);
        let unknown_count = |word: &[u8]| {
            word.iter()
                .filter(|&&c| unknown(c))
                .fold(0u32, |bits, &c| bits | (1 << c))
                .count_ones()
        };

        // words with few open letters first, so checks start early
        let mut ranked: Vec<usize> = (0..text.words.len()).collect();
        ranked.sort_by_key(|&i| (unknown_count(&text.words[i]), Reverse(text.words[i].len())));

        let mut depth_of = [usize::MAX; ALPHABET_SIZE];
        let mut order = Vec::with_capacity(ALPHABET_SIZE);
        for &i in &ranked {
            for &c in &text.words[i] {
                if unknown(c) && depth_of[c as usize] == usize::MAX {
                    depth_of[c as usize] = order.len();
                    order.push(c);
                }
            }
        }
        // letters that only occur next to digits still change the decode
        for c in 0..ALPHABET_SIZE as u8 {
            if text.present & (1 << c) != 0 && unknown(c) && depth_of[c as usize] == usize::MAX {
                depth_of[c as usize] = order.len();
                order.push(c);
            }
        }

        let mut checks = vec![Vec::new(); order.len() + 1];
        for (i, word) in text.words.iter().enumerate() {
            let depth = word
                .iter()
                .filter(|&&c| unknown(c))
                .map(|&c| depth_of[c as usize] + 1)
                .max()
                .unwrap_or(0);
            checks[depth].push(i);
        }

        Self { order, checks }
    }
}

/// State shared by all branches of one run.
struct SearchCtx<'a> {
    ciphertext: &'a str,
    dictionary: &'a Dictionary,
    text: &'a PreparedText,
    budget: &'a TimeBudget,
    collect_all: bool,
    stop: AtomicBool,
    /// Set when a branch stopped because the budget ran out.
    expired: AtomicBool,
    first: OnceLock<Cracked>,
    all: Mutex<Vec<Cracked>>,
    nodes_visited: AtomicU64,
    keys_checked: AtomicU64,
}

impl SearchCtx<'_> {
    fn halted(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn halt(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Keep a valid decode. In first-found mode only the first write lands.
    fn record(&self, cracked: Cracked) {
        if self.collect_all {
            debug!("valid decode via '{}': {}", cracked.token, cracked.plaintext);
            self.all.lock().unwrap_or_else(PoisonError::into_inner).push(cracked);
        } else {
            match self.first.set(cracked) {
                Ok(()) => {
                    info!("valid decode found; stopping other branches");
                    self.halt();
                }
                Err(rejected) => {
                    debug!("discarding later decode via '{}'", rejected.token);
                }
            }
        }
    }

    fn search_branch(&self, candidate: &ClueCandidate) {
        if self.halted() {
            return;
        }

        let plan = BranchPlan::new(self.text, &candidate.key);
        debug!(
            "branch '{}': {} letter(s) to assign over {} free plain letter(s)",
            candidate.token,
            plan.order.len(),
            candidate.remaining_plain.len()
        );

        let mut walker = Walker {
            ctx: self,
            free_plain: candidate.key.unmapped_plain_pos(),
            plan,
            token: &candidate.token,
            nodes: 0,
            keys: 0,
            halted: false,
            decoded: String::new(),
        };
        walker.walk(candidate.key, 0);

        self.nodes_visited.fetch_add(walker.nodes, Ordering::Relaxed);
        self.keys_checked.fetch_add(walker.keys, Ordering::Relaxed);
    }
}

/// Depth-first enumeration for one branch.
struct Walker<'c, 'a> {
    ctx: &'c SearchCtx<'a>,
    plan: BranchPlan,
    /// Plain letters the clue left free, ascending.
    free_plain: Vec<u8>,
    token: &'c str,
    nodes: u64,
    keys: u64,
    halted: bool,
    /// Scratch buffer for decoded words.
    decoded: String,
}

impl Walker<'_, '_> {
    fn should_stop(&mut self) -> bool {
        if self.halted || self.ctx.halted() {
            self.halted = true;
        } else if self.nodes & BUDGET_CHECK_MASK == 0 && self.ctx.budget.expired() {
            warn!("time budget expired in branch '{}'", self.token);
            self.ctx.expired.store(true, Ordering::Relaxed);
            self.ctx.halt();
            self.halted = true;
        }
        self.halted
    }

    /// Whether every word that became fully known at `depth` is a dictionary word.
    fn words_known_at(&mut self, key: &KeyMap, depth: usize) -> bool {
        let checks = &self.plan.checks[depth];
        if checks.is_empty() {
            return true;
        }

        let inverse = key.inverse();
        for &i in checks {
            self.decoded.clear();
            for &c in &self.ctx.text.words[i] {
                match inverse[c as usize] {
                    Some(p) => self.decoded.push(pos_to_letter(p)),
                    None => return false,
                }
            }
            if !self.ctx.dictionary.contains(&self.decoded) {
                return false;
            }
        }
        true
    }

    fn walk(&mut self, key: KeyMap, depth: usize) {
        if self.should_stop() {
            return;
        }
        self.nodes += 1;

        if !self.words_known_at(&key, depth) {
            return;
        }

        let Some(&cipher) = self.plan.order.get(depth) else {
            self.check_full_key(key);
            return;
        };

        for i in 0..self.free_plain.len() {
            let plain = self.free_plain[i];
            if key.is_plain_mapped(plain) {
                continue;
            }
            let mut next = key;
            if let Err(e) = next.set_pos(cipher, plain) {
                // a conflicting assignment only discards this branch
                debug!("skipping assignment in branch '{}': {e}", self.token);
                continue;
            }
            self.walk(next, depth + 1);
            if self.halted {
                return;
            }
        }
    }

    fn check_full_key(&mut self, key: KeyMap) {
        self.keys += 1;
        let full = key.fill_remaining();
        let plaintext = full.decrypt(self.ctx.ciphertext);
        if self.ctx.dictionary.all_words_known(&plaintext) {
            self.ctx.record(Cracked {
                plaintext,
                key: full,
                token: self.token.to_string(),
            });
        }
    }
}

/// Runs the branches of one crack attempt.
pub struct SearchCoordinator<'a> {
    ciphertext: &'a str,
    dictionary: &'a Dictionary,
    config: SearchConfig,
    state: SearchState,
}

impl<'a> SearchCoordinator<'a> {
    #[must_use]
    pub fn new(ciphertext: &'a str, dictionary: &'a Dictionary, config: SearchConfig) -> Self {
        Self {
            ciphertext,
            dictionary,
            config,
            state: SearchState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Search every candidate branch.
    ///
    /// # Errors
    ///
    /// `WorkerPool` if the thread pool cannot be built. Running out of candidates
    /// or keys is reported through [`SearchStatus`], not as an error.
    pub fn run(&mut self, candidates: &[ClueCandidate]) -> Result<SearchOutcome, CrackError> {
        debug_assert_eq!(self.state, SearchState::Idle, "a coordinator runs once");

        let text = PreparedText::new(self.ciphertext);
        let budget = TimeBudget::new(self.config.time_limit);
        let ctx = SearchCtx {
            ciphertext: self.ciphertext,
            dictionary: self.dictionary,
            text: &text,
            budget: &budget,
            collect_all: self.config.collect_all,
            stop: AtomicBool::new(false),
            expired: AtomicBool::new(false),
            first: OnceLock::new(),
            all: Mutex::new(Vec::new()),
            nodes_visited: AtomicU64::new(0),
            keys_checked: AtomicU64::new(0),
        };

        self.state = SearchState::Dispatched;
        info!(
            "dispatching {} branch(es) over {} distinct word(s)",
            candidates.len(),
            text.words.len()
        );
        self.dispatch(&ctx, candidates)?;

        let timed_out = ctx.expired.load(Ordering::Relaxed);
        let results = if self.config.collect_all {
            let mut all = ctx.all.into_inner().unwrap_or_else(PoisonError::into_inner);
            all.sort_by(|a, b| {
                (&a.plaintext, a.key.cipher_alphabet(), &a.token).cmp(&(&b.plaintext, b.key.cipher_alphabet(), &b.token))
            });
            all.dedup_by(|later, earlier| later.plaintext == earlier.plaintext);
            all
        } else {
            ctx.first.into_inner().into_iter().collect()
        };

        let status = if !results.is_empty() && !(timed_out && self.config.collect_all) {
            SearchStatus::Found
        } else if timed_out {
            SearchStatus::TimedOut { elapsed: budget.elapsed() }
        } else {
            SearchStatus::Exhausted
        };

        self.state = match status {
            SearchStatus::Found => SearchState::Found,
            SearchStatus::Exhausted => SearchState::Exhausted,
            SearchStatus::TimedOut { .. } => SearchState::Aborted,
        };

        let outcome = SearchOutcome {
            status,
            results,
            branches: candidates.len(),
            nodes_visited: ctx.nodes_visited.into_inner(),
            keys_checked: ctx.keys_checked.into_inner(),
        };
        info!(
            "search {:?}: {} result(s), {} node(s), {} key(s) in {:.3}s",
            self.state,
            outcome.results.len(),
            outcome.nodes_visited,
            outcome.keys_checked,
            budget.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }

    fn dispatch(&self, ctx: &SearchCtx, candidates: &[ClueCandidate]) -> Result<(), CrackError> {
        if self.config.parallel && candidates.len() > 1 {
            dispatch_parallel(ctx, candidates, self.config.threads)
        } else {
            dispatch_sequential(ctx, candidates);
            Ok(())
        }
    }
}

/// One task per candidate on a dedicated pool.
#[cfg(not(target_arch = "wasm32"))]
fn dispatch_parallel(ctx: &SearchCtx, candidates: &[ClueCandidate], threads: Option<usize>) -> Result<(), CrackError> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;
    debug!("worker pool with {} thread(s)", pool.current_num_threads());
    pool.install(|| candidates.par_iter().for_each(|candidate| ctx.search_branch(candidate)));
    Ok(())
}

/// wasm32 has no threads; run in candidate order instead.
#[cfg(target_arch = "wasm32")]
fn dispatch_parallel(ctx: &SearchCtx, candidates: &[ClueCandidate], _threads: Option<usize>) -> Result<(), CrackError> {
    dispatch_sequential(ctx, candidates);
    Ok(())
}

fn dispatch_sequential(ctx: &SearchCtx, candidates: &[ClueCandidate]) {
    for candidate in candidates {
        if ctx.halted() {
            break;
        }
        ctx.search_branch(candidate);
    }
}

/// Extend `key` with every word of `ciphertext` that only one dictionary word fits.
///
/// Repeats until a full pass adds nothing. A lone candidate that contradicts the
/// key is ignored.
#[must_use]
pub fn refine_with_dictionary(ciphertext: &str, key: &KeyMap, dictionary: &Dictionary) -> KeyMap {
    let words: Vec<String> = PreparedText::new(ciphertext)
        .words
        .iter()
        .map(|word| word.iter().map(|&c| pos_to_letter(c)).collect())
        .collect();

    let mut key = *key;
    loop {
        let mut progress = false;
        for word in &words {
            if word.chars().all(|c| key.plain_for(c).is_some()) {
                continue;
            }
            let candidates = dictionary.candidates_for_pattern(word, &key);
            let [only] = candidates.as_slice() else {
                continue;
            };

            let mut extended = key;
            let consistent = word
                .chars()
                .zip(only.chars())
                .all(|(cipher, plain)| extended.set(cipher, plain).is_ok());
            if consistent && extended != key {
                debug!("'{word}' can only be '{only}'");
                key = extended;
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }
    key
}

/// Advance `items` to the next lexicographic permutation.
///
/// Returns false (leaving `items` sorted ascending) after the last permutation.
pub fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    let Some(pivot) = items.windows(2).rposition(|w| w[0] < w[1]) else {
        items.reverse();
        return false;
    };
    let Some(swap_with) = items.iter().rposition(|x| *x > items[pivot]) else {
        return false;
    };
    items.swap(pivot, swap_with);
    items[pivot + 1..].reverse();
    true
}
