use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{ArgGroup, Args, Parser, Subcommand};

use monocrack::cracker::{self, FrequencyCrack};
use monocrack::dictionary::Dictionary;
use monocrack::errors::CrackError;
use monocrack::frequency;
use monocrack::key_file;
use monocrack::key_map::KeyMap;
use monocrack::search::{SearchConfig, SearchStatus};

const DEFAULT_DICTIONARY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/words.txt");
const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Monoalphabetic substitution cipher cracker
#[derive(Parser, Debug)]
#[command(author, version, long_version = LONG_VERSION, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt text with a known key
    Encrypt(KeyArgs),
    /// Decrypt text with a known key
    Decrypt(KeyArgs),
    /// Recover the key from a known plaintext word, searching exhaustively
    Crack(CrackArgs),
    /// Guess the key from letter frequencies, optionally helped by a clue
    Frequency(FrequencyArgs),
    /// Print the letters of the text from most to least frequent
    Rank(TextArg),
}

#[derive(Args, Debug)]
struct TextArg {
    /// Input text (read from stdin if omitted)
    text: Option<String>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("key_source").required(true).args(["key_file", "key"])))]
struct KeyArgs {
    /// Key file with one "plain": "cipher" pair per line
    #[arg(short = 'f', long)]
    key_file: Option<PathBuf>,

    /// 26-slot cipher alphabet; slot i encrypts the i-th letter, '_' leaves it unset
    #[arg(short, long)]
    key: Option<String>,

    #[command(flatten)]
    input: TextArg,
}

#[derive(Args, Debug)]
struct CrackArgs {
    /// A word known to occur in the plaintext
    #[arg(short, long)]
    clue: String,

    /// Newline-delimited word list
    #[arg(short, long, default_value = DEFAULT_DICTIONARY)]
    dictionary: PathBuf,

    /// Report every valid decode instead of the first one found
    #[arg(short, long)]
    all: bool,

    /// Give up after this many seconds
    #[arg(short, long)]
    timeout: Option<f64>,

    /// Number of worker threads (default: one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Search clue placements one after another on the calling thread
    #[arg(long)]
    sequential: bool,

    /// Write the recovered key to this file
    #[arg(long)]
    save_key: Option<PathBuf>,

    #[command(flatten)]
    input: TextArg,
}

#[derive(Args, Debug)]
struct FrequencyArgs {
    /// A word known to occur in the plaintext
    #[arg(short, long)]
    clue: Option<String>,

    /// Maximum number of letters to guess from frequencies (default: all)
    #[arg(short = 'b', long)]
    letter_budget: Option<usize>,

    /// Newline-delimited word list
    #[arg(short, long, default_value = DEFAULT_DICTIONARY)]
    dictionary: PathBuf,

    #[command(flatten)]
    input: TextArg,
}

/// Entry point of the monocrack CLI.
///
/// Delegates to [`try_main`], printing any error in detail before exiting with
/// code 1.
fn main() -> ExitCode {
    let debug_enabled = std::env::var("MONOCRACK_DEBUG").is_ok();
    monocrack::log::init_logger(debug_enabled);

    if let Err(e) = try_main() {
        if let Some(crack_err) = e.downcast_ref::<CrackError>() {
            eprintln!("Error: {}", crack_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Dispatch the subcommand. Results go to stdout, status and timings to stderr.
fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Encrypt(args) => {
            let key = load_key(&args)?;
            println!("{}", cracker::encrypt(&key, &read_text(args.input)?));
        }
        Command::Decrypt(args) => {
            let key = load_key(&args)?;
            println!("{}", cracker::decrypt(&key, &read_text(args.input)?));
        }
        Command::Crack(args) => run_crack(args)?,
        Command::Frequency(args) => run_frequency(args)?,
        Command::Rank(input) => {
            let ranking = frequency::rank(&read_text(input)?);
            for (letter, count) in ranking.entries() {
                println!("{letter} {count}");
            }
            eprintln!("{} letter(s), {} distinct", ranking.total(), ranking.len());
        }
    }

    Ok(())
}

fn run_crack(args: CrackArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ciphertext = read_text(args.input)?;
    let (dictionary, load_secs) = load_dictionary(&args.dictionary)?;

    let config = SearchConfig {
        parallel: !args.sequential,
        threads: args.threads,
        time_limit: args.timeout.map(Duration::try_from_secs_f64).transpose()?,
        collect_all: args.all,
    };

    let t_search = Instant::now();
    let outcome = cracker::crack_with_clue_brute_force(&ciphertext, &args.clue, &dictionary, &config)?;
    let search_secs = t_search.elapsed().as_secs_f64();

    for cracked in &outcome.results {
        println!("{}", cracked.plaintext);
        eprintln!("  key {} (clue at '{}')", cracked.key.cipher_alphabet(), cracked.token);
    }

    match outcome.status {
        SearchStatus::Found => {
            eprintln!("✓ Found {} decode(s)", outcome.results.len());
        }
        SearchStatus::Exhausted => {
            eprintln!("✗ No key turns the ciphertext into dictionary words");
        }
        SearchStatus::TimedOut { elapsed } => {
            eprintln!(
                "⚠️  Timed out after {:.1}s; {} decode(s) found before stopping",
                elapsed.as_secs_f64(),
                outcome.results.len()
            );
        }
    }

    if let (Some(path), Some(best)) = (&args.save_key, outcome.best()) {
        std::fs::write(path, key_file::render_key_file(&best.key))?;
        eprintln!("Key written to '{}'", path.display());
    }

    eprintln!(
        "Loaded {} words in {:.3}s; searched {} placement(s), {} key(s) in {:.3}s.",
        dictionary.len(),
        load_secs,
        outcome.branches,
        outcome.keys_checked,
        search_secs
    );

    Ok(())
}

fn run_frequency(args: FrequencyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ciphertext = read_text(args.input)?;
    let (dictionary, load_secs) = load_dictionary(&args.dictionary)?;

    let t_guess = Instant::now();
    let guess: FrequencyCrack = match &args.clue {
        Some(clue) => cracker::crack_with_clue_and_frequency_seed(&ciphertext, clue, args.letter_budget, &dictionary),
        None => cracker::crack_with_frequency(&ciphertext, args.letter_budget, &dictionary),
    };
    let guess_secs = t_guess.elapsed().as_secs_f64();

    println!("{}", guess.plaintext);
    eprintln!("  key {}", guess.key.cipher_alphabet());
    if guess.validated {
        eprintln!("✓ Every word is in the dictionary");
    } else {
        eprintln!("⚠️  Unvalidated guess; some words are not in the dictionary");
    }
    eprintln!(
        "Loaded {} words in {:.3}s; guessed {} pair(s) in {:.3}s.",
        dictionary.len(),
        load_secs,
        guess.key.len(),
        guess_secs
    );

    Ok(())
}

fn load_dictionary(path: &Path) -> Result<(Dictionary, f64), CrackError> {
    let t_load = Instant::now();
    let dictionary = Dictionary::load_from_path(path)?;
    Ok((dictionary, t_load.elapsed().as_secs_f64()))
}

fn load_key(args: &KeyArgs) -> Result<KeyMap, CrackError> {
    match (&args.key_file, &args.key) {
        (Some(path), _) => key_file::load_key_file(path),
        (None, Some(alphabet)) => alphabet.parse(),
        // clap's required group rules this out
        (None, None) => Ok(KeyMap::new()),
    }
}

/// The positional text, or all of stdin without its trailing newline.
fn read_text(input: TextArg) -> std::io::Result<String> {
    if let Some(text) = input.text {
        return Ok(text);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf.trim_end_matches(['\n', '\r']).to_string())
}
