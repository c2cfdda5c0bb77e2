//! FlowMind CLI
//!
//! Usage:
//!   flowmind [OPTIONS] [FILE]
//!
//! Compiles FlowMind source (from a file or stdin) to a laid-out graph,
//! printed as JSON. Structural warnings go to stderr.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use flowmind::{
    compile_with_config, Algorithm, CompileConfig, Direction, LayoutConfig, Theme,
};

#[derive(Parser)]
#[command(name = "flowmind")]
#[command(about = "Text-to-graph compiler for AI-written flow diagrams")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Theme file for per-kind default styling (TOML format)
    #[arg(short, long)]
    theme: Option<PathBuf>,

    /// Flow direction of the layout
    #[arg(short, long, value_enum, default_value = "down")]
    direction: DirectionArg,

    /// Placement algorithm
    #[arg(short, long, value_enum, default_value = "layered")]
    algorithm: AlgorithmArg,

    /// Skip the layout pass (positions stay zeroed)
    #[arg(long)]
    no_layout: bool,

    /// Compact JSON output (single line)
    #[arg(short, long)]
    compact: bool,

    /// Show language grammar reference
    #[arg(short, long)]
    grammar: bool,

    /// Show annotated examples
    #[arg(short, long)]
    examples: bool,

    /// Output LLM-optimized skill document for agent integration
    #[arg(long)]
    skill: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Down,
    Right,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Layered,
    Grid,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle documentation flags first
    if cli.grammar {
        print_grammar();
        return;
    }

    if cli.examples {
        print_examples();
        return;
    }

    if cli.skill {
        println!("{}", flowmind::prompt::SKILL_REFERENCE);
        return;
    }

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    // Load theme
    let theme = match &cli.theme {
        Some(path) => match Theme::from_file(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error loading theme '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Theme::default(),
    };

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    // Report structural warnings with source context before compiling; the
    // compile itself is lenient and never fails.
    let parsed = flowmind::parse_source(&source);
    for err in &parsed.errors {
        eprint!("{}", err.format(&source, &filename));
    }

    let layout = LayoutConfig::new()
        .with_direction(match cli.direction {
            DirectionArg::Down => Direction::Down,
            DirectionArg::Right => Direction::Right,
        })
        .with_algorithm(match cli.algorithm {
            AlgorithmArg::Layered => Algorithm::Layered,
            AlgorithmArg::Grid => Algorithm::Grid,
        });
    let mut config = CompileConfig::new().with_layout(layout).with_theme(theme);
    if cli.no_layout {
        config = config.without_layout();
    }

    let graph = compile_with_config(&source, &config);

    let json = if cli.compact {
        serde_json::to_string(&graph)
    } else {
        serde_json::to_string_pretty(&graph)
    };
    match json {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("Error serializing graph: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"FlowMind - text-to-graph compiler for AI-written flow diagrams

USAGE:
    flowmind [OPTIONS] [FILE]
    echo '<source>' | flowmind

OPTIONS:
    -g, --grammar      Show language grammar reference
    -e, --examples     Show annotated examples
    --skill            Output LLM skill document (for embedding in agent context)
    -t, --theme        Custom styling palette (TOML file)
    -d, --direction    Layout direction (down, right)
    -a, --algorithm    Placement algorithm (layered, grid)
    --no-layout        Skip the layout pass
    -c, --compact      Single-line JSON output
    -h, --help         Print help

QUICK START:
    echo '[start] a: Begin
a -> b' | flowmind > graph.json

This compiles two nodes and an edge to a positioned JSON graph.
Run --grammar for syntax reference or --examples for more patterns."#
    );
}

fn print_grammar() {
    println!(
        r#"FLOWMIND GRAMMAR
================

Line-oriented; every line is classified independently, first match wins.
Unrecognized lines are silently ignored.

METADATA
--------
name: "value"                 One entry per line; no '[' or arrow on the line.
                              Keys are lower-cased; values are typed
                              (string / number / boolean).

NODES
-----
[kind] id: Label {{attrs}}     Declare a node. The id is optional:
[kind] Label {{attrs}}         the id then defaults to the label text.

Kinds: start, process, decision, end, system, note, section, browser,
mobile, button, input, icon, placeholder, container.
Unrecognized kinds fall back to process.

EDGES
-----
a -> b {{attrs}}               Plain edge between refs (id or label)
a --> b                       Curved
a ..> b                       Dashed
a ==> b                       Thick
a ->|Yes| b                   Branch label

Referencing an undeclared name creates an implicit process node with
that label; the same name always resolves to the same node.

GROUPS
------
group "Label" {{               Open a group (nestable)
    [process] x: X            Members are parented to the group
}}                             Close on its own line

ATTRIBUTES
----------
{{key: value, ...}} after a node label or edge target:
    color: "emerald"          Color token
    icon: "Zap"               Icon name
    subLabel: "details"       Secondary text
    styleType: "dashed"       Edge rendering hint (overrides the arrow)

Values: "quoted string" (commas and colons allowed inside), number,
true/false, or a bare token. Malformed blocks are ignored.

COMMENTS
--------
# anything                    Ignored"#
    );
}

fn print_examples() {
    println!(
        r#"FLOWMIND EXAMPLES
=================

EXAMPLE 1: Linear flow with metadata
------------------------------------
flow: "Signup"
[start] a: Visit page {{color: "emerald", icon: "Play", subLabel: "entry"}}
[process] b: Fill form {{color: "blue", icon: "PenLine", subLabel: "details"}}
[end] c: Account created {{color: "red", icon: "Flag", subLabel: "done"}}
a -> b
b -> c

Three nodes and two edges; metadata is carried on the graph.

EXAMPLE 2: Branching decision
-----------------------------
[start] visit: Open checkout
[decision] stock: In stock?
[process] ship: Ship order
[process] notify: Notify customer
visit -> stock
stock ->|yes| ship
stock ->|no| notify

The |labels| name the branches out of the decision.

EXAMPLE 3: Groups
-----------------
group "Backend" {{
    [process] api: API
    [process] db: Database
    api ..> db
}}
[browser] ui: Web client
ui -> api

Grouped nodes are parented to the group for containment layout; the
dashed arrow is a styling hint on the edge.

EXAMPLE 4: Implicit nodes
-------------------------
[start] begin: Kickoff
begin -> Review
Review -> Publish

'Review' and 'Publish' were never declared; the compiler synthesizes
process nodes with those labels."#
    );
}
