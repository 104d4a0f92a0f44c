use cardstack::render;
use cardstack::Engine;
use rustyline::error::ReadlineError;

const PROMPT: &str = "msg> ";

const HELP: &str = "\
:card     show the current card
:events   recent lifecycle events
:watch    message watcher with it/result
:recent   recently visited cards
:history  lines typed this session
!!, !N    run the last line again, or line N of :history
:quit     leave (also exit, Ctrl-D)";

/// What a `:` line asks the REPL to do.
#[derive(Debug, PartialEq, Eq)]
enum Meta {
    Print(String),
    Quit,
}

fn meta_command(engine: &Engine, line: &str) -> Meta {
    let name = line.trim_start_matches(':').trim();
    match name.to_ascii_lowercase().as_str() {
        "card" => Meta::Print(render::card_view(engine)),
        "events" => Meta::Print(render::event_stream(engine)),
        "watch" => Meta::Print(render::watcher(engine)),
        "recent" => Meta::Print(render::recent_view(engine)),
        "history" => Meta::Print(
            engine
                .history()
                .entries()
                .iter()
                .enumerate()
                .map(|(i, line)| format!("{:>4}  {line}\n", i + 1))
                .collect(),
        ),
        "quit" | "q" => Meta::Quit,
        _ => Meta::Print(HELP.to_string()),
    }
}

/// Expand `!!` or `!N` to a line from the engine's history.
fn recall(engine: &Engine, line: &str) -> Option<String> {
    let rest = line.strip_prefix('!')?.trim();
    let entry = if rest == "!" {
        engine.history().last()
    } else {
        rest.parse().ok().and_then(|n| engine.history().get(n))
    };
    entry.map(str::to_string)
}

/// Run one message-box line; reprint the card when it changed.
fn submit(engine: &mut Engine, line: &str) -> String {
    let before = engine.current_card_index();
    let mut out = engine.execute(line);
    if engine.current_card_index() != before {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(render::card_view(engine).trim_end());
    }
    out
}

pub fn run(engine: &mut Engine) {
    println!("cardstack {} — message box", env!("CARGO_PKG_VERSION"));
    println!("Type commands like `go next` or `put \"Hi\" into field \"Body\"`. :help lists views.\n");
    print!("{}", render::card_view(engine));

    let mut rl = match rustyline::DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("cardstack: cannot initialize line editor: {e}");
            std::process::exit(1);
        }
    };

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if trimmed.eq_ignore_ascii_case("exit") {
                    break;
                }
                if trimmed.starts_with('!') {
                    match recall(engine, trimmed) {
                        Some(recalled) => {
                            println!("{recalled}");
                            let out = submit(engine, &recalled);
                            if !out.is_empty() {
                                println!("{out}");
                            }
                        }
                        None => println!("no such history entry: {trimmed}"),
                    }
                    continue;
                }
                if trimmed.starts_with(':') {
                    match meta_command(engine, trimmed) {
                        Meta::Print(text) => println!("{}", text.trim_end()),
                        Meta::Quit => break,
                    }
                    continue;
                }
                let out = submit(engine, &line);
                if !out.is_empty() {
                    println!("{out}");
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("cardstack: {e}");
                break;
            }
        }
    }
}
