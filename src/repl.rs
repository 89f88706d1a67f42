//! Line oriented command loop over a [`Session`]

use std::io::Write;
use std::time::Duration;

use clap::{Parser, Subcommand};
use perch_types::Rect;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::session::{Session, TipArgs};

#[derive(Parser)]
#[command(name = "perch")]
struct Repl {
    #[command(subcommand)]
    command: Option<ReplCommand>,
}

#[derive(Subcommand)]
enum ReplCommand {
    /// Add or replace a named anchor box
    #[command(allow_negative_numbers = true)]
    Anchor {
        name: String,
        top: f64,
        left: f64,
        width: f64,
        height: f64,
    },
    /// Move an existing anchor
    #[command(name = "move", allow_negative_numbers = true)]
    MoveAnchor {
        name: String,
        top: f64,
        left: f64,
        width: f64,
        height: f64,
    },
    /// Remove an anchor from the document
    Remove { name: String },
    /// Create a hidden tooltip
    Tip {
        name: String,
        #[command(flatten)]
        args: TipArgs,
    },
    Attach { tip: String, anchor: String },
    Detach { tip: String },
    Show { tip: String },
    Hide { tip: String },
    Toggle { tip: String },
    Place { tip: String, placement: String },
    /// Replace the body text
    Text { tip: String, text: String },
    /// Position against a fixed point
    #[command(allow_negative_numbers = true)]
    At { tip: String, x: f64, y: f64 },
    #[command(allow_negative_numbers = true)]
    Scroll { dx: f64, dy: f64 },
    Resize { width: f64, height: f64 },
    /// Let pending passes and transitions run for MS milliseconds
    Wait { ms: u64 },
    /// Run a pending reposition pass now
    Flush,
    Status,
    Destroy { tip: String },
    Exit,
}

/// Print the prompt and read one line. None at end of input.
async fn readline<R>(lines: &mut tokio::io::Lines<R>) -> Result<Option<String>, String>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    write!(std::io::stdout(), "$ ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    lines.next_line().await.map_err(|e| e.to_string())
}

/// Run the session until `exit` or end of input.
///
/// Must be driven inside a `tokio::task::LocalSet`; timers keep firing
/// while the loop waits for input.
pub async fn run(mut session: Session) -> Result<(), String> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = readline(&mut lines).await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut session).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

/// Execute one command line. Returns true when the session should end.
pub async fn respond(line: &str, session: &mut Session) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "perch".to_string());
    let repl = Repl::try_parse_from(args).map_err(|e| e.to_string())?;

    let output = match repl.command {
        Some(ReplCommand::Anchor {
            name,
            top,
            left,
            width,
            height,
        }) => session.anchor(&name, Rect::new(top, left, width, height)),
        Some(ReplCommand::MoveAnchor {
            name,
            top,
            left,
            width,
            height,
        }) => session.move_anchor(&name, Rect::new(top, left, width, height)),
        Some(ReplCommand::Remove { name }) => session.remove_anchor(&name),
        Some(ReplCommand::Tip { name, args }) => session.create(&name, args),
        Some(ReplCommand::Attach { tip, anchor }) => session.attach(&tip, &anchor),
        Some(ReplCommand::Detach { tip }) => session.detach(&tip),
        Some(ReplCommand::Show { tip }) => session.show(&tip),
        Some(ReplCommand::Hide { tip }) => session.hide(&tip),
        Some(ReplCommand::Toggle { tip }) => session.toggle(&tip),
        Some(ReplCommand::Place { tip, placement }) => session.place(&tip, &placement),
        Some(ReplCommand::Text { tip, text }) => session.text(&tip, text),
        Some(ReplCommand::At { tip, x, y }) => session.at(&tip, x, y),
        Some(ReplCommand::Scroll { dx, dy }) => session.scroll(dx, dy),
        Some(ReplCommand::Resize { width, height }) => session.resize(width, height),
        Some(ReplCommand::Wait { ms }) => session.wait(Duration::from_millis(ms)).await,
        Some(ReplCommand::Flush) => session.flush(),
        Some(ReplCommand::Status) => session.status(),
        Some(ReplCommand::Destroy { tip }) => session.destroy(&tip),
        Some(ReplCommand::Exit) => return Ok(true),
        None => Ok(String::new()),
    }
    .map_err(|e| e.to_string())?;

    if !output.is_empty() {
        writeln!(std::io::stdout(), "{output}").map_err(|e| e.to_string())?;
    }
    Ok(false)
}
