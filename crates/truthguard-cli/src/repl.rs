//! Line-oriented chat loop over stdin.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::warn;
use truthguard_core::{AuthSession, BiasReport, Message, MessageStatus, StoredConversation};
use truthguard_engine::{
    AnalysisOutcome, AppContext, ConversationEngine, FactCheckOutcome, SendOutcome,
};

const HELP: &str = "\
Type a message to chat. Commands:
  /bias                   analyze the latest message you sent
  /factcheck              check the latest message for misinformation
  /new                    start a new conversation
  /save                   save the conversation
  /load                   list saved conversations
  /open <n>               open conversation <n> from the last /load
  /login <user> <pass>    sign in
  /register <user> <pass> create an account
  /logout                 sign out
  /whoami                 show the current session
  /help                   show this text
  /quit                   exit";

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Bias,
    FactCheck,
    New,
    Save,
    Load,
    Open(usize),
    Login { username: String, password: String },
    Register { username: String, password: String },
    Logout,
    WhoAmI,
    Help,
    Quit,
    Empty,
    /// Unknown command or bad arguments; carries the complaint.
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Say(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match (name, args.as_slice()) {
            ("bias", []) => Self::Bias,
            ("factcheck", []) => Self::FactCheck,
            ("new", []) => Self::New,
            ("save", []) => Self::Save,
            ("load", []) => Self::Load,
            ("open", [n]) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Self::Open(n),
                _ => Self::Invalid(format!("Not a conversation number: {n}")),
            },
            ("login", [user, pass]) => Self::Login {
                username: user.to_string(),
                password: pass.to_string(),
            },
            ("register", [user, pass]) => Self::Register {
                username: user.to_string(),
                password: pass.to_string(),
            },
            ("logout", []) => Self::Logout,
            ("whoami", []) => Self::WhoAmI,
            ("help", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            ("open", _) => Self::Invalid("Usage: /open <n>".into()),
            ("login", _) => Self::Invalid("Usage: /login <user> <pass>".into()),
            ("register", _) => Self::Invalid("Usage: /register <user> <pass>".into()),
            _ => Self::Invalid(format!("Unknown command: /{name} (try /help)")),
        }
    }
}

/// Starts a send in the background unless one is already outstanding.
///
/// The engine is marked busy before this returns, so a following line sees
/// it. Returns `false` if the text was refused.
pub fn submit(engine: &Arc<ConversationEngine>, sends: &mut JoinSet<()>, text: &str) -> bool {
    let Some(pending) = engine.try_begin_send(text) else {
        return false;
    };
    engine.set_draft(text);
    let engine = engine.clone();
    sends.spawn(async move {
        match engine.complete_send(pending).await {
            SendOutcome::Replied(reply) | SendOutcome::Failed(reply) => print_message(&reply),
            SendOutcome::Superseded | SendOutcome::Ignored => {}
        }
    });
    true
}

/// Waits for every outstanding send so no reply is lost on exit.
pub async fn drain(sends: &mut JoinSet<()>) {
    while let Some(result) = sends.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "Send task failed");
        }
    }
}

/// Runs the chat loop until `/quit` or end of input.
pub async fn run(ctx: AppContext) -> anyhow::Result<()> {
    let engine = Arc::new(ConversationEngine::new(&ctx));
    let mut sends = JoinSet::new();
    let mut listed: Vec<StoredConversation> = Vec::new();

    match ctx.auth().current().await {
        AuthSession::Authenticated { username, .. } => println!("Signed in as {username}."),
        AuthSession::Anonymous => println!("Guest session. Conversations are kept until exit."),
    }
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Say(text) => {
                if !submit(&engine, &mut sends, &text) {
                    println!("Still waiting for the previous reply.");
                }
            }
            Command::Bias => match engine.analyze_bias().await {
                AnalysisOutcome::NoUserMessage => println!("No user message to analyze"),
                AnalysisOutcome::Stored(report) => print_report(&report),
                AnalysisOutcome::Superseded => {}
            },
            Command::FactCheck => match engine.fact_check().await {
                FactCheckOutcome::NoUserMessage => println!("No user message to analyze"),
                FactCheckOutcome::Flagged => {
                    println!("Possible misinformation detected. Please verify with reliable sources.")
                }
                FactCheckOutcome::Clear => println!("No misinformation detected."),
                FactCheckOutcome::Failed(e) => println!("Fact check failed: {e}"),
            },
            Command::New => {
                engine.new_conversation();
                println!("Started a new conversation.");
            }
            Command::Save => match engine.save().await {
                Ok(kind) => println!("Saved ({kind})."),
                Err(e) => println!("Save failed: {}", e.user_message()),
            },
            Command::Load => match engine.load().await {
                Ok(conversations) => {
                    if conversations.is_empty() {
                        println!("No saved conversations.");
                    }
                    for (i, c) in conversations.iter().enumerate() {
                        println!("{:>3}. {} ({} messages)", i + 1, c.title, c.len());
                    }
                    listed = conversations;
                }
                Err(e) => println!("Load failed: {}", e.user_message()),
            },
            Command::Open(n) => match listed.get(n - 1) {
                Some(conversation) => {
                    engine.open(conversation.clone());
                    for message in engine.transcript() {
                        print_message(&message);
                    }
                }
                None => println!("No conversation {n}. Run /load first."),
            },
            Command::Login { username, password } => {
                if ctx.auth().login(&username, &password).await {
                    println!("Signed in as {username}.");
                } else {
                    println!("Login failed.");
                }
            }
            Command::Register { username, password } => {
                if ctx.auth().register(&username, &password).await {
                    println!("Registered and signed in as {username}.");
                } else {
                    println!("Registration failed.");
                }
            }
            Command::Logout => match ctx.auth().logout().await {
                Ok(()) => println!("Signed out."),
                Err(e) => println!("Logout failed: {}", e.user_message()),
            },
            Command::WhoAmI => match ctx.auth().current().await.username() {
                Some(name) => println!("{name}"),
                None => println!("guest"),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Invalid(complaint) => println!("{complaint}"),
        }
    }
    drain(&mut sends).await;
    Ok(())
}

fn print_message(message: &Message) {
    let who = if message.is_user() { "you" } else { "assistant" };
    let marker = match message.status() {
        MessageStatus::Error => " [error]",
        _ => "",
    };
    println!("{who}{marker}: {}", message.text());
    if message.misinformation_alert() {
        println!("  ! Possible misinformation detected. Please verify with reliable sources.");
    }
}

fn print_report(report: &BiasReport) {
    if let Some(error) = report.error() {
        println!("Bias analysis failed: {error}");
        return;
    }
    let Some(score) = report.score() else {
        return;
    };
    println!("Bias: {} (score {:.1}, {})", score.band, score.score, score.level);
    if !score.trigger_phrases.is_empty() {
        let phrases: Vec<&str> = score.trigger_phrases.iter().map(String::as_str).collect();
        println!("  Triggers: {}", phrases.join(", "));
    }
    if let Some(sentiment) = &score.sentiment {
        println!(
            "  Sentiment: polarity {:.2}, subjectivity {:.2}",
            sentiment.polarity, sentiment.subjectivity
        );
    }
}
