use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use vocab_forge::StudyService;
use vocab_forge::config::Config;
use vocab_forge::models::Provider;
use vocab_forge::split_word_list;

const USAGE: &str = "usage: vocab-forge [--provider gemini|deepseek] <command>

commands:
  topic <topic> <count> <difficulty>   generate flashcards for a topic
  words <word,word,...>                generate flashcards for a word list
  classical <text>                     analyze a classical Chinese passage
  writing <text> [context]             critique a piece of writing
  chat                                 tutoring chat, one message per stdin line";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let service = StudyService::new(&config);

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut provider = service.default_provider();
    if let Some(pos) = args.iter().position(|a| a == "--provider") {
        let value = args
            .get(pos + 1)
            .cloned()
            .context("--provider needs a value")?;
        provider = value.parse()?;
        args.drain(pos..=pos + 1);
    }

    let Some(command) = args.first().map(String::as_str) else {
        bail!("{USAGE}");
    };

    match (command, &args[1..]) {
        ("topic", [topic, count, difficulty]) => {
            let count: usize = count.parse().context("count must be a number")?;
            let items = service
                .generate_by_topic(topic, count, difficulty, provider)
                .await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        ("words", rest) if !rest.is_empty() => {
            let words = split_word_list(&rest.join("\n"));
            let items = service.generate_from_list(&words, provider).await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        ("classical", [text]) => {
            let result = service.analyze_classical_text(text, provider).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        ("writing", [text]) => {
            let critique = service.analyze_writing(text, None, provider).await?;
            println!("{}", serde_json::to_string_pretty(&critique)?);
        }
        ("writing", [text, context]) => {
            let critique = service
                .analyze_writing(text, Some(context.as_str()), provider)
                .await?;
            println!("{}", serde_json::to_string_pretty(&critique)?);
        }
        ("chat", []) => run_chat(&service, provider).await?,
        _ => bail!("{USAGE}"),
    }

    Ok(())
}

async fn run_chat(service: &StudyService, provider: Provider) -> Result<()> {
    let session = service.start_chat(provider);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match session.send_message(line).await {
            Ok(reply) => println!("{reply}"),
            // A failed turn is reported and the session carries on
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}
