use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use chatbot_widget::bundle::{BUNDLE_FILE, artifact_names, bundle_script};
use chatbot_widget::embed::{EmbedKind, EmbedSnippets};
use chatbot_widget::headless::HeadlessDocument;
use chatbot_widget::host::TokioLocalExecutor;
use chatbot_widget::protocol::{CreateChatbotRequest, Faq, RespondRequest, Tone};
use chatbot_widget::transport::ReplyClient;
use chatbot_widget::transport::http::{ChatbotApi, HttpReplyClient};
use chatbot_widget::{ChatWidget, SendOutcome, WidgetConfig, WidgetError, WidgetOptions, WidgetRegistry};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Widget(#[from] WidgetError),
    #[error("io failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to access {path}: {source}")]
    File { path: PathBuf, source: io::Error },
}

#[derive(Parser, Debug)]
#[command(name = "chatbot-cli", about = "Create and talk to chatbots, and build or embed the widget")]
struct Cli {
    #[arg(long, env = "CHATBOT_API_URL", default_value = chatbot_widget::config::DEFAULT_API_BASE_URL)]
    api_url: String,

    #[arg(long, env = "CHATBOT_TIMEOUT_MS", default_value_t = chatbot_widget::config::DEFAULT_REQUEST_TIMEOUT_MS, help = "Reply timeout in milliseconds, 0 disables")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message and print the reply.
    Send {
        #[command(flatten)]
        bot: BotArgs,
        message: String,
        #[arg(long, default_value_t = false, help = "Print the raw response body")]
        json: bool,
    },
    /// Interactive session through the widget controller.
    Chat(BotArgs),
    /// Print the chatbot's public description.
    Info(BotArgs),
    /// Print an HTML snippet that embeds the chatbot.
    Embed(EmbedArgs),
    /// Generate a chatbot from a business profile and print its embed tag.
    Create(CreateArgs),
    /// Wrap `wasm-pack --target no-modules` output into a single widget.js.
    Bundle(BundleArgs),
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: String,

    #[arg(long)]
    website_url: Option<String>,

    #[arg(long, value_enum, default_value_t = ToneArg::Friendly)]
    tone: ToneArg,

    #[arg(long = "faq", value_parser = parse_faq, help = "Question and answer separated by `::`; repeatable")]
    faqs: Vec<Faq>,

    #[arg(long, default_value_t = false, help = "Print the raw response body")]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ToneArg {
    Friendly,
    Professional,
    Casual,
}

impl From<ToneArg> for Tone {
    fn from(tone: ToneArg) -> Self {
        match tone {
            ToneArg::Friendly => Tone::Friendly,
            ToneArg::Professional => Tone::Professional,
            ToneArg::Casual => Tone::Casual,
        }
    }
}

#[derive(Args, Debug)]
struct BundleArgs {
    #[arg(long, default_value = "pkg", help = "wasm-pack output directory")]
    pkg_dir: PathBuf,

    #[arg(long, default_value = "dist")]
    out_dir: PathBuf,

    #[arg(long, default_value = "chatbot_widget", help = "wasm-pack --out-name")]
    name: String,
}

fn parse_faq(raw: &str) -> Result<Faq, String> {
    let Some((q, a)) = raw.split_once("::") else {
        return Err("expected `question::answer`".to_owned());
    };
    let (q, a) = (q.trim(), a.trim());
    if q.is_empty() || a.is_empty() {
        return Err("question and answer must both be non-empty".to_owned());
    }
    Ok(Faq { q: q.to_owned(), a: a.to_owned() })
}

#[derive(Args, Debug)]
struct BotArgs {
    #[arg(long, env = "CHATBOT_ID")]
    chatbot_id: String,
}

#[derive(Args, Debug)]
struct EmbedArgs {
    #[command(flatten)]
    bot: BotArgs,

    #[arg(long, help = "URL of widget.js; defaults to {api-url}/widget.js")]
    script_url: Option<String>,

    #[arg(long, help = "Origin hosting widget.html; defaults to the API URL")]
    site_origin: Option<String>,

    #[arg(long, value_enum, default_value_t = EmbedFormat::Script)]
    format: EmbedFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EmbedFormat {
    Script,
    Iframe,
    Manual,
}

impl From<EmbedFormat> for EmbedKind {
    fn from(format: EmbedFormat) -> Self {
        match format {
            EmbedFormat::Script => EmbedKind::Script,
            EmbedFormat::Iframe => EmbedKind::Iframe,
            EmbedFormat::Manual => EmbedKind::Manual,
        }
    }
}

impl Cli {
    fn widget_config(&self, bot: &BotArgs) -> Result<WidgetConfig, WidgetError> {
        WidgetConfig::from_options(WidgetOptions {
            api_base_url: Some(self.api_url.clone()),
            request_timeout_ms: Some(self.timeout_ms),
            ..WidgetOptions::for_chatbot(bot.chatbot_id.as_str())
        })
    }

    fn chatbot_api(&self) -> Result<ChatbotApi, WidgetError> {
        let timeout = (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms));
        ChatbotApi::new(&self.api_url, timeout)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Send { bot, message, json } => run_send(cli.widget_config(bot)?, message, *json).await,
        Command::Chat(bot) => run_chat(cli.widget_config(bot)?).await,
        Command::Info(bot) => run_info(cli.widget_config(bot)?).await,
        Command::Embed(args) => {
            println!("{}", embed_snippet(&cli, args)?);
            Ok(())
        }
        Command::Create(args) => run_create(&cli, args).await,
        Command::Bundle(args) => {
            let written = run_bundle(args)?;
            println!("{}", written.display());
            Ok(())
        }
    }
}

async fn run_send(config: WidgetConfig, message: &str, json: bool) -> Result<(), CliError> {
    let client = HttpReplyClient::new(&config)?;
    let request = RespondRequest::new(&config.chatbot_id, message);
    tracing::debug!(url = %config.respond_url(), "sending message");
    let response = client.respond(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }
    println!("{}", response.reply_text());
    if let Some(confidence) = response.meta.and_then(|m| m.confidence) {
        eprintln!("confidence: {confidence:.2}");
    }
    Ok(())
}

async fn run_info(config: WidgetConfig) -> Result<(), CliError> {
    let client = HttpReplyClient::new(&config)?;
    let info = client.chatbot_info().await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

async fn run_chat(config: WidgetConfig) -> Result<(), CliError> {
    let client = HttpReplyClient::new(&config)?;
    let doc = HeadlessDocument::new();

    LocalSet::new()
        .run_until(async move {
            let mut registry = WidgetRegistry::default();
            let widget = ChatWidget::mount(&doc, &mut registry, config, client, Rc::new(TokioLocalExecutor))?;
            widget.open();
            for message in widget.transcript() {
                println!("bot> {}", message.text);
            }

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            prompt()?;
            while let Some(line) = lines.next_line().await? {
                if matches!(line.trim(), "/quit" | "/exit") {
                    break;
                }
                widget.surface().set_input(&line);
                let outcome = widget.send_message().await;
                if outcome != SendOutcome::Ignored {
                    if let Some(reply) = widget.transcript().last() {
                        println!("bot> {}", reply.text);
                    }
                }
                prompt()?;
            }
            widget.close();
            tracing::info!(messages = widget.transcript().len(), "chat session ended");
            Ok::<(), CliError>(())
        })
        .await
}

fn prompt() -> Result<(), CliError> {
    let mut stdout = io::stdout();
    write!(stdout, "you> ")?;
    stdout.flush()?;
    Ok(())
}

fn embed_snippet(cli: &Cli, args: &EmbedArgs) -> Result<String, CliError> {
    let config = cli.widget_config(&args.bot)?;
    let script_url = args.script_url.clone().unwrap_or_else(|| format!("{}/widget.js", config.api_base_url));
    let site_origin = args.site_origin.clone().unwrap_or_else(|| config.api_base_url.clone());
    let snippets = EmbedSnippets::new(&config.chatbot_id, &script_url, &site_origin);
    Ok(snippets.render(args.format.into()))
}

fn create_request(args: &CreateArgs) -> CreateChatbotRequest {
    CreateChatbotRequest {
        website_url: args.website_url.as_deref().map(str::trim).filter(|u| !u.is_empty()).map(str::to_owned),
        tone: args.tone.into(),
        faqs: args.faqs.clone(),
        ..CreateChatbotRequest::new(&args.name, &args.description)
    }
}

async fn run_create(cli: &Cli, args: &CreateArgs) -> Result<(), CliError> {
    let created = cli.chatbot_api()?.create_chatbot(&create_request(args)).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }
    tracing::info!(chatbot_id = %created.chatbot_id, created_at = %created.created_at, "chatbot created");
    let snippets = EmbedSnippets::new(&created.chatbot_id, &created.embed_script_url, &cli.api_url);
    println!("{}", snippets.script_tag());
    Ok(())
}

/// Write `{out_dir}/widget.js` and copy the wasm module beside it. Returns the bundle path.
fn run_bundle(args: &BundleArgs) -> Result<PathBuf, CliError> {
    let (glue_file, wasm_file) = artifact_names(&args.name);
    let glue_path = args.pkg_dir.join(&glue_file);
    let glue = fs::read_to_string(&glue_path).map_err(|source| file_err(&glue_path, source))?;
    let bundle = bundle_script(&glue, &wasm_file)?;

    fs::create_dir_all(&args.out_dir).map_err(|source| file_err(&args.out_dir, source))?;
    let wasm_src = args.pkg_dir.join(&wasm_file);
    let wasm_dst = args.out_dir.join(&wasm_file);
    fs::copy(&wasm_src, &wasm_dst).map_err(|source| file_err(&wasm_src, source))?;

    let bundle_path = args.out_dir.join(BUNDLE_FILE);
    fs::write(&bundle_path, bundle).map_err(|source| file_err(&bundle_path, source))?;
    tracing::info!(bundle = %bundle_path.display(), wasm = %wasm_dst.display(), "widget bundle written");
    Ok(bundle_path)
}

fn file_err(path: &Path, source: io::Error) -> CliError {
    CliError::File { path: path.to_path_buf(), source }
}
