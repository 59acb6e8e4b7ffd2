//! CLI entry point for `webmail`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use webmail_model::config::{self, Config};
use webmail_model::credentials::{CachedProvider, TerminalPrompt};
use webmail_model::mailbox::spool::{EmlDirectoryReader, SpoolSender};
use webmail_model::mailbox::{MailboxReader, MailboxSender};
use webmail_model::model::summary::{Field, MessageSummary};
use webmail_model::parser::eml;
use webmail_model::variant::compose::ComposeMessage;
use webmail_model::{EmailAddress, Message, Operation};

#[derive(Parser)]
#[command(
    name = "webmail",
    version,
    about = "Read, list and compose mail through a capability-aware message model"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to $WEBMAIL_CONFIG or the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one .eml message, field by field
    Show {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List messages in an inbox directory
    List {
        /// Directory of .eml files (defaults to the configured inbox)
        dir: Option<PathBuf>,
        #[arg(long)]
        json: bool,
        /// Fail on unreadable files instead of skipping them
        #[arg(long)]
        strict: bool,
    },
    /// Compose a message and write it to the outbox
    Compose {
        #[arg(short, long)]
        subject: String,
        /// Message body (use "-" to read stdin)
        #[arg(short, long)]
        body: String,
        #[arg(long, value_name = "ADDRESS")]
        to: Vec<EmailAddress>,
        #[arg(long, value_name = "ADDRESS")]
        cc: Vec<EmailAddress>,
        #[arg(long, value_name = "ADDRESS")]
        bcc: Vec<EmailAddress>,
        /// Sender (defaults to the configured account)
        #[arg(long, value_name = "ADDRESS")]
        from: Option<EmailAddress>,
        /// Outbox directory (defaults to the configured outbox)
        #[arg(short, long)]
        outbox: Option<PathBuf>,
    },
    /// Show which operations each message variant supports
    Capabilities {
        #[arg(long)]
        json: bool,
    },
    /// Resolve account (and proxy) credentials, prompting if needed
    Login {
        /// Remember the account user name in the config file (never the password)
        #[arg(long)]
        save: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config(),
    };

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Show { path, json } => cmd_show(&path, json, &config),
        Commands::List { dir, json, strict } => {
            let dir = dir.unwrap_or_else(|| config::inbox_dir(&config));
            cmd_list(&dir, json, strict, &config)
        }
        Commands::Compose {
            subject,
            body,
            to,
            cc,
            bcc,
            from,
            outbox,
        } => {
            let outbox = outbox.unwrap_or_else(|| config::outbox_dir(&config));
            let draft = Draft {
                subject,
                body,
                to,
                cc,
                bcc,
                from,
            };
            cmd_compose(draft, &outbox, &config)
        }
        Commands::Capabilities { json } => cmd_capabilities(json),
        Commands::Login { save } => cmd_login(&config, cli.config.as_deref(), save),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_path = config::log_file_path(config);
    let log_target = log_path.parent().zip(log_path.file_name());
    if let Some((log_dir, file_name)) =
        log_target.filter(|(dir, _)| std::fs::create_dir_all(dir).is_ok())
    {
        let file_appender = tracing_appender::rolling::never(log_dir, file_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Print every field of a single message.
fn cmd_show(path: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    let message = eml::parse_eml(path, config.general.preview_length)?;
    let summary = MessageSummary::of(&message)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let date_format = config.general.date_format.as_str();
    println!();
    println!("  {:<14} {}", "Subject", summary.subject);
    println!("  {:<14} {}", "From", summary.from);
    println!("  {:<14} {}", "Date", summary.send_date.format(date_format));
    println!("  {:<14} {}", "To", render_list(&summary.to));
    println!("  {:<14} {}", "Cc", render_list(&summary.cc));
    println!("  {:<14} {}", "Link", render_optional(&summary.link));
    println!("  {:<14} {}", "Preview", render_optional(&summary.preview));
    println!();
    match &summary.content_text {
        Field::Value(text) => println!("{text}"),
        Field::Unsupported => println!("  (body unsupported)"),
    }
    Ok(())
}

/// List the messages of an inbox directory, newest first.
fn cmd_list(dir: &Path, json: bool, strict: bool, config: &Config) -> anyhow::Result<()> {
    let reader = EmlDirectoryReader::new(dir, config.general.preview_length).strict(strict);
    let messages = reader.messages()?;

    if json {
        let summaries = messages
            .iter()
            .map(|m| MessageSummary::of(m.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let output = serde_json::json!({
            "dir": dir.to_string_lossy(),
            "message_count": summaries.len(),
            "messages": summaries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("  {} message(s) in {}", messages.len(), dir.display());
    println!();
    if messages.is_empty() {
        return Ok(());
    }

    println!("  {:<4} {:<17} {:<25} {:<40}", "#", "Date", "From", "Subject");
    println!("  {}", "-".repeat(88));
    for (i, message) in messages.iter().enumerate() {
        let date = message
            .send_date()
            .format(&config.general.date_format)
            .to_string();
        let from = message.from();
        let from = from.display_name().unwrap_or(from.address());
        let from_trunc: String = from.chars().take(24).collect();
        let subj_trunc: String = message.subject().chars().take(39).collect();
        println!(
            "  {:<4} {:<17} {:<25} {:<40}",
            i + 1,
            date,
            from_trunc,
            subj_trunc
        );
    }
    println!();
    Ok(())
}

/// Command-line input for `compose`.
struct Draft {
    subject: String,
    body: String,
    to: Vec<EmailAddress>,
    cc: Vec<EmailAddress>,
    bcc: Vec<EmailAddress>,
    from: Option<EmailAddress>,
}

/// Build a compose buffer through the message interface and spool it.
fn cmd_compose(draft: Draft, outbox: &Path, config: &Config) -> anyhow::Result<()> {
    let from = match draft.from.or_else(|| config.sender_address()) {
        Some(from) => from,
        None => anyhow::bail!("No sender: pass --from or set [account] user in the config"),
    };
    let body = if draft.body == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        draft.body
    };

    let mut compose = ComposeMessage::new(from);
    {
        let message: &mut dyn Message = &mut compose;
        message.set_subject(draft.subject)?;
        message.set_content_text(body)?;
        for to in draft.to {
            message.add_to(to)?;
        }
        for cc in draft.cc {
            message.add_cc(cc)?;
        }
        for bcc in draft.bcc {
            message.add_bcc(bcc)?;
        }
    }

    let delivery = SpoolSender::new(outbox).send(compose)?;
    println!(
        "  Spooled message for {} recipient(s)",
        delivery.recipients.len()
    );
    if let Some(path) = delivery.location {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Print the capability matrix of every variant.
fn cmd_capabilities(json: bool) -> anyhow::Result<()> {
    let catalog = webmail_model::variant::catalog();

    if json {
        let variants: Vec<serde_json::Value> = catalog
            .iter()
            .map(|(name, caps)| {
                serde_json::json!({
                    "variant": name,
                    "read_only": caps.is_read_only(),
                    "supports": caps.iter().map(Operation::name).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&variants)?);
        return Ok(());
    }

    println!();
    print!("  {:<18}", "Operation");
    for (name, _) in &catalog {
        print!(" {name:<9}");
    }
    println!();
    println!("  {}", "-".repeat(18 + catalog.len() * 10));
    for op in Operation::ALL {
        print!("  {:<18}", op.name());
        for (_, caps) in &catalog {
            let mark = if caps.contains(op) { "yes" } else { "-" };
            print!(" {mark:<9}");
        }
        println!();
    }
    println!("  {}", "-".repeat(18 + catalog.len() * 10));
    print!("  {:<18}", "read-only");
    for (_, caps) in &catalog {
        let mark = if caps.is_read_only() { "yes" } else { "no" };
        print!(" {mark:<9}");
    }
    println!();
    println!();
    Ok(())
}

/// Resolve credentials the way a live client would.
fn cmd_login(config: &Config, config_path: Option<&Path>, save: bool) -> anyhow::Result<()> {
    let prompt = CachedProvider::new(if config.account.user.is_empty() {
        TerminalPrompt::new()
    } else {
        TerminalPrompt::with_username(config.account.user.clone())
    });

    let account = config.account_credentials(&prompt)?;
    println!("  {:<10} {}", "Account", account.username());

    if save && account.username() != config.account.user {
        let path = match config_path.map(Path::to_path_buf).or_else(config::config_file_path) {
            Some(path) => path,
            None => anyhow::bail!("Could not determine config file path"),
        };
        let mut updated = config.clone();
        updated.account.user = account.username().to_string();
        config::save_config(&updated, &path)?;
        println!("  {:<10} {}", "Saved", path.display());
    }

    if config.use_proxy() {
        let proxy_prompt = TerminalPrompt::with_username(config.proxy.user.clone());
        match config.proxy_credentials(&proxy_prompt)? {
            Some(creds) => println!(
                "  {:<10} {}@{}:{}",
                "Proxy",
                creds.username(),
                config.proxy.host,
                config.proxy.port
            ),
            None => println!("  {:<10} {}:{}", "Proxy", config.proxy.host, config.proxy.port),
        }
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "webmail", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

fn render_list(field: &Field<Vec<EmailAddress>>) -> String {
    match field {
        Field::Value(list) if list.is_empty() => "(none)".to_string(),
        Field::Value(list) => list
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Field::Unsupported => "(unsupported)".to_string(),
    }
}

fn render_optional(field: &Field<Option<String>>) -> String {
    match field {
        Field::Value(Some(value)) => value.clone(),
        Field::Value(None) => "(none)".to_string(),
        Field::Unsupported => "(unsupported)".to_string(),
    }
}
