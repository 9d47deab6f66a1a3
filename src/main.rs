mod args;
mod bayes;
mod cache;
mod classify;
mod collect;
mod config;
mod dataset;
mod error;
mod features;
mod labels;
mod mailbox;
mod message;
mod prompt;
mod stats;
mod text;
mod utils;
mod vocabulary;

use anyhow::{anyhow, Context, Result};
use args::{Args, Command};
use collect::Collector;
use config::MailConfig;
use dataset::Dataset;
use features::FeatureSpace;
use mailbox::{GmailClient, Mailbox};
use message::Message;
use prompt::TerminalPrompt;
use text::Analyzer;
use vocabulary::Vocabulary;

fn main() -> Result<()> {
    let args = Args::parse_args();
    let level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    do_main(&args)
}

fn do_main(args: &Args) -> Result<()> {
    let analyzer = Analyzer::english();
    match args.command() {
        Command::Collect => {
            let config = args.mail_config();
            let mailbox = connect(&config)?;
            let mut prompt = TerminalPrompt::stdio();
            let dataset = open_dataset(args, &mailbox, &analyzer);
            let outcome = Collector::new(dataset, &mut prompt, &config).run()?;
            if let Some(accuracy) = outcome.statistics.accuracy() {
                log::info!(
                    "Predictions so far: {} right, {} wrong ({:.1}% accurate)",
                    outcome.statistics.right,
                    outcome.statistics.wrong,
                    accuracy * 100.0
                );
            }
        }
        Command::Build => {
            let mailbox = connect(&args.mail_config())?;
            args.layout.ensure_exists()?;
            let cache = open_dataset(args, &mailbox, &analyzer).build()?;
            log::info!("Feature cache holds {} messages", cache.len());
        }
        Command::Update { refresh } => {
            let mailbox = connect(&args.mail_config())?;
            args.layout.ensure_exists()?;
            let cache = open_dataset(args, &mailbox, &analyzer).update(refresh)?;
            log::info!("Feature cache holds {} messages", cache.len());
        }
        Command::ExtendVocabulary => {
            let mailbox = connect(&args.mail_config())?;
            args.layout.ensure_exists()?;
            let added = open_dataset(args, &mailbox, &analyzer).extend_vocabulary()?;
            log::info!("Added {} stems to the vocabulary", added);
        }
        Command::Classify { id } => {
            let mailbox = connect(&args.mail_config())?;
            let message = Message::parse(mailbox.get_message(&id)?, &analyzer)?;
            let vocabulary = Vocabulary::load(&args.layout.vocabulary())?;
            let features = FeatureSpace::new(&vocabulary).extract(&message);
            let good = classify::predict_from_cache(&args.layout.features(), &features)
                .with_context(|| format!("Failed to classify {}", id))?;
            println!("{}", message);
            println!("{}", if good { "Not Spam" } else { "Spam" });
        }
        Command::Labels => {
            let mailbox = connect(&args.mail_config())?;
            for label in mailbox.labels()? {
                println!("{}\t{}", label.id, label.name);
            }
        }
        Command::Stats => {
            let summary = dataset::summarize(&args.layout)
                .with_context(|| format!("Failed to read {}", args.data_dir.display()))?;
            println!("{}", summary);
        }
    }
    Ok(())
}

fn connect(config: &MailConfig) -> Result<GmailClient> {
    let token = config
        .token
        .as_deref()
        .ok_or_else(|| anyhow!("No access token; pass --token or set MAIL_TRIAGE_TOKEN"))?;
    Ok(GmailClient::new(&config.api_base, &config.user, token))
}

fn open_dataset<'a>(
    args: &'a Args,
    mailbox: &'a GmailClient,
    analyzer: &'a Analyzer,
) -> Dataset<'a, GmailClient> {
    Dataset {
        mailbox,
        analyzer,
        dir: &args.layout,
        quiet: args.quiet,
    }
}
