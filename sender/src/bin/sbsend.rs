use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use sender::cli::{Launch, SendArgs, launch};
use sender::connection::{ConnectionString, build_sqs_client};
use sender::sqs::{self, SqsTransport};
use sender::{dispatcher, logging, message};
use tracing::info;

const RULER: &str = "-----------------";

#[derive(Parser, Debug)]
#[command(
    name = "sbsend",
    version,
    about = "simple messages sending utility to SQS",
    args_override_self = true
)]
struct Args {
    #[command(flatten)]
    send: SendArgs,
}

fn print_banner() -> Result<()> {
    println!(
        "sbsend v{} - simple messages sending utility to SQS",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    Args::command().print_help().context("printing usage")?;
    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let settings = match launch(&args.send) {
        Launch::Usage => return print_banner(),
        Launch::Send(settings) => settings,
    };

    println!("{RULER}");
    println!("{settings}");
    println!("{RULER}");

    let queue_name = settings.require_queue_name()?;
    let conn = ConnectionString::parse(&settings.connection_string)
        .context("parsing connection string")?;
    let client = build_sqs_client(&conn).await?;
    let url = sqs::get_queue_url(&client, queue_name).await?;
    info!(queue_url = %url, region = %conn.region, "resolved destination");

    let transport = SqsTransport::new(client, url);
    let messages = message::generate(settings.count, &settings.prefix);
    for m in &messages {
        println!("{m}");
    }

    let summary = dispatcher::run(&transport, messages).await?;

    println!(
        "Sent a batch of {} messages in {} batch(es) to the queue: {}",
        summary.messages, summary.batches, queue_name
    );
    Ok(())
}
