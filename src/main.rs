use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use upi_assist::application::engine::PaymentEngine;
use upi_assist::domain::session::{Channel, PaymentStatus};
use upi_assist::infrastructure::in_memory::{ScriptedPoll, ScriptedStatusSource, SequentialGateway};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// UPI payment descriptor, e.g. "upi://pay?pa=merchant@upi&pn=Store&am=150"
    descriptor: String,

    /// Amount to send; required unless the descriptor embeds one
    #[arg(long)]
    amount: Option<String>,

    /// Assistance channel: ussd or ivr
    #[arg(long, default_value = "ussd")]
    channel: String,

    /// Milliseconds between status polls
    #[arg(long, default_value_t = 3000)]
    poll_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let channel: Channel = cli.channel.parse().into_diagnostic()?;

    // The descriptor decoder and the session are real; the remote
    // collaborators are simulated so a full attempt can be walked offline.
    let source = Arc::new(ScriptedStatusSource::new([
        ScriptedPoll::Respond(PaymentStatus::Processing),
        ScriptedPoll::Respond(PaymentStatus::Processing),
        ScriptedPoll::Respond(PaymentStatus::Success),
    ]));
    let engine = PaymentEngine::new(source)
        .with_gateway(Arc::new(SequentialGateway::new()))
        .with_poll_interval(Duration::from_millis(cli.poll_interval_ms));

    let session = engine.capture_raw(&cli.descriptor).into_diagnostic()?;
    if let Some(descriptor) = session.descriptor.as_ref() {
        println!(
            "Paying {} ({})",
            descriptor.payee_display_name(),
            descriptor.payee_identifier()
        );
        if let Some(note) = descriptor.note() {
            println!("Note: {note}");
        }
    }

    if let Some(amount_text) = cli.amount.as_deref() {
        engine.enter_amount(amount_text).into_diagnostic()?;
    }

    let session = engine.confirm(channel).await.into_diagnostic()?;
    if let Some(amount) = session.amount {
        println!("Amount: {}", amount.formatted());
    }
    if let Some(reference) = session.local_correlation_id.as_deref() {
        println!("Reference: {reference}");
    }
    if let Some(remote) = session.remote_transaction_id.as_deref() {
        println!("Remote transaction: {remote}");
    }

    println!();
    if let Some(steps) = session.instructions.as_ref() {
        for (index, step) in steps.iter().enumerate() {
            println!("{}. {step}", index + 1);
        }
    }
    println!();

    let (done_tx, mut done_rx) = tokio::sync::watch::channel(());
    engine.subscribe(move |snapshot| {
        if snapshot.is_terminal() {
            let _ = done_tx.send(());
        }
    });

    if engine.start_status_polling() {
        println!("Tracking payment status...");
        done_rx.changed().await.into_diagnostic()?;
    }

    if let Some(status) = engine.snapshot().status {
        println!("Final status: {status}");
    }
    engine.reset();

    Ok(())
}
