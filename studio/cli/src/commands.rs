//! Subcommand implementations
//!
//! Each command returns the process exit code. Errors that mean "the tool
//! could not run" propagate as `anyhow::Error`; outcomes the user asked
//! about (a failed job, an unreachable service) become exit codes.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use studio_core::palette::{self, Preset};
use studio_core::{
    GenerationRequest, HttpGenerationService, JobClient, JobId, JobSnapshot, JobUpdate,
    StudioConfig,
};

type Client = JobClient<HttpGenerationService>;

/// Exit code for Ctrl-C, as shells report SIGINT
const EXIT_INTERRUPTED: u8 = 130;

/// How a watch ended
enum WatchOutcome {
    Completed(JobSnapshot),
    Failed,
    Interrupted,
}

/// Build a client from resolved configuration
pub fn connect(config: &StudioConfig) -> Result<Client> {
    let service = HttpGenerationService::from_config(&config.service)
        .context("Failed to create generation service client")?;
    Ok(JobClient::new(service).with_options(config.watch_options()))
}

pub async fn generate(
    client: &Client,
    topic: &str,
    color: &str,
    detach: bool,
    download: Option<&Path>,
) -> Result<ExitCode> {
    let color = palette::resolve_or_hex(color)?;
    let request = GenerationRequest::new(topic, color)?;

    let job_id = match client.submit(&request).await {
        Ok(job_id) => job_id,
        Err(e) => {
            eprintln!("Submission failed: {}", e.cause());
            return Ok(ExitCode::FAILURE);
        }
    };

    if detach {
        println!("{job_id}");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Job {job_id} submitted ({})", request.waveform_color());
    finish(client, job_id, download).await
}

pub async fn watch(client: &Client, job_id: String, download: Option<&Path>) -> Result<ExitCode> {
    finish(client, JobId::new(job_id), download).await
}

async fn finish(client: &Client, job_id: JobId, download: Option<&Path>) -> Result<ExitCode> {
    match watch_until_done(client, job_id).await {
        WatchOutcome::Completed(snapshot) => {
            print_result(client, &snapshot);
            if let Some(dir) = download {
                download_results(client, &snapshot, dir).await?;
            }
            Ok(ExitCode::SUCCESS)
        }
        WatchOutcome::Failed => Ok(ExitCode::FAILURE),
        WatchOutcome::Interrupted => Ok(ExitCode::from(EXIT_INTERRUPTED)),
    }
}

/// Print every update until the loop ends or the user hits Ctrl-C
async fn watch_until_done(client: &Client, job_id: JobId) -> WatchOutcome {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = client.watch(job_id, move |update| {
        let _ = tx.send(update);
    });

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(update) = update else {
                    // Loop exited without a terminal update; only happens on cancel
                    return WatchOutcome::Interrupted;
                };

                match update {
                    JobUpdate::Snapshot(snapshot) => {
                        println!("{}", status_line(&snapshot));
                        if snapshot.is_completed() {
                            return WatchOutcome::Completed(snapshot);
                        }
                        if snapshot.is_failed() {
                            eprintln!(
                                "Job failed: {}",
                                snapshot.error.as_deref().unwrap_or("no reason given")
                            );
                            return WatchOutcome::Failed;
                        }
                    }
                    JobUpdate::PollFailed(e) => {
                        eprintln!("Lost track of job: {e}");
                        return WatchOutcome::Failed;
                    }
                    timed_out @ JobUpdate::TimedOut { .. } => {
                        let reason = timed_out.snapshot().error.unwrap_or_default();
                        eprintln!("Stopped watching {}: {reason}", timed_out.job_id());
                        return WatchOutcome::Failed;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
                eprintln!("Interrupted; job {} keeps running on the service", handle.job_id());
                return WatchOutcome::Interrupted;
            }
        }
    }
}

pub async fn status(client: &Client, job_id: String) -> Result<ExitCode> {
    let job_id = JobId::new(job_id);
    let snapshot = client
        .status(&job_id)
        .await
        .with_context(|| format!("Failed to query job {job_id}"))?;

    println!("{}", status_line(&snapshot));
    if let Some(ref error) = snapshot.error {
        println!("  error: {error}");
    }
    if snapshot.is_completed() {
        print_result(client, &snapshot);
    }
    Ok(if snapshot.is_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

pub async fn list(client: &Client) -> Result<ExitCode> {
    let jobs = client.list().await.context("Failed to list jobs")?;
    if jobs.is_empty() {
        println!("No jobs");
        return Ok(ExitCode::SUCCESS);
    }

    for (job_id, summary) in jobs {
        println!(
            "{job_id:<38} {:<18} {:>3}%  {}",
            summary.status.label(),
            summary.progress_percent(),
            summary.topic
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn delete(client: &Client, job_id: String) -> Result<ExitCode> {
    let job_id = JobId::new(job_id);
    match client.delete(&job_id).await {
        Ok(()) => {
            println!("Deleted {job_id}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_not_found() => {
            eprintln!("No such job: {job_id}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to delete job {job_id}")),
    }
}

pub async fn health(client: &Client) -> ExitCode {
    let base_url = client.service().base_url();
    if client.health_check().await {
        println!("{base_url} is healthy");
        ExitCode::SUCCESS
    } else {
        eprintln!("{base_url} is not reachable");
        ExitCode::FAILURE
    }
}

pub fn colors() -> ExitCode {
    for preset in Preset::ALL {
        let marker = if preset == Preset::default() { " (default)" } else { "" };
        println!("{:<8} {}{marker}", preset.name(), preset.color());
    }
    ExitCode::SUCCESS
}

fn status_line(snapshot: &JobSnapshot) -> String {
    format!(
        "{:<22} {} {:>3}%",
        snapshot.stage_label(),
        snapshot.progress_bar(30),
        snapshot.progress_percent()
    )
}

fn print_result(client: &Client, snapshot: &JobSnapshot) {
    let refs = [("audio", &snapshot.audio_url), ("video", &snapshot.video_url)];
    for (kind, reference) in refs {
        let Some(reference) = reference else { continue };
        match client.service().resolve_url(reference) {
            Ok(url) => println!("  {kind}: {url}"),
            Err(_) => println!("  {kind}: {reference}"),
        }
    }
}

async fn download_results(client: &Client, snapshot: &JobSnapshot, dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let refs = [snapshot.audio_url.as_deref(), snapshot.video_url.as_deref()];
    for reference in refs.into_iter().flatten() {
        match client.service().download(reference, dir).await {
            Ok(path) => println!("Saved {}", path.display()),
            Err(e) => {
                warn!(reference, error = %e, "Download failed");
                return Err(e).with_context(|| format!("Failed to download {reference}"));
            }
        }
    }
    info!(job_id = %snapshot.job_id, dir = %dir.display(), "Artifacts downloaded");
    Ok(())
}
