use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Local;
use colored::*;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::client::TimedRequest;
use crate::error::{BatchError, TransportError};
use crate::models::metrics::{BatchReport, BatchResult};
use crate::models::request_model::{BatchPlan, RequestDescriptor};

/// Issues `count` timed requests with at most `concurrency` in flight.
///
/// Latencies come back in completion order. The first failure aborts the
/// batch: no new request is started and the samples gathered so far are
/// dropped.
pub async fn run_batch(
    adapter: TimedRequest,
    descriptor: RequestDescriptor,
    count: usize,
    concurrency: usize,
) -> Result<Vec<f64>, BatchError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let workers = concurrency.max(1).min(count);
    let descriptor = Arc::new(descriptor);
    let dispatched = Arc::new(AtomicUsize::new(0));
    let running = Arc::new(AtomicBool::new(true));
    let response_times = Arc::new(Mutex::new(Vec::new()));

    let mut tasks = JoinSet::new();

    for _ in 0..workers {
        if !running.load(Ordering::SeqCst) || dispatched.load(Ordering::SeqCst) >= count {
            break;
        }

        let adapter = adapter.clone();
        let descriptor = Arc::clone(&descriptor);
        let dispatched = Arc::clone(&dispatched);
        let running = Arc::clone(&running);
        let response_times = Arc::clone(&response_times);

        tasks.spawn(async move {
            while running.load(Ordering::SeqCst) {
                if dispatched.fetch_add(1, Ordering::SeqCst) >= count {
                    break;
                }

                match adapter.execute(&descriptor).await {
                    Ok(elapsed) => {
                        response_times
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(elapsed);
                    }
                    Err(e) => {
                        running.store(false, Ordering::SeqCst);
                        return Err(e);
                    }
                }
            }
            Ok::<(), TransportError>(())
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tasks.abort_all();
                return Err(e.into());
            }
            Err(e) => {
                running.store(false, Ordering::SeqCst);
                tasks.abort_all();
                return Err(BatchError::Worker(e.to_string()));
            }
        }
    }

    let mut samples = response_times.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(std::mem::take(&mut *samples))
}

/// Runs a batch and measures its wall-clock time from first dispatch to last
/// completion.
pub async fn run_timed_batch(
    adapter: TimedRequest,
    descriptor: RequestDescriptor,
    count: usize,
    concurrency: usize,
) -> Result<BatchResult, BatchError> {
    let batch_start = Instant::now();
    let response_times = run_batch(adapter, descriptor, count, concurrency).await?;
    let total_ms = batch_start.elapsed().as_secs_f64() * 1000.0;

    Ok(BatchResult {
        response_times,
        total_ms,
    })
}

/// Runs a validated plan end to end and prints the results block.
pub async fn execute_plan(
    adapter: TimedRequest,
    plan: BatchPlan,
) -> Result<BatchReport, BatchError> {
    info!(
        url = %plan.descriptor.url,
        method = %plan.descriptor.method,
        count = plan.count,
        concurrency = plan.concurrency,
        transport = adapter.transport_name(),
        "Running parallel requests"
    );

    let result = run_timed_batch(
        adapter,
        plan.descriptor.clone(),
        plan.count,
        plan.concurrency,
    )
    .await
    .map_err(|e| {
        warn!(url = %plan.descriptor.url, error = %e, "batch aborted");
        e
    })?;

    let timestamp = Local::now().format("%Y/%m/%d %H:%M:%S").to_string();
    let report = BatchReport::new(&plan.descriptor, plan.concurrency, result, timestamp);
    print_report(&report);
    Ok(report)
}

pub fn print_report(report: &BatchReport) {
    let line = |label: ColoredString, value: String| println!("{} {}", label, value.bold());

    println!();
    println!("{}", "======== TEST RESULTS ========".bold().white().on_blue());
    line("Timestamp                :".blue().bold(), report.timestamp.clone());
    line(
        "Target                   :".blue().bold(),
        format!("{} {}", report.http_method, report.target_url),
    );
    line(
        "Total requests           :".green().bold(),
        report.request_count.to_string(),
    );
    line(
        "Concurrency              :".green().bold(),
        report.concurrency.to_string(),
    );
    line(
        "Fastest response (ms)    :".cyan().bold(),
        format!("{:.2}", report.fastest_response),
    );
    line(
        "Slowest response (ms)    :".yellow().bold(),
        format!("{:.2}", report.slowest_response),
    );
    line(
        "Average response (ms)    :".magenta().bold(),
        format!("{:.2}", report.average_ms),
    );
    line(
        "Median response time (ms):".magenta().bold(),
        format!("{:.2}", report.median_response_time),
    );
    line(
        "Requests per second (RPS):".blue().bold(),
        format!("{:.2}", report.throughput),
    );
    line(
        "Total execution time (s) :".blue().bold(),
        format!("{:.2}", report.total_ms / 1000.0),
    );

    println!();
    println!("{}", "======== RESPONSE TIMES ========".bold().white().on_blue());
    for (index, time) in report.response_times.iter().enumerate() {
        println!("{}", format!("• Request {}: {:.2} ms", index + 1, time).bold());
    }
}
