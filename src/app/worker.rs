//! Background thread that runs network jobs so the UI keeps drawing.
//!
//! Jobs go in over one channel and outcomes come back over another. The
//! worker handles one job at a time, in order, and never cancels a job once
//! started.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use anyhow::{Context, Result};

use crate::api::{RecordClient, Transport};
use crate::app::{Job, Outcome};

/// Perform the HTTP round-trip for `job` and report how it went.
pub fn execute_job<T: Transport + ?Sized>(
    client: &RecordClient,
    transport: &T,
    job: Job,
) -> Outcome {
    let result = match &job {
        Job::List => {
            let listed = transport
                .execute(client.build_list())
                .and_then(|resp| client.parse_list(resp));
            return Outcome::Listed(listed);
        }
        Job::Create(input) => client
            .build_create(input)
            .and_then(|req| transport.execute(req)),
        Job::Update(id, input) => client
            .build_update(id, input)
            .and_then(|req| transport.execute(req)),
        Job::Delete(id) => transport.execute(client.build_delete(id)),
    };
    Outcome::Mutated(job, result.and_then(|resp| client.parse_ack(resp)))
}

/// Handle to the worker thread.
pub struct Worker {
    jobs: Sender<Job>,
    outcomes: Receiver<Outcome>,
}

impl Worker {
    pub fn spawn<T>(client: RecordClient, transport: T) -> Result<Self>
    where
        T: Transport + Send + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (out_tx, out_rx) = mpsc::channel::<Outcome>();
        thread::Builder::new()
            .name("userdeck-net".to_string())
            .spawn(move || {
                for job in job_rx {
                    tracing::debug!(job = job.label(), "worker picked up job");
                    let outcome = execute_job(&client, &transport, job);
                    if out_tx.send(outcome).is_err() {
                        break;
                    }
                }
                tracing::debug!("worker shutting down");
            })
            .context("spawn network worker")?;
        Ok(Self {
            jobs: job_tx,
            outcomes: out_rx,
        })
    }

    pub fn submit(&self, job: Job) -> Result<()> {
        self.jobs
            .send(job)
            .map_err(|_| anyhow::anyhow!("network worker has stopped"))
    }

    /// Next finished outcome, if any, without blocking.
    pub fn try_recv(&self) -> Result<Option<Outcome>> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(anyhow::anyhow!("network worker has stopped")),
        }
    }
}
