// ABOUTME: Run command implementation.
// ABOUTME: Starts the init exec, forwards Ctrl-C as a kill-all and deletes the task.

use std::env;
use std::sync::Arc;
use taskshim::config::{Config, StopConfig};
use taskshim::error::Result;
use taskshim::guest::{SIGKILL, flavor_for};
use taskshim::host::LocalHost;
use taskshim::output::Output;
use taskshim::service::{
    Code, DeleteRequest, KillRequest, StartRequest, TaskService, WaitRequest, WaitResponse,
};
use taskshim::task::Task;
use taskshim::types::ExecId;

/// Run the configured task to completion and return the init exec's exit
/// status.
pub async fn run_task(config: Config, mut output: Output) -> Result<u32> {
    let cwd = env::current_dir()?;
    let spec = config.exec_spec(&cwd)?;
    let task_id = config.task_id();

    let task = Arc::new(Task::new(
        task_id.clone(),
        flavor_for(config.guest),
        Arc::new(LocalHost::new()),
        spec,
    ));
    let service = TaskService::new(task);

    output.progress(&format!("  → Starting task {task_id} ({} guest)...", config.guest));
    let started = service
        .start(StartRequest {
            exec_id: ExecId::init(),
        })
        .await?;
    output.started(&task_id, started.pid);

    let waited = tokio::select! {
        result = service.wait(WaitRequest::new(ExecId::init())) => result?,
        result = tokio::signal::ctrl_c() => {
            result?;
            output.stopping(&task_id, config.stop.signal);
            stop(&service, &config.stop).await?
        }
    };
    tracing::debug!(task = %task_id, exit_status = waited.exit_status, "init exec exited");

    let deleted = service
        .delete(DeleteRequest {
            exec_id: ExecId::init(),
        })
        .await?;
    output.exited(&deleted);

    Ok(deleted.exit_status)
}

/// Signal every exec with the stop signal, then force-kill whatever is still
/// running once the grace period is over.
async fn stop(service: &TaskService, stop: &StopConfig) -> Result<WaitResponse> {
    service.kill(kill_all(stop.signal)).await?;

    let graceful = WaitRequest::new(ExecId::init()).with_timeout(stop.timeout);
    match service.wait(graceful).await {
        Ok(waited) => Ok(waited),
        Err(status) if status.code == Code::Cancelled => {
            tracing::warn!(
                task = %service.task().id(),
                timeout = ?stop.timeout,
                "task did not stop in time, sending SIGKILL"
            );
            service.kill(kill_all(SIGKILL)).await?;
            Ok(service.wait(WaitRequest::new(ExecId::init())).await?)
        }
        Err(status) => Err(status.into()),
    }
}

fn kill_all(signal: u32) -> KillRequest {
    KillRequest {
        exec_id: ExecId::init(),
        signal,
        all: true,
    }
}

/// Exit code for the shim process: the init exec's status, capped to what a
/// process can report.
pub fn exit_code(exit_status: u32) -> i32 {
    exit_status.min(255) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_is_capped() {
        assert_eq!(exit_code(0), 0);
        assert_eq!(exit_code(143), 143);
        assert_eq!(exit_code(4096), 255);
    }
}
