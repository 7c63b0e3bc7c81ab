// ABOUTME: Task-control service: maps task protocol requests onto a Task.
// ABOUTME: Every failure comes back as a Status with a protocol code.

mod status;
mod types;

pub use status::{Code, Status};
pub use types::{
    CloseIoRequest, DeleteRequest, DeleteResponse, ExecProcessRequest, KillRequest,
    PidsResponse, ResizePtyRequest, StartRequest, StartResponse, StateRequest, StateResponse,
    WaitRequest, WaitResponse,
};

use std::sync::Arc;

use crate::task::{Task, TaskError};

/// Serves task-control requests for one task.
///
/// Cheap to clone; requests for different execs may run concurrently.
#[derive(Debug, Clone)]
pub struct TaskService {
    task: Arc<Task>,
}

impl TaskService {
    pub fn new(task: Arc<Task>) -> Self {
        Self { task }
    }

    pub fn task(&self) -> &Arc<Task> {
        &self.task
    }

    pub async fn start(&self, req: StartRequest) -> Result<StartResponse, Status> {
        let exec = self.task.get_exec(&req.exec_id)?;
        exec.start().await.map_err(TaskError::from)?;
        Ok(StartResponse { pid: exec.pid() })
    }

    pub async fn exec(&self, req: ExecProcessRequest) -> Result<(), Status> {
        self.task.create_exec(req.exec_id, req.spec)?;
        Ok(())
    }

    pub async fn kill(&self, req: KillRequest) -> Result<(), Status> {
        self.task
            .kill_exec(&req.exec_id, req.signal, req.all)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, req: DeleteRequest) -> Result<DeleteResponse, Status> {
        let info = self.task.delete_exec(&req.exec_id).await?;
        Ok(DeleteResponse::new(
            self.task.id().clone(),
            req.exec_id,
            info,
        ))
    }

    pub async fn wait(&self, req: WaitRequest) -> Result<WaitResponse, Status> {
        let exec = self.task.get_exec(&req.exec_id)?;
        let status = match req.timeout {
            Some(timeout) => exec.wait_timeout(timeout).await.map_err(TaskError::from)?,
            None => exec.wait().await,
        };
        Ok(WaitResponse {
            exit_status: status.exit_status,
            exited_at: status.exited_at,
        })
    }

    pub async fn state(&self, req: StateRequest) -> Result<StateResponse, Status> {
        let exec = self.task.get_exec(&req.exec_id)?;
        Ok(StateResponse::new(self.task.id().clone(), exec.status()))
    }

    pub async fn resize_pty(&self, req: ResizePtyRequest) -> Result<(), Status> {
        let exec = self.task.get_exec(&req.exec_id)?;
        exec.resize_pty(req.width, req.height)
            .await
            .map_err(TaskError::from)?;
        Ok(())
    }

    pub async fn close_io(&self, req: CloseIoRequest) -> Result<(), Status> {
        let exec = self.task.get_exec(&req.exec_id)?;
        exec.close_io(req.stdin).await.map_err(TaskError::from)?;
        Ok(())
    }

    pub async fn pids(&self) -> Result<PidsResponse, Status> {
        Ok(PidsResponse {
            processes: self.task.pids(),
        })
    }
}
