// ABOUTME: Integration tests for the host-backed exec state machine.
// ABOUTME: Drives HostedExec against an in-memory process host.

mod support;

use std::sync::Arc;
use std::time::Duration;
use support::FakeHost;
use taskshim::error::ErrorKind;
use taskshim::exec::{
    EXIT_STATUS_KILLED_BEFORE_START, ExecError, ExecState, HostedExec, ShimExec,
};
use taskshim::guest::{GuestOs, SIGKILL, SIGTERM, flavor_for};
use taskshim::host::{ExecSpec, HostedProcess, ProcessSignal};
use taskshim::types::{ExecId, TaskId};

fn hosted(host: &Arc<FakeHost>, os: GuestOs, spec: ExecSpec) -> HostedExec {
    support::init_tracing();
    HostedExec::new(
        TaskId::new("t1"),
        ExecId::new("e1"),
        spec,
        host.clone(),
        flavor_for(os),
    )
}

fn linux_exec(host: &Arc<FakeHost>) -> HostedExec {
    hosted(host, GuestOs::Linux, ExecSpec::new("sleep").arg("30"))
}

fn assert_kind<T: std::fmt::Debug>(result: Result<T, ExecError>, kind: ErrorKind) {
    match result {
        Ok(value) => panic!("expected {kind:?}, got Ok({value:?})"),
        Err(e) => assert_eq!(e.kind(), kind, "unexpected error: {e}"),
    }
}

mod start {
    use super::*;

    #[tokio::test]
    async fn new_exec_is_created_without_pid() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);

        let status = exec.status();
        assert_eq!(status.state, ExecState::Created);
        assert_eq!(status.pid, 0);
        assert_eq!(status.exit_status, 0);
        assert!(status.exited_at.is_none());
    }

    #[tokio::test]
    async fn start_runs_the_process() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);

        exec.start().await.unwrap();

        assert_eq!(exec.state(), ExecState::Running);
        assert_eq!(exec.pid(), host.process(0).pid());
        assert_eq!(host.spawn_count(), 1);
    }

    #[tokio::test]
    async fn second_start_is_refused() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);
        exec.start().await.unwrap();

        assert_kind(exec.start().await, ErrorKind::FailedPrecondition);
        assert_eq!(host.spawn_count(), 1);
    }

    #[tokio::test]
    async fn failed_spawn_leaves_exec_created() {
        let host = Arc::new(FakeHost::new());
        host.fail_spawns(true);
        let exec = linux_exec(&host);

        assert_kind(exec.start().await, ErrorKind::Internal);
        assert_eq!(exec.state(), ExecState::Created);

        host.fail_spawns(false);
        exec.start().await.unwrap();
        assert_eq!(exec.state(), ExecState::Running);
    }

    #[tokio::test]
    async fn concurrent_starts_launch_once() {
        let host = Arc::new(FakeHost::new());
        let exec = Arc::new(linux_exec(&host));

        let results = futures::future::join_all((0..4).map(|_| {
            let exec = Arc::clone(&exec);
            async move { exec.start().await }
        }))
        .await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(host.spawn_count(), 1);
    }

    #[tokio::test]
    async fn linux_guest_defaults_cwd_to_root() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);

        exec.start().await.unwrap();

        assert_eq!(host.spec(0).cwd.as_deref(), Some(std::path::Path::new("/")));
    }
}

mod exit {
    use super::*;

    #[tokio::test]
    async fn process_exit_is_recorded() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);
        exec.start().await.unwrap();
        let pid = exec.pid();

        host.process(0).exit(3);
        let status = exec.wait().await;

        assert_eq!(status.state, ExecState::Exited);
        assert_eq!(status.exit_status, 3);
        assert_eq!(status.pid, pid);
        assert!(status.exited_at.is_some());
    }

    #[tokio::test]
    async fn every_waiter_sees_the_same_exit() {
        let host = Arc::new(FakeHost::new());
        let exec = Arc::new(linux_exec(&host));
        exec.start().await.unwrap();

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let exec = Arc::clone(&exec);
                tokio::spawn(async move { exec.wait().await })
            })
            .collect();
        host.process(0).exit(0);

        let mut seen = Vec::new();
        for waiter in waiters {
            seen.push(waiter.await.unwrap());
        }
        assert!(seen.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(seen[0], exec.status());
    }

    #[tokio::test]
    async fn wait_after_exit_returns_immediately() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);
        exec.kill(SIGTERM).await.unwrap();

        let status = exec
            .wait_timeout(Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(status.exit_status, EXIT_STATUS_KILLED_BEFORE_START);
    }

    #[tokio::test]
    async fn wait_timeout_cancels_without_changing_state() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);
        exec.start().await.unwrap();

        let result = exec.wait_timeout(Duration::from_millis(20)).await;

        assert_kind(result, ErrorKind::Cancelled);
        assert_eq!(exec.state(), ExecState::Running);
    }
}

mod kill {
    use super::*;

    #[tokio::test]
    async fn created_exec_exits_without_a_process() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);

        exec.kill(SIGKILL).await.unwrap();

        let status = exec.status();
        assert_eq!(status.state, ExecState::Exited);
        assert_eq!(status.exit_status, EXIT_STATUS_KILLED_BEFORE_START);
        assert!(status.exited_at.is_some());
        assert_eq!(host.spawn_count(), 0);
        assert_kind(exec.start().await, ErrorKind::FailedPrecondition);
    }

    #[tokio::test]
    async fn running_exec_is_signaled() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);
        exec.start().await.unwrap();

        exec.kill(SIGTERM).await.unwrap();
        let status = exec.wait().await;

        assert_eq!(host.process(0).signals(), vec![ProcessSignal::Posix(15)]);
        assert_eq!(status.exit_status, 143);
    }

    #[tokio::test]
    async fn kill_does_not_wait_for_exit() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);
        exec.start().await.unwrap();
        host.process(0).ignore_signals();

        exec.kill(SIGTERM).await.unwrap();

        assert_eq!(exec.state(), ExecState::Running);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn kill_racing_start_settles_on_one_outcome() {
        for _ in 0..50 {
            let host = Arc::new(FakeHost::new());
            let exec = Arc::new(linux_exec(&host));

            let starter = tokio::spawn({
                let exec = Arc::clone(&exec);
                async move { exec.start().await }
            });
            let killer = tokio::spawn({
                let exec = Arc::clone(&exec);
                async move { exec.kill(SIGKILL).await }
            });
            let started = starter.await.unwrap();
            killer.await.unwrap().unwrap();

            let status = exec.wait_timeout(Duration::from_secs(5)).await.unwrap();
            assert_eq!(status.state, ExecState::Exited);
            match started {
                Ok(()) => {
                    assert_eq!(host.spawn_count(), 1);
                    assert_eq!(host.process(0).signals(), vec![ProcessSignal::Posix(9)]);
                    assert_eq!(status.exit_status, 137);
                }
                Err(e) => {
                    assert_eq!(e.kind(), ErrorKind::FailedPrecondition);
                    assert_eq!(host.spawn_count(), 0);
                    assert_eq!(status.exit_status, EXIT_STATUS_KILLED_BEFORE_START);
                }
            }
        }
    }

    #[tokio::test]
    async fn exited_exec_keeps_its_exit_values() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);
        exec.start().await.unwrap();
        host.process(0).exit(9);
        let before = exec.wait().await;

        exec.kill(SIGKILL).await.unwrap();

        assert_eq!(exec.status(), before);
        assert_eq!(host.process(0).signals(), Vec::new());
    }

    #[tokio::test]
    async fn invalid_signal_changes_nothing() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);

        assert_kind(exec.kill(0).await, ErrorKind::InvalidArgument);
        assert_eq!(exec.state(), ExecState::Created);
    }

    #[tokio::test]
    async fn windows_maps_sigterm_to_shutdown() {
        let host = Arc::new(FakeHost::new());
        let exec = hosted(&host, GuestOs::Windows, ExecSpec::new("cmd.exe"));
        exec.start().await.unwrap();

        exec.kill(SIGTERM).await.unwrap();

        assert_eq!(
            host.process(0).signals(),
            vec![ProcessSignal::CtrlShutdown]
        );
    }
}

mod io {
    use super::*;

    #[tokio::test]
    async fn resize_needs_a_terminal() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);
        exec.start().await.unwrap();

        assert_kind(exec.resize_pty(80, 24).await, ErrorKind::FailedPrecondition);
    }

    #[tokio::test]
    async fn resize_forwards_to_running_process() {
        let host = Arc::new(FakeHost::new());
        let exec = hosted(
            &host,
            GuestOs::Linux,
            ExecSpec::new("bash").terminal(true),
        );

        assert_kind(exec.resize_pty(80, 24).await, ErrorKind::FailedPrecondition);
        exec.start().await.unwrap();
        exec.resize_pty(120, 40).await.unwrap();

        assert_eq!(host.process(0).resizes(), vec![(120, 40)]);
    }

    #[tokio::test]
    async fn close_stdin_once() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);
        exec.start().await.unwrap();

        exec.close_io(true).await.unwrap();

        assert!(host.process(0).stdin_closed());
        assert_kind(exec.close_io(true).await, ErrorKind::FailedPrecondition);
    }

    #[tokio::test]
    async fn close_io_without_stdin_is_a_no_op() {
        let host = Arc::new(FakeHost::new());
        let exec = linux_exec(&host);

        exec.close_io(false).await.unwrap();
        assert_kind(exec.close_io(true).await, ErrorKind::FailedPrecondition);
    }
}
