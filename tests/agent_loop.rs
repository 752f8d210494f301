//! Loop behavior tests with a scripted planner and a recording bridge.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Map;

use operate_agent::agent::{Agent, RunOutcome, TurnOutcome};
use operate_agent::bridge::{
    BridgeError, StateSnapshot, ToolAction, ToolBridge, ToolResult, ToolSpec,
};
use operate_agent::planner::{Plan, PlanRequest, Planner, PlannerError};

/// Planner that replays a fixed script. Panics if called more often than
/// scripted, which doubles as the "at most N planning calls" assertion.
struct ScriptedPlanner {
    script: Mutex<VecDeque<Result<Plan, PlannerError>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedPlanner {
    fn new(script: Vec<Result<Plan, PlannerError>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                script: Mutex::new(script.into()),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn plan(&self, _request: PlanRequest<'_>) -> Result<Plan, PlannerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("planner called more often than scripted")
    }
}

#[derive(Clone, Copy)]
enum DispatchBehavior {
    Succeed,
    Fail,
    Reject,
}

/// Bridge that records every dispatched action.
struct RecordingBridge {
    specs: Vec<ToolSpec>,
    dispatched: Mutex<Vec<ToolAction>>,
    behavior: DispatchBehavior,
    state_fails: bool,
}

impl RecordingBridge {
    fn build(behavior: DispatchBehavior, state_fails: bool) -> Arc<Self> {
        Arc::new(Self {
            specs: vec![ToolSpec {
                name: "Click-Tool".to_string(),
                description: "click".to_string(),
                parameters: serde_json::json!({"type": "object"}),
            }],
            dispatched: Mutex::new(Vec::new()),
            behavior,
            state_fails,
        })
    }

    fn new(behavior: DispatchBehavior) -> Arc<Self> {
        Self::build(behavior, false)
    }

    fn with_failing_state(behavior: DispatchBehavior) -> Arc<Self> {
        Self::build(behavior, true)
    }

    fn dispatch_count(&self) -> usize {
        self.dispatched.lock().unwrap().len()
    }

    fn dispatched_names(&self) -> Vec<String> {
        self.dispatched
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.name.clone())
            .collect()
    }
}

/// Newtype so the shared bridge can be handed to the agent while the test
/// keeps its own handle for assertions.
struct SharedBridge(Arc<RecordingBridge>);

#[async_trait]
impl ToolBridge for SharedBridge {
    fn specs(&self) -> &[ToolSpec] {
        &self.0.specs
    }

    async fn state(&self, _use_vision: bool) -> Result<StateSnapshot, BridgeError> {
        if self.0.state_fails {
            Err(BridgeError::Remote {
                status: 503,
                detail: "state endpoint down".to_string(),
            })
        } else {
            Ok(StateSnapshot {
                text: "desktop idle".to_string(),
                screenshot: None,
            })
        }
    }

    async fn dispatch(&self, action: &ToolAction) -> Result<ToolResult, BridgeError> {
        self.0.dispatched.lock().unwrap().push(action.clone());
        match self.0.behavior {
            DispatchBehavior::Succeed => Ok(ToolResult::new(serde_json::json!("done"))),
            DispatchBehavior::Fail => Err(BridgeError::Remote {
                status: 500,
                detail: "tool exploded".to_string(),
            }),
            DispatchBehavior::Reject => Err(BridgeError::Rejected {
                reason: "out of scope".to_string(),
            }),
        }
    }
}

fn click() -> Result<Plan, PlannerError> {
    Ok(Plan::Action(ToolAction::new("Click-Tool", Map::new())))
}

fn finish(summary: &str) -> Result<Plan, PlannerError> {
    Ok(Plan::Finish {
        summary: summary.to_string(),
    })
}

fn invalid(reason: &str) -> Result<Plan, PlannerError> {
    Ok(Plan::Invalid {
        reason: reason.to_string(),
    })
}

fn agent(planner: ScriptedPlanner, bridge: Arc<RecordingBridge>, max_turns: usize) -> Agent {
    Agent::new(
        Box::new(planner),
        Box::new(SharedBridge(bridge)),
        max_turns,
        false,
    )
}

#[tokio::test]
async fn stop_signal_on_first_turn_skips_dispatch() {
    let (planner, calls) = ScriptedPlanner::new(vec![finish("Said hello")]);
    let bridge = RecordingBridge::new(DispatchBehavior::Succeed);

    let report = agent(planner, bridge.clone(), 3)
        .run("Say hello and then exit")
        .await
        .unwrap();

    assert_eq!(
        report.outcome,
        RunOutcome::Finished {
            summary: "Said hello".to_string()
        }
    );
    assert!(report.history.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(bridge.dispatch_count(), 0);
}

#[tokio::test]
async fn one_dispatch_then_finish() {
    let (planner, calls) = ScriptedPlanner::new(vec![click(), finish("clicked the button")]);
    let bridge = RecordingBridge::new(DispatchBehavior::Succeed);

    let report = agent(planner, bridge.clone(), 2)
        .run("click the button")
        .await
        .unwrap();

    assert!(report.is_finished());
    assert_eq!(report.history.len(), 1);
    assert!(matches!(
        report.history[0].outcome,
        TurnOutcome::Success { .. }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(bridge.dispatched_names(), vec!["Click-Tool"]);
}

#[tokio::test]
async fn invalid_proposals_exhaust_without_dispatch() {
    let (planner, _) = ScriptedPlanner::new(vec![invalid("unknown tool"), invalid("unknown tool")]);
    let bridge = RecordingBridge::new(DispatchBehavior::Succeed);

    let report = agent(planner, bridge.clone(), 2).run("task").await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Exhausted);
    assert_eq!(report.history.len(), 2);
    for turn in &report.history {
        assert!(matches!(turn.outcome, TurnOutcome::PlannerInvalid { .. }));
        assert!(turn.action.is_none());
    }
    // An unknown tool name never reaches dispatch.
    assert_eq!(bridge.dispatch_count(), 0);
}

#[tokio::test]
async fn planning_calls_are_bounded_by_turn_limit() {
    // Exactly three planning calls scripted; a fourth would panic the planner.
    let (planner, calls) = ScriptedPlanner::new(vec![click(), click(), click()]);
    let bridge = RecordingBridge::new(DispatchBehavior::Succeed);

    let report = agent(planner, bridge.clone(), 3)
        .run("keep clicking")
        .await
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::Exhausted);
    assert_eq!(report.history.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(bridge.dispatch_count(), 3);
}

#[tokio::test]
async fn bridge_failure_is_recorded_not_fatal() {
    let (planner, _) = ScriptedPlanner::new(vec![click(), finish("gave up on the button")]);
    let bridge = RecordingBridge::new(DispatchBehavior::Fail);

    let report = agent(planner, bridge, 5).run("task").await.unwrap();

    assert!(report.is_finished());
    assert_eq!(report.history.len(), 1);
    let TurnOutcome::ToolFailure { reason } = &report.history[0].outcome else {
        panic!("expected tool failure, got {:?}", report.history[0].outcome);
    };
    assert!(reason.contains("tool exploded"));
}

#[tokio::test]
async fn safety_rejection_is_its_own_outcome() {
    let (planner, _) = ScriptedPlanner::new(vec![click(), finish("adapted")]);
    let bridge = RecordingBridge::new(DispatchBehavior::Reject);

    let report = agent(planner, bridge, 5).run("task").await.unwrap();

    assert!(matches!(
        report.history[0].outcome,
        TurnOutcome::SafetyRejected { .. }
    ));
}

#[tokio::test]
async fn planner_transport_failure_aborts() {
    let (planner, _) = ScriptedPlanner::new(vec![Err(PlannerError::Api {
        status: 429,
        message: "quota exceeded".to_string(),
    })]);
    let bridge = RecordingBridge::new(DispatchBehavior::Succeed);

    let result = agent(planner, bridge.clone(), 5).run("task").await;

    assert!(result.is_err());
    assert_eq!(bridge.dispatch_count(), 0);
}

#[tokio::test]
async fn state_failure_consumes_a_turn_without_planning() {
    // Empty script: any planning call would panic.
    let (planner, calls) = ScriptedPlanner::new(vec![]);
    let bridge = RecordingBridge::with_failing_state(DispatchBehavior::Succeed);

    let report = agent(planner, bridge, 2).run("task").await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Exhausted);
    assert_eq!(report.history.len(), 2);
    for turn in &report.history {
        assert!(matches!(turn.outcome, TurnOutcome::ToolFailure { .. }));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn history_preserves_insertion_order_across_failures() {
    let (planner, _) = ScriptedPlanner::new(vec![
        click(),
        invalid("made something up"),
        click(),
        finish("done"),
    ]);
    let bridge = RecordingBridge::new(DispatchBehavior::Succeed);

    let report = agent(planner, bridge.clone(), 10).run("task").await.unwrap();

    assert!(report.is_finished());
    assert_eq!(report.history.len(), 3);
    for (i, turn) in report.history.iter().enumerate() {
        assert_eq!(turn.index, i);
    }
    assert!(matches!(
        report.history[0].outcome,
        TurnOutcome::Success { .. }
    ));
    assert!(matches!(
        report.history[1].outcome,
        TurnOutcome::PlannerInvalid { .. }
    ));
    assert!(matches!(
        report.history[2].outcome,
        TurnOutcome::Success { .. }
    ));
    // Only the two valid proposals were dispatched.
    assert_eq!(bridge.dispatch_count(), 2);
}

#[tokio::test]
async fn zero_turn_limit_exhausts_immediately() {
    let (planner, calls) = ScriptedPlanner::new(vec![]);
    let bridge = RecordingBridge::new(DispatchBehavior::Succeed);

    let report = agent(planner, bridge, 0).run("task").await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Exhausted);
    assert!(report.history.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
