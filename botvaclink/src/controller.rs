//! Intent-level robot control.
//!
//! Callers express intents ("start cleaning", "send home"); this module
//! translates them into the legal low-level command for the robot's
//! current state, using the capability flags the robot itself reports.
//! A paused robot resumes instead of restarting, a cleaning robot pauses
//! instead of hard-stopping, and a robot that cannot dock yet is paused
//! first and retried until it can.

use crate::cache::StateCache;
use crate::nucleo::{
    ApiError, CleaningCategory, CleaningMode, CleaningParams, NavigationMode, RobotApi,
    RobotCommand, SpotSize,
};
use crate::status::{derive, DerivedState};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// How many times to re-check a paused robot before giving up on docking.
const DEFAULT_DOCK_ATTEMPTS: u32 = 30;

/// Delay between dock-readiness checks.
const DEFAULT_DOCK_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Errors from intent execution.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The robot's reported capabilities allow no command for this intent.
    #[error("command not allowed in the robot's current state")]
    InvalidTransition,
    /// The robot reports it cannot return to base right now.
    #[error("robot cannot return to base right now")]
    CannotDock,
    /// The robot never became ready to dock within the retry budget.
    #[error("robot not ready to dock after {attempts} attempts")]
    DockTimeout { attempts: u32 },
}

/// User-facing cleaning preferences, applied to every run.
#[derive(Debug, Clone, Copy)]
pub struct CleaningOptions {
    /// Quieter, longer-running cleaning.
    pub eco_mode: bool,
    pub navigation_mode: NavigationMode,
    /// Honor persistent-map no-go lines during house cleaning.
    pub no_go_lines: bool,
    /// Area for spot cleaning runs.
    pub spot: SpotSize,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            eco_mode: false,
            navigation_mode: NavigationMode::Normal,
            no_go_lines: false,
            spot: SpotSize::default(),
        }
    }
}

impl CleaningOptions {
    pub(crate) fn mode(&self) -> CleaningMode {
        if self.eco_mode {
            CleaningMode::Eco
        } else {
            CleaningMode::Turbo
        }
    }

    pub(crate) fn house_category(&self) -> CleaningCategory {
        if self.no_go_lines {
            CleaningCategory::PersistentMap
        } else {
            CleaningCategory::House
        }
    }
}

/// Intent executor for one robot.
pub struct RobotController<A> {
    cache: Arc<StateCache<A>>,
    dock_attempts: u32,
    dock_retry_delay: Duration,
}

impl<A: RobotApi> RobotController<A> {
    pub fn new(cache: Arc<StateCache<A>>) -> Self {
        Self {
            cache,
            dock_attempts: DEFAULT_DOCK_ATTEMPTS,
            dock_retry_delay: DEFAULT_DOCK_RETRY_DELAY,
        }
    }

    /// Overrides the dock retry budget. Tests use short delays.
    pub fn with_dock_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.dock_attempts = attempts;
        self.dock_retry_delay = delay;
        self
    }

    /// The state cache backing this controller.
    pub fn cache(&self) -> &Arc<StateCache<A>> {
        &self.cache
    }

    /// Current derived state, served from cache when fresh.
    pub async fn refresh(&self) -> Result<DerivedState, ControlError> {
        let raw = self.cache.get().await?;
        Ok(derive(&raw))
    }

    /// Starts (or resumes) a house cleaning run.
    pub async fn start_cleaning(&self, options: CleaningOptions) -> Result<(), ControlError> {
        let state = self.cache.get().await?;

        // A paused run is resumed rather than restarted from scratch.
        if state.available_commands.resume {
            return self.dispatch(RobotCommand::ResumeCleaning).await;
        }
        if state.available_commands.start {
            let params = CleaningParams {
                category: options.house_category(),
                mode: options.mode(),
                navigation_mode: options.navigation_mode,
                spot: None,
            };
            return self.dispatch(RobotCommand::StartCleaning(params)).await;
        }

        warn!("start requested but robot can neither start nor resume");
        Err(ControlError::InvalidTransition)
    }

    /// Starts (or resumes) a spot cleaning run around the robot's
    /// current position.
    pub async fn start_spot_cleaning(&self, options: CleaningOptions) -> Result<(), ControlError> {
        let state = self.cache.get().await?;

        if state.available_commands.resume {
            return self.dispatch(RobotCommand::ResumeCleaning).await;
        }
        if state.available_commands.start {
            let params = CleaningParams {
                category: CleaningCategory::Spot,
                mode: options.mode(),
                navigation_mode: options.navigation_mode,
                spot: Some(options.spot),
            };
            return self.dispatch(RobotCommand::StartCleaning(params)).await;
        }

        warn!("spot clean requested but robot can neither start nor resume");
        Err(ControlError::InvalidTransition)
    }

    /// Stops the current run, preferring a resumable pause over a hard
    /// stop.
    pub async fn stop_cleaning(&self) -> Result<(), ControlError> {
        let state = self.cache.get().await?;

        if state.available_commands.pause {
            return self.dispatch(RobotCommand::PauseCleaning).await;
        }
        if state.available_commands.stop {
            return self.dispatch(RobotCommand::StopCleaning).await;
        }

        warn!("stop requested but robot can neither pause nor stop");
        Err(ControlError::InvalidTransition)
    }

    /// Sends the robot to its base, failing if it reports it cannot.
    pub async fn dock(&self) -> Result<(), ControlError> {
        let state = self.cache.get().await?;

        if state.available_commands.go_to_base {
            return self.dispatch(RobotCommand::SendToBase).await;
        }
        Err(ControlError::CannotDock)
    }

    /// Sends the robot home from any state: pauses a running clean if
    /// needed, then waits for the robot to report it can dock.
    ///
    /// The readiness check is a bounded retry loop; if the robot never
    /// becomes dockable within the budget, [`ControlError::DockTimeout`]
    /// is returned and the robot is left paused.
    pub async fn pause_and_dock(&self) -> Result<(), ControlError> {
        let state = self.cache.get().await?;

        if state.available_commands.go_to_base {
            return self.dispatch(RobotCommand::SendToBase).await;
        }
        if state.available_commands.pause {
            debug!("pausing before docking");
            self.dispatch(RobotCommand::PauseCleaning).await?;
        }

        for attempt in 1..=self.dock_attempts {
            tokio::time::sleep(self.dock_retry_delay).await;

            self.cache.invalidate();
            let state = self.cache.get().await?;
            if state.available_commands.go_to_base {
                info!(attempt, "robot ready to dock");
                return self.dispatch(RobotCommand::SendToBase).await;
            }
            debug!(attempt, "robot not yet ready to dock");
        }

        warn!(attempts = self.dock_attempts, "gave up waiting for dock readiness");
        Err(ControlError::DockTimeout {
            attempts: self.dock_attempts,
        })
    }

    async fn dispatch(&self, command: RobotCommand) -> Result<(), ControlError> {
        info!(command = command.name(), "dispatching robot command");
        self.cache.api().dispatch(&command).await?;
        // The next state read must see post-command reality.
        self.cache.invalidate();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::{AvailableCommands, RawRobotState, RobotState, StateDetails};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn state_with(commands: AvailableCommands) -> RawRobotState {
        RawRobotState {
            state: RobotState::Idle,
            action: None,
            result: Some("ok".to_string()),
            error: None,
            details: StateDetails {
                is_charging: false,
                is_docked: false,
                charge: 70,
            },
            available_commands: commands,
        }
    }

    fn can_start() -> AvailableCommands {
        AvailableCommands {
            start: true,
            ..AvailableCommands::default()
        }
    }

    fn can_resume() -> AvailableCommands {
        AvailableCommands {
            resume: true,
            go_to_base: true,
            ..AvailableCommands::default()
        }
    }

    fn cleaning() -> AvailableCommands {
        AvailableCommands {
            pause: true,
            stop: true,
            ..AvailableCommands::default()
        }
    }

    /// Fake API: serves states in order (repeating the last) and records
    /// every dispatched command.
    struct SequenceApi {
        states: Mutex<VecDeque<RawRobotState>>,
        last: Mutex<Option<RawRobotState>>,
        dispatched: Mutex<Vec<RobotCommand>>,
    }

    impl SequenceApi {
        fn new(states: Vec<RawRobotState>) -> Arc<Self> {
            Arc::new(Self {
                states: Mutex::new(states.into()),
                last: Mutex::new(None),
                dispatched: Mutex::new(Vec::new()),
            })
        }

        fn dispatched(&self) -> Vec<RobotCommand> {
            self.dispatched.lock().unwrap().clone()
        }
    }

    impl RobotApi for SequenceApi {
        async fn fetch_state(&self) -> Result<RawRobotState, ApiError> {
            let mut states = self.states.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            if let Some(next) = states.pop_front() {
                *last = Some(next);
            }
            last.clone()
                .ok_or_else(|| ApiError::Transport("no scripted state".to_string()))
        }

        async fn dispatch(&self, command: &RobotCommand) -> Result<(), ApiError> {
            self.dispatched.lock().unwrap().push(*command);
            Ok(())
        }
    }

    fn controller(api: &Arc<SequenceApi>) -> RobotController<SequenceApi> {
        let cache = Arc::new(StateCache::new(Arc::clone(api)));
        RobotController::new(cache).with_dock_retry(3, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_start_on_idle_robot_starts_house_clean() {
        let api = SequenceApi::new(vec![state_with(can_start())]);
        let ctl = controller(&api);

        ctl.start_cleaning(CleaningOptions::default()).await.unwrap();

        let sent = api.dispatched();
        assert_eq!(sent.len(), 1);
        match sent[0] {
            RobotCommand::StartCleaning(p) => {
                assert_eq!(p.category, CleaningCategory::House);
                assert_eq!(p.mode, CleaningMode::Turbo);
                assert!(p.spot.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_on_paused_robot_resumes() {
        let api = SequenceApi::new(vec![state_with(can_resume())]);
        let ctl = controller(&api);

        ctl.start_cleaning(CleaningOptions::default()).await.unwrap();

        assert_eq!(api.dispatched(), vec![RobotCommand::ResumeCleaning]);
    }

    #[tokio::test]
    async fn test_start_options_map_to_eco_and_no_go_lines() {
        let api = SequenceApi::new(vec![state_with(can_start())]);
        let ctl = controller(&api);

        let options = CleaningOptions {
            eco_mode: true,
            no_go_lines: true,
            navigation_mode: NavigationMode::ExtraCare,
            ..CleaningOptions::default()
        };
        ctl.start_cleaning(options).await.unwrap();

        match api.dispatched()[0] {
            RobotCommand::StartCleaning(p) => {
                assert_eq!(p.category, CleaningCategory::PersistentMap);
                assert_eq!(p.mode, CleaningMode::Eco);
                assert_eq!(p.navigation_mode, NavigationMode::ExtraCare);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_while_cleaning_is_invalid() {
        let api = SequenceApi::new(vec![state_with(cleaning())]);
        let ctl = controller(&api);

        let err = ctl
            .start_cleaning(CleaningOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::InvalidTransition));
        assert!(api.dispatched().is_empty());
    }

    #[tokio::test]
    async fn test_spot_clean_carries_area() {
        let api = SequenceApi::new(vec![state_with(can_start())]);
        let ctl = controller(&api);

        ctl.start_spot_cleaning(CleaningOptions::default())
            .await
            .unwrap();

        match api.dispatched()[0] {
            RobotCommand::StartCleaning(p) => {
                assert_eq!(p.category, CleaningCategory::Spot);
                assert_eq!(p.spot, Some(SpotSize::default()));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spot_clean_on_paused_robot_resumes() {
        let api = SequenceApi::new(vec![state_with(can_resume())]);
        let ctl = controller(&api);

        ctl.start_spot_cleaning(CleaningOptions::default())
            .await
            .unwrap();

        assert_eq!(api.dispatched(), vec![RobotCommand::ResumeCleaning]);
    }

    #[tokio::test]
    async fn test_stop_prefers_pause() {
        let api = SequenceApi::new(vec![state_with(cleaning())]);
        let ctl = controller(&api);

        ctl.stop_cleaning().await.unwrap();

        assert_eq!(api.dispatched(), vec![RobotCommand::PauseCleaning]);
    }

    #[tokio::test]
    async fn test_stop_falls_back_to_hard_stop() {
        let commands = AvailableCommands {
            stop: true,
            ..AvailableCommands::default()
        };
        let api = SequenceApi::new(vec![state_with(commands)]);
        let ctl = controller(&api);

        ctl.stop_cleaning().await.unwrap();

        assert_eq!(api.dispatched(), vec![RobotCommand::StopCleaning]);
    }

    #[tokio::test]
    async fn test_stop_on_idle_robot_is_invalid() {
        let api = SequenceApi::new(vec![state_with(can_start())]);
        let ctl = controller(&api);

        let err = ctl.stop_cleaning().await.unwrap_err();
        assert!(matches!(err, ControlError::InvalidTransition));
    }

    #[tokio::test]
    async fn test_dock_when_not_ready_fails_fast() {
        let api = SequenceApi::new(vec![state_with(cleaning())]);
        let ctl = controller(&api);

        let err = ctl.dock().await.unwrap_err();
        assert!(matches!(err, ControlError::CannotDock));
        assert!(api.dispatched().is_empty());
    }

    #[tokio::test]
    async fn test_pause_and_dock_when_already_dockable() {
        let api = SequenceApi::new(vec![state_with(can_resume())]);
        let ctl = controller(&api);

        ctl.pause_and_dock().await.unwrap();

        assert_eq!(api.dispatched(), vec![RobotCommand::SendToBase]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_dock_pauses_then_retries_until_ready() {
        // Cleaning, still cleaning after the pause, then dockable.
        let api = SequenceApi::new(vec![
            state_with(cleaning()),
            state_with(cleaning()),
            state_with(can_resume()),
        ]);
        let ctl = controller(&api);

        ctl.pause_and_dock().await.unwrap();

        assert_eq!(
            api.dispatched(),
            vec![RobotCommand::PauseCleaning, RobotCommand::SendToBase]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_dock_gives_up_after_retry_budget() {
        // The robot never becomes dockable.
        let api = SequenceApi::new(vec![state_with(cleaning())]);
        let ctl = controller(&api);

        let err = ctl.pause_and_dock().await.unwrap_err();

        assert!(matches!(err, ControlError::DockTimeout { attempts: 3 }));
        // Only the initial pause went out.
        assert_eq!(api.dispatched(), vec![RobotCommand::PauseCleaning]);
    }

    #[tokio::test]
    async fn test_commands_invalidate_the_state_cache() {
        let mut busy = state_with(cleaning());
        busy.state = RobotState::Busy;
        busy.action = Some(crate::robot::RobotAction::HouseCleaning);

        let api = SequenceApi::new(vec![state_with(can_start()), busy]);
        let ctl = controller(&api);

        ctl.start_cleaning(CleaningOptions::default()).await.unwrap();

        // The post-command read sees the second scripted state even
        // though the first is still within its TTL.
        let derived = ctl.refresh().await.unwrap();
        assert_eq!(derived.status, crate::status::VacuumStatus::Cleaning);
    }
}
