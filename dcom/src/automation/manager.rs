use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tracing::Instrument;

use crate::automation::collaborators::{
    AutomationError, Configuration, ProcessingManager, Storage,
};
use crate::automation::policy::{evaluate, AutomationPolicy, CycleSnapshot, MonitoredPoints};
use crate::shutdown::TaskHandle;

/// length of one sub-interval of the delay between cycles
const TICK: Duration = Duration::from_secs(1);

/// Shared signal that ends the current sub-interval of the automation delay early
///
/// A notification sent while the loop is busy is kept until the next wait.
#[derive(Clone, Debug, Default)]
pub struct AutomationTrigger {
    inner: Arc<Notify>,
}

impl AutomationTrigger {
    /// create a new trigger
    pub fn new() -> Self {
        Self::default()
    }

    /// wake the automation loop
    pub fn notify(&self) {
        self.inner.notify_one();
    }
}

#[derive(Debug)]
enum State {
    Idle,
    Running(TaskHandle),
    Stopped,
}

/// Periodically reads the monitored points and issues the writes the policy decides
///
/// The manager moves from idle to running on [`AutomationManager::start`] and to
/// stopped on [`AutomationManager::stop`]. Stopping is terminal. Dropping a
/// running manager shuts the loop down.
pub struct AutomationManager {
    storage: Arc<dyn Storage>,
    processing: Arc<dyn ProcessingManager>,
    configuration: Arc<dyn Configuration>,
    trigger: AutomationTrigger,
    points: MonitoredPoints,
    policy: AutomationPolicy,
    state: State,
}

impl AutomationManager {
    /// Create an idle manager that supervises the default points with the default policy
    pub fn new(
        storage: Arc<dyn Storage>,
        processing: Arc<dyn ProcessingManager>,
        configuration: Arc<dyn Configuration>,
        trigger: AutomationTrigger,
    ) -> Self {
        Self {
            storage,
            processing,
            configuration,
            trigger,
            points: MonitoredPoints::default(),
            policy: AutomationPolicy::default(),
            state: State::Idle,
        }
    }

    /// supervise a different set of points
    pub fn with_points(mut self, points: MonitoredPoints) -> Self {
        self.points = points;
        self
    }

    /// apply a different policy
    pub fn with_policy(mut self, policy: AutomationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// true while the loop is running
    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    /// Spawn the loop with `delay_seconds` between cycles
    ///
    /// Must be called from within a Tokio runtime. A delay of zero is treated as
    /// one sub-interval.
    pub fn start(&mut self, delay_seconds: u64) -> Result<(), AutomationError> {
        match self.state {
            State::Idle => {}
            State::Running(_) => return Err(AutomationError::AlreadyStarted),
            State::Stopped => return Err(AutomationError::Terminated),
        }

        let mut task = AutomationTask {
            storage: self.storage.clone(),
            processing: self.processing.clone(),
            configuration: self.configuration.clone(),
            trigger: self.trigger.inner.clone(),
            points: self.points,
            policy: self.policy,
            ticks: delay_seconds.max(1),
        };

        let handle = TaskHandle::spawn(move |rx| async move {
            task.run(rx)
                .instrument(tracing::info_span!("Automation", delay = delay_seconds))
                .await
        });

        self.state = State::Running(handle);
        Ok(())
    }

    /// start with the delay from the [`Configuration`]
    pub fn start_with_configured_delay(&mut self) -> Result<(), AutomationError> {
        let delay = self.configuration.delay_between_commands();
        self.start(delay)
    }

    /// Stop the loop and wait for it to exit, repeated calls do nothing
    pub async fn stop(&mut self) {
        if let State::Running(handle) = std::mem::replace(&mut self.state, State::Stopped) {
            handle.shutdown().await;
        }
    }
}

struct Shutdown;

struct AutomationTask {
    storage: Arc<dyn Storage>,
    processing: Arc<dyn ProcessingManager>,
    configuration: Arc<dyn Configuration>,
    trigger: Arc<Notify>,
    points: MonitoredPoints,
    policy: AutomationPolicy,
    ticks: u64,
}

impl AutomationTask {
    async fn run(&mut self, mut shutdown: mpsc::Receiver<()>) {
        tracing::info!("automation started");
        loop {
            if let Err(err) = self.run_cycle() {
                tracing::warn!("automation cycle failed: {}", err);
            }
            if let Err(Shutdown) = self.wait(&mut shutdown).await {
                tracing::info!("automation stopped");
                return;
            }
        }
    }

    fn run_cycle(&self) -> Result<(), AutomationError> {
        let ids = self.points.identifiers();
        let points = self.storage.get_points(&ids)?;
        let snapshot = CycleSnapshot::from_points(&points)?;

        for command in evaluate(&snapshot, &self.policy) {
            let transaction_id = self.configuration.next_transaction_id();
            let unit_id = self.configuration.unit_address();
            tracing::debug!(
                "write {} = {} (tx id: {})",
                command.id,
                command.value,
                transaction_id
            );
            if let Err(err) = self.processing.execute_write_command(
                &command.config,
                transaction_id,
                unit_id,
                command.id.address,
                command.value,
            ) {
                tracing::warn!("write to {} failed: {}", command.id, err);
            }
        }

        Ok(())
    }

    async fn wait(&self, shutdown: &mut mpsc::Receiver<()>) -> Result<(), Shutdown> {
        for _ in 0..self.ticks {
            tokio::select! {
                _ = shutdown.recv() => return Err(Shutdown),
                _ = self.trigger.notified() => {}
                _ = tokio::time::sleep(TICK) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::automation::collaborators::ConfigItem;
    use crate::automation::config::StaticConfiguration;
    use crate::automation::memory::MemoryStorage;
    use crate::types::PointType;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Write {
        transaction_id: u16,
        unit_id: u8,
        address: u16,
        value: i32,
    }

    #[derive(Default)]
    struct RecordingProcessor {
        writes: Mutex<Vec<Write>>,
        fail: bool,
    }

    impl RecordingProcessor {
        fn failing() -> Self {
            Self {
                writes: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn writes(&self) -> Vec<Write> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl ProcessingManager for RecordingProcessor {
        fn execute_write_command(
            &self,
            _config: &ConfigItem,
            transaction_id: u16,
            unit_id: u8,
            address: u16,
            value: i32,
        ) -> Result<(), AutomationError> {
            self.writes.lock().unwrap().push(Write {
                transaction_id,
                unit_id,
                address,
                value,
            });
            if self.fail {
                return Err(AutomationError::Processing("link down".to_string()));
            }
            Ok(())
        }
    }

    fn storage(level: u16, valve: u16, pumps: [u16; 3]) -> Arc<MemoryStorage> {
        let ids = MonitoredPoints::default();
        let storage = MemoryStorage::new();
        storage.insert(
            ids.fuel_level,
            level,
            ConfigItem::new(PointType::AnalogOutput, 1.0, 0.0, 20.0, 500.0),
        );
        storage.insert(ids.valve, valve, ConfigItem::unscaled(PointType::DigitalOutput));
        for (id, raw) in ids.pumps.into_iter().zip(pumps) {
            storage.insert(id, raw, ConfigItem::unscaled(PointType::DigitalOutput));
        }
        Arc::new(storage)
    }

    fn manager(
        storage: Arc<MemoryStorage>,
        processor: Arc<RecordingProcessor>,
        trigger: AutomationTrigger,
    ) -> AutomationManager {
        AutomationManager::new(
            storage,
            processor,
            Arc::new(StaticConfiguration::new(2, 0x07)),
            trigger,
        )
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_raises_fuel_level_while_valve_closed() {
        let processor = Arc::new(RecordingProcessor::default());
        let mut manager = manager(
            storage(100, 0, [0, 0, 0]),
            processor.clone(),
            AutomationTrigger::new(),
        );

        manager.start(2).unwrap();
        settle().await;

        assert_eq!(
            processor.writes(),
            vec![Write {
                transaction_id: 0,
                unit_id: 0x07,
                address: 1000,
                value: 110,
            }]
        );
        manager.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_repeat_after_the_delay() {
        let processor = Arc::new(RecordingProcessor::default());
        let mut manager = manager(
            storage(100, 1, [1, 0, 0]),
            processor.clone(),
            AutomationTrigger::new(),
        );

        manager.start(2).unwrap();
        settle().await;
        assert_eq!(processor.writes().len(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(processor.writes().len(), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        let ids: Vec<u16> = processor.writes().iter().map(|x| x.transaction_id).collect();
        assert_eq!(ids, vec![0, 1]);

        manager.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn trigger_shortens_the_current_sub_interval() {
        let processor = Arc::new(RecordingProcessor::default());
        let trigger = AutomationTrigger::new();
        let mut manager = manager(storage(100, 0, [0, 0, 0]), processor.clone(), trigger.clone());

        manager.start(2).unwrap();
        settle().await;
        trigger.notify();

        // second sub-interval ends at 1.1s instead of 2s
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(processor.writes().len(), 2);

        manager.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_writes_do_not_stop_the_cycle() {
        let processor = Arc::new(RecordingProcessor::failing());
        let mut manager = manager(
            storage(100, 0, [1, 1, 1]),
            processor.clone(),
            AutomationTrigger::new(),
        );

        manager.start(2).unwrap();
        settle().await;

        let values: Vec<i32> = processor.writes().iter().map(|x| x.value).collect();
        assert_eq!(values, vec![110, 99, 98, 97]);
        manager.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn loop_survives_storage_errors() {
        let processor = Arc::new(RecordingProcessor::default());
        let mut manager = AutomationManager::new(
            Arc::new(MemoryStorage::new()),
            processor.clone(),
            Arc::new(StaticConfiguration::new(1, 1)),
            AutomationTrigger::new(),
        );

        manager.start(1).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(manager.is_running());
        assert!(processor.writes().is_empty());
        manager.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_terminal_and_idempotent() {
        let processor = Arc::new(RecordingProcessor::default());
        let mut manager = manager(
            storage(100, 1, [0, 0, 0]),
            processor,
            AutomationTrigger::new(),
        );

        manager.start(3600).unwrap();
        assert_eq!(manager.start(1), Err(AutomationError::AlreadyStarted));
        assert!(manager.is_running());

        let begin = tokio::time::Instant::now();
        manager.stop().await;
        assert!(begin.elapsed() < TICK);

        manager.stop().await;
        assert!(!manager.is_running());
        assert_eq!(manager.start(1), Err(AutomationError::Terminated));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_start_prevents_start() {
        let mut manager = manager(
            storage(100, 1, [0, 0, 0]),
            Arc::new(RecordingProcessor::default()),
            AutomationTrigger::new(),
        );

        manager.stop().await;
        assert_eq!(manager.start(1), Err(AutomationError::Terminated));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_manager_ends_the_task() {
        let storage = storage(100, 1, [0, 0, 0]);
        let mut manager = manager(
            storage.clone(),
            Arc::new(RecordingProcessor::default()),
            AutomationTrigger::new(),
        );

        manager.start(3600).unwrap();
        settle().await;
        assert!(Arc::strong_count(&storage) > 2);

        drop(manager);
        settle().await;
        assert_eq!(Arc::strong_count(&storage), 1);
    }
}
