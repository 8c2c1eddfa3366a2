//! Live Display
//!
//! Read-only consumer of the settings store. It keeps its own copy of the
//! keys it uses (refresh rate, channel count, heater profile, trace buffer
//! size) and only refreshes that copy when told a save happened.

use crate::waveform::SineWaveform;
use sensorlab_core::{DisplayError, DisplayEvent};
use sensorlab_settings::{ChannelCount, HeaterProfile, SettingKey, Snapshot};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info};

/// Number of channel slots on the plot
pub const SLOT_COUNT: usize = 8;

/// Slowest refresh rate in Hz
pub const MIN_RATE_HZ: i64 = 1;

/// Fastest refresh rate in Hz
pub const MAX_RATE_HZ: i64 = 200;

/// Trace colors, one per slot
pub const SLOT_COLORS: [&str; SLOT_COUNT] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

/// Refresh interval for `rate` Hz; rates below 1 are treated as 1
pub fn interval_for_rate(rate: i64) -> Duration {
    let rate = rate.clamp(MIN_RATE_HZ, MAX_RATE_HZ);
    Duration::from_millis((1000 / rate) as u64)
}

/// Display lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    Running,
}

/// Settings the display consumes
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub rate_hz: i64,
    pub channels: ChannelCount,
    pub heater_profile: HeaterProfile,
    pub buffer_points: usize,
}

impl DisplaySettings {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            rate_hz: snapshot.integer(SettingKey::Rate),
            channels: snapshot.parse_choice(SettingKey::Channels),
            heater_profile: snapshot.parse_choice(SettingKey::HeaterProfile),
            buffer_points: snapshot.unsigned(SettingKey::Buffer).max(1) as usize,
        }
    }
}

/// One plot trace
#[derive(Debug, Clone)]
pub struct ChannelSlot {
    name: String,
    color: &'static str,
    visible: bool,
    trace: VecDeque<(f64, f64)>,
}

impl ChannelSlot {
    fn new(index: usize) -> Self {
        Self {
            name: format!("CH{}", index + 1),
            color: SLOT_COLORS[index],
            visible: false,
            trace: VecDeque::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &'static str {
        self.color
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Points on the trace, oldest first
    pub fn points(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.trace.iter()
    }

    pub fn len(&self) -> usize {
        self.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    pub fn latest(&self) -> Option<(f64, f64)> {
        self.trace.back().copied()
    }

    fn push(&mut self, point: (f64, f64), capacity: usize) {
        self.trace.push_back(point);
        self.truncate(capacity);
    }

    fn truncate(&mut self, capacity: usize) {
        while self.trace.len() > capacity {
            self.trace.pop_front();
        }
    }
}

/// Live plotting dashboard state
#[derive(Debug)]
pub struct LiveDisplay {
    state: DisplayState,
    settings: DisplaySettings,
    rate_hz: i64,
    heater_profile: HeaterProfile,
    slots: Vec<ChannelSlot>,
    waveform: SineWaveform,
    interval_changed: Arc<Notify>,
}

impl LiveDisplay {
    /// Build the display from the current settings and start it
    pub fn new(snapshot: &Snapshot) -> Self {
        let settings = DisplaySettings::from_snapshot(snapshot);
        let mut live = Self {
            state: DisplayState::Idle,
            rate_hz: settings.rate_hz.clamp(MIN_RATE_HZ, MAX_RATE_HZ),
            heater_profile: settings.heater_profile,
            settings,
            slots: (0..SLOT_COUNT).map(ChannelSlot::new).collect(),
            waveform: SineWaveform::new(),
            interval_changed: Arc::new(Notify::new()),
        };
        live.apply_visibility();
        live.state = DisplayState::Running;

        let interval_ms = live.interval_ms();
        let visible = live.visible_count();
        info!(
            interval_ms,
            visible,
            profile = live.heater_label(),
            "Live display running"
        );
        live
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    /// Consumed settings as of the last refresh
    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    /// Re-read the consumed keys after a save.
    ///
    /// Returns one event per visible change.
    pub fn apply_settings(&mut self, snapshot: &Snapshot) -> Vec<DisplayEvent> {
        let next = DisplaySettings::from_snapshot(snapshot);
        let previous = std::mem::replace(&mut self.settings, next);
        let mut events = Vec::new();

        if previous.rate_hz != self.settings.rate_hz || self.rate_hz != self.settings.rate_hz {
            if let Some(event) = self.set_rate(self.settings.rate_hz) {
                events.push(event);
            }
        }

        if previous.channels != self.settings.channels {
            self.apply_visibility();
            events.push(DisplayEvent::ChannelsChanged {
                visible: self.visible_count(),
            });
        }

        if previous.heater_profile != self.settings.heater_profile
            || self.heater_profile != self.settings.heater_profile
        {
            if let Some(event) = self.set_heater_profile(self.settings.heater_profile) {
                events.push(event);
            }
        }

        if previous.buffer_points != self.settings.buffer_points {
            let capacity = self.settings.buffer_points;
            for slot in &mut self.slots {
                slot.truncate(capacity);
            }
        }

        debug!("Display refreshed, {} changes", events.len());
        events
    }

    /// Change the refresh rate from the dashboard without touching the store.
    ///
    /// Returns an event when the interval actually changed.
    pub fn set_rate(&mut self, rate: i64) -> Option<DisplayEvent> {
        let before = self.interval();
        self.rate_hz = rate.clamp(MIN_RATE_HZ, MAX_RATE_HZ);
        let after = self.interval();

        (before != after).then(|| {
            debug!("Display interval {}ms -> {}ms", before.as_millis(), after.as_millis());
            self.interval_changed.notify_one();
            DisplayEvent::IntervalChanged {
                interval_ms: after.as_millis() as u64,
            }
        })
    }

    /// Select the heater profile from the dashboard without touching the store.
    pub fn set_heater_profile(&mut self, profile: HeaterProfile) -> Option<DisplayEvent> {
        if self.heater_profile == profile {
            return None;
        }
        debug!("Heater profile {} -> {}", self.heater_profile, profile);
        self.heater_profile = profile;
        Some(DisplayEvent::ProfileChanged {
            profile: profile.label().to_string(),
        })
    }

    /// Signalled whenever the refresh interval changes
    pub fn interval_changed(&self) -> Arc<Notify> {
        self.interval_changed.clone()
    }

    /// Effective refresh rate in Hz
    pub fn rate_hz(&self) -> i64 {
        self.rate_hz
    }

    pub fn interval(&self) -> Duration {
        interval_for_rate(self.rate_hz)
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval().as_millis() as u64
    }

    /// Advance the simulated signal and append one point to every trace
    pub fn tick(&mut self) {
        let t = self.waveform.advance();
        let capacity = self.settings.buffer_points;
        for (slot, value) in self.slots.iter_mut().zip(self.waveform.frame(SLOT_COUNT)) {
            slot.push((t, value), capacity);
        }
    }

    /// Simulated time of the newest point
    pub fn time(&self) -> f64 {
        self.waveform.time()
    }

    fn apply_visibility(&mut self) {
        let count = self.settings.channels.count();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.visible = i < count;
        }
    }

    pub fn visible_count(&self) -> usize {
        self.slots.iter().filter(|s| s.visible).count()
    }

    pub fn visible_slots(&self) -> impl Iterator<Item = &ChannelSlot> {
        self.slots.iter().filter(|s| s.visible)
    }

    pub fn slots(&self) -> &[ChannelSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Result<&ChannelSlot, DisplayError> {
        self.slots.get(index).ok_or(DisplayError::ChannelOutOfRange {
            index,
            count: SLOT_COUNT,
        })
    }

    pub fn heater_profile(&self) -> HeaterProfile {
        self.heater_profile
    }

    /// Label shown next to the microheater selector
    pub fn heater_label(&self) -> &'static str {
        self.heater_profile.label()
    }
}
