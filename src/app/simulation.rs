use tracing::info;

use super::{Ownership, RenderNode};

/// Physics ticks allowed after a filtered-graph change before the layout is frozen.
pub const WARMUP_TICK_BUDGET: u32 = 900;
/// Seconds a resumed simulation runs before it freezes itself again.
pub const AUTO_FREEZE_AFTER_RESUME: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settled {
    /// First stabilization after a graph change; the camera should fit the layout.
    pub fit_to_view: bool,
}

#[derive(Clone, Debug)]
pub struct SimulationController {
    running: bool,
    ticks_left: u32,
    auto_freeze_at: Option<f64>,
    fit_on_settle: bool,
}

impl Default for SimulationController {
    fn default() -> Self {
        Self {
            running: true,
            ticks_left: WARMUP_TICK_BUDGET,
            auto_freeze_at: None,
            fit_on_settle: true,
        }
    }
}

impl SimulationController {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn auto_freeze_at(&self) -> Option<f64> {
        self.auto_freeze_at
    }

    /// Re-enters the warm-up phase after the displayed graph changed.
    pub fn restart(&mut self) {
        if !self.running {
            info!("simulation restarted");
        }
        self.running = true;
        self.ticks_left = WARMUP_TICK_BUDGET;
        self.auto_freeze_at = None;
        self.fit_on_settle = true;
    }

    pub fn freeze(&mut self) -> bool {
        self.auto_freeze_at = None;
        if !self.running {
            return false;
        }
        self.running = false;
        info!("simulation frozen");
        true
    }

    /// Releases every pinned node and runs until the auto-freeze deadline.
    pub fn resume<'a>(
        &mut self,
        now: f64,
        nodes: impl IntoIterator<Item = &'a mut RenderNode>,
    ) -> usize {
        let mut released = 0usize;
        for node in nodes {
            if node.ownership == Ownership::Pinned {
                node.ownership = Ownership::Simulated;
                released += 1;
            }
        }

        self.running = true;
        self.ticks_left = WARMUP_TICK_BUDGET;
        self.auto_freeze_at = Some(now + AUTO_FREEZE_AFTER_RESUME);
        info!(released, "simulation resumed");
        released
    }

    /// Enforces the auto-freeze deadline; returns whether the engine should step this frame.
    pub fn tick(&mut self, now: f64) -> bool {
        if self.running
            && self
                .auto_freeze_at
                .is_some_and(|deadline| now >= deadline)
        {
            self.running = false;
            self.auto_freeze_at = None;
            info!("simulation auto-frozen after resume window");
        }
        self.running
    }

    /// Feeds back the outcome of one engine step.
    pub fn report_step(&mut self, moving: bool) -> Option<Settled> {
        if !self.running {
            return None;
        }

        self.ticks_left = self.ticks_left.saturating_sub(1);
        if moving && self.ticks_left > 0 {
            return None;
        }

        self.running = false;
        self.auto_freeze_at = None;
        let fit_to_view = std::mem::take(&mut self.fit_on_settle);
        info!(budget_exhausted = moving, "simulation stabilized");
        Some(Settled { fit_to_view })
    }
}
