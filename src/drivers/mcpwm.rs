//! Servo pulse generation on the MCPWM peripheral.
//!
//! One chain per servo: timer → operator → comparator → generator. The
//! generator goes HIGH when the timer wraps to zero and LOW when the
//! counter reaches the compare value, so the compare value *is* the
//! pulse width in timer ticks (1 tick = 1 us at the default resolution).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: raw `mcpwm_*` driver calls via `esp_idf_svc::sys`.
//! On host/test: tracks state in-memory only.
//!
//! A failed `acquire` releases whatever part of the chain it had already
//! allocated, so a later attempt starts from a clean peripheral.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;
use log::warn;

use crate::config::ServoTiming;
use crate::error::PwmError;

/// Exclusive handle on one servo's pulse output.
///
/// Implementations are moved into the owning service's worker and never
/// shared, so register access needs no locking.
pub trait PulseOutput: Send + 'static {
    /// Allocate the chain on `gpio`, preload `initial_us`, and start the
    /// timer free-running. Called once per successful setup.
    fn acquire(&mut self, gpio: i32, timing: &ServoTiming, initial_us: u32) -> Result<(), PwmError>;

    /// Program a new pulse width. Takes effect at the next timer wrap.
    fn set_pulse_width_us(&mut self, pulse_us: u32) -> Result<(), PwmError>;
}

/// All servo timers share MCPWM group 0; operators must match their timer's group.
#[cfg(target_os = "espidf")]
const MCPWM_GROUP: i32 = 0;

/// MCPWM-backed pulse output.
pub struct McpwmPulseChain {
    #[cfg(target_os = "espidf")]
    timer: mcpwm_timer_handle_t,
    #[cfg(target_os = "espidf")]
    operator: mcpwm_oper_handle_t,
    #[cfg(target_os = "espidf")]
    comparator: mcpwm_cmpr_handle_t,
    #[cfg(target_os = "espidf")]
    generator: mcpwm_gen_handle_t,
    /// Chain stages currently allocated (timer, operator, comparator, generator).
    #[cfg(not(target_os = "espidf"))]
    stages: u8,
    gpio: Option<i32>,
    pulse_us: u32,
}

// SAFETY: the driver handles are plain pointers into IDF-owned objects. The
// chain is only ever used by one thread at a time (it is moved into its
// worker after acquisition), and the MCPWM driver has no thread affinity.
#[cfg(target_os = "espidf")]
unsafe impl Send for McpwmPulseChain {}

impl Default for McpwmPulseChain {
    fn default() -> Self {
        Self::new()
    }
}

impl McpwmPulseChain {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            timer: core::ptr::null_mut(),
            #[cfg(target_os = "espidf")]
            operator: core::ptr::null_mut(),
            #[cfg(target_os = "espidf")]
            comparator: core::ptr::null_mut(),
            #[cfg(target_os = "espidf")]
            generator: core::ptr::null_mut(),
            #[cfg(not(target_os = "espidf"))]
            stages: 0,
            gpio: None,
            pulse_us: 0,
        }
    }

    /// GPIO the chain was bound to, once acquired.
    pub fn gpio(&self) -> Option<i32> {
        self.gpio
    }

    /// Last pulse width successfully programmed.
    pub fn pulse_us(&self) -> u32 {
        self.pulse_us
    }
}

impl PulseOutput for McpwmPulseChain {
    fn acquire(&mut self, gpio: i32, timing: &ServoTiming, initial_us: u32) -> Result<(), PwmError> {
        if let Err(e) = self.build_chain(gpio, timing, initial_us) {
            warn!("mcpwm: chain setup on gpio {} failed: {}, releasing", gpio, e);
            self.release_chain();
            return Err(e);
        }
        self.gpio = Some(gpio);
        self.pulse_us = initial_us;
        Ok(())
    }

    fn set_pulse_width_us(&mut self, pulse_us: u32) -> Result<(), PwmError> {
        self.write_compare(pulse_us)?;
        self.pulse_us = pulse_us;
        Ok(())
    }
}

impl Drop for McpwmPulseChain {
    fn drop(&mut self) {
        if self.is_allocated() {
            self.release_chain();
        }
    }
}

// ---------------------------------------------------------------------------
// ESP-IDF chain
// ---------------------------------------------------------------------------

#[cfg(target_os = "espidf")]
fn check(rc: esp_err_t, stage: fn(i32) -> PwmError) -> Result<(), PwmError> {
    if rc == ESP_OK as esp_err_t {
        Ok(())
    } else {
        Err(stage(rc))
    }
}

#[cfg(target_os = "espidf")]
impl McpwmPulseChain {
    /// Whether any part of the chain is currently allocated.
    pub fn is_allocated(&self) -> bool {
        !self.timer.is_null()
    }

    fn build_chain(&mut self, gpio: i32, timing: &ServoTiming, initial_us: u32) -> Result<(), PwmError> {
        info!("mcpwm: create timer and operator (gpio={})", gpio);
        let timer_config = mcpwm_timer_config_t {
            group_id: MCPWM_GROUP,
            clk_src: soc_periph_mcpwm_timer_clk_src_t_MCPWM_TIMER_CLK_SRC_DEFAULT,
            resolution_hz: timing.timer_resolution_hz,
            count_mode: mcpwm_timer_count_mode_t_MCPWM_TIMER_COUNT_MODE_UP,
            period_ticks: timing.timer_period_ticks,
            ..Default::default()
        };
        // SAFETY: config outlives the call; the out-pointer is our own field.
        check(unsafe { mcpwm_new_timer(&timer_config, &mut self.timer) }, PwmError::TimerAlloc)?;

        let operator_config = mcpwm_operator_config_t {
            group_id: MCPWM_GROUP,
            ..Default::default()
        };
        check(
            unsafe { mcpwm_new_operator(&operator_config, &mut self.operator) },
            PwmError::OperatorAlloc,
        )?;

        info!("mcpwm: connect timer and operator");
        check(
            unsafe { mcpwm_operator_connect_timer(self.operator, self.timer) },
            PwmError::ConnectTimer,
        )?;

        info!("mcpwm: create comparator and generator");
        let mut comparator_config = mcpwm_comparator_config_t::default();
        // Latch new compare values at the frame boundary only, so a pulse is never cut short.
        comparator_config.flags.set_update_cmp_on_tez(1);
        check(
            unsafe { mcpwm_new_comparator(self.operator, &comparator_config, &mut self.comparator) },
            PwmError::ComparatorAlloc,
        )?;

        let generator_config = mcpwm_generator_config_t {
            gen_gpio_num: gpio,
            ..Default::default()
        };
        check(
            unsafe { mcpwm_new_generator(self.operator, &generator_config, &mut self.generator) },
            PwmError::GeneratorAlloc,
        )?;

        self.write_compare(initial_us)?;

        info!("mcpwm: set generator action on timer and compare event");
        check(
            unsafe {
                mcpwm_generator_set_action_on_timer_event(
                    self.generator,
                    mcpwm_gen_timer_event_action_t {
                        direction: mcpwm_timer_direction_t_MCPWM_TIMER_DIRECTION_UP,
                        event: mcpwm_timer_event_t_MCPWM_TIMER_EVENT_EMPTY,
                        action: mcpwm_generator_action_t_MCPWM_GEN_ACTION_HIGH,
                    },
                )
            },
            PwmError::GeneratorAction,
        )?;
        check(
            unsafe {
                mcpwm_generator_set_action_on_compare_event(
                    self.generator,
                    mcpwm_gen_compare_event_action_t {
                        direction: mcpwm_timer_direction_t_MCPWM_TIMER_DIRECTION_UP,
                        comparator: self.comparator,
                        action: mcpwm_generator_action_t_MCPWM_GEN_ACTION_LOW,
                    },
                )
            },
            PwmError::GeneratorAction,
        )?;

        info!("mcpwm: enable and start timer");
        check(unsafe { mcpwm_timer_enable(self.timer) }, PwmError::TimerEnable)?;
        check(
            unsafe {
                mcpwm_timer_start_stop(self.timer, mcpwm_timer_start_stop_cmd_t_MCPWM_TIMER_START_NO_STOP)
            },
            PwmError::TimerStart,
        )
    }

    fn write_compare(&mut self, pulse_us: u32) -> Result<(), PwmError> {
        // SAFETY: comparator was created in build_chain(); only the owning worker calls this.
        check(
            unsafe { mcpwm_comparator_set_compare_value(self.comparator, pulse_us) },
            PwmError::SetCompare,
        )
    }

    /// Delete every allocated stage, generator first, and null the handles.
    fn release_chain(&mut self) {
        // SAFETY: each handle is either null or was returned by its mcpwm_new_*
        // call and not yet deleted. Children go before their operator, the
        // operator before the timer it is connected to.
        unsafe {
            if !self.generator.is_null() {
                mcpwm_del_generator(self.generator);
            }
            if !self.comparator.is_null() {
                mcpwm_del_comparator(self.comparator);
            }
            if !self.operator.is_null() {
                mcpwm_del_operator(self.operator);
            }
            if !self.timer.is_null() {
                // Fails harmlessly when the timer never got enabled.
                mcpwm_timer_disable(self.timer);
                mcpwm_del_timer(self.timer);
            }
        }
        self.generator = core::ptr::null_mut();
        self.comparator = core::ptr::null_mut();
        self.operator = core::ptr::null_mut();
        self.timer = core::ptr::null_mut();
        self.gpio = None;
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

#[cfg(not(target_os = "espidf"))]
const ESP_ERR_INVALID_ARG: i32 = 0x102;
#[cfg(not(target_os = "espidf"))]
const ESP_ERR_INVALID_STATE: i32 = 0x103;

/// Highest output-capable GPIO on the ESP32-S3.
#[cfg(not(target_os = "espidf"))]
const SIM_MAX_GPIO: i32 = 48;

#[cfg(not(target_os = "espidf"))]
impl McpwmPulseChain {
    /// Whether any part of the chain is currently allocated.
    pub fn is_allocated(&self) -> bool {
        self.stages > 0
    }

    fn build_chain(&mut self, gpio: i32, timing: &ServoTiming, initial_us: u32) -> Result<(), PwmError> {
        log::info!(
            "mcpwm(sim): gpio={} {}Hz/{} ticks, initial={}us",
            gpio,
            timing.timer_resolution_hz,
            timing.timer_period_ticks,
            initial_us
        );
        // timer, operator, comparator
        self.stages = 3;
        if !(0..=SIM_MAX_GPIO).contains(&gpio) {
            return Err(PwmError::GeneratorAlloc(ESP_ERR_INVALID_ARG));
        }
        self.stages = 4;
        self.write_compare(initial_us)
    }

    fn write_compare(&mut self, _pulse_us: u32) -> Result<(), PwmError> {
        if self.stages < 3 {
            return Err(PwmError::SetCompare(ESP_ERR_INVALID_STATE));
        }
        Ok(())
    }

    fn release_chain(&mut self) {
        self.stages = 0;
        self.gpio = None;
    }
}
