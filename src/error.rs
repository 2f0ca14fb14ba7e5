//! Unified error types for the cabin firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the bootstrap path's error handling uniform. All variants are `Copy`
//! so they can be returned across worker boundaries without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The pulse-generation chain could not be acquired or programmed.
    Pwm(PwmError),
    /// A command channel operation failed.
    Channel(ChannelError),
    /// An actuator rejected a request.
    Request(RequestError),
    /// The service registry refused an operation.
    Registry(RegistryError),
    /// A service failed to build or set up.
    Service(ServiceError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pwm(e) => write!(f, "pwm: {e}"),
            Self::Channel(e) => write!(f, "channel: {e}"),
            Self::Request(e) => write!(f, "request: {e}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Service(e) => write!(f, "service: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Pulse chain (MCPWM) errors
// ---------------------------------------------------------------------------

/// Failures of the timer → operator → comparator → generator chain.
///
/// Each variant carries the raw ESP-IDF `esp_err_t` of the failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    TimerAlloc(i32),
    OperatorAlloc(i32),
    ConnectTimer(i32),
    ComparatorAlloc(i32),
    GeneratorAlloc(i32),
    GeneratorAction(i32),
    SetCompare(i32),
    TimerEnable(i32),
    TimerStart(i32),
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimerAlloc(rc) => write!(f, "timer allocation failed (rc={})", rc),
            Self::OperatorAlloc(rc) => write!(f, "operator allocation failed (rc={})", rc),
            Self::ConnectTimer(rc) => write!(f, "operator/timer connect failed (rc={})", rc),
            Self::ComparatorAlloc(rc) => write!(f, "comparator allocation failed (rc={})", rc),
            Self::GeneratorAlloc(rc) => write!(f, "generator allocation failed (rc={})", rc),
            Self::GeneratorAction(rc) => write!(f, "generator action setup failed (rc={})", rc),
            Self::SetCompare(rc) => write!(f, "compare value write failed (rc={})", rc),
            Self::TimerEnable(rc) => write!(f, "timer enable failed (rc={})", rc),
            Self::TimerStart(rc) => write!(f, "timer start failed (rc={})", rc),
        }
    }
}

impl std::error::Error for PwmError {}

impl From<PwmError> for Error {
    fn from(e: PwmError) -> Self {
        Self::Pwm(e)
    }
}

// ---------------------------------------------------------------------------
// Channel errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel stayed full for the whole send timeout; nothing was enqueued.
    Timeout,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "send timed out, channel full"),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Self::Channel(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator request errors
// ---------------------------------------------------------------------------

/// Why an actuator refused a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// The service has not completed `setup()` yet.
    NotReady,
    /// The command queue stayed full past the request timeout.
    Timeout,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "actuator not set up"),
            Self::Timeout => write!(f, "command queue full"),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<ChannelError> for RequestError {
    fn from(e: ChannelError) -> Self {
        match e {
            ChannelError::Timeout => Self::Timeout,
        }
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        Self::Request(e)
    }
}

// ---------------------------------------------------------------------------
// Service errors
// ---------------------------------------------------------------------------

/// Failures raised by a service while it is being built or set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    /// Hardware acquisition failed.
    Pwm(PwmError),
    /// The named worker thread could not be spawned.
    WorkerSpawn(&'static str),
    /// A collaborator service was not created first.
    MissingDependency(&'static str),
    /// `setup()` was called a second time.
    AlreadySetUp,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pwm(e) => write!(f, "{e}"),
            Self::WorkerSpawn(name) => write!(f, "worker '{}' spawn failed", name),
            Self::MissingDependency(name) => write!(f, "dependency {} not created", name),
            Self::AlreadySetUp => write!(f, "already set up"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<PwmError> for ServiceError {
    fn from(e: PwmError) -> Self {
        Self::Pwm(e)
    }
}

impl From<ServiceError> for Error {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// `create` was called twice for the same service type.
    AlreadyCreated(&'static str),
    /// `get` was called for a type that was never created.
    NotCreated(&'static str),
    /// The fixed-capacity service table is full.
    Full,
    /// The service failed to build or set up; nothing was registered.
    Setup {
        service: &'static str,
        cause: ServiceError,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyCreated(name) => write!(f, "{} already created", name),
            Self::NotCreated(name) => write!(f, "{} not created", name),
            Self::Full => write!(f, "service table full"),
            Self::Setup { service, cause } => write!(f, "{} setup failed: {}", service, cause),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
