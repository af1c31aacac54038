//! LMS API session adapter.
//!
//! Content talks to the LMS through string-returning calls: booleans come
//! back as `"true"`/`"false"`, failures are reported out of band through
//! the last-error code.

use super::tracking::{RuntimeTrackingError, RuntimeTrackingService};
use crate::package::ports::PackageRepository;
use crate::runtime::{
    domain::{AttemptId, ElementValue, LearnerId},
    ports::{AttemptRepository, ElementRepository, RuntimeCache, RuntimeLogStore},
};
use mockable::Clock;
use tracing::warn;

const LMS_TRUE: &str = "true";
const LMS_FALSE: &str = "false";

/// Error codes reported by [`LmsSession::get_last_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LmsErrorCode {
    /// The last call succeeded.
    #[default]
    NoError,
    /// The backing store rejected the call.
    GeneralException,
    /// The call named no element.
    InvalidArgument,
    /// The call arrived outside an initialized session.
    NotInitialized,
}

impl LmsErrorCode {
    /// Returns the numeric code as content expects it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoError => "0",
            Self::GeneralException => "101",
            Self::InvalidArgument => "201",
            Self::NotInitialized => "301",
        }
    }

    /// Returns the human-readable description of the code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoError => "No error",
            Self::GeneralException => "General exception",
            Self::InvalidArgument => "Invalid argument error",
            Self::NotInitialized => "Not initialized",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Self::NoError),
            "101" => Some(Self::GeneralException),
            "201" => Some(Self::InvalidArgument),
            "301" => Some(Self::NotInitialized),
            _ => None,
        }
    }
}

/// One content session for a learner's attempt.
pub struct LmsSession<L, K, R, P, C>
where
    L: RuntimeLogStore,
    K: RuntimeCache,
    R: AttemptRepository + ElementRepository,
    P: PackageRepository,
    C: Clock + Send + Sync,
{
    service: RuntimeTrackingService<L, K, R, P, C>,
    learner_id: LearnerId,
    attempt_id: AttemptId,
    initialized: bool,
    last_error: LmsErrorCode,
    diagnostic: Option<String>,
}

impl<L, K, R, P, C> LmsSession<L, K, R, P, C>
where
    L: RuntimeLogStore,
    K: RuntimeCache,
    R: AttemptRepository + ElementRepository,
    P: PackageRepository,
    C: Clock + Send + Sync,
{
    /// Opens an uninitialized session bound to one attempt.
    #[must_use]
    pub const fn new(
        service: RuntimeTrackingService<L, K, R, P, C>,
        learner_id: LearnerId,
        attempt_id: AttemptId,
    ) -> Self {
        Self {
            service,
            learner_id,
            attempt_id,
            initialized: false,
            last_error: LmsErrorCode::NoError,
            diagnostic: None,
        }
    }

    /// Begins the session. A second call without `finish` fails.
    pub fn initialize(&mut self, _parameter: &str) -> &'static str {
        if self.initialized {
            return self.fail(LmsErrorCode::GeneralException, "session already initialized");
        }
        self.initialized = true;
        self.succeed(LMS_TRUE)
    }

    /// Ends the session.
    pub fn finish(&mut self, _parameter: &str) -> &'static str {
        if !self.initialized {
            return self.fail(LmsErrorCode::NotInitialized, "finish before initialize");
        }
        self.initialized = false;
        self.succeed(LMS_TRUE)
    }

    /// Returns the current value of an element, or `""` when unset.
    pub async fn get_value(&mut self, element_id: &str) -> String {
        if let Err(code) = self.check_call(element_id) {
            self.fail(code, "get_value rejected");
            return String::new();
        }
        match self
            .service
            .get_value(self.learner_id, self.attempt_id, element_id)
            .await
        {
            Ok(ElementValue::Set(value)) => {
                self.succeed(LMS_TRUE);
                value
            }
            Ok(ElementValue::NotSet) => {
                self.succeed(LMS_TRUE);
                String::new()
            }
            Err(err) => {
                self.record_failure(&err);
                String::new()
            }
        }
    }

    /// Records a value for an element.
    pub async fn set_value(&mut self, element_id: &str, value: &str) -> &'static str {
        if let Err(code) = self.check_call(element_id) {
            return self.fail(code, "set_value rejected");
        }
        match self
            .service
            .set_value(self.learner_id, self.attempt_id, element_id, value)
            .await
        {
            Ok(()) => self.succeed(LMS_TRUE),
            Err(err) => {
                self.record_failure(&err);
                LMS_FALSE
            }
        }
    }

    /// Flushes pending writes. Writes are durable on `set_value`, so this
    /// only checks the session state.
    pub fn commit(&mut self, _parameter: &str) -> &'static str {
        if !self.initialized {
            return self.fail(LmsErrorCode::NotInitialized, "commit before initialize");
        }
        self.succeed(LMS_TRUE)
    }

    /// Returns the code of the last call.
    #[must_use]
    pub const fn get_last_error(&self) -> &'static str {
        self.last_error.as_str()
    }

    /// Describes an error code. Unknown codes read as empty.
    #[must_use]
    #[expect(
        clippy::unused_self,
        reason = "part of the session call surface content expects"
    )]
    pub fn get_error_string(&self, code: &str) -> &'static str {
        LmsErrorCode::from_code(code).map_or("", LmsErrorCode::description)
    }

    /// Returns detail for the last error, or for `code` when given.
    #[must_use]
    pub fn get_diagnostic(&self, code: &str) -> String {
        let requested = LmsErrorCode::from_code(code);
        let about_last = code.trim().is_empty() || requested == Some(self.last_error);
        match (&self.diagnostic, about_last) {
            (Some(detail), true) => detail.clone(),
            (None, true) if self.last_error == LmsErrorCode::NoError => {
                "No diagnostic information".to_owned()
            }
            (None, true) => self.last_error.description().to_owned(),
            (_, false) => requested.map_or_else(
                || "No diagnostic information".to_owned(),
                |other| other.description().to_owned(),
            ),
        }
    }

    fn check_call(&self, element_id: &str) -> Result<(), LmsErrorCode> {
        if !self.initialized {
            return Err(LmsErrorCode::NotInitialized);
        }
        if element_id.trim().is_empty() {
            return Err(LmsErrorCode::InvalidArgument);
        }
        Ok(())
    }

    fn succeed(&mut self, result: &'static str) -> &'static str {
        self.last_error = LmsErrorCode::NoError;
        self.diagnostic = None;
        result
    }

    fn fail(&mut self, code: LmsErrorCode, detail: &str) -> &'static str {
        self.last_error = code;
        self.diagnostic = Some(detail.to_owned());
        LMS_FALSE
    }

    fn record_failure(&mut self, err: &RuntimeTrackingError) {
        warn!(
            learner_id = %self.learner_id,
            attempt_id = %self.attempt_id,
            error = %err,
            "LMS call failed"
        );
        self.last_error = LmsErrorCode::GeneralException;
        self.diagnostic = Some(err.to_string());
    }
}
