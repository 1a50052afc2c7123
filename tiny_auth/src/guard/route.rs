use crate::guard::config::TINY_AUTH_LOGIN_ROUTE;
use crate::session::{Session, Transition};

/// Host router as seen by the guard.
pub trait Navigator {
    /// Navigate to a named destination.
    fn transition_to(&mut self, destination: &str);

    /// Replay a transition that was interrupted earlier. Routers that carry
    /// parameters should override this; the default only keeps the destination.
    fn retry(&mut self, transition: Transition) {
        self.transition_to(transition.destination());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    Redirected,
}

/// Protects navigation targets that need an authenticated session.
///
/// An unauthenticated entry is remembered on the session as its attempted
/// transition and redirected to the login destination, so the application
/// can resume it once the user has logged in.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: Session,
    login_destination: String,
}

impl RouteGuard {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            login_destination: TINY_AUTH_LOGIN_ROUTE.to_string(),
        }
    }

    pub fn with_login_destination(mut self, destination: impl Into<String>) -> Self {
        self.login_destination = destination.into();
        self
    }

    pub fn login_destination(&self) -> &str {
        &self.login_destination
    }

    pub fn before_enter<N: Navigator + ?Sized>(
        &self,
        transition: Transition,
        navigator: &mut N,
    ) -> GuardOutcome {
        if self.session.is_authenticated() {
            return GuardOutcome::Proceed;
        }

        tracing::debug!(
            "Not authenticated, redirecting {} to {}",
            transition.destination(),
            self.login_destination
        );
        self.session.set_attempted_transition(Some(transition));
        navigator.transition_to(&self.login_destination);
        GuardOutcome::Redirected
    }

    /// Navigate to the transition interrupted by the guard, if there is one,
    /// and forget it. Returns whether navigation happened.
    pub fn resume_attempted<N: Navigator + ?Sized>(&self, navigator: &mut N) -> bool {
        match self.session.take_attempted_transition() {
            Some(transition) => {
                tracing::debug!("Resuming attempted transition to {}", transition.destination());
                navigator.retry(transition);
                true
            }
            None => false,
        }
    }
}
