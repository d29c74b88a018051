//! Responsibility chain: a request is offered to each handler in turn until
//! one accepts it or the chain runs out.
//!
//! Each [`ChainLink`] owns its handler and the remainder of the chain after
//! it, so the chain is finite and acyclic by construction. Traversal never
//! mutates the structure.

use std::fmt;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// A request offered to the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub amount: f64,
    pub description: String,
}

impl Request {
    pub fn new(amount: f64, description: impl Into<String>) -> Self {
        Self {
            amount,
            description: description.into(),
        }
    }
}

/// One position in a responsibility chain.
pub trait Handler: Send + Sync {
    /// Display name used in verdicts and narration.
    fn title(&self) -> &str;

    /// Return `true` to accept the request and stop the traversal.
    fn process(&self, request: &Request) -> bool;

    /// Approval ceiling, for handlers that have one.
    fn limit(&self) -> Option<f64> {
        None
    }
}

/// Threshold handler: accepts any request whose amount is within its limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Approver {
    title: String,
    limit: f64,
}

impl Approver {
    /// # Errors
    /// [`DomainError::Validation`] if the title is blank or the limit is
    /// negative or not finite.
    pub fn new(title: impl Into<String>, limit: f64) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::Validation(
                "approver title must not be empty".into(),
            ));
        }
        if !limit.is_finite() || limit < 0.0 {
            return Err(DomainError::Validation(format!(
                "approver {title}: limit must be a finite, non-negative amount (got {limit})"
            )));
        }
        Ok(Self { title, limit })
    }
}

impl Handler for Approver {
    fn title(&self) -> &str {
        &self.title
    }

    fn process(&self, request: &Request) -> bool {
        request.amount <= self.limit
    }

    fn limit(&self) -> Option<f64> {
        Some(self.limit)
    }
}

/// A single handler's decision on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub handler: String,
    pub accepted: bool,
}

/// Terminal state of a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Approved { by: String },
    /// Every handler declined. This is an expected result, not a fault.
    Unresolved,
}

/// Result of offering one request to a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    /// Verdicts in chain order, ending at the accepting handler if any.
    pub trail: Vec<Verdict>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, Outcome::Approved { .. })
    }

    pub fn approved_by(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Approved { by } => Some(by),
            Outcome::Unresolved => None,
        }
    }
}

/// A handler together with exclusive ownership of its successors.
pub struct ChainLink {
    handler: Box<dyn Handler>,
    next: Option<Box<ChainLink>>,
}

impl fmt::Debug for ChainLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.titles()).finish()
    }
}

impl ChainLink {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self::from_boxed(Box::new(handler))
    }

    pub fn from_boxed(handler: Box<dyn Handler>) -> Self {
        Self {
            handler,
            next: None,
        }
    }

    /// Build a chain from handlers in order; `None` if there are none.
    pub fn from_handlers<I>(handlers: I) -> Option<Self>
    where
        I: IntoIterator<Item = Box<dyn Handler>>,
        I::IntoIter: DoubleEndedIterator,
    {
        handlers.into_iter().rev().fold(None, |tail, handler| {
            let mut link = Self::from_boxed(handler);
            link.next = tail.map(Box::new);
            Some(link)
        })
    }

    /// Make `next` this link's successor and return it for further building.
    ///
    /// Any previous successor, with everything after it, is dropped.
    pub fn attach(&mut self, next: ChainLink) -> &mut ChainLink {
        &mut **self.next.insert(Box::new(next))
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    pub fn next(&self) -> Option<&ChainLink> {
        self.next.as_deref()
    }

    /// Links from this one to the end of the chain.
    pub fn iter(&self) -> impl Iterator<Item = &ChainLink> {
        std::iter::successors(Some(self), |link| link.next())
    }

    // A link always holds a handler, so a chain is never empty
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.iter().map(|link| link.handler.title()).collect()
    }

    /// Whether the limits along the chain never decrease.
    ///
    /// Handlers without a limit are ignored. Ordering is not enforced; an
    /// unordered chain still works but may route requests unexpectedly.
    pub fn is_monotonic(&self) -> bool {
        self.iter()
            .filter_map(|link| link.handler.limit())
            .tuple_windows()
            .all(|(a, b)| a <= b)
    }

    /// Offer `request` to each handler in order, stopping at the first
    /// acceptance.
    #[instrument(level = "debug", skip(self, request), fields(amount = request.amount))]
    pub fn handle(&self, request: &Request) -> Resolution {
        let mut trail = Vec::new();
        for link in self.iter() {
            let title = link.handler.title();
            let accepted = link.handler.process(request);
            debug!(handler = title, accepted, "verdict");
            trail.push(Verdict {
                handler: title.to_string(),
                accepted,
            });
            if accepted {
                return Resolution {
                    outcome: Outcome::Approved {
                        by: title.to_string(),
                    },
                    trail,
                };
            }
        }
        Resolution {
            outcome: Outcome::Unresolved,
            trail,
        }
    }
}
