//! Approval service
//!
//! Routes spending requests through a chain of approvers and narrates each
//! verdict.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::ChainConfig;
use crate::domain::{ChainLink, Handler, Request, Resolution};
use crate::infrastructure::traits::Console;

/// Service narrating a responsibility chain.
pub struct ApprovalService {
    chain: ChainLink,
    currency: String,
    console: Arc<dyn Console>,
}

impl ApprovalService {
    pub fn new(chain: ChainLink, currency: impl Into<String>, console: Arc<dyn Console>) -> Self {
        if !chain.is_monotonic() {
            warn!(
                chain = ?chain.titles(),
                "approver limits decrease along the chain; later approvers may never see requests"
            );
        }
        Self {
            chain,
            currency: currency.into(),
            console,
        }
    }

    /// Build the chain from configured approvers.
    pub fn from_settings(settings: &ChainConfig, console: Arc<dyn Console>) -> ApplicationResult<Self> {
        let handlers = settings
            .build_approvers()?
            .into_iter()
            .map(|a| Box::new(a) as Box<dyn Handler>)
            .collect::<Vec<_>>();
        let chain = ChainLink::from_handlers(handlers).ok_or_else(|| ApplicationError::Config {
            message: "chain.approvers must name at least one approver".into(),
        })?;
        Ok(Self::new(chain, settings.currency.clone(), console))
    }

    /// The batch of requests used by the demo.
    pub fn sample_requests() -> Vec<Request> {
        vec![
            Request::new(120.0, "Stationery purchase"),
            Request::new(999.9, "Team lunch"),
            Request::new(1_800.0, "New dev laptop (deposit)"),
            Request::new(4_200.0, "Conference fees"),
            Request::new(22_000.0, "Small server upgrade"),
            Request::new(120_000.0, "Data center annual contract"),
            Request::new(350_000.0, "New office renovation"),
        ]
    }

    pub fn chain(&self) -> &ChainLink {
        &self.chain
    }

    /// Print the chain order.
    pub fn announce(&self) {
        self.console
            .header(&format!("== Approval chain: {} ==", self.chain.titles().join(" -> ")));
    }

    /// Offer one request to the chain and narrate every verdict.
    #[instrument(level = "debug", skip(self, request), fields(description = %request.description))]
    pub fn submit(&self, request: &Request) -> Resolution {
        let resolution = self.chain.handle(request);
        let subject = format!(
            "{} ({} {:.2})",
            request.description, self.currency, request.amount
        );
        let last = self.chain.len() - 1;

        for (position, verdict) in resolution.trail.iter().enumerate() {
            if verdict.accepted {
                self.console.success(&format!(
                    "[APPROVED]  {} approved: {}",
                    verdict.handler, subject
                ));
            } else if position == last {
                self.console.line(&format!(
                    "[PASS]      {} cannot approve per policy cap: {}",
                    verdict.handler, subject
                ));
            } else {
                self.console
                    .line(&format!("[PASS]      {} passes: {}", verdict.handler, subject));
            }
        }

        match resolution.approved_by() {
            Some(by) => info!(by, "request approved"),
            None => {
                info!("request unresolved");
                self.console
                    .failure(&format!("[REJECTED]  No approver for: {}", subject));
            }
        }
        resolution
    }

    pub fn submit_all(&self, requests: &[Request]) -> Vec<Resolution> {
        requests.iter().map(|r| self.submit(r)).collect()
    }
}
