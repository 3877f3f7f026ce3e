use std::sync::Arc;

use crate::domain::recommendation::{Recommendation, RecommendationKind};
use crate::domain::simulation::{SimulatedAction, SimulationReport};
use crate::gateway::AnalysisGateway;
use crate::workflow::WorkflowError;

const SIMULATION_FALLBACK: &str = "Failed to run simulation";

/// What the simulation panel is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationView {
    Closed,
    Running {
        campaign_name: String,
        action: SimulatedAction,
    },
    Complete(SimulationReport),
    Errored(String),
}

/// Handle for one opened simulation. Tickets from a closed view go stale and
/// can no longer affect the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationTicket {
    epoch: u64,
    campaign_name: String,
    action: SimulatedAction,
}

impl SimulationTicket {
    pub fn campaign_name(&self) -> &str {
        &self.campaign_name
    }

    pub fn action(&self) -> SimulatedAction {
        self.action
    }
}

/// Drives ad-hoc what-if simulations. Results are never cached; every open
/// issues a fresh request, and closing the view invalidates any outstanding
/// ticket so a late resolve cannot repaint a dismissed panel.
pub struct SimulationRequester {
    gateway: Arc<dyn AnalysisGateway>,
    view: SimulationView,
    epoch: u64,
}

impl SimulationRequester {
    pub fn new(gateway: Arc<dyn AnalysisGateway>) -> Self {
        Self {
            gateway,
            view: SimulationView::Closed,
            epoch: 0,
        }
    }

    pub fn view(&self) -> &SimulationView {
        &self.view
    }

    /// Map a recommendation to the action the simulation will model: fatigue
    /// refreshes the named campaign's creative, reallocation moves budget out
    /// of its source campaign. Anything else has no defined action.
    pub fn derive_action(
        recommendation: &Recommendation,
    ) -> Result<(String, SimulatedAction), WorkflowError> {
        match &recommendation.kind {
            RecommendationKind::Fatigue => {
                let campaign = recommendation.details.campaign_name.clone().ok_or_else(|| {
                    WorkflowError::Precondition(
                        "fatigue recommendation is missing details.campaign_name".to_string(),
                    )
                })?;
                Ok((campaign, SimulatedAction::RefreshCreative))
            }
            RecommendationKind::Reallocation => {
                let campaign = recommendation.details.from_campaign.clone().ok_or_else(|| {
                    WorkflowError::Precondition(
                        "reallocation recommendation is missing details.from_campaign".to_string(),
                    )
                })?;
                Ok((campaign, SimulatedAction::ReallocateBudget))
            }
            RecommendationKind::Other(kind) => {
                Err(WorkflowError::UnsupportedKind { kind: kind.clone() })
            }
        }
    }

    /// Open the view for one recommendation and hand back the ticket the
    /// caller must later resolve.
    pub fn open(
        &mut self,
        recommendation: &Recommendation,
    ) -> Result<SimulationTicket, WorkflowError> {
        let (campaign_name, action) = Self::derive_action(recommendation)?;
        self.epoch += 1;
        self.view = SimulationView::Running {
            campaign_name: campaign_name.clone(),
            action,
        };
        tracing::debug!(campaign = %campaign_name, %action, epoch = self.epoch, "simulation opened");
        Ok(SimulationTicket {
            epoch: self.epoch,
            campaign_name,
            action,
        })
    }

    /// Run the simulation for `ticket`. A stale ticket is discarded without a
    /// request. A gateway failure becomes the errored view rather than an
    /// error return; the display message prefers the service's detail.
    pub async fn resolve(&mut self, ticket: &SimulationTicket) -> &SimulationView {
        if ticket.epoch != self.epoch {
            tracing::debug!(
                ticket_epoch = ticket.epoch,
                current_epoch = self.epoch,
                "simulation ticket is stale; discarding"
            );
            return &self.view;
        }
        match self
            .gateway
            .simulate(&ticket.campaign_name, ticket.action)
            .await
        {
            Ok(report) => {
                self.view = SimulationView::Complete(report);
            }
            Err(err) => {
                tracing::warn!(campaign = %ticket.campaign_name, error = %err, "simulation failed");
                self.view = SimulationView::Errored(err.display_message(SIMULATION_FALLBACK));
            }
        }
        &self.view
    }

    /// Dismiss the view and invalidate outstanding tickets.
    pub fn close(&mut self) {
        self.epoch += 1;
        self.view = SimulationView::Closed;
    }
}
