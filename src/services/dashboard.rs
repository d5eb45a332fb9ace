//! Dashboard and statistics service

use crate::{
    error::AppResult,
    inventory::count_by_name,
    models::{
        dashboard::{StatsResponse, SupervisorDashboard},
        enums::{Role, TransferStatus},
        transfer::{TransferDirection, TransferQuery},
        user::Session,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Landing page of a supervisor. A supervisor without a site gets an
    /// empty dashboard rather than an error.
    pub async fn supervisor(&self, session: &Session) -> AppResult<SupervisorDashboard> {
        let Some(site_id) = session.site_id else {
            return Ok(SupervisorDashboard {
                site: None,
                owned: Vec::new(),
                rental: Vec::new(),
                incoming: Vec::new(),
                outgoing: Vec::new(),
            });
        };

        let incoming_query = TransferQuery {
            status: Some(TransferStatus::Pending),
            direction: Some(TransferDirection::Incoming),
        };
        let outgoing_query = TransferQuery {
            status: None,
            direction: Some(TransferDirection::Outgoing),
        };

        let (site, rows, incoming, outgoing) = tokio::try_join!(
            self.repository.sites.get_by_id(site_id),
            self.repository.equipment.list_by_site(site_id),
            self.repository.transfers.list_for_site(site_id, &incoming_query),
            self.repository.transfers.list_for_site(site_id, &outgoing_query),
        )?;

        Ok(SupervisorDashboard {
            site: Some(site),
            owned: count_by_name(&rows, false),
            rental: count_by_name(&rows, true),
            incoming,
            outgoing,
        })
    }

    /// Global counters for admins
    pub async fn stats(&self) -> AppResult<StatsResponse> {
        let (sites, admins, supervisors, owned_quantity, rental_quantity, pending_requests, pending_transfers) =
            tokio::try_join!(
                self.repository.sites.count(),
                self.repository.users.count_by_role(Role::Admin),
                self.repository.users.count_by_role(Role::Supervisor),
                self.repository.equipment.total_quantity(false),
                self.repository.equipment.total_quantity(true),
                self.repository.requests.count_pending(),
                self.repository.transfers.count_pending(),
            )?;

        Ok(StatsResponse {
            sites,
            admins,
            supervisors,
            owned_quantity,
            rental_quantity,
            pending_requests,
            pending_transfers,
        })
    }
}
